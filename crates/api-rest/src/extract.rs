//! `Path` and `Query` extractors that reject with the JSON error body.

use crate::error::ApiError;
use axum::extract::{FromRequestParts, Path, Query};

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
