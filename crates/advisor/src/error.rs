use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("invalid advisor configuration: {0}")]
    InvalidConfig(String),
    #[error("completion API key is not configured")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Http(String),
    #[error("completion request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("completion API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("completion API returned no content")]
    EmptyResponse,
    #[error("completion content is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("completion content did not match the advisory schema: {0}")]
    SchemaViolation(String),
}

pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;
