//! Chat-completion clients.

use crate::{AdvisorConfig, AdvisorError, AdvisorResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A chat-completion backend returning the raw content of one reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> AdvisorResult<String>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: AdvisorConfig,
}

impl OpenAiClient {
    pub fn new(config: AdvisorConfig) -> AdvisorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdvisorError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> AdvisorResult<String> {
        let api_key = self.config.api_key().ok_or(AdvisorError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.config.base_url());
        let body = ChatRequest {
            model: self.config.model(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.config.temperature(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisorError::Timeout(self.config.timeout())
                } else {
                    AdvisorError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedJson(format!("completion envelope: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AdvisorError::EmptyResponse)
    }
}

/// Canned completion client for tests and offline demos.
pub struct StaticCompletionClient {
    reply: StaticReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

enum StaticReply {
    Content(String),
    Upstream { status: u16, body: String },
}

impl StaticCompletionClient {
    /// Always replies with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            reply: StaticReply::Content(content.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails as if the upstream returned `status`.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            reply: StaticReply::Upstream {
                status,
                body: body.into(),
            },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Waits `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StaticCompletionClient {
    async fn complete(&self, _system: &str, _user: &str) -> AdvisorResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            StaticReply::Content(content) => Ok(content.clone()),
            StaticReply::Upstream { status, body } => Err(AdvisorError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
