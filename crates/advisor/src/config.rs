//! Advisor configuration, resolved once at startup.

use crate::{AdvisorError, AdvisorResult};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const TEMPERATURE: f32 = 0.3;

#[derive(Clone)]
pub struct AdvisorConfig {
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
    temperature: f32,
}

impl AdvisorConfig {
    pub fn new(api_key: Option<String>, base_url: String, model: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            temperature: TEMPERATURE,
        }
    }

    /// Build from raw environment values; blank values fall back to the defaults.
    ///
    /// A missing API key is not an error here: analysis later fails with
    /// [`AdvisorError::MissingApiKey`].
    pub fn from_env_values(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        timeout_secs: Option<String>,
    ) -> AdvisorResult<Self> {
        let timeout_secs = non_blank(timeout_secs)
            .map(|v| {
                v.parse::<u64>().map_err(|_| {
                    AdvisorError::InvalidConfig(format!("timeout must be whole seconds, got {v}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AdvisorError::InvalidConfig(
                "timeout must be at least one second".into(),
            ));
        }

        Ok(Self::new(
            non_blank(api_key),
            non_blank(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            non_blank(model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            Duration::from_secs(timeout_secs),
        ))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_blank_values() {
        let config =
            AdvisorConfig::from_env_values(None, Some(" ".into()), None, None).expect("config");
        assert_eq!(config.api_key(), None);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!((config.temperature() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = AdvisorConfig::from_env_values(
            Some(" sk-test ".into()),
            Some("http://localhost:8080/v1/".into()),
            Some("gpt-4o".into()),
            Some("5".into()),
        )
        .expect("config");
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeout() {
        for value in ["soon", "0", "-3"] {
            let err = AdvisorConfig::from_env_values(None, None, None, Some(value.into()))
                .expect_err("invalid timeout");
            assert!(matches!(err, AdvisorError::InvalidConfig(_)), "{value}");
        }
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = AdvisorConfig::from_env_values(Some("sk-secret".into()), None, None, None)
            .expect("config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
