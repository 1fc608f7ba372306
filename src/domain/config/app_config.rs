//! Application configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default speech model submitted with transcription jobs
pub const DEFAULT_SPEECH_MODEL: &str = "slam-1";

/// Default delay between transcript status polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Default cap on transcript status polls before giving up.
/// A configured value of 0 disables the cap entirely.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 200;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub speech_model: Option<String>,
    pub notes_dir: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_poll_attempts: Option<u32>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            api_base_url: None,
            speech_model: Some(DEFAULT_SPEECH_MODEL.to_string()),
            notes_dir: None,
            poll_interval_secs: Some(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            api_base_url: other.api_base_url.or(self.api_base_url),
            speech_model: other.speech_model.or(self.speech_model),
            notes_dir: other.notes_dir.or(self.notes_dir),
            poll_interval_secs: other.poll_interval_secs.or(self.poll_interval_secs),
            max_poll_attempts: other.max_poll_attempts.or(self.max_poll_attempts),
        }
    }

    /// Get the speech model, or the default if not set
    pub fn speech_model_or_default(&self) -> &str {
        self.speech_model.as_deref().unwrap_or(DEFAULT_SPEECH_MODEL)
    }

    /// Get the poll interval, or the default if not set
    pub fn poll_interval_or_default(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    /// Get the poll attempt cap; `None` means poll without bound
    pub fn max_poll_attempts_or_default(&self) -> Option<u32> {
        match self.max_poll_attempts.unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS) {
            0 => None,
            n => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_credential() {
        let config = AppConfig::defaults();
        assert_eq!(config.api_key, None);
        assert_eq!(config.speech_model.as_deref(), Some(DEFAULT_SPEECH_MODEL));
    }

    #[test]
    fn merge_prefers_other() {
        let base = AppConfig {
            api_key: Some("base-key".to_string()),
            speech_model: Some("base-model".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            speech_model: Some("other-model".to_string()),
            poll_interval_secs: Some(1),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.api_key.as_deref(), Some("base-key"));
        assert_eq!(merged.speech_model.as_deref(), Some("other-model"));
        assert_eq!(merged.poll_interval_secs, Some(1));
    }

    #[test]
    fn poll_interval_default_is_three_seconds() {
        let config = AppConfig::empty();
        assert_eq!(config.poll_interval_or_default(), Duration::from_secs(3));
    }

    #[test]
    fn zero_poll_attempts_means_unbounded() {
        let config = AppConfig {
            max_poll_attempts: Some(0),
            ..Default::default()
        };
        assert_eq!(config.max_poll_attempts_or_default(), None);

        let config = AppConfig::empty();
        assert_eq!(
            config.max_poll_attempts_or_default(),
            Some(DEFAULT_MAX_POLL_ATTEMPTS)
        );
    }
}
