use crate::types::Settings;
use secrecy::{ExposeSecret, SecretBox};
use std::env;

/// Environment-derived provider credentials.
///
/// The primary provider key is optional at this layer: a household that only
/// uses the custom provider never sets it, and the parental portal can also
/// store a key override in [`Settings`].
#[derive(Debug)]
pub struct ApiConfig {
    gemini_key: Option<SecretBox<String>>,
}

impl ApiConfig {
    /// Load credentials from the environment.
    pub fn load() -> Self {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let gemini_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretBox::new(Box::new(key)));

        if gemini_key.is_none() {
            log::warn!(
                "GEMINI_API_KEY not set; the primary provider needs a key from \
                 the environment or from the parental settings"
            );
        }

        Self { gemini_key }
    }

    /// Build a config from an explicit key (tests, non-env wiring).
    pub fn with_gemini_key(key: impl Into<String>) -> Self {
        Self {
            gemini_key: Some(SecretBox::new(Box::new(key.into()))),
        }
    }

    /// Config with no credentials at all.
    pub fn empty() -> Self {
        Self { gemini_key: None }
    }

    /// Get the primary provider key (use only when making API calls).
    pub fn gemini_key(&self) -> Option<&str> {
        self.gemini_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
    }
}

/// Resolve the primary provider key for one call: the settings override wins,
/// the environment is the fallback.
pub fn resolve_primary_key(settings: &Settings, env: &ApiConfig) -> Option<String> {
    settings
        .primary
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or_else(|| env.gemini_key().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_override_wins() {
        let env = ApiConfig::with_gemini_key("env-key");
        let mut settings = Settings::default();
        assert_eq!(resolve_primary_key(&settings, &env).as_deref(), Some("env-key"));

        settings.primary.api_key = Some("portal-key".to_string());
        assert_eq!(
            resolve_primary_key(&settings, &env).as_deref(),
            Some("portal-key")
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let env = ApiConfig::with_gemini_key("env-key");
        let mut settings = Settings::default();
        settings.primary.api_key = Some("   ".to_string());
        assert_eq!(resolve_primary_key(&settings, &env).as_deref(), Some("env-key"));
    }

    #[test]
    fn test_no_key_anywhere() {
        let env = ApiConfig::empty();
        let settings = Settings::default();
        assert!(resolve_primary_key(&settings, &env).is_none());
    }
}
