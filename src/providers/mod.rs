//! Backend adapters for the hosted generative providers.
//!
//! Two implementations share each trait: the primary provider
//! ([`gemini::GeminiClient`]) and the OpenAI-compatible custom provider
//! ([`custom::CustomChat`], [`custom::CustomTts`]). Business logic never
//! branches on provider strings; it asks the factory for a backend keyed on
//! the settings selectors and talks to the trait.

pub mod custom;
pub mod gemini;

use crate::speech::SpeechAudio;
use crate::types::{ApiProvider, Language, Settings, VoiceProvider};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Response parsing error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A grounding citation returned alongside a search-augmented answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Normalized knowledge-path result.
#[derive(Debug)]
pub struct TextAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Answers knowledge queries.
#[async_trait::async_trait]
pub trait TextBackend: Send + Sync + std::fmt::Debug {
    /// `use_search` grants the provider's web-search tool where supported;
    /// a custom provider decides search itself and ignores the flag.
    async fn answer_query(
        &self,
        query: &str,
        system_prompt: &str,
        use_search: bool,
    ) -> Result<TextAnswer, ProviderError>;
}

/// Synthesizes speech.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// `voice` is the character's voice identity; the custom backend uses
    /// the voice configured in its own settings block instead.
    async fn synthesize_speech(
        &self,
        text: &str,
        voice: &str,
        language: Language,
    ) -> Result<SpeechAudio, ProviderError>;
}

fn require(value: &str, what: &str) -> Result<String, ProviderError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ProviderError::Config(format!("{} is not configured", what)));
    }
    Ok(value.to_string())
}

/// Build the text backend selected by `settings.api_provider`.
///
/// Missing configuration fails here, before any network I/O.
pub fn text_backend(
    settings: &Settings,
    primary_key: Option<&str>,
) -> Result<Box<dyn TextBackend>, ProviderError> {
    match settings.api_provider {
        ApiProvider::Google => {
            let key = primary_key.ok_or_else(|| {
                ProviderError::Config("primary provider API key is not configured".to_string())
            })?;
            Ok(Box::new(gemini::GeminiClient::new(
                key.to_string(),
                settings.primary.model.clone(),
            )))
        }
        ApiProvider::Custom => {
            let block = &settings.custom_api;
            let base_url = require(&block.base_url, "custom provider base URL")?;
            let api_key = require(&block.api_key, "custom provider API key")?;
            let model = require(&block.model, "custom provider model")?;
            Ok(Box::new(custom::CustomChat::new(base_url, api_key, model)))
        }
    }
}

/// Build the speech backend selected by `settings.voice_provider`.
pub fn speech_backend(
    settings: &Settings,
    primary_key: Option<&str>,
) -> Result<Box<dyn SpeechBackend>, ProviderError> {
    match settings.voice_provider {
        VoiceProvider::Google => {
            let key = primary_key.ok_or_else(|| {
                ProviderError::Config("primary provider API key is not configured".to_string())
            })?;
            Ok(Box::new(gemini::GeminiClient::new(
                key.to_string(),
                settings.primary.model.clone(),
            )))
        }
        VoiceProvider::Custom => {
            let block = &settings.custom_tts;
            let base_url = require(&block.base_url, "custom speech base URL")?;
            let api_key = require(&block.api_key, "custom speech API key")?;
            let model = require(&block.model, "custom speech model")?;
            let voice = require(&block.voice, "custom speech voice")?;
            Ok(Box::new(custom::CustomTts::new(
                base_url, api_key, model, voice,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_text_backend_requires_configuration() {
        let mut settings = Settings::default();
        settings.api_provider = ApiProvider::Custom;

        // Everything empty: fails on the base URL first.
        let err = text_backend(&settings, None).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));

        settings.custom_api.base_url = "https://llm.example.com/v1".to_string();
        let err = text_backend(&settings, None).unwrap_err();
        assert!(err.to_string().contains("API key"));

        settings.custom_api.api_key = "sk-test".to_string();
        settings.custom_api.model = "gpt-4o-mini".to_string();
        assert!(text_backend(&settings, None).is_ok());
    }

    #[test]
    fn test_google_backend_requires_key() {
        let settings = Settings::default();
        assert!(text_backend(&settings, None).is_err());
        assert!(text_backend(&settings, Some("key")).is_ok());
        assert!(speech_backend(&settings, None).is_err());
        assert!(speech_backend(&settings, Some("key")).is_ok());
    }

    #[test]
    fn test_speech_selector_is_independent() {
        let mut settings = Settings::default();
        settings.api_provider = ApiProvider::Custom;
        // Text on custom, speech still on the primary provider.
        assert!(speech_backend(&settings, Some("key")).is_ok());
    }
}
