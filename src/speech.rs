//! Text-to-speech adapter.
//!
//! Two backends return two fundamentally different encodings; the adapter
//! normalizes both into one tagged variant and swallows every failure.
//! A silent companion is a degraded experience, not an error the child
//! should ever see.

use crate::config::{resolve_primary_key, ApiConfig};
use crate::providers;
use crate::types::Settings;

/// Speech audio as returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechAudio {
    /// Raw 24 kHz mono 16-bit little-endian samples, base64 as received
    /// on the wire.
    Pcm { data: String },
    /// A standard compressed container (wav/mp3/ogg), handed to a
    /// container-aware decoder as-is.
    File { bytes: Vec<u8> },
}

/// Synthesize `text` with the backend selected by
/// `settings.voice_provider`.
///
/// Returns `None` on any failure or missing credentials; callers treat
/// that as "skip playback".
pub async fn synthesize(
    text: &str,
    voice: &str,
    settings: &Settings,
    credentials: &ApiConfig,
) -> Option<SpeechAudio> {
    let text = text.trim();
    if text.is_empty() {
        log::debug!("Empty text, skipping TTS");
        return None;
    }

    let primary_key = resolve_primary_key(settings, credentials);
    let backend = match providers::speech_backend(settings, primary_key.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            log::warn!("Speech backend unavailable: {}", e);
            return None;
        }
    };

    match backend
        .synthesize_speech(text, voice, settings.language)
        .await
    {
        Ok(audio) => Some(audio),
        Err(e) => {
            log::warn!("TTS synthesis failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoiceProvider;

    #[tokio::test]
    async fn test_empty_text_skips_synthesis() {
        let settings = Settings::default();
        let credentials = ApiConfig::with_gemini_key("key");
        assert!(synthesize("   ", "Zephyr", &settings, &credentials)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_none() {
        // Primary voice provider with no key anywhere: no network call is
        // possible, the adapter must degrade to None.
        let settings = Settings::default();
        let credentials = ApiConfig::empty();
        assert!(synthesize("hello", "Zephyr", &settings, &credentials)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_custom_tts_yields_none() {
        let mut settings = Settings::default();
        settings.voice_provider = VoiceProvider::Custom;
        // Default custom block has an empty URL and key.
        let credentials = ApiConfig::with_gemini_key("key");
        assert!(synthesize("hello", "Zephyr", &settings, &credentials)
            .await
            .is_none());
    }
}
