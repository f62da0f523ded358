//! Content safety gate for user-authored character text.
//!
//! Fail closed: anything short of a well-formed "safe" verdict keeps the
//! content out.

use crate::config::{resolve_primary_key, ApiConfig};
use crate::providers::gemini::GeminiClient;
use crate::types::Settings;
use serde::Deserialize;

/// Ephemeral verdict; consumed at character create/update, never persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Parse the raw classification body. Malformed output is an unsafe
/// verdict, never a silent accept.
pub fn parse_verdict(raw: &str) -> SafetyVerdict {
    match serde_json::from_str(raw) {
        Ok(verdict) => verdict,
        Err(e) => {
            log::error!("Safety verdict did not parse: {}", e);
            SafetyVerdict::rejected("Parsing error")
        }
    }
}

/// Judge whether `text` is appropriate for the target age group.
pub async fn classify(text: &str, settings: &Settings, credentials: &ApiConfig) -> SafetyVerdict {
    let key = match resolve_primary_key(settings, credentials) {
        Some(key) => key,
        None => {
            log::error!("Safety check impossible: no primary provider key");
            return SafetyVerdict::rejected("Service not configured");
        }
    };

    let client = GeminiClient::new(key, settings.primary.model.clone());
    match client.classify_content(text).await {
        Ok(raw) => parse_verdict(&raw),
        Err(e) => {
            log::error!("Safety check failed: {}", e);
            SafetyVerdict::rejected("Service error")
        }
    }
}
