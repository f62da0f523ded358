//! Provider router: decides per user message whether it is an image
//! request or a knowledge request, dispatches to the selected backend,
//! and normalizes every outcome into one [`Answer`] shape.

use crate::config::{resolve_primary_key, ApiConfig};
use crate::prompts::{self, SystemPrompts};
use crate::providers::gemini::GeminiClient;
use crate::providers::{self, Source};
use crate::types::Settings;
use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered image-request trigger phrases. First match wins, and the
/// matching phrase decides how the picture subject is extracted.
pub const IMAGE_TRIGGERS: [&str; 5] = [
    "show me a picture of",
    "draw a picture of",
    "image of",
    "picture of",
    "can you draw",
];

struct TriggerPattern {
    /// Case-insensitive containment check.
    detect: Regex,
    /// Captures the trailing clause after the phrase.
    extract: Regex,
}

static TRIGGER_PATTERNS: Lazy<Vec<TriggerPattern>> = Lazy::new(|| {
    IMAGE_TRIGGERS
        .iter()
        .map(|phrase| {
            let escaped = regex::escape(phrase);
            TriggerPattern {
                detect: Regex::new(&format!("(?i){}", escaped)).expect("static trigger regex"),
                extract: Regex::new(&format!(r"(?i){}\s+(.+)$", escaped))
                    .expect("static trigger regex"),
            }
        })
        .collect()
});

/// What the child is asking for. A heuristic, not a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Knowledge,
    Image { subject: String },
}

/// Classify a query against the trigger list.
pub fn classify_intent(query: &str) -> Intent {
    for pattern in TRIGGER_PATTERNS.iter() {
        if pattern.detect.is_match(query) {
            let subject = pattern
                .extract
                .captures(query)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| strip_triggers(query));
            return Intent::Image { subject };
        }
    }
    Intent::Knowledge
}

/// Fallback subject extraction: remove every known trigger phrase from
/// the whole query.
fn strip_triggers(query: &str) -> String {
    let mut remainder = query.to_string();
    for pattern in TRIGGER_PATTERNS.iter() {
        remainder = pattern.detect.replace_all(&remainder, "").into_owned();
    }
    remainder.trim().to_string()
}

/// The uniform result of one routed user message.
#[derive(Debug)]
pub struct Answer {
    /// Never empty.
    pub text: String,
    /// Present only on successful image generation; a `data:` URI.
    pub image_url: Option<String>,
    /// Grounding citations; empty unless the search tool produced them.
    pub sources: Vec<Source>,
}

impl Answer {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_url: None,
            sources: Vec::new(),
        }
    }
}

/// Route one user message.
///
/// Always returns a non-empty `text`; all provider failures degrade to
/// canned replies.
pub async fn answer(
    query: &str,
    character_prompt: &str,
    settings: &Settings,
    credentials: &ApiConfig,
) -> Answer {
    match classify_intent(query) {
        Intent::Image { subject } => answer_image(&subject, settings, credentials).await,
        Intent::Knowledge => answer_knowledge(query, character_prompt, settings, credentials).await,
    }
}

async fn answer_image(subject: &str, settings: &Settings, credentials: &ApiConfig) -> Answer {
    if subject.is_empty() {
        // Nothing to draw; ask instead of calling the backend.
        return Answer::plain(prompts::IMAGE_CLARIFY);
    }

    let key = match resolve_primary_key(settings, credentials) {
        Some(key) => key,
        None => {
            log::warn!("Image request without a primary provider key");
            return Answer::plain(prompts::IMAGE_FAILED);
        }
    };

    let client = GeminiClient::new(key, settings.primary.model.clone());
    match client.generate_image(subject).await {
        Ok(image) => Answer {
            text: prompts::IMAGE_READY.to_string(),
            image_url: Some(format!("data:{};base64,{}", image.mime_type, image.data)),
            sources: Vec::new(),
        },
        Err(e) => {
            log::warn!("Image generation failed: {}", e);
            Answer::plain(prompts::IMAGE_FAILED)
        }
    }
}

async fn answer_knowledge(
    query: &str,
    character_prompt: &str,
    settings: &Settings,
    credentials: &ApiConfig,
) -> Answer {
    let system_prompt = SystemPrompts::knowledge(character_prompt, settings.language);
    let primary_key = resolve_primary_key(settings, credentials);

    let backend = match providers::text_backend(settings, primary_key.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            log::warn!("Text backend unavailable: {}", e);
            return Answer::plain(prompts::APOLOGY);
        }
    };

    match backend
        .answer_query(query, &system_prompt, settings.search_enabled)
        .await
    {
        Ok(result) => {
            let text = if result.text.trim().is_empty() {
                prompts::EMPTY_ANSWER_FALLBACK.to_string()
            } else {
                result.text
            };
            Answer {
                text,
                image_url: None,
                sources: result.sources,
            }
        }
        Err(e) => {
            log::warn!("Query failed: {}", e);
            Answer::plain(prompts::APOLOGY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiProvider;

    #[test]
    fn test_knowledge_queries_stay_on_knowledge_path() {
        for query in [
            "Why is the sky blue?",
            "how do bees make honey",
            "Tell me about volcanoes",
            "What does a penguin eat?",
        ] {
            assert_eq!(classify_intent(query), Intent::Knowledge, "{}", query);
        }
    }

    #[test]
    fn test_trigger_phrases_route_to_image_path() {
        for query in [
            "show me a picture of a cat",
            "Draw a picture of a castle",
            "an IMAGE OF the moon please",
            "picture of a whale",
            "can you draw a rainbow",
        ] {
            assert!(
                matches!(classify_intent(query), Intent::Image { .. }),
                "{}",
                query
            );
        }
    }

    #[test]
    fn test_subject_extraction() {
        assert_eq!(
            classify_intent("draw a picture of a red dragon"),
            Intent::Image {
                subject: "a red dragon".to_string()
            }
        );
        assert_eq!(
            classify_intent("Show me a picture of the solar system!"),
            Intent::Image {
                subject: "the solar system!".to_string()
            }
        );
        assert_eq!(
            classify_intent("can you draw a happy dog"),
            Intent::Image {
                subject: "a happy dog".to_string()
            }
        );
    }

    #[test]
    fn test_bare_trigger_yields_empty_subject() {
        assert_eq!(
            classify_intent("picture of"),
            Intent::Image {
                subject: String::new()
            }
        );
    }

    #[test]
    fn test_first_match_wins_over_shorter_trigger() {
        // "show me a picture of" contains "picture of"; the longer, earlier
        // phrase must drive extraction.
        assert_eq!(
            classify_intent("show me a picture of a boat"),
            Intent::Image {
                subject: "a boat".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_subject_never_calls_the_network() {
        // No credentials at all: if the clarifying reply comes back, no
        // backend was consulted.
        let settings = Settings::default();
        let credentials = ApiConfig::empty();
        let result = answer("picture of", "You are Sparky.", &settings, &credentials).await;
        assert_eq!(result.text, prompts::IMAGE_CLARIFY);
        assert!(result.image_url.is_none());
    }

    #[tokio::test]
    async fn test_custom_path_missing_key_degrades_to_apology() {
        let mut settings = Settings::default();
        settings.api_provider = ApiProvider::Custom;
        settings.custom_api.base_url = "https://llm.example.com/v1".to_string();
        settings.custom_api.model = "gpt-4o-mini".to_string();
        // api_key left empty: the factory must fail before any request.
        let credentials = ApiConfig::empty();

        let result = answer("Why is the sky blue?", "prompt", &settings, &credentials).await;
        assert_eq!(result.text, prompts::APOLOGY);
        assert!(result.sources.is_empty());
        assert!(result.image_url.is_none());
    }

    #[tokio::test]
    async fn test_primary_path_missing_key_degrades_to_apology() {
        let settings = Settings::default();
        let credentials = ApiConfig::empty();
        let result = answer("Why is the sky blue?", "prompt", &settings, &credentials).await;
        assert_eq!(result.text, prompts::APOLOGY);
    }
}
