use magicpedia::config::ApiConfig;
use magicpedia::prompts::{self, SystemPrompts};
use magicpedia::router::{answer, classify_intent, Intent, IMAGE_TRIGGERS};
use magicpedia::types::{ApiProvider, Language, Settings};
use strum::IntoEnumIterator;

#[test]
fn every_trigger_phrase_routes_to_the_image_path() {
    for trigger in IMAGE_TRIGGERS {
        let query = format!("{} a friendly dinosaur", trigger);
        assert!(
            matches!(classify_intent(&query), Intent::Image { .. }),
            "'{}' did not route to the image path",
            query
        );
    }
}

#[test]
fn plain_questions_route_to_the_knowledge_path() {
    for query in [
        "Why is the sky blue?",
        "How far away is the moon?",
        "what do pandas eat",
        "Can fish sleep?",
    ] {
        assert_eq!(classify_intent(query), Intent::Knowledge, "{}", query);
    }
}

#[test]
fn subject_extraction_matches_the_documented_examples() {
    assert_eq!(
        classify_intent("draw a picture of a red dragon"),
        Intent::Image {
            subject: "a red dragon".to_string()
        }
    );
    assert_eq!(
        classify_intent("picture of"),
        Intent::Image {
            subject: String::new()
        }
    );
}

#[test]
fn knowledge_prompt_is_localized_for_every_language() {
    for language in Language::iter() {
        let prompt = SystemPrompts::knowledge("You are a friendly owl.", language);
        assert!(
            prompt.contains(language.english_name()),
            "missing display name for {:?}",
            language
        );
        assert!(prompt.contains("8-year-old"));
        assert!(prompt.contains("You are a friendly owl."));
    }
}

#[tokio::test]
async fn bare_image_request_gets_a_clarifying_reply_without_network() {
    let settings = Settings::default();
    let credentials = ApiConfig::empty();
    let result = answer("picture of", "prompt", &settings, &credentials).await;
    assert_eq!(result.text, prompts::IMAGE_CLARIFY);
    assert!(result.image_url.is_none());
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn unconfigured_custom_provider_surfaces_the_apology() {
    let mut settings = Settings::default();
    settings.api_provider = ApiProvider::Custom;
    settings.custom_api.base_url = "https://llm.example.com/v1".to_string();
    settings.custom_api.model = "gpt-4o-mini".to_string();
    // No API key: must fail before any request is issued.
    let credentials = ApiConfig::empty();

    let result = answer("Why do cats purr?", "prompt", &settings, &credentials).await;
    assert_eq!(result.text, prompts::APOLOGY);
}

#[tokio::test]
async fn the_answer_text_is_never_empty() {
    // Exercise both failure paths; the guarantee holds everywhere.
    let credentials = ApiConfig::empty();
    for query in ["picture of", "draw a picture of nothing at all", "hello"] {
        let result = answer(query, "prompt", &Settings::default(), &credentials).await;
        assert!(!result.text.is_empty(), "empty answer for '{}'", query);
    }
}
