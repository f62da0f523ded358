use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// UI language. The seven supported locales.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    En,
    De,
    Zh,
    Ja,
    Fr,
    Es,
    It,
}

impl Language {
    /// English display name, used when composing provider prompts.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::De => "German",
            Language::Zh => "Chinese",
            Language::Ja => "Japanese",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::It => "Italian",
        }
    }

    /// Stock demo question in each locale ("Why is the sky blue?").
    pub fn demo_question(self) -> &'static str {
        match self {
            Language::En => "Why is the sky blue?",
            Language::De => "Warum ist der Himmel blau?",
            Language::Zh => "天空为什么是蓝色的？",
            Language::Ja => "空はなぜ青いの？",
            Language::Fr => "Pourquoi le ciel est-il bleu ?",
            Language::Es => "¿Por qué el cielo es azul?",
            Language::It => "Perché il cielo è blu?",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// Visual theme of the UI shell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Neutral,
    Ocean,
    Forest,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Neutral
    }
}

/// Which backend answers knowledge queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiProvider {
    Google,
    Custom,
}

impl Default for ApiProvider {
    fn default() -> Self {
        ApiProvider::Google
    }
}

/// Which backend synthesizes speech. Independent of [`ApiProvider`]:
/// text and speech may use different providers at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VoiceProvider {
    Google,
    Custom,
}

impl Default for VoiceProvider {
    fn default() -> Self {
        VoiceProvider::Google
    }
}

/// Prebuilt cross-lingual voices offered by the primary speech backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum VoiceName {
    Zephyr,
    Puck,
    Charon,
    Kore,
    Fenrir,
}

impl VoiceName {
    pub fn description(self) -> &'static str {
        match self {
            VoiceName::Zephyr => "Energetic & Youthful",
            VoiceName::Puck => "Playful & Bright",
            VoiceName::Charon => "Deep & Calm",
            VoiceName::Kore => "Warm & Wise",
            VoiceName::Fenrir => "Gentle & Friendly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Friendly,
    Excited,
    Calm,
    Wise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnswerLength {
    Short,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStyle {
    pub tone: Tone,
    pub length: AnswerLength,
}

/// A cartoon companion the child talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub persona: String,
    pub system_prompt: String,
    pub voice: VoiceName,
    pub style: CharacterStyle,
    pub image: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Character {
    /// Create a user-authored character with a fresh opaque id.
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        system_prompt: impl Into<String>,
        voice: VoiceName,
        style: CharacterStyle,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            persona: persona.into(),
            system_prompt: system_prompt.into(),
            voice,
            style,
            image: image.into(),
            is_default: false,
        }
    }
}

/// The two stock companions shipped on first run.
pub fn default_characters() -> Vec<Character> {
    vec![
        Character {
            id: "sparky".to_string(),
            name: "Sparky the Robot".to_string(),
            persona: "A friendly little robot who loves science and math.".to_string(),
            system_prompt: "You are Sparky, a friendly 8-year-old child companion. Use simple \
                            words. Keep answers short and fun. Always encourage curiosity."
                .to_string(),
            voice: VoiceName::Zephyr,
            style: CharacterStyle {
                tone: Tone::Excited,
                length: AnswerLength::Short,
            },
            image: "https://picsum.photos/seed/sparky/400/400".to_string(),
            is_default: true,
        },
        Character {
            id: "luna".to_string(),
            name: "Professor Luna".to_string(),
            persona: "A wise owl who knows everything about nature and animals.".to_string(),
            system_prompt: "You are Professor Luna, a wise but kind owl. You explain nature to \
                            kids aged 8. Use analogies and storytelling."
                .to_string(),
            voice: VoiceName::Kore,
            style: CharacterStyle {
                tone: Tone::Calm,
                length: AnswerLength::Medium,
            },
            image: "https://picsum.photos/seed/luna/400/400".to_string(),
            is_default: true,
        },
    ]
}

/// Primary provider configuration block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimarySettings {
    pub model: String,
    /// Overrides the `GEMINI_API_KEY` environment variable when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for PrimarySettings {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            api_key: None,
        }
    }
}

/// OpenAI-compatible custom provider block (text generation).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// OpenAI-compatible custom speech block, separate from the text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTtsSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub voice: String,
}

impl Default for CustomTtsSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
        }
    }
}

/// The single parental-control record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_enabled: bool,
    pub safe_search_strict: bool,
    pub time_limit_minutes: u32,
    /// Remaining minutes of the daily budget. Ticks down once per
    /// wall-clock minute and never goes below zero.
    pub remaining_time: u32,
    pub language: Language,
    pub theme: Theme,
    pub api_provider: ApiProvider,
    pub voice_provider: VoiceProvider,
    pub primary: PrimarySettings,
    pub custom_api: CustomApiSettings,
    pub custom_tts: CustomTtsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_enabled: true,
            safe_search_strict: true,
            time_limit_minutes: 60,
            remaining_time: 60,
            language: Language::default(),
            theme: Theme::default(),
            api_provider: ApiProvider::default(),
            voice_provider: VoiceProvider::default(),
            primary: PrimarySettings::default(),
            custom_api: CustomApiSettings::default(),
            custom_tts: CustomTtsSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat message. Immutable once created; the full log is partitioned
/// per character by filtering on `character_id` at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Unix millis.
    pub timestamp: i64,
    pub character_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>, character_id: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            character_id: character_id.into(),
            image_url: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        character_id: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            character_id: character_id.into(),
            image_url,
        }
    }
}
