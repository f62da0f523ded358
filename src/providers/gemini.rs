//! Primary provider client: text, speech, image, and safety classification
//! over the `generativelanguage` REST surface.

use super::{ProviderError, Source, SpeechBackend, TextAnswer, TextBackend};
use crate::prompts::SystemPrompts;
use crate::speech::SpeechAudio;
use crate::types::Language;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// One image produced by the image endpoint.
#[derive(Debug)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64 bytes as received on the wire.
    pub data: String,
}

#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, text_model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60)) // generation calls can be slow
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
            text_model,
        }
    }

    /// Point the client at a different base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate_content(&self, model: &str, payload: Value) -> Result<Value, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::Parse(format!("Invalid JSON: {}", e)))
    }

    /// Answer a knowledge query, optionally granting the web-search tool.
    pub async fn answer(
        &self,
        query: &str,
        system_prompt: &str,
        use_search: bool,
    ) -> Result<TextAnswer, ProviderError> {
        let mut payload = json!({
            "contents": [{ "parts": [{ "text": query }] }],
            "systemInstruction": { "parts": [{ "text": system_prompt }] }
        });

        if use_search {
            payload["tools"] = json!([{ "googleSearch": {} }]);
        }

        let response = self.generate_content(&self.text_model, payload).await?;
        let text = collect_text(&response)?;
        let sources = grounding_sources(&response);

        Ok(TextAnswer { text, sources })
    }

    /// Synthesize speech. Returns the inline base64 PCM payload
    /// (24 kHz, mono, 16-bit little-endian, no container header).
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        language: Language,
    ) -> Result<String, ProviderError> {
        let instruction = SystemPrompts::speech_delivery(language, voice);

        let payload = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "systemInstruction": { "parts": [{ "text": instruction }] },
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }
        });

        let response = self.generate_content(TTS_MODEL, payload).await?;
        let (_, data) = first_inline_data(&response)
            .ok_or_else(|| ProviderError::Parse("No inline audio in response".to_string()))?;
        Ok(data)
    }

    /// Generate one square illustration for the given subject.
    pub async fn generate_image(&self, subject: &str) -> Result<GeneratedImage, ProviderError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": subject }] }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": "1:1" }
            }
        });

        let response = self.generate_content(IMAGE_MODEL, payload).await?;
        let (mime_type, data) = first_inline_data(&response)
            .ok_or_else(|| ProviderError::Parse("No image in response".to_string()))?;
        Ok(GeneratedImage { mime_type, data })
    }

    /// Run the safety classification call. Returns the raw JSON text the
    /// model produced; the safety gate owns parsing and the fail-closed
    /// policy.
    pub async fn classify_content(&self, text: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": SystemPrompts::safety_check(text) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "safe": { "type": "BOOLEAN" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["safe"]
                }
            }
        });

        let response = self.generate_content(&self.text_model, payload).await?;
        collect_text(&response)
    }
}

/// Concatenate the text parts of the first candidate.
fn collect_text(response: &Value) -> Result<String, ProviderError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ProviderError::Parse("Missing 'parts' field".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(ProviderError::Parse("Empty text response".to_string()));
    }
    Ok(text)
}

/// Grounding citations from a search-augmented answer, if any.
fn grounding_sources(response: &Value) -> Vec<Source> {
    response["candidates"][0]["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = &chunk["web"];
                    Some(Source {
                        uri: web["uri"].as_str()?.to_string(),
                        title: web["title"].as_str().unwrap_or_default().to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// First inline (base64) payload of the first candidate: `(mime type, data)`.
fn first_inline_data(response: &Value) -> Option<(String, String)> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    parts.iter().find_map(|part| {
        let inline = &part["inlineData"];
        Some((
            inline["mimeType"].as_str().unwrap_or("application/octet-stream").to_string(),
            inline["data"].as_str()?.to_string(),
        ))
    })
}

#[async_trait::async_trait]
impl TextBackend for GeminiClient {
    async fn answer_query(
        &self,
        query: &str,
        system_prompt: &str,
        use_search: bool,
    ) -> Result<TextAnswer, ProviderError> {
        self.answer(query, system_prompt, use_search).await
    }
}

#[async_trait::async_trait]
impl SpeechBackend for GeminiClient {
    async fn synthesize_speech(
        &self,
        text: &str,
        voice: &str,
        language: Language,
    ) -> Result<SpeechAudio, ProviderError> {
        let data = self.synthesize(text, voice, language).await?;
        Ok(SpeechAudio::Pcm { data })
    }
}
