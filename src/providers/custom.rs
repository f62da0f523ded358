//! OpenAI-compatible custom provider: chat completions and `/audio/speech`.

use super::{ProviderError, SpeechBackend, TextAnswer, TextBackend};
use crate::speech::SpeechAudio;
use crate::types::Language;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Fixed sampling temperature for the child-facing chat path.
const CHAT_TEMPERATURE: f32 = 0.7;

#[derive(Debug)]
pub struct CustomChat {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CustomChat {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60)) // LLM calls can be slow
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    /// One system + user exchange against `{base_url}/chat/completions`.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": CHAT_TEMPERATURE
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
        parse_completion(&response_text)
    }
}

/// Extract `.choices[0].message.content` from a chat-completions body.
fn parse_completion(response_text: &str) -> Result<String, ProviderError> {
    let body: Value = serde_json::from_str(response_text)
        .map_err(|e| ProviderError::Parse(format!("Invalid JSON: {}", e)))?;

    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::Parse("Missing 'content' field".to_string()))?;

    if content.trim().is_empty() {
        return Err(ProviderError::Parse("Empty completion".to_string()));
    }
    Ok(content.to_string())
}

#[async_trait::async_trait]
impl TextBackend for CustomChat {
    async fn answer_query(
        &self,
        query: &str,
        system_prompt: &str,
        _use_search: bool, // a custom provider decides search itself
    ) -> Result<TextAnswer, ProviderError> {
        let text = self.complete(system_prompt, query).await?;
        Ok(TextAnswer {
            text,
            sources: Vec::new(),
        })
    }
}

pub struct CustomTts {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
}

impl CustomTts {
    pub fn new(base_url: String, api_key: String, model: String, voice: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
            voice,
        }
    }

    /// POST `{base_url}/audio/speech`; the response body is a compressed
    /// audio file.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));

        let payload = json!({
            "model": self.model,
            "input": text,
            "voice": self.voice
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl SpeechBackend for CustomTts {
    async fn synthesize_speech(
        &self,
        text: &str,
        _voice: &str, // the configured voice from the settings block wins
        _language: Language,
    ) -> Result<SpeechAudio, ProviderError> {
        let bytes = self.synthesize(text).await?;
        if bytes.is_empty() {
            return Err(ProviderError::Parse("Empty audio response".to_string()));
        }
        Ok(SpeechAudio::File { bytes })
    }
}
