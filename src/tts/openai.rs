use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SpeechError, SpeechGenerator};
use crate::stream::{ByteStream, StreamError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_INSTRUCTIONS: &str = "Speak in a cheerful and positive tone.";

/// OpenAI `audio/speech` client returning the MP3 body as it arrives.
pub struct OpenAiSpeech {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    instructions: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequestBody<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    instructions: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiSpeech {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

#[async_trait]
impl SpeechGenerator for OpenAiSpeech {
    async fn generate(&self, text: &str, voice_id: &str) -> Result<ByteStream, SpeechError> {
        let body = SpeechRequestBody {
            model: &self.model,
            voice: voice_id,
            input: text,
            instructions: &self.instructions,
            response_format: "mp3",
        };

        tracing::debug!(model = %self.model, voice = voice_id, "Requesting speech");

        let resp = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("Speech API returned {}: {}", status, text));
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.bytes_stream().map_err(StreamError::from).boxed())
    }
}
