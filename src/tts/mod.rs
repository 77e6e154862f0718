pub mod openai;

use async_trait::async_trait;

use crate::stream::ByteStream;

pub use openai::OpenAiSpeech;

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("Speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with an error; the message is the backend's own.
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// Produces an MP3 byte stream for a piece of text spoken by a voice.
#[async_trait]
pub trait SpeechGenerator: Send + Sync {
    async fn generate(&self, text: &str, voice_id: &str) -> Result<ByteStream, SpeechError>;
}
