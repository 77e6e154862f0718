pub mod memory;
pub mod supabase;

use std::time::Duration;

use async_trait::async_trait;

use crate::stream::ByteStream;

pub use memory::InMemoryBlobStore;
pub use supabase::SupabaseStorage;

/// Content type used for every stored and relayed audio object.
pub const AUDIO_MPEG: &str = "audio/mpeg";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Signed location expired: {0}")]
    Expired(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Upload stream failed: {0}")]
    Body(String),
}

/// A short-lived, pre-authorized read location for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLocation {
    pub url: String,
}

impl SignedLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Key to blob store holding generated audio.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Sign a read location for `name`, or `None` when nothing is stored under it.
    async fn signed_url(
        &self,
        name: &str,
        expires_in: Duration,
    ) -> Result<Option<SignedLocation>, StorageError>;

    /// Open the bytes behind a signed location.
    async fn fetch(&self, location: &SignedLocation) -> Result<ByteStream, StorageError>;

    /// Store `body` under `name`, replacing any existing object.
    async fn upload(
        &self,
        name: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
