pub mod fork;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::BoxStream;

pub use fork::fork;

/// A chunked audio body whose total length is not known up front.
pub type ByteStream = BoxStream<'static, Result<Bytes, StreamError>>;

/// Error carried inside a [`ByteStream`].
///
/// Cloneable so a single source failure can be handed to every branch of a fork.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct StreamError {
    message: Arc<str>,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(e: reqwest::Error) -> Self {
        StreamError::new(e.to_string())
    }
}
