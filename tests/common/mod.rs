//! Fakes and helpers shared by the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tts_cache_server::api::routes::{create_router, AppState};
use tts_cache_server::cache::{PersistenceQueue, PersistenceWorker};
use tts_cache_server::config::DEFAULT_VOICE_ID;
use tts_cache_server::storage::{BlobStore, InMemoryBlobStore, SignedLocation, StorageError};
use tts_cache_server::stream::{ByteStream, StreamError};
use tts_cache_server::tts::{SpeechError, SpeechGenerator};

pub const DEFAULT_VOICE: &str = DEFAULT_VOICE_ID;

/// Generator that replays fixed chunks and records every call.
pub struct ScriptedSpeech {
    chunks: Vec<Result<Bytes, StreamError>>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedSpeech {
    pub fn new(chunks: &[&'static [u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Yields `chunks` and then fails mid-stream.
    pub fn breaking_after(chunks: &[&'static [u8]], message: &str) -> Self {
        let mut speech = Self::new(chunks);
        speech.chunks.push(Err(StreamError::new(message)));
        speech
    }

    /// Fails before producing any audio.
    pub fn failing(message: &str) -> Self {
        Self {
            chunks: Vec::new(),
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn audio(&self) -> Bytes {
        let mut out = Vec::new();
        for chunk in self.chunks.iter().flatten() {
            out.extend_from_slice(chunk);
        }
        Bytes::from(out)
    }
}

#[async_trait]
impl SpeechGenerator for ScriptedSpeech {
    async fn generate(&self, text: &str, voice_id: &str) -> Result<ByteStream, SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_id.to_string()));

        if let Some(message) = &self.failure {
            return Err(SpeechError::Api {
                status: 429,
                message: message.clone(),
            });
        }
        Ok(stream::iter(self.chunks.clone()).boxed())
    }
}

/// Store whose signed locations always point at something unreadable.
pub struct BrokenFetchStore {
    pub inner: InMemoryBlobStore,
}

#[async_trait]
impl BlobStore for BrokenFetchStore {
    async fn signed_url(
        &self,
        name: &str,
        expires_in: Duration,
    ) -> Result<Option<SignedLocation>, StorageError> {
        self.inner.signed_url(name, expires_in).await
    }

    async fn fetch(&self, _location: &SignedLocation) -> Result<ByteStream, StorageError> {
        Err(StorageError::Status {
            status: 404,
            message: "Object not found".into(),
        })
    }

    async fn upload(
        &self,
        name: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.inner.upload(name, body, content_type).await
    }
}

/// Store that is empty and rejects every upload without reading it.
pub struct RejectingStore;

#[async_trait]
impl BlobStore for RejectingStore {
    async fn signed_url(
        &self,
        _name: &str,
        _expires_in: Duration,
    ) -> Result<Option<SignedLocation>, StorageError> {
        Ok(None)
    }

    async fn fetch(&self, location: &SignedLocation) -> Result<ByteStream, StorageError> {
        Err(StorageError::NotFound(location.url.clone()))
    }

    async fn upload(
        &self,
        _name: &str,
        _body: ByteStream,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        Err(StorageError::Status {
            status: 503,
            message: "storage unavailable".into(),
        })
    }
}

/// Build a router over the given collaborators plus the worker draining its uploads.
pub fn test_app(
    store: Arc<dyn BlobStore>,
    generator: Arc<dyn SpeechGenerator>,
) -> (Router, PersistenceWorker) {
    let (persistence, worker) = PersistenceQueue::spawn(Arc::clone(&store));
    let state = Arc::new(AppState {
        store,
        generator,
        persistence,
        default_voice_id: DEFAULT_VOICE.to_string(),
        signed_url_expiry: Duration::from_secs(60),
        fork_buffer_chunks: 4,
    });
    (create_router(state), worker)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Poll until the background upload for `name` has landed.
pub async fn wait_for_object(store: &InMemoryBlobStore, name: &str) -> Bytes {
    for _ in 0..200 {
        if let Some(data) = store.get(name).await {
            return data;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} was never stored", name);
}
