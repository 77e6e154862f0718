use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use tokio::sync::RwLock;

use super::{BlobStore, SignedLocation, StorageError};
use crate::stream::ByteStream;

const SCHEME: &str = "memory://";
const READ_CHUNK: usize = 16 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

// Locations: memory://<bucket>/<name>?expires=<unix millis>
pub struct InMemoryBlobStore {
    bucket: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, name: &str, data: impl Into<Bytes>, content_type: &str) {
        self.objects.write().await.insert(
            name.to_string(),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.objects.read().await.get(name).map(|o| o.data.clone())
    }

    pub async fn content_type(&self, name: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(name)
            .map(|o| o.content_type.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn parse_location<'a>(&self, url: &'a str) -> Option<(&'a str, u128)> {
        let rest = url.strip_prefix(SCHEME)?;
        let rest = rest.strip_prefix(self.bucket.as_str())?.strip_prefix('/')?;
        let (name, expires) = rest.split_once("?expires=")?;
        Some((name, expires.parse().ok()?))
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn signed_url(
        &self,
        name: &str,
        expires_in: Duration,
    ) -> Result<Option<SignedLocation>, StorageError> {
        if !self.objects.read().await.contains_key(name) {
            return Ok(None);
        }

        let expires = now_millis() + expires_in.as_millis();
        Ok(Some(SignedLocation::new(format!(
            "{}{}/{}?expires={}",
            SCHEME, self.bucket, name, expires
        ))))
    }

    async fn fetch(&self, location: &SignedLocation) -> Result<ByteStream, StorageError> {
        let (name, expires) = self
            .parse_location(&location.url)
            .ok_or_else(|| StorageError::NotFound(location.url.clone()))?;

        if now_millis() > expires {
            return Err(StorageError::Expired(location.url.clone()));
        }

        let data = self
            .get(name)
            .await
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;

        let chunks: Vec<_> = (0..data.len())
            .step_by(READ_CHUNK)
            .map(|start| Ok(data.slice(start..data.len().min(start + READ_CHUNK))))
            .collect();

        Ok(stream::iter(chunks).boxed())
    }

    async fn upload(
        &self,
        name: &str,
        mut body: ByteStream,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StorageError::Body(e.to_string()))?;
            buf.extend_from_slice(&chunk);
        }

        self.insert(name, buf.freeze(), content_type).await;
        Ok(())
    }
}
