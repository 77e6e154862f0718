use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{BlobStore, SignedLocation, StorageError};
use crate::stream::{ByteStream, StreamError};

/// Client for a Supabase-compatible storage REST API.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Deserialize)]
struct StorageErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SupabaseStorage {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, action: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}{}/{}",
            self.base_url, action, self.bucket, name
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
    }
}

async fn status_error(resp: Response) -> StorageError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StorageErrorBody>(&text)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or(text);
    StorageError::Status { status, message }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn signed_url(
        &self,
        name: &str,
        expires_in: Duration,
    ) -> Result<Option<SignedLocation>, StorageError> {
        let resp = self
            .authorized(self.client.post(self.object_url("sign/", name)))
            .json(&SignRequest {
                expires_in: expires_in.as_secs(),
            })
            .send()
            .await?;

        // Missing objects come back as 400 or 404 depending on the server version.
        if matches!(resp.status(), StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND) {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let signed: SignResponse = resp.json().await?;
        Ok(Some(SignedLocation::new(format!(
            "{}/storage/v1{}",
            self.base_url, signed.signed_url
        ))))
    }

    async fn fetch(&self, location: &SignedLocation) -> Result<ByteStream, StorageError> {
        let resp = self.client.get(&location.url).send().await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        Ok(resp.bytes_stream().map_err(StreamError::from).boxed())
    }

    async fn upload(
        &self,
        name: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let resp = self
            .authorized(self.client.post(self.object_url("", name)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(())
    }
}
