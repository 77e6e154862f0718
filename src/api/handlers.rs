use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{HealthResponse, SpeechQuery, SpeechRequest};
use crate::api::routes::AppState;
use crate::cache::{derive_key, PersistJob};
use crate::error::AppError;
use crate::storage::AUDIO_MPEG;
use crate::stream::{fork, ByteStream};

pub const X_CACHE: &str = "x-cache";

/// Serve cached audio for (text, voice), or generate it while storing a copy.
pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = SpeechQuery::from_pairs(pairs);

    let origin = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");
    tracing::info!("Request origin: {}", origin);

    let voice_id = query
        .voice_id
        .unwrap_or_else(|| state.default_voice_id.clone());
    let key = derive_key(query.text.as_deref().unwrap_or_default(), &voice_id);
    tracing::info!(key = %key, "Derived cache key");

    let object = key.object_name();
    if let Some(cached) = lookup_cached(&state, &object).await {
        return Ok(audio_response(cached, "HIT"));
    }

    // Only generation needs text; a stored object is served regardless.
    let request = SpeechRequest::new(query.text, voice_id)?;

    tracing::info!(voice = %request.voice_id, "Generating speech");
    let audio = state
        .generator
        .generate(&request.text, &request.voice_id)
        .await?;

    let (response_body, storage_body) = fork(audio, state.fork_buffer_chunks);
    let job = PersistJob {
        name: object,
        body: storage_body,
    };
    if let Err(e) = state.persistence.enqueue(job) {
        tracing::warn!("{}, {} will not be cached", e, key);
    }

    Ok(audio_response(response_body, "MISS"))
}

/// Resolve a stored object into a readable body. Every failure counts as a miss.
async fn lookup_cached(state: &AppState, object: &str) -> Option<ByteStream> {
    let location = match state.store.signed_url(object, state.signed_url_expiry).await {
        Ok(Some(location)) => location,
        Ok(None) => {
            tracing::debug!("No stored audio for {}", object);
            return None;
        }
        Err(e) => {
            tracing::warn!("Cache lookup for {} failed, generating instead: {}", object, e);
            return None;
        }
    };

    match state.store.fetch(&location).await {
        Ok(body) => {
            tracing::info!("Serving {} from storage", object);
            Some(body)
        }
        Err(e) => {
            tracing::warn!("Stored {} is unreadable, generating instead: {}", object, e);
            None
        }
    }
}

fn audio_response(body: ByteStream, cache: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, AUDIO_MPEG),
            (HeaderName::from_static(X_CACHE), cache),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
