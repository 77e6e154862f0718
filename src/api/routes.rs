use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::cache::PersistenceQueue;
use crate::config::Config;
use crate::storage::BlobStore;
use crate::tts::SpeechGenerator;

/// Dependencies shared by every request.
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub generator: Arc<dyn SpeechGenerator>,
    pub persistence: PersistenceQueue,
    pub default_voice_id: String,
    pub signed_url_expiry: Duration,
    pub fork_buffer_chunks: usize,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn BlobStore>,
        generator: Arc<dyn SpeechGenerator>,
        persistence: PersistenceQueue,
    ) -> Self {
        Self {
            store,
            generator,
            persistence,
            default_voice_id: config.default_voice_id.clone(),
            signed_url_expiry: config.signed_url_expiry,
            fork_buffer_chunks: config.fork_buffer_chunks,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/text-to-speech", get(handlers::text_to_speech))
        .route("/health", get(handlers::health));

    Router::new()
        .route("/", get(handlers::text_to_speech))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
