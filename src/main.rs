use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tts_cache_server::api::routes::{create_router, AppState};
use tts_cache_server::cache::PersistenceQueue;
use tts_cache_server::config::{Config, StorageBackend};
use tts_cache_server::storage::{BlobStore, InMemoryBlobStore, SupabaseStorage};
use tts_cache_server::tts::{OpenAiSpeech, SpeechGenerator};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("TTS Cache Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);

    let http = reqwest::Client::new();

    let store: Arc<dyn BlobStore> = match &config.storage {
        StorageBackend::Supabase { url, service_key } => {
            tracing::info!("Storage: {} (bucket '{}')", url, config.storage_bucket);
            Arc::new(SupabaseStorage::new(
                http.clone(),
                url,
                service_key,
                &config.storage_bucket,
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("STORAGE_URL not set, cached audio is kept in memory only");
            Arc::new(InMemoryBlobStore::new(&config.storage_bucket))
        }
    };

    let generator: Arc<dyn SpeechGenerator> = Arc::new(
        OpenAiSpeech::new(http, &config.openai_api_key)
            .with_base_url(&config.openai_base_url)
            .with_model(&config.tts_model)
            .with_instructions(&config.tts_instructions),
    );

    let (persistence, worker) = PersistenceQueue::spawn(Arc::clone(&store));

    // Create app state
    let state = Arc::new(AppState::new(&config, store, generator, persistence));

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    // The router and every request holding a queue handle are gone now.
    let report = worker.drain().await;
    tracing::info!(
        "Shut down after storing {} uploads ({} failed)",
        report.stored,
        report.failed
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown requested, finishing in-flight requests");
}
