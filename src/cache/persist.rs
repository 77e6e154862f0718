use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::storage::{BlobStore, AUDIO_MPEG};
use crate::stream::ByteStream;

pub struct PersistJob {
    pub name: String,
    pub body: ByteStream,
}

#[derive(thiserror::Error, Debug)]
#[error("Persistence worker has shut down")]
pub struct QueueClosed;

// The worker runs until every clone is dropped, then finishes in-flight uploads.
#[derive(Clone)]
pub struct PersistenceQueue {
    tx: mpsc::UnboundedSender<PersistJob>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub stored: usize,
    pub failed: usize,
}

pub struct PersistenceWorker {
    handle: JoinHandle<DrainReport>,
}

impl PersistenceQueue {
    pub fn spawn(store: Arc<dyn BlobStore>) -> (Self, PersistenceWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx));
        (Self { tx }, PersistenceWorker { handle })
    }

    pub fn enqueue(&self, job: PersistJob) -> Result<(), QueueClosed> {
        self.tx.send(job).map_err(|_| QueueClosed)
    }
}

impl PersistenceWorker {
    pub async fn drain(self) -> DrainReport {
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Persistence worker crashed: {}", e);
                DrainReport::default()
            }
        }
    }
}

async fn run(store: Arc<dyn BlobStore>, mut rx: mpsc::UnboundedReceiver<PersistJob>) -> DrainReport {
    let mut uploads = JoinSet::new();
    let mut report = DrainReport::default();

    loop {
        tokio::select! {
            job = rx.recv() => match job {
                Some(job) => {
                    uploads.spawn(persist(Arc::clone(&store), job));
                }
                None => break,
            },
            Some(done) = uploads.join_next() => report.record(done),
        }
    }

    if !uploads.is_empty() {
        tracing::info!("Waiting for {} pending uploads", uploads.len());
    }
    while let Some(done) = uploads.join_next().await {
        report.record(done);
    }

    tracing::info!(
        stored = report.stored,
        failed = report.failed,
        "Persistence worker drained"
    );
    report
}

async fn persist(store: Arc<dyn BlobStore>, job: PersistJob) -> bool {
    match store.upload(&job.name, job.body, AUDIO_MPEG).await {
        Ok(()) => {
            tracing::info!(object = %job.name, "Stored generated audio");
            true
        }
        Err(e) => {
            tracing::error!(object = %job.name, "Failed to store generated audio: {}", e);
            false
        }
    }
}

impl DrainReport {
    fn record(&mut self, done: Result<bool, JoinError>) {
        match done {
            Ok(true) => self.stored += 1,
            Ok(false) => self.failed += 1,
            Err(e) => {
                tracing::error!("Upload task panicked: {}", e);
                self.failed += 1;
            }
        }
    }
}
