use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{ByteStream, StreamError};

type Chunk = Result<Bytes, StreamError>;

/// Split `source` into two branches that each yield every chunk in order.
/// A dropped branch is detached; the pump keeps feeding the other one.
pub fn fork(source: ByteStream, capacity: usize) -> (ByteStream, ByteStream) {
    let capacity = capacity.max(1);
    let (left_tx, left_rx) = mpsc::channel(capacity);
    let (right_tx, right_rx) = mpsc::channel(capacity);

    tokio::spawn(pump(source, left_tx, right_tx));

    (
        ReceiverStream::new(left_rx).boxed(),
        ReceiverStream::new(right_rx).boxed(),
    )
}

async fn pump(mut source: ByteStream, left: mpsc::Sender<Chunk>, right: mpsc::Sender<Chunk>) {
    let mut left = Some(left);
    let mut right = Some(right);
    let mut chunks = 0usize;
    let mut bytes = 0usize;

    while let Some(chunk) = source.next().await {
        let failed = match &chunk {
            Ok(data) => {
                chunks += 1;
                bytes += data.len();
                false
            }
            Err(e) => {
                tracing::warn!("Forked source failed after {} chunks: {}", chunks, e);
                true
            }
        };

        let (left_open, right_open) = tokio::join!(
            send(left.as_ref(), chunk.clone()),
            send(right.as_ref(), chunk),
        );
        if !left_open {
            left = None;
        }
        if !right_open {
            right = None;
        }

        if failed {
            break;
        }
        if left.is_none() && right.is_none() {
            tracing::debug!("Both fork branches dropped, abandoning source");
            break;
        }
    }

    tracing::debug!(chunks, bytes, "Fork pump finished");
}

async fn send(tx: Option<&mpsc::Sender<Chunk>>, chunk: Chunk) -> bool {
    match tx {
        Some(tx) => tx.send(chunk).await.is_ok(),
        None => false,
    }
}
