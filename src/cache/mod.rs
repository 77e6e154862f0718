pub mod key;
pub mod persist;

pub use key::{derive_key, CacheKey};
pub use persist::{DrainReport, PersistJob, PersistenceQueue, PersistenceWorker, QueueClosed};
