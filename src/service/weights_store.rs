use crate::risk::types::WeightSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Holds the current weight set. Readers get an immutable snapshot that a
/// later refresh never mutates. The instant records when the snapshot was
/// last confirmed against the store.
#[derive(Clone)]
pub struct WeightsStore {
    inner: Arc<RwLock<(Instant, Arc<WeightSet>)>>,
    ttl: Duration,
}

impl WeightsStore {
    pub fn new(initial: WeightSet, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new((Instant::now(), Arc::new(initial)))),
            ttl,
        }
    }

    pub async fn snapshot(&self) -> Arc<WeightSet> {
        self.inner.read().await.1.clone()
    }

    pub async fn version(&self) -> i64 {
        self.inner.read().await.1.update_count
    }

    pub async fn is_stale(&self) -> bool {
        self.inner.read().await.0.elapsed() >= self.ttl
    }

    /// Installs `loaded` if it is newer than what is held, and marks the
    /// snapshot fresh either way. Older versions never replace newer ones.
    pub async fn refresh(&self, loaded: WeightSet) -> Arc<WeightSet> {
        let mut write = self.inner.write().await;
        if loaded.update_count > write.1.update_count {
            write.1 = Arc::new(loaded);
        }
        write.0 = Instant::now();
        write.1.clone()
    }
}
