use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per trigger.
///
/// Enforcement passes and bulk purges for the same trigger take the same
/// lock, so their list-then-delete sequences never interleave. Different
/// triggers proceed in parallel.
///
/// Entries are never removed; the map holds one mutex per trigger ever seen.
#[derive(Clone, Default)]
pub struct TriggerLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TriggerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `trigger`.
    pub async fn lock(&self, trigger: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let entry = self.inner.entry(trigger.to_string()).or_default();
            Arc::clone(entry.value())
        };
        mutex.lock_owned().await
    }
}
