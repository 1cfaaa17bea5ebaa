//! Per-idea async locks.
//!
//! Serialises work on the same idea id while different ids proceed
//! independently. Entries are dropped once no guard or waiter holds them.

use cofounder_domain::IdeaId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct IdeaLocks {
    locks: Mutex<HashMap<IdeaId, Weak<AsyncMutex<()>>>>,
}

impl IdeaLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`
    pub async fn acquire(&self, id: &IdeaId) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(id);
        lock.lock_owned().await
    }

    fn lock_for(&self, id: &IdeaId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = locks.get(id).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(id.clone(), Arc::downgrade(&lock));
        lock
    }

    /// Number of ids with a live lock
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .map(|locks| locks.values().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
