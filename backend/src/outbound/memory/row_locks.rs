//! Per-resource locks emulating `SELECT ... FOR UPDATE`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lockable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum LockKey {
    Reward(Uuid),
    CustomerLedger(Uuid),
    Redemption(Uuid),
}

/// Registry handing out one async mutex per resource.
///
/// Slots are never evicted; the registry grows with the number of distinct
/// resources touched, which is bounded by the size of the stored data.
#[derive(Debug, Default)]
pub(super) struct RowLocks {
    slots: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl RowLocks {
    /// Wait until `key` is free and return a guard holding it.
    pub(super) async fn acquire(&self, key: LockKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.lock_owned().await
    }
}
