//! Per-group serialization point.

use std::sync::Arc;

use bgorg_domain::GroupId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<GroupId, Arc<Mutex<()>>>;

/// One async mutex per group. Holding a group's guard keeps every other
/// multi-step policy sequence for that group waiting; other groups proceed.
///
/// Entries live only while someone holds or waits for them, so the table
/// stays as small as the set of groups currently in flight.
#[derive(Default)]
pub struct GroupLocks {
    locks: Arc<LockTable>,
}

/// Held group lock. Dropping it releases the group and removes the table
/// entry when nobody else is holding or waiting.
pub struct GroupGuard {
    guard: Option<OwnedMutexGuard<()>>,
    group_id: GroupId,
    locks: Arc<LockTable>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, group_id: &GroupId) -> GroupGuard {
        // Clone the Arc out so the DashMap shard is not held across the await.
        let lock = self
            .locks
            .entry(group_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        GroupGuard {
            guard: Some(lock.lock_owned().await),
            group_id: group_id.clone(),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The table's own reference is the only one left when the group is
        // idle. Waiters and holders each keep a clone, and cloning happens
        // under the shard lock, so this check cannot race a new locker.
        self.locks
            .remove_if(&self.group_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
