//! Coarse-grained locking around the whole task manager.
//!
//! One lock guards the entire engine. Readers (display) take a shared
//! lease, the calculation thread takes an exclusive one per sample.

use crate::task_manager::TaskManager;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
pub struct ProtectedTaskManager {
    inner: RwLock<TaskManager>,
}

impl ProtectedTaskManager {
    pub fn new(manager: TaskManager) -> Self {
        Self {
            inner: RwLock::new(manager),
        }
    }

    /// Shared read access.
    pub fn lease(&self) -> RwLockReadGuard<'_, TaskManager> {
        self.inner.read().unwrap_or_else(|poisoned| {
            tracing::warn!("task manager lock poisoned, recovering shared lease");
            poisoned.into_inner()
        })
    }

    /// Exclusive access for updates and edits.
    pub fn exclusive_lease(&self) -> RwLockWriteGuard<'_, TaskManager> {
        self.inner.write().unwrap_or_else(|poisoned| {
            tracing::warn!("task manager lock poisoned, recovering exclusive lease");
            poisoned.into_inner()
        })
    }

    pub fn into_inner(self) -> TaskManager {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullTaskEvents;
    use crate::task_manager::TaskMode;
    use crate::waypoint::Waypoints;
    use std::sync::Arc;
    use std::thread;

    fn protected() -> Arc<ProtectedTaskManager> {
        let manager = TaskManager::new(Arc::new(Waypoints::new()), Box::new(NullTaskEvents));
        Arc::new(ProtectedTaskManager::new(manager))
    }

    #[test]
    fn test_shared_leases_coexist() {
        let ptm = protected();
        let a = ptm.lease();
        let b = ptm.lease();
        assert_eq!(a.mode(), b.mode());
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let ptm = protected();
        let clone = ptm.clone();
        let result = thread::spawn(move || {
            let _lease = clone.exclusive_lease();
            panic!("calculation thread died");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(ptm.lease().mode(), TaskMode::Null);
        ptm.exclusive_lease().abort();
        assert_eq!(ptm.lease().mode(), TaskMode::Abort);
    }
}
