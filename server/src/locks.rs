//! Push serialization.
//!
//! Pushes from the same device run one at a time. A push without a device
//! may touch any owner, so it waits for every other push and blocks new ones.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock table for in-flight pushes.
#[derive(Debug, Default)]
pub struct PushLocks {
    all: RwLock<()>,
    devices: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one push.
#[derive(Debug)]
pub enum PushGuard<'a> {
    Device {
        _all: RwLockReadGuard<'a, ()>,
        _device: OwnedMutexGuard<()>,
    },
    All(RwLockWriteGuard<'a, ()>),
}

impl PushLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until a push for `device` (or for every owner, when `None`) may run.
    pub async fn acquire(&self, device: Option<&str>) -> PushGuard<'_> {
        match device {
            Some(device) => {
                let all = self.all.read().await;
                let lock = self.devices.entry(device.to_string()).or_default().clone();
                PushGuard::Device {
                    _all: all,
                    _device: lock.lock_owned().await,
                }
            }
            None => PushGuard::All(self.all.write().await),
        }
    }
}
