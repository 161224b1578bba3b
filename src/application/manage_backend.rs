//! Backend preference management

use crate::error::Result;
use crate::infrastructure::backend::{load_preference, save_preference};
use crate::infrastructure::{BackendStatus, KeyValueStore, StoreSettings};

/// Reads and changes the stored remote-mode preference.
///
/// `remote_ready` is only consulted when the preference asks for remote.
pub struct BackendService<K, F> {
    kv: K,
    remote_ready: F,
}

impl<K: KeyValueStore, F: Fn() -> bool> BackendService<K, F> {
    pub fn new(kv: K, remote_ready: F) -> Self {
        BackendService { kv, remote_ready }
    }

    fn status_for(&self, prefer_remote: bool) -> BackendStatus {
        StoreSettings {
            prefer_remote,
            remote_ready: prefer_remote && (self.remote_ready)(),
        }
        .status()
    }

    pub fn status(&self) -> Result<BackendStatus> {
        let prefer_remote = load_preference(&self.kv)?;
        Ok(self.status_for(prefer_remote))
    }

    /// Flip the preference and report what the next session will use
    pub fn toggle(&self) -> Result<BackendStatus> {
        let prefer_remote = !load_preference(&self.kv)?;
        self.set(prefer_remote)
    }

    pub fn set(&self, use_remote: bool) -> Result<BackendStatus> {
        save_preference(&self.kv, use_remote)?;
        tracing::info!(use_remote, "Saved backend preference");

        let status = self.status_for(use_remote);
        if status.is_downgraded() {
            tracing::warn!("Remote mode selected but the remote store is not available");
        }
        Ok(status)
    }
}
