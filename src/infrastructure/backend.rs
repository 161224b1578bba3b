//! Backend selection: stored preference, readiness probing, and store construction

use crate::error::Result;
use crate::infrastructure::kv::KeyValueStore;
use crate::infrastructure::post_store::{LocalPostStore, PostStore, RemotePostStore};
use crate::infrastructure::remote::{BlobStorage, DocumentStore};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Key holding the textual remote-mode preference
pub const PREFERENCE_KEY: &str = "use_remote";

/// Persistence target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Remote,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

/// Read the remote-mode preference. A missing value means remote and is persisted as such.
pub fn load_preference<K: KeyValueStore + ?Sized>(kv: &K) -> Result<bool> {
    match kv.get(PREFERENCE_KEY)? {
        Some(value) => Ok(value.trim() == "true"),
        None => {
            kv.set(PREFERENCE_KEY, "true")?;
            Ok(true)
        }
    }
}

pub fn save_preference<K: KeyValueStore + ?Sized>(kv: &K, use_remote: bool) -> Result<()> {
    kv.set(PREFERENCE_KEY, if use_remote { "true" } else { "false" })
}

/// Polls a readiness check at a fixed interval until it passes or time runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        ReadinessProbe {
            interval: Duration::from_millis(100),
            timeout: Duration::from_millis(5000),
        }
    }
}

impl ReadinessProbe {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        ReadinessProbe { interval, timeout }
    }

    /// `true` as soon as `check` passes; `false` once the timeout has elapsed
    pub fn wait<F: FnMut() -> bool>(&self, mut check: F) -> bool {
        let started = Instant::now();
        loop {
            if check() {
                return true;
            }
            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                return false;
            }
            thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}

/// Inputs to backend selection, decided once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    pub prefer_remote: bool,
    pub remote_ready: bool,
}

impl StoreSettings {
    pub fn effective(&self) -> Backend {
        if self.prefer_remote && self.remote_ready {
            Backend::Remote
        } else {
            Backend::Local
        }
    }

    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            preferred: if self.prefer_remote {
                Backend::Remote
            } else {
                Backend::Local
            },
            effective: self.effective(),
        }
    }
}

/// What the user asked for versus what the session actually uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendStatus {
    pub preferred: Backend,
    pub effective: Backend,
}

impl BackendStatus {
    /// Remote was requested but is not available
    pub fn is_downgraded(&self) -> bool {
        self.preferred == Backend::Remote && self.effective == Backend::Local
    }

    pub fn describe(&self) -> &'static str {
        match (self.preferred, self.effective) {
            (_, Backend::Remote) => "Remote mode: posts are stored in the remote document store.",
            (Backend::Remote, Backend::Local) => {
                "Remote store is not available (running in local mode)."
            }
            (Backend::Local, Backend::Local) => "Local mode: posts are stored in this diary.",
        }
    }
}

/// Build the post store for this session
pub fn open_post_store<K, R>(settings: StoreSettings, kv: K, remote: Option<R>) -> Box<dyn PostStore>
where
    K: KeyValueStore + 'static,
    R: DocumentStore + BlobStorage + 'static,
{
    match (settings.effective(), remote) {
        (Backend::Remote, Some(remote)) => {
            tracing::info!("Using remote post store");
            Box::new(RemotePostStore::new(remote))
        }
        _ => {
            if settings.status().is_downgraded() {
                tracing::warn!("Remote store requested but not ready, falling back to local");
            } else {
                tracing::info!("Using local post store");
            }
            Box::new(LocalPostStore::new(kv))
        }
    }
}
