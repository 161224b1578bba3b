//! Per-invocation wiring: configuration, backend selection and the active store

use crate::error::Result;
use crate::infrastructure::backend::{load_preference, open_post_store};
use crate::infrastructure::{
    BackendStatus, Config, DiaryRepository, DirectoryRemote, DocumentStore, FileSystemRepository,
    PostStore, StoreSettings,
};
use std::path::Path;

/// Configured remote for `root`, if any, and whether it became ready in time
pub fn probe_remote(config: &Config, root: &Path) -> (Option<DirectoryRemote>, bool) {
    let Some(path) = config.resolve_remote(root) else {
        return (None, false);
    };

    let remote = DirectoryRemote::new(path);
    let ready = config.readiness_probe().wait(|| remote.is_ready());
    if !ready {
        tracing::warn!(path = %remote.root().display(), "Remote store did not become ready");
    }
    (Some(remote), ready)
}

/// An opened diary. The backend is chosen once here and kept for the session.
pub struct DiarySession {
    config: Config,
    status: BackendStatus,
    store: Box<dyn PostStore>,
}

impl DiarySession {
    pub fn open(repository: FileSystemRepository) -> Result<Self> {
        let config = repository.load_config()?;
        let kv = repository.storage();
        let prefer_remote = load_preference(&kv)?;

        let (remote, remote_ready) = if prefer_remote {
            probe_remote(&config, repository.root())
        } else {
            (None, false)
        };

        let settings = StoreSettings {
            prefer_remote,
            remote_ready,
        };
        let store = open_post_store(settings, kv, remote);

        Ok(DiarySession {
            config,
            status: settings.status(),
            store,
        })
    }

    pub fn store(&self) -> &dyn PostStore {
        self.store.as_ref()
    }

    pub fn status(&self) -> BackendStatus {
        self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::init::init;
    use crate::domain::Post;
    use crate::infrastructure::backend::save_preference;
    use crate::infrastructure::Backend;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fast_probe(root: &Path) {
        let repo = FileSystemRepository::new(root.to_path_buf());
        let mut config = repo.load_config().unwrap();
        config.ready_poll_interval_ms = 1;
        config.ready_timeout_ms = 20;
        repo.save_config(&config).unwrap();
    }

    #[test]
    fn test_open_local_diary() {
        let temp = TempDir::new().unwrap();
        init(temp.path(), None).unwrap();

        let session = DiarySession::open(FileSystemRepository::new(temp.path().to_path_buf())).unwrap();
        assert_eq!(session.store().backend(), Backend::Local);
        assert!(!session.status().is_downgraded());
    }

    #[test]
    fn test_open_with_ready_remote() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cloud")).unwrap();
        init(temp.path(), Some(PathBuf::from("cloud"))).unwrap();

        let session = DiarySession::open(FileSystemRepository::new(temp.path().to_path_buf())).unwrap();
        assert_eq!(session.store().backend(), Backend::Remote);

        session
            .store()
            .create(Post::new("synced", "", "2025-07-05"))
            .unwrap();
        assert_eq!(fs::read_dir(temp.path().join("cloud/posts")).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_remote_downgrades_without_touching_preference() {
        let temp = TempDir::new().unwrap();
        init(temp.path(), Some(PathBuf::from("missing"))).unwrap();
        fast_probe(temp.path());

        let repo = FileSystemRepository::new(temp.path().to_path_buf());
        let session = DiarySession::open(repo.clone()).unwrap();
        assert_eq!(session.store().backend(), Backend::Local);
        assert!(session.status().is_downgraded());
        assert!(load_preference(&repo.storage()).unwrap());
    }

    #[test]
    fn test_local_preference_skips_remote() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cloud")).unwrap();
        init(temp.path(), Some(PathBuf::from("cloud"))).unwrap();

        let repo = FileSystemRepository::new(temp.path().to_path_buf());
        save_preference(&repo.storage(), false).unwrap();

        let session = DiarySession::open(repo).unwrap();
        assert_eq!(session.store().backend(), Backend::Local);
        assert!(!session.status().is_downgraded());
    }
}
