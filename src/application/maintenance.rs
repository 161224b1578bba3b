//! Local data check and clear

use crate::error::Result;
use crate::infrastructure::post_store::LocalDataReport;
use crate::infrastructure::{KeyValueStore, LocalPostStore};

pub struct MaintenanceService<K> {
    local: LocalPostStore<K>,
}

impl<K: KeyValueStore> MaintenanceService<K> {
    pub fn new(kv: K) -> Self {
        MaintenanceService {
            local: LocalPostStore::new(kv),
        }
    }

    /// Report on the locally stored collection, including unparsable data
    pub fn check(&self) -> Result<LocalDataReport> {
        self.local.inspect()
    }

    /// Remove the local collection. The backend preference is kept.
    pub fn clear(&self) -> Result<()> {
        self.local.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Post;
    use crate::infrastructure::backend::PREFERENCE_KEY;
    use crate::infrastructure::post_store::POSTS_KEY;
    use crate::infrastructure::{FileKeyValueStore, PostStore};
    use tempfile::TempDir;

    #[test]
    fn test_check_reports_posts() {
        let temp = TempDir::new().unwrap();
        let kv = FileKeyValueStore::new(temp.path().to_path_buf());
        LocalPostStore::new(kv.clone())
            .create(Post::new("one", "", "2025-07-05"))
            .unwrap();

        let report = MaintenanceService::new(kv).check().unwrap();
        assert!(report.stored_bytes.is_some());
        assert_eq!(report.parsed, Ok(1));
    }

    #[test]
    fn test_check_reports_corrupt_data() {
        let temp = TempDir::new().unwrap();
        let kv = FileKeyValueStore::new(temp.path().to_path_buf());
        kv.set(POSTS_KEY, "{broken").unwrap();

        let report = MaintenanceService::new(kv).check().unwrap();
        assert_eq!(report.stored_bytes, Some(7));
        assert!(report.parsed.is_err());
    }

    #[test]
    fn test_clear_keeps_preference() {
        let temp = TempDir::new().unwrap();
        let kv = FileKeyValueStore::new(temp.path().to_path_buf());
        kv.set(PREFERENCE_KEY, "false").unwrap();
        LocalPostStore::new(kv.clone())
            .create(Post::new("one", "", "2025-07-05"))
            .unwrap();

        let service = MaintenanceService::new(kv.clone());
        service.clear().unwrap();

        let report = service.check().unwrap();
        assert_eq!(report.stored_bytes, None);
        assert_eq!(report.parsed, Ok(0));
        assert_eq!(kv.get(PREFERENCE_KEY).unwrap().as_deref(), Some("false"));
    }
}
