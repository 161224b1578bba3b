//! Export and restore of the whole post collection as JSON

use crate::domain::Post;
use crate::error::{DiaryError, Result};
use crate::infrastructure::{PostStore, ReplaceReport};
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of an import attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The user declined; nothing was changed
    Cancelled,
    Restored(ReplaceReport),
}

/// `diary_posts_backup_<YYYY-MM-DD>.json`
pub fn backup_file_name(today: NaiveDate) -> String {
    format!("diary_posts_backup_{}.json", today.format("%Y-%m-%d"))
}

/// Parse backup contents. Anything but an array of post objects is rejected.
pub fn parse_backup(contents: &str) -> Result<Vec<Post>> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| DiaryError::InvalidBackup(format!("not valid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(DiaryError::InvalidBackup(
            "expected a JSON array of posts".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(DiaryError::InvalidBackup(format!(
                    "entry {} is not a post object",
                    index + 1
                )));
            }
            serde_json::from_value::<Post>(item).map_err(|e| {
                DiaryError::InvalidBackup(format!("entry {}: {}", index + 1, e))
            })
        })
        .collect()
}

pub struct BackupService<'a> {
    store: &'a dyn PostStore,
}

impl<'a> BackupService<'a> {
    pub fn new(store: &'a dyn PostStore) -> Self {
        BackupService { store }
    }

    /// The active collection as pretty-printed JSON
    pub fn export_json(&self) -> Result<String> {
        let posts = self.store.list()?;
        Ok(serde_json::to_string_pretty(&posts)?)
    }

    /// Write a dated backup file into `dir` and return its path
    pub fn export_to(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
        let json = self.export_json()?;
        fs::create_dir_all(dir)?;

        let path = dir.join(backup_file_name(today));
        fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "Exported posts");
        Ok(path)
    }

    /// Replace the active collection with the posts in `contents`.
    ///
    /// The contents are validated first; `confirm` is asked with the number of
    /// posts and nothing is written unless it agrees.
    pub fn import<F>(&self, contents: &str, confirm: F) -> Result<ImportOutcome>
    where
        F: FnOnce(usize) -> Result<bool>,
    {
        let posts = parse_backup(contents)?;

        if !confirm(posts.len())? {
            tracing::debug!("Import cancelled");
            return Ok(ImportOutcome::Cancelled);
        }

        let report = self.store.replace_all(posts)?;
        if report.is_complete() {
            tracing::info!(
                backend = %self.store.backend(),
                inserted = report.inserted,
                "Restored posts"
            );
        } else {
            tracing::warn!(failed = ?report.failed_ids(), "Restore finished with failures");
        }
        Ok(ImportOutcome::Restored(report))
    }
}
