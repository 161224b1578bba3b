//! Error types for diary

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for diary application
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("Not a diary directory: {0}")]
    NotDiaryDirectory(PathBuf),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    #[error("Restore finished with failures: {}", .0.join(", "))]
    PartialRestore(Vec<String>),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("The editor is not open")]
    EditorClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl DiaryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DiaryError::NotDiaryDirectory(_) => 2,
            DiaryError::PostNotFound(_) => 3,
            DiaryError::InvalidBackup(_) => 4,
            DiaryError::PartialRestore(_) => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            DiaryError::NotDiaryDirectory(path) => {
                format!(
                    "Not a diary directory: {}\n\n\
                    Suggestions:\n\
                    • Run 'diary init' in this directory to create a new diary\n\
                    • Navigate to an existing diary directory\n\
                    • Set DIARY_ROOT environment variable to your diary path",
                    path.display()
                )
            }
            DiaryError::PostNotFound(id) => {
                format!(
                    "Post not found: '{}'\n\n\
                    Suggestions:\n\
                    • Use 'diary list' to see post ids\n\
                    • Check which backend is active with 'diary backend status'",
                    id
                )
            }
            DiaryError::InvalidBackup(msg) => {
                format!(
                    "Invalid backup file: {}\n\n\
                    A backup must be a JSON array of posts, as written by 'diary export'.\n\
                    Nothing was changed.",
                    msg
                )
            }
            DiaryError::PartialRestore(ids) => {
                format!(
                    "Restore finished with {} failure(s): {}\n\n\
                    The backend now holds a mix of old and restored posts.\n\
                    Suggestions:\n\
                    • Check that the remote store is reachable\n\
                    • Re-run 'diary import' with the same backup file",
                    ids.len(),
                    ids.join(", ")
                )
            }
            DiaryError::Editor(msg) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check that your editor is installed and in PATH\n\
                    • Set EDITOR environment variable (e.g., export EDITOR=nano)\n\
                    • Configure editor: diary config editor 'vim'\n\
                    • Pass the body directly: diary new --content '<b>hi</b>'",
                    msg
                )
            }
            DiaryError::Config(msg) => {
                if msg.contains("paste policy") {
                    format!(
                        "{}\n\n\
                        Valid policies: allow-list, strip-styles\n\
                        Example: diary config paste_policy strip-styles",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using DiaryError
pub type Result<T> = std::result::Result<T, DiaryError>;
