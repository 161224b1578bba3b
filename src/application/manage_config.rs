//! Config management use case

use crate::domain::PastePolicy;
use crate::error::{DiaryError, Result};
use crate::infrastructure::{Config, DiaryRepository, FileSystemRepository};
use std::path::PathBuf;
use std::str::FromStr;

const VALID_KEYS: &str =
    "remote, paste_policy, editor, ready_poll_interval_ms, ready_timeout_ms, created";

/// Service for managing diary configuration
pub struct ConfigService {
    repository: FileSystemRepository,
}

impl ConfigService {
    /// Create a new config service
    pub fn new(repository: FileSystemRepository) -> Self {
        ConfigService { repository }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.repository.load_config()?;

        match key {
            "remote" | "remote_path" => Ok(config
                .remote_path
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            "paste_policy" => Ok(config.paste_policy.to_string()),
            "editor" => Ok(config.editor.clone()),
            "ready_poll_interval_ms" => Ok(config.ready_poll_interval_ms.to_string()),
            "ready_timeout_ms" => Ok(config.ready_timeout_ms.to_string()),
            "created" => Ok(config.created.to_rfc3339()),
            _ => Err(DiaryError::Config(format!(
                "Unknown config key: '{}'. Valid keys are: {}",
                key, VALID_KEYS
            ))),
        }
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.repository.load_config()?;

        match key {
            "remote" | "remote_path" => {
                let value = value.trim();
                config.remote_path = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "paste_policy" => {
                config.paste_policy = PastePolicy::from_str(value).map_err(DiaryError::Config)?;
            }
            "editor" => {
                config.editor = value.to_string();
            }
            "ready_poll_interval_ms" => {
                config.ready_poll_interval_ms = parse_millis(key, value)?;
            }
            "ready_timeout_ms" => {
                config.ready_timeout_ms = parse_millis(key, value)?;
            }
            "created" => {
                return Err(DiaryError::Config(
                    "Cannot modify 'created' field (read-only)".to_string(),
                ));
            }
            _ => {
                return Err(DiaryError::Config(format!(
                    "Unknown config key: '{}'. Valid keys are: {}",
                    key, VALID_KEYS
                )));
            }
        }

        self.repository.save_config(&config)?;
        Ok(())
    }

    /// List all config values
    pub fn list(&self) -> Result<Config> {
        self.repository.load_config()
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        DiaryError::Config(format!(
            "Invalid value for '{}': '{}' (expected milliseconds)",
            key, value
        ))
    })
}
