//! Initialize diary use case

use crate::error::Result;
use crate::infrastructure::backend::save_preference;
use crate::infrastructure::{Config, DiaryRepository, FileSystemRepository};
use std::fs;
use std::path::{Path, PathBuf};

/// Initialize a new diary at the specified path.
///
/// With a remote location the diary starts in remote mode; without one it
/// starts local.
pub fn init(path: &Path, remote: Option<PathBuf>) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let repo = FileSystemRepository::new(path.to_path_buf());
    repo.initialize()?;

    let use_remote = remote.is_some();
    let config = Config::new(remote);
    repo.save_config(&config)?;
    save_preference(&repo.storage(), use_remote)?;

    tracing::info!(root = %path.display(), use_remote, "Initialized diary");

    println!("Initialized diary at {}", path.display());
    match &config.remote_path {
        Some(remote) => println!("Remote: {}", remote.display()),
        None => println!("Mode: local"),
    }

    Ok(())
}
