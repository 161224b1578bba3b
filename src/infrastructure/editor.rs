//! External editor integration for writing post bodies

use crate::error::{DiaryError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

/// Session for editing text in an external editor
pub struct EditorSession {
    command: String,
}

impl EditorSession {
    /// Create a new editor session with the given command
    pub fn new(editor_command: String) -> Self {
        EditorSession {
            command: editor_command,
        }
    }

    /// Write `initial` to a scratch file, open it in the editor and wait for it
    /// to exit, then return what was saved. The scratch file is always removed.
    pub fn edit_text(&self, initial: &str) -> Result<String> {
        let path = scratch_path();
        fs::write(&path, initial)?;

        let outcome = self.run(&path).and_then(|()| Ok(fs::read_to_string(&path)?));

        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
        }

        outcome
    }

    /// Open a file in the editor and block until it exits
    fn run(&self, file_path: &Path) -> Result<()> {
        let (program, args) = self.parse_command();

        let mut all_args = args;
        all_args.push(file_path.to_string_lossy().to_string());

        tracing::debug!(program = %program, "Launching editor");

        // On Windows, use cmd /c to ensure .bat and .cmd files are found
        #[cfg(windows)]
        let status = Command::new("cmd")
            .arg("/C")
            .arg(&program)
            .args(&all_args)
            .status();

        #[cfg(not(windows))]
        let status = Command::new(&program).args(&all_args).status();

        let status = status.map_err(|e| {
            DiaryError::Editor(format!("Failed to launch editor '{}': {}", program, e))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(DiaryError::Editor(format!(
                "Editor '{}' exited with {}",
                program, status
            )))
        }
    }

    /// Parse command into program and arguments
    fn parse_command(&self) -> (String, Vec<String>) {
        let parts: Vec<&str> = self.command.split_whitespace().collect();

        if parts.is_empty() {
            let fallback = if cfg!(windows) { "notepad" } else { "nano" };
            return (fallback.to_string(), vec![]);
        }

        let program = parts[0].to_string();
        let args = parts[1..].iter().map(|s| s.to_string()).collect();

        (program, args)
    }
}

fn scratch_path() -> PathBuf {
    std::env::temp_dir().join(format!("diary-post-{}.html", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_simple() {
        let session = EditorSession::new("vim".to_string());
        let (program, args) = session.parse_command();

        assert_eq!(program, "vim");
        assert_eq!(args.len(), 0);
    }

    #[test]
    fn test_parse_command_with_args() {
        let session = EditorSession::new("code -w".to_string());
        let (program, args) = session.parse_command();

        assert_eq!(program, "code");
        assert_eq!(args, vec!["-w"]);
    }

    #[test]
    fn test_parse_command_empty() {
        let session = EditorSession::new("   ".to_string());
        let (program, args) = session.parse_command();

        assert!(program == "nano" || program == "notepad");
        assert!(args.is_empty());
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        assert_ne!(scratch_path(), scratch_path());
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_text_returns_saved_contents() {
        // `true` leaves the file as written
        let session = EditorSession::new("true".to_string());
        let text = session.edit_text("<p>draft</p>").unwrap();
        assert_eq!(text, "<p>draft</p>");
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_text_reports_failing_editor() {
        let session = EditorSession::new("false".to_string());
        match session.edit_text("draft").unwrap_err() {
            DiaryError::Editor(msg) => assert!(msg.contains("false")),
            other => panic!("Expected Editor error, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_text_reports_missing_editor() {
        let session = EditorSession::new("diary-no-such-editor-binary".to_string());
        assert!(matches!(
            session.edit_text("draft"),
            Err(DiaryError::Editor(_))
        ));
    }
}
