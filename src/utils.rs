//! Utility functions for directory management
//!
//! State follows the XDG Base Directory specification:
//! `~/.local/state/ufwd/` holds the audit log. For a service running as
//! root that is `/root/.local/state/ufwd/`; pass `--audit-log` to place it
//! elsewhere (for example under `/var/log`).

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub fn get_state_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "ufwd", "ufwd")
        .and_then(|pd| pd.state_dir().map(Path::to_path_buf))
}

/// Creates `dir` (and parents) readable only by the current user.
pub fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        let mut builder = DirBuilder::new();
        builder.mode(0o700); // User read/write/execute only
        builder.recursive(true);
        builder.create(dir)?;
    }

    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)?;
    }

    Ok(())
}

/// Ensures the parent directory of a file path exists
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_private_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_private_dir_nested() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b/c");
        ensure_private_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_private_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_parent_dir() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("logs/audit.log");
        ensure_parent_dir(&file).unwrap();
        assert!(root.path().join("logs").is_dir());
        assert!(ensure_parent_dir(Path::new("audit.log")).is_ok());
    }
}
