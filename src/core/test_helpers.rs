//! Shared test utilities for core module tests
//!
//! This module is only compiled in test mode.

use crate::core::runner::Runner;
use crate::core::service::Firewall;
use crate::elevation::ElevationMethod;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fake `ufw` executable in a private temp directory.
///
/// The script records its arguments (one per line) to `args.log` and then
/// runs `body` as POSIX shell. Tests never touch the real firewall or need
/// elevation.
///
/// # Example
///
/// ```ignore
/// let mock = MockUfw::new(r#"echo "Rule added""#);
/// mock.firewall().add_rule(Action::Allow, spec).await?;
/// assert_eq!(mock.recorded_args(), ["allow", "22/tcp"]);
/// ```
pub struct MockUfw {
    dir: TempDir,
    path: PathBuf,
}

impl MockUfw {
    pub fn new(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ufw");
        let log = dir.path().join("args.log");

        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{body}\n",
            log.display()
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, path }
    }

    pub fn runner(&self) -> Runner {
        Runner::new(self.path.to_string_lossy(), ElevationMethod::None)
    }

    pub fn firewall(&self) -> Firewall {
        Firewall::new(self.runner())
    }

    /// Arguments of the most recent invocation
    pub fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("args.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}
