//! Privilege elevation for ufw
//!
//! ufw must run as root to read or change firewall state. ufwd usually runs
//! as an unprivileged service user and only elevates the one approved
//! program, with arguments passed as a vector (no shell involved).
//!
//! # Elevation Strategy
//!
//! - **Already root**: run ufw directly
//! - **Auto (default)**: `sudo -n ufw …` (non-interactive; requires a
//!   NOPASSWD sudoers entry for the service user)
//! - **Explicit**: `sudo`, `run0`, or `pkexec` via `--elevation` /
//!   `UFWD_ELEVATION_METHOD`
//! - **None**: run the program as-is (tests, or a program that is already
//!   privileged)
//!
//! # Example
//!
//! ```no_run
//! use ufwd::elevation::{create_elevated_command, ElevationMethod};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let args = vec!["status".to_string(), "numbered".to_string()];
//! let mut cmd = create_elevated_command("ufw", &args, ElevationMethod::Auto)?;
//! let output = cmd.output().await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::str::FromStr;
use tokio::process::Command;

/// Directories searched for the firewall tool when it is not on `PATH`.
///
/// ufw lives in `/usr/sbin`, which is often missing from a service user's
/// `PATH`.
const SYSTEM_BIN_DIRS: &[&str] = &["/usr/sbin", "/sbin", "/usr/local/sbin"];

/// Error type for privilege elevation operations
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    /// Requested elevation method is not available (binary not found)
    #[error("Elevation method '{0}' is not available (binary not found)")]
    MethodNotAvailable(String),

    /// Invalid value for `UFWD_ELEVATION_METHOD`
    #[error("Invalid elevation method '{0}'. Valid options: auto, sudo, run0, pkexec, none")]
    InvalidMethod(String),
}

/// How the firewall tool is started with root privileges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ElevationMethod {
    /// Direct when running as root, otherwise `sudo -n`
    #[default]
    Auto,
    Sudo,
    Run0,
    Pkexec,
    /// Never elevate
    None,
}

impl FromStr for ElevationMethod {
    type Err = ElevationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "sudo" => Ok(Self::Sudo),
            "run0" => Ok(Self::Run0),
            "pkexec" => Ok(Self::Pkexec),
            "none" => Ok(Self::None),
            other => Err(ElevationError::InvalidMethod(other.to_string())),
        }
    }
}

/// Checks if a binary exists in PATH
///
/// A name containing `/` is treated as a path and checked directly.
pub fn binary_exists(name: &str) -> bool {
    find_binary(name).is_some()
}

/// Resolves `name` on `PATH`, falling back to the system sbin directories.
pub fn find_binary(name: &str) -> Option<std::path::PathBuf> {
    if name.contains('/') {
        let path = Path::new(name);
        return path.is_file().then(|| path.to_path_buf());
    }

    let on_path = std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join(name);
            full_path.is_file().then_some(full_path)
        })
    });

    on_path.or_else(|| {
        SYSTEM_BIN_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(name))
            .find(|p| p.is_file())
    })
}

fn prefixed(prefix: &[&str], program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(prefix[0]);
    cmd.args(&prefix[1..]).arg(program).args(args);
    cmd
}

fn direct(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

/// Builds a command that runs `program` with root privileges.
///
/// Arguments are passed directly without shell interpretation; callers must
/// only pass validated values.
///
/// # Errors
///
/// Returns [`ElevationError::MethodNotAvailable`] if the selected elevation
/// binary is not installed.
pub fn create_elevated_command(
    program: &str,
    args: &[String],
    method: ElevationMethod,
) -> Result<Command, ElevationError> {
    match method {
        ElevationMethod::None => Ok(direct(program, args)),
        ElevationMethod::Auto => {
            if nix::unistd::getuid().is_root() {
                return Ok(direct(program, args));
            }
            if !binary_exists("sudo") {
                return Err(ElevationError::MethodNotAvailable("sudo".into()));
            }
            Ok(prefixed(&["sudo", "-n"], program, args))
        }
        ElevationMethod::Sudo => {
            if !binary_exists("sudo") {
                return Err(ElevationError::MethodNotAvailable("sudo".into()));
            }
            Ok(prefixed(&["sudo", "-n"], program, args))
        }
        ElevationMethod::Run0 => {
            if !binary_exists("run0") {
                return Err(ElevationError::MethodNotAvailable("run0".into()));
            }
            Ok(prefixed(&["run0"], program, args))
        }
        ElevationMethod::Pkexec => {
            if !binary_exists("pkexec") {
                return Err(ElevationError::MethodNotAvailable("pkexec".into()));
            }
            Ok(prefixed(&["pkexec"], program, args))
        }
    }
}
