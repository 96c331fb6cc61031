use crate::elevation::ElevationError;
use crate::validators::ValidationError;
use thiserror::Error;

/// Core error types for ufwd
///
/// Benign "already satisfied" results are not errors; they come back as
/// [`crate::core::outcome::Outcome`] values.
#[derive(Debug, Error)]
pub enum Error {
    /// A request field was rejected; nothing was executed
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The firewall executable could not be located
    #[error("firewall tool not available: {0}")]
    ToolUnavailable(String),

    /// ufw ran and failed for a reason no benign marker explains
    #[error("{message}")]
    Execution {
        message: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// Delete referenced a rule number that does not exist
    #[error("rule number {0} not found")]
    NotFound(String),

    /// `ufw status` printed nothing at all
    #[error("unexpected empty output from ufw status")]
    EmptyOutput,

    /// Privilege escalation could not be set up
    #[error("Elevation error: {0}")]
    Elevation(#[from] ElevationError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the fault lies with the caller's input rather than the host
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Captured stderr for execution failures
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::Execution { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Database of ufw/elevation error patterns and their translations
pub struct UfwErrorPattern;

impl UfwErrorPattern {
    /// Matches captured stderr against known patterns.
    ///
    /// Returns `None` when nothing matches; the raw stderr is then the best
    /// explanation available.
    pub fn match_error(msg: &str) -> Option<ErrorTranslation> {
        let lower = msg.to_lowercase();

        // sudo -n without a NOPASSWD entry
        if lower.contains("a password is required") || lower.contains("a terminal is required") {
            return Some(
                ErrorTranslation::new("sudo requires a password for the service user")
                    .with_suggestion("Add a sudoers entry: <user> ALL=(root) NOPASSWD: /usr/sbin/ufw")
                    .with_suggestion("Or run ufwd as root, or choose --elevation run0"),
            );
        }

        if lower.contains("you need to be root") || lower.contains("permission denied") {
            return Some(
                ErrorTranslation::new("Insufficient privileges to run ufw")
                    .with_suggestion("Check the elevation method (--elevation / UFWD_ELEVATION_METHOD)"),
            );
        }

        if lower.contains("command not found") || lower.contains("no such file") {
            return Some(
                ErrorTranslation::new("ufw is not installed or not found in PATH")
                    .with_suggestion("Install ufw: sudo apt install ufw  (Debian/Ubuntu)")
                    .with_suggestion("Or point --ufw-command at the executable"),
            );
        }

        if lower.contains("bad port") || lower.contains("invalid port") {
            return Some(
                ErrorTranslation::new("Invalid port or port range")
                    .with_suggestion("Port numbers must be between 1 and 65535")
                    .with_suggestion("Ranges need a protocol: 6000:6007/tcp"),
            );
        }

        if lower.contains("could not find a profile matching") {
            return Some(
                ErrorTranslation::new("Unknown application profile")
                    .with_suggestion("List profiles with: ufw app list"),
            );
        }

        if lower.contains("wrong number of arguments")
            || lower.contains("invalid syntax")
            || lower.contains("need 'to' or 'from' clause")
        {
            return Some(
                ErrorTranslation::new("ufw rejected the rule syntax")
                    .with_suggestion("Examples: 22/tcp, 80,443/tcp, proto udp to any port 53"),
            );
        }

        if lower.contains("bad source address") || lower.contains("bad destination address") {
            return Some(
                ErrorTranslation::new("Invalid IP address or network")
                    .with_suggestion("Use 192.168.1.10, 192.168.1.0/24, or 2001:db8::/32"),
            );
        }

        if lower.contains("problem running") || lower.contains("iptables") {
            return Some(
                ErrorTranslation::new("ufw failed while loading rules into the kernel")
                    .with_suggestion("Check kernel modules and ufw logs: journalctl -u ufw"),
            );
        }

        None
    }
}

pub type Result<T> = std::result::Result<T, Error>;
