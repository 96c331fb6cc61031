/// Audit logging for privileged firewall operations
///
/// Every state-changing ufw invocation (rule add/delete, enable, disable)
/// appends one JSON line describing what was run and how it ended. Audit
/// writes never fail the request that triggered them.
use crate::command::Operation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event occurred (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Correlates the entry with tracing output for the same request
    pub operation_id: Uuid,

    /// Operation name (`allow`, `delete`, `enable`, ...)
    pub event_type: String,

    /// Whether the operation succeeded (benign outcomes count as success)
    pub success: bool,

    /// Arguments and classified outcome
    pub details: serde_json::Value,

    /// Error message if operation failed
    pub error: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event
    pub fn new(
        operation_id: Uuid,
        operation: Operation,
        success: bool,
        details: serde_json::Value,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            operation_id,
            event_type: operation.to_string(),
            success,
            details,
            error,
        }
    }
}

/// Audit log writer
#[derive(Debug, Clone)]
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Creates an audit log in the default state directory
    ///
    /// # Errors
    ///
    /// Returns `Err` if state directory cannot be determined or created
    pub fn new() -> std::io::Result<Self> {
        let dir = crate::utils::get_state_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "State directory not found")
        })?;
        crate::utils::ensure_private_dir(&dir)?;

        Ok(Self {
            log_path: dir.join("audit.log"),
        })
    }

    /// Creates an audit log writing to an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: path.into(),
        }
    }

    /// Appends an event to the audit log
    ///
    /// Events are written as JSON-lines format (one JSON object per line)
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be opened or written
    pub async fn log(&self, event: &AuditEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.log_path).await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_all().await?;

        Ok(())
    }

    /// Appends an event, logging (not returning) any write failure
    pub async fn record(&self, event: &AuditEvent) {
        if let Err(e) = self.log(event).await {
            tracing::warn!("Failed to write audit log {}: {}", self.log_path.display(), e);
        }
    }

    /// Reads the most recent events from the log, newest first
    ///
    /// # Arguments
    ///
    /// * `count` - Maximum number of events to return
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be read
    pub async fn read_recent(&self, count: usize) -> std::io::Result<Vec<AuditEvent>> {
        let content = tokio::fs::read_to_string(&self.log_path).await?;

        let events: Vec<AuditEvent> = content
            .lines()
            .rev()
            .take(count)
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        Ok(events)
    }

    /// Returns the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
