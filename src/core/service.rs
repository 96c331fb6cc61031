//! Firewall operations exposed to the HTTP layer and the CLI
//!
//! [`Firewall`] runs one validated [`UfwCommand`] per call and turns the
//! captured output into a typed result:
//!
//! - benign outcomes (already active/inactive, duplicate rule) are `Ok`
//! - a delete of a missing rule number is [`Error::NotFound`]
//! - any other failed run is [`Error::Execution`] carrying ufw's stderr
//!
//! The struct holds no firewall state; concurrent calls each spawn their own
//! ufw process and ufw serializes changes itself.

use crate::audit::{AuditEvent, AuditLog};
use crate::command::{Operation, UfwCommand};
use crate::core::error::{Error, Result};
use crate::core::firewall::{Action, IpRuleSpec, RuleIndex, RuleSpec, StatusReport};
use crate::core::outcome::{self, FailureDetail, Outcome};
use crate::core::runner::Runner;
use crate::core::status;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct Firewall {
    runner: Runner,
    audit: Option<AuditLog>,
}

impl Firewall {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            audit: None,
        }
    }

    /// Records every mutating operation in `audit`
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Queries `ufw status numbered`.
    ///
    /// Checks that the tool exists first so a missing ufw is reported as
    /// [`Error::ToolUnavailable`] rather than an execution failure.
    pub async fn status(&self) -> Result<StatusReport> {
        self.runner.ensure_available()?;

        let command = UfwCommand::Status;
        let result = self.runner.run(&command).await?;

        match outcome::classify(Operation::Status, &result) {
            Outcome::Inactive => Ok(StatusReport::inactive()),
            Outcome::Failure(detail) => Err(execution_error(&command, detail)),
            _ => status::parse_status(&result.stdout),
        }
    }

    /// `ufw allow|deny <rule> [comment <c>]`
    pub async fn add_rule(&self, action: Action, spec: RuleSpec) -> Result<Outcome> {
        self.execute(UfwCommand::Rule { action, spec }).await
    }

    /// `ufw allow|deny from <ip> [to any port <p>] [comment <c>]`
    pub async fn add_ip_rule(&self, action: Action, spec: IpRuleSpec) -> Result<Outcome> {
        self.execute(UfwCommand::FromIp { action, spec }).await
    }

    /// `ufw delete <n>`, confirming the prompt
    pub async fn delete(&self, index: RuleIndex) -> Result<Outcome> {
        self.execute(UfwCommand::Delete(index)).await
    }

    /// `ufw enable`, confirming the prompt
    pub async fn enable(&self) -> Result<Outcome> {
        self.execute(UfwCommand::Enable).await
    }

    pub async fn disable(&self) -> Result<Outcome> {
        self.execute(UfwCommand::Disable).await
    }

    /// Runs a mutating command, classifies the result, and audits it.
    pub async fn execute(&self, command: UfwCommand) -> Result<Outcome> {
        let operation_id = Uuid::new_v4();
        let operation = command.operation();
        let span = info_span!("ufw", %operation_id, %operation);

        async {
            let result = match self.runner.run(&command).await {
                Ok(execution) => match outcome::classify(operation, &execution) {
                    Outcome::Failure(detail) => Err(execution_error(&command, detail)),
                    Outcome::NotFound => Err(Error::NotFound(target_of(&command))),
                    outcome => Ok(outcome),
                },
                Err(e) => Err(e),
            };

            match &result {
                Ok(outcome) => match outcome.note() {
                    Some(note) => info!("{note}"),
                    None => info!("ufw {operation} succeeded"),
                },
                Err(e) => tracing::error!("ufw {operation} failed: {e}"),
            }

            if operation.is_mutating()
                && let Some(audit) = &self.audit
            {
                let details = serde_json::json!({
                    "args": command.args(),
                    "outcome": result.as_ref().ok().map(|o| format!("{o:?}")),
                });
                let event = AuditEvent::new(
                    operation_id,
                    operation,
                    result.is_ok(),
                    details,
                    result.as_ref().err().map(ToString::to_string),
                );
                audit.record(&event).await;
            }

            result
        }
        .instrument(span)
        .await
    }
}

fn execution_error(command: &UfwCommand, detail: FailureDetail) -> Error {
    Error::Execution {
        message: format!("{} ('ufw {}')", detail.message, command.args().join(" ")),
        stderr: detail.stderr,
        exit_code: detail.exit_code,
    }
}

fn target_of(command: &UfwCommand) -> String {
    match command {
        UfwCommand::Delete(index) => index.to_string(),
        other => other.operation().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_helpers::MockUfw;

    #[tokio::test]
    async fn test_status_active() {
        let mock = MockUfw::new(
            r#"cat <<'EOF'
Status: active

     To                         Action      From
     --                         ------      ----
[ 1] 22/tcp                     ALLOW IN    Anywhere
[ 2] 443/tcp                    ALLOW IN    Anywhere
EOF"#,
        );
        let report = mock.firewall().status().await.unwrap();

        assert_eq!(report.status, "active");
        assert_eq!(report.rules.len(), 2);
        assert!(report.rules[1].starts_with("[ 2] 443/tcp"));
        assert_eq!(mock.recorded_args(), ["status", "numbered"]);
    }

    #[tokio::test]
    async fn test_status_inactive_short_circuits_on_failure() {
        let mock = MockUfw::new(r#"echo "Status: inactive"; exit 1"#);
        let report = mock.firewall().status().await.unwrap();
        assert_eq!(report, StatusReport::inactive());
    }

    #[tokio::test]
    async fn test_status_keeps_rule_commented_inactive() {
        let mock = MockUfw::new(
            r#"cat <<'EOF'
Status: active

     To                         Action      From
     --                         ------      ----
[ 1] 22/tcp                     ALLOW IN    Anywhere                   # Status: inactive
EOF"#,
        );
        let report = mock.firewall().status().await.unwrap();

        assert_eq!(report.status, "active");
        assert_eq!(report.rules.len(), 1);
        assert!(report.rules[0].ends_with("# Status: inactive"));
    }

    #[tokio::test]
    async fn test_status_empty_output_is_error() {
        let mock = MockUfw::new("exit 0");
        let result = mock.firewall().status().await;
        assert!(matches!(result, Err(Error::EmptyOutput)));
    }

    #[tokio::test]
    async fn test_status_failure() {
        let mock = MockUfw::new(r#"echo "ERROR: You need to be root" >&2; exit 1"#);
        match mock.firewall().status().await {
            Err(Error::Execution { stderr, exit_code, .. }) => {
                assert!(stderr.contains("You need to be root"));
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_tool_missing() {
        let firewall = Firewall::new(Runner::new(
            "/nonexistent/ufw",
            crate::elevation::ElevationMethod::None,
        ));
        assert!(matches!(
            firewall.status().await,
            Err(Error::ToolUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_add_rule_args_and_success() {
        let mock = MockUfw::new(r#"echo "Rule added"; echo "Rule added (v6)""#);
        let spec = RuleSpec::new("8080/tcp", "dev server").unwrap();
        let outcome = mock.firewall().add_rule(Action::Allow, spec).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            mock.recorded_args(),
            ["allow", "8080/tcp", "comment", "dev server"]
        );
    }

    #[tokio::test]
    async fn test_add_rule_duplicate_is_benign() {
        let mock = MockUfw::new(r#"echo "Skipping adding existing rule""#);
        let spec = RuleSpec::new("22/tcp", "").unwrap();
        let outcome = mock.firewall().add_rule(Action::Deny, spec).await.unwrap();
        assert_eq!(outcome, Outcome::DuplicateSkipped);
    }

    #[tokio::test]
    async fn test_add_ip_rule_port_clause() {
        let mock = MockUfw::new(r#"echo "Rule added""#);
        let spec = IpRuleSpec::new("10.1.2.3", "22/tcp", "").unwrap();
        mock.firewall().add_ip_rule(Action::Allow, spec).await.unwrap();
        assert_eq!(
            mock.recorded_args(),
            ["allow", "from", "10.1.2.3", "to", "any", "port", "22/tcp"]
        );

        let spec = IpRuleSpec::new("10.1.2.3", "", "").unwrap();
        mock.firewall().add_ip_rule(Action::Deny, spec).await.unwrap();
        assert_eq!(mock.recorded_args(), ["deny", "from", "10.1.2.3"]);
    }

    #[tokio::test]
    async fn test_add_rule_failure_carries_stderr() {
        let mock = MockUfw::new(r#"echo "ERROR: Bad port" >&2; exit 1"#);
        let spec = RuleSpec::new("99999/tcp", "").unwrap();
        let err = mock.firewall().add_rule(Action::Allow, spec).await.unwrap_err();

        assert_eq!(err.stderr(), Some("ERROR: Bad port\n"));
        assert!(err.to_string().contains("'ufw allow 99999/tcp'"));
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let mock = MockUfw::new(r#"echo "WARN: Rule not found" >&2; exit 1"#);
        let err = mock
            .firewall()
            .delete(RuleIndex::new("42").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref n) if n == "42"));
    }

    #[tokio::test]
    async fn test_delete_confirms_prompt() {
        let mock = MockUfw::new(
            r#"printf 'Deleting:\n allow 22/tcp\nProceed with operation (y|n)? '
read answer
[ "$answer" = "y" ] || exit 1
echo "Rule deleted""#,
        );
        let outcome = mock
            .firewall()
            .delete(RuleIndex::new("1").unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(mock.recorded_args(), ["delete", "1"]);
    }

    #[tokio::test]
    async fn test_enable_already_active_with_error_exit() {
        let mock = MockUfw::new(r#"echo "Firewall is already active" >&2; exit 1"#);
        let outcome = mock.firewall().enable().await.unwrap();
        assert_eq!(outcome, Outcome::AlreadyActive);
    }

    #[tokio::test]
    async fn test_disable_already_inactive() {
        let mock = MockUfw::new(r#"echo "Firewall is not active"; exit 1"#);
        let outcome = mock.firewall().disable().await.unwrap();
        assert_eq!(outcome, Outcome::AlreadyInactive);
    }

    #[tokio::test]
    async fn test_mutations_are_audited() {
        let mock = MockUfw::new(r#"echo "Firewall is active and enabled on system startup""#);
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::at(dir.path().join("audit.log"));
        let firewall = mock.firewall().with_audit(audit.clone());

        firewall.enable().await.unwrap();
        firewall.status().await.unwrap();

        let events = audit.read_recent(10).await.unwrap();
        assert_eq!(events.len(), 1, "status must not be audited");
        assert_eq!(events[0].event_type, "enable");
        assert!(events[0].success);
        assert_eq!(events[0].details["args"][0], "enable");
    }

    #[tokio::test]
    async fn test_failed_mutation_audit_has_error() {
        let mock = MockUfw::new(r#"echo "ERROR: problem running ufw-init" >&2; exit 1"#);
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::at(dir.path().join("audit.log"));

        let result = mock.firewall().with_audit(audit.clone()).disable().await;
        assert!(result.is_err());

        let events = audit.read_recent(1).await.unwrap();
        assert!(!events[0].success);
        assert!(events[0].error.as_deref().unwrap().contains("ufw disable failed"));
    }
}
