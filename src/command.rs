//! Construction of ufw argument vectors
//!
//! Each request maps to exactly one [`UfwCommand`]. The command only holds
//! values that already passed [`crate::validators`], so building the argument
//! vector cannot fail and is fully deterministic: the same command always
//! yields the same arguments in the same order.
//!
//! | Command | Arguments (after the `ufw` program name) |
//! |---------|-------------------------------------------|
//! | [`UfwCommand::Rule`] | `allow\|deny <rule tokens>… [comment <text>]` |
//! | [`UfwCommand::FromIp`] | `allow\|deny from <ip> [to any port <p>] [comment <text>]` |
//! | [`UfwCommand::Delete`] | `delete <n>` |
//! | [`UfwCommand::Enable`] | `enable` |
//! | [`UfwCommand::Disable`] | `disable` |
//! | [`UfwCommand::Status`] | `status numbered` |
//!
//! # Example
//!
//! ```
//! use ufwd::command::UfwCommand;
//! use ufwd::core::firewall::{Action, IpRuleSpec};
//!
//! let spec = IpRuleSpec::new("10.0.0.5", "22/tcp", "bastion").unwrap();
//! let cmd = UfwCommand::FromIp { action: Action::Allow, spec };
//! assert_eq!(
//!     cmd.args(),
//!     ["allow", "from", "10.0.0.5", "to", "any", "port", "22/tcp", "comment", "bastion"]
//! );
//! ```

use crate::core::firewall::{Action, IpRuleSpec, RuleIndex, RuleSpec};
use serde::Serialize;

/// Input written to ufw for subcommands that ask "Proceed with operation (y|n)?"
pub const CONFIRMATION_LINE: &str = "y\n";

/// The kind of firewall operation, independent of its arguments.
///
/// Used to key the outcome marker table and to tag audit events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Status,
    Allow,
    Deny,
    AllowFrom,
    DenyFrom,
    Delete,
    Enable,
    Disable,
}

impl Operation {
    /// Whether the operation changes firewall state (and is audited)
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Operation::Status)
    }
}

/// A fully validated ufw invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UfwCommand {
    /// Allow or deny by port/protocol rule
    Rule { action: Action, spec: RuleSpec },
    /// Allow or deny traffic from a source address
    FromIp { action: Action, spec: IpRuleSpec },
    /// Delete by position in the numbered listing
    Delete(RuleIndex),
    Enable,
    Disable,
    /// `status numbered`
    Status,
}

impl UfwCommand {
    pub fn operation(&self) -> Operation {
        match self {
            UfwCommand::Rule {
                action: Action::Allow,
                ..
            } => Operation::Allow,
            UfwCommand::Rule {
                action: Action::Deny,
                ..
            } => Operation::Deny,
            UfwCommand::FromIp {
                action: Action::Allow,
                ..
            } => Operation::AllowFrom,
            UfwCommand::FromIp {
                action: Action::Deny,
                ..
            } => Operation::DenyFrom,
            UfwCommand::Delete(_) => Operation::Delete,
            UfwCommand::Enable => Operation::Enable,
            UfwCommand::Disable => Operation::Disable,
            UfwCommand::Status => Operation::Status,
        }
    }

    /// Builds the argument vector, starting with the ufw subcommand name.
    ///
    /// The program name itself (and any elevation prefix) is added by the
    /// runner.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match self {
            UfwCommand::Rule { action, spec } => {
                args.push(action.as_str().to_string());
                args.extend(spec.tokens().map(str::to_string));
                push_comment(&mut args, spec.comment());
            }
            UfwCommand::FromIp { action, spec } => {
                args.push(action.as_str().to_string());
                args.push("from".to_string());
                args.push(spec.ip_address().to_string());
                if let Some(port_protocol) = spec.port_protocol() {
                    args.extend(["to", "any", "port"].map(String::from));
                    args.push(port_protocol.to_string());
                }
                push_comment(&mut args, spec.comment());
            }
            UfwCommand::Delete(index) => {
                args.push("delete".to_string());
                args.push(index.as_str().to_string());
            }
            UfwCommand::Enable => args.push("enable".to_string()),
            UfwCommand::Disable => args.push("disable".to_string()),
            UfwCommand::Status => {
                args.push("status".to_string());
                args.push("numbered".to_string());
            }
        }

        args
    }

    /// Input to supply on stdin, for subcommands that prompt for confirmation.
    ///
    /// The line is sent unconditionally; ufw does not prompt when deleting an
    /// index that does not exist, and the unread input is then discarded.
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            UfwCommand::Enable | UfwCommand::Delete(_) => Some(CONFIRMATION_LINE),
            _ => None,
        }
    }
}

fn push_comment(args: &mut Vec<String>, comment: Option<&str>) {
    if let Some(comment) = comment {
        args.push("comment".to_string());
        args.push(comment.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(action: Action, rule: &str, comment: &str) -> UfwCommand {
        UfwCommand::Rule {
            action,
            spec: RuleSpec::new(rule, comment).unwrap(),
        }
    }

    fn from_ip(action: Action, ip: &str, port: &str, comment: &str) -> UfwCommand {
        UfwCommand::FromIp {
            action,
            spec: IpRuleSpec::new(ip, port, comment).unwrap(),
        }
    }

    #[test]
    fn test_allow_rule_args() {
        assert_eq!(rule(Action::Allow, "22/tcp", "").args(), ["allow", "22/tcp"]);
    }

    #[test]
    fn test_deny_rule_with_comment() {
        assert_eq!(
            rule(Action::Deny, "23/tcp", "no telnet").args(),
            ["deny", "23/tcp", "comment", "no telnet"]
        );
    }

    #[test]
    fn test_multi_token_rule_is_split() {
        assert_eq!(
            rule(Action::Allow, "proto udp to any port 53", "").args(),
            ["allow", "proto", "udp", "to", "any", "port", "53"]
        );
    }

    #[test]
    fn test_comment_is_single_argument() {
        let args = rule(Action::Allow, "80/tcp", "public web server").args();
        assert_eq!(args.last().unwrap(), "public web server");
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_from_ip_without_port_omits_clause() {
        let args = from_ip(Action::Deny, "198.51.100.7", "", "").args();
        assert_eq!(args, ["deny", "from", "198.51.100.7"]);
        assert!(!args.iter().any(|a| a == "port"));
    }

    #[test]
    fn test_from_ip_with_port() {
        assert_eq!(
            from_ip(Action::Allow, "10.0.0.0/8", "5432/tcp", "").args(),
            ["allow", "from", "10.0.0.0/8", "to", "any", "port", "5432/tcp"]
        );
    }

    #[test]
    fn test_from_ip_comment_without_port() {
        assert_eq!(
            from_ip(Action::Allow, "10.0.0.9", "", "backup host").args(),
            ["allow", "from", "10.0.0.9", "comment", "backup host"]
        );
    }

    #[test]
    fn test_fixed_commands() {
        assert_eq!(UfwCommand::Enable.args(), ["enable"]);
        assert_eq!(UfwCommand::Disable.args(), ["disable"]);
        assert_eq!(UfwCommand::Status.args(), ["status", "numbered"]);
        assert_eq!(
            UfwCommand::Delete(RuleIndex::new("3").unwrap()).args(),
            ["delete", "3"]
        );
    }

    #[test]
    fn test_args_are_deterministic() {
        let cmd = from_ip(Action::Allow, "192.0.2.1", "443/tcp", "edge");
        assert_eq!(cmd.args(), cmd.args());
        assert_eq!(cmd.clone().args(), cmd.args());
    }

    #[test]
    fn test_confirmation_only_for_prompting_commands() {
        assert_eq!(UfwCommand::Enable.confirmation(), Some("y\n"));
        assert_eq!(
            UfwCommand::Delete(RuleIndex::new("1").unwrap()).confirmation(),
            Some("y\n")
        );
        assert_eq!(UfwCommand::Disable.confirmation(), None);
        assert_eq!(UfwCommand::Status.confirmation(), None);
        assert_eq!(rule(Action::Allow, "22", "").confirmation(), None);
    }

    #[test]
    fn test_operation_mapping() {
        assert_eq!(rule(Action::Allow, "22", "").operation(), Operation::Allow);
        assert_eq!(rule(Action::Deny, "22", "").operation(), Operation::Deny);
        assert_eq!(
            from_ip(Action::Allow, "10.0.0.1", "", "").operation(),
            Operation::AllowFrom
        );
        assert_eq!(
            from_ip(Action::Deny, "10.0.0.1", "", "").operation(),
            Operation::DenyFrom
        );
        assert_eq!(Operation::DenyFrom.to_string(), "deny_from");
        assert!(Operation::Delete.is_mutating());
        assert!(!Operation::Status.is_mutating());
    }
}
