//! Request-scoped firewall data structures
//!
//! Every value here is built from untrusted request fields through a
//! validating constructor, used to build one ufw invocation, and dropped when
//! the response is written. There is no rule table: ufw itself is the only
//! source of truth for what is installed.
//!
//! # Example
//!
//! ```
//! use ufwd::core::firewall::{IpRuleSpec, RuleIndex, RuleSpec};
//!
//! let ssh = RuleSpec::new("22/tcp", "SSH").unwrap();
//! assert_eq!(ssh.tokens().collect::<Vec<_>>(), ["22/tcp"]);
//!
//! let office = IpRuleSpec::new("203.0.113.0/24", "443/tcp", "").unwrap();
//! assert_eq!(office.port_protocol(), Some("443/tcp"));
//! assert_eq!(office.comment(), None);
//!
//! assert!(RuleIndex::new("0").is_err());
//! ```

use crate::validators::{self, FieldRole, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a rule lets matching traffic through or blocks it
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[strum(serialize = "allow")]
    Allow,
    #[strum(serialize = "deny")]
    Deny,
}

impl Action {
    /// Returns the ufw subcommand name
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
        }
    }
}

/// A port/protocol rule such as `22/tcp`, with an optional comment.
///
/// The rule text may hold several whitespace-separated tokens; each becomes
/// its own argument and they are never joined back into one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSpec {
    rule: String,
    comment: Option<String>,
}

impl RuleSpec {
    /// Validates and builds a rule spec. An empty `comment` means none.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the rule is empty (or only whitespace) or either
    /// field contains a forbidden character.
    pub fn new(rule: &str, comment: &str) -> Result<Self, ValidationError> {
        let rule = validators::validate_rule_spec(rule)?;
        if rule.split_whitespace().next().is_none() {
            return Err(ValidationError {
                field: FieldRole::RuleSpec,
                message: "cannot be empty".to_string(),
            });
        }
        let comment = validators::validate_comment(comment)?;

        Ok(Self {
            rule: rule.to_string(),
            comment: comment.map(str::to_string),
        })
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Rule text split on whitespace, one item per argument
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.rule.split_whitespace()
    }
}

/// A source-address rule: traffic from `ip`, optionally narrowed to one
/// port/protocol, with an optional comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpRuleSpec {
    ip_address: String,
    port_protocol: Option<String>,
    comment: Option<String>,
}

impl IpRuleSpec {
    /// Validates and builds an IP rule. Empty optional fields mean absent.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the address is empty or contains whitespace or a
    /// shell metacharacter, or an optional field contains a forbidden
    /// character.
    pub fn new(
        ip_address: &str,
        port_protocol: &str,
        comment: &str,
    ) -> Result<Self, ValidationError> {
        let ip_address = validators::validate_ip_address(ip_address)?;
        let port_protocol = validators::validate_port_protocol(port_protocol)?;
        let comment = validators::validate_comment(comment)?;

        Ok(Self {
            ip_address: ip_address.to_string(),
            port_protocol: port_protocol.map(str::to_string),
            comment: comment.map(str::to_string),
        })
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn port_protocol(&self) -> Option<&str> {
        self.port_protocol.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Position of a rule in `ufw status numbered` output (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleIndex(String);

impl RuleIndex {
    /// # Errors
    ///
    /// Returns `Err` unless `input` is a non-empty run of ASCII digits other
    /// than `"0"`.
    pub fn new(input: &str) -> Result<Self, ValidationError> {
        validators::validate_rule_index(input).map(|index| Self(index.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed `ufw status numbered` output.
///
/// Rule lines are kept as opaque text in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
    pub rules: Vec<String>,
}

impl StatusReport {
    pub const STATE_UNKNOWN: &'static str = "unknown";
    pub const STATE_INACTIVE: &'static str = "inactive";

    /// Report for a firewall that is switched off
    pub fn inactive() -> Self {
        Self {
            status: Self::STATE_INACTIVE.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
