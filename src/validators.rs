//! Input validation for every field that ends up on the ufw command line
//!
//! This module is the only gate between untrusted request fields and the
//! argument vector handed to the elevated `ufw` process. Arguments are never
//! passed through a shell, so the goal is precision rather than escaping:
//! each field role has a deny-list of characters that could change argument
//! boundaries or escape into another command, and anything containing one of
//! them is rejected outright (never silently stripped).
//!
//! | Role | Rejected |
//! |------|----------|
//! | rule spec, port/protocol | `; \| & ` `` ` `` ` $ < > \` |
//! | comment | the above plus `'` and `"` |
//! | IP address | rule-spec set plus any whitespace |
//! | rule index | anything but a non-empty all-digit string other than `"0"` |

/// Characters that could split or chain commands if a value ever reached a shell.
pub const SHELL_METACHARACTERS: &[char] = &[';', '|', '&', '`', '$', '<', '>', '\\'];

/// Additional characters rejected in free-text comments.
pub const QUOTE_CHARACTERS: &[char] = &['\'', '"'];

/// What a field is used for, which decides the character set it may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum FieldRole {
    #[strum(serialize = "rule")]
    RuleSpec,
    #[strum(serialize = "port_protocol")]
    PortProtocol,
    #[strum(serialize = "comment")]
    Comment,
    #[strum(serialize = "ip_address")]
    IpAddress,
    #[strum(serialize = "rule_number")]
    RuleIndex,
}

/// A field was rejected before anything was executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: FieldRole,
    pub message: String,
}

impl ValidationError {
    fn new(field: FieldRole, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Checks `input` against the character rules for `role`.
///
/// Emptiness is only an error for [`FieldRole::RuleIndex`]; whether other
/// fields are required is decided by the caller (see [`require`]).
///
/// # Examples
///
/// ```
/// use ufwd::validators::{validate, FieldRole};
///
/// assert!(validate("22/tcp", FieldRole::RuleSpec).is_ok());
/// assert!(validate("22/tcp; reboot", FieldRole::RuleSpec).is_err());
/// assert!(validate("web \"server\"", FieldRole::Comment).is_err());
/// assert!(validate("10.0.0.1 22", FieldRole::IpAddress).is_err());
/// assert!(validate("0", FieldRole::RuleIndex).is_err());
/// ```
pub fn validate(input: &str, role: FieldRole) -> Result<(), ValidationError> {
    match role {
        FieldRole::RuleSpec | FieldRole::PortProtocol => reject_chars(input, role, |c| {
            SHELL_METACHARACTERS.contains(&c)
        }),
        FieldRole::Comment => reject_chars(input, role, |c| {
            SHELL_METACHARACTERS.contains(&c) || QUOTE_CHARACTERS.contains(&c)
        }),
        FieldRole::IpAddress => reject_chars(input, role, |c| {
            SHELL_METACHARACTERS.contains(&c) || c.is_whitespace()
        }),
        FieldRole::RuleIndex => validate_rule_index(input).map(|_| ()),
    }
}

fn reject_chars(
    input: &str,
    role: FieldRole,
    forbidden: impl Fn(char) -> bool,
) -> Result<(), ValidationError> {
    match input.chars().find(|&c| forbidden(c)) {
        Some(c) => Err(ValidationError::new(
            role,
            format!("contains forbidden character {c:?}"),
        )),
        None => Ok(()),
    }
}

/// Rejects an empty value for a field the operation cannot do without.
pub fn require(input: &str, role: FieldRole) -> Result<(), ValidationError> {
    if input.is_empty() {
        Err(ValidationError::new(role, "cannot be empty"))
    } else {
        Ok(())
    }
}

/// Validates a rule-spec field (`"22/tcp"`, `"80,443/tcp"`, `"proto udp to any port 53"`).
///
/// # Errors
///
/// Returns `Err` if the value is empty or contains a shell metacharacter.
pub fn validate_rule_spec(input: &str) -> Result<&str, ValidationError> {
    require(input, FieldRole::RuleSpec)?;
    validate(input, FieldRole::RuleSpec)?;
    Ok(input)
}

/// Validates an optional port/protocol token. Empty means "not supplied".
pub fn validate_port_protocol(input: &str) -> Result<Option<&str>, ValidationError> {
    validate(input, FieldRole::PortProtocol)?;
    Ok(non_empty(input))
}

/// Validates an optional comment. Empty means "not supplied".
pub fn validate_comment(input: &str) -> Result<Option<&str>, ValidationError> {
    validate(input, FieldRole::Comment)?;
    Ok(non_empty(input))
}

/// Validates a source IP/CIDR field, which must be a single non-empty token.
pub fn validate_ip_address(input: &str) -> Result<&str, ValidationError> {
    require(input, FieldRole::IpAddress)?;
    validate(input, FieldRole::IpAddress)?;
    Ok(input)
}

/// Validates a rule index from the numbered listing.
///
/// ufw numbers rules from 1, so the literal `"0"` is never valid. The value is
/// kept as text; it is forwarded verbatim and never parsed into an integer.
pub fn validate_rule_index(input: &str) -> Result<&str, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::new(FieldRole::RuleIndex, "cannot be empty"));
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(FieldRole::RuleIndex, "must be numeric"));
    }
    if input == "0" {
        return Err(ValidationError::new(FieldRole::RuleIndex, "cannot be zero"));
    }
    Ok(input)
}

fn non_empty(input: &str) -> Option<&str> {
    if input.is_empty() { None } else { Some(input) }
}
