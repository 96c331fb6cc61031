//! Parsing of `ufw status numbered` output
//!
//! The output is treated as semi-structured text rather than a grammar:
//!
//! ```text
//! Status: active
//!
//!      To                         Action      From
//!      --                         ------      ----
//! [ 1] 22/tcp                     ALLOW IN    Anywhere
//! ```
//!
//! The first line carries the overall state. Rule lines follow the column
//! header (the first line mentioning both `Action` and `From`) and its dashed
//! separator. If no header shows up at all, the parser falls back to keeping
//! everything after the state line, or everything if there was no state
//! line, so a change in ufw's layout degrades to extra lines instead of an
//! empty list.

use crate::core::error::{Error, Result};
use crate::core::firewall::StatusReport;

const STATUS_PREFIX: &str = "Status:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    SeekingHeader,
    /// `at_separator` is true only for the line right after the header
    CollectingRules { at_separator: bool },
}

fn is_header(line: &str) -> bool {
    line.contains("Action") && line.contains("From")
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-' || c.is_whitespace())
}

/// Parses captured stdout of `ufw status numbered`.
///
/// # Errors
///
/// Returns [`Error::EmptyOutput`] if there is no text at all; ufw always
/// prints at least the status line.
pub fn parse_status(stdout: &str) -> Result<StatusReport> {
    let text = stdout.trim_end();
    if text.is_empty() {
        return Err(Error::EmptyOutput);
    }

    let lines: Vec<&str> = text.lines().collect();

    let state = lines[0]
        .strip_prefix(STATUS_PREFIX)
        .map(|rest| rest.trim().to_string());
    let recognized = state.is_some();

    let mut parse_state = ParseState::SeekingHeader;
    let mut rules = Vec::new();

    for line in &lines {
        match parse_state {
            ParseState::SeekingHeader => {
                if is_header(line) {
                    parse_state = ParseState::CollectingRules { at_separator: true };
                }
            }
            ParseState::CollectingRules { at_separator } => {
                parse_state = ParseState::CollectingRules {
                    at_separator: false,
                };
                if at_separator && is_separator(line) {
                    continue;
                }
                rules.push(line.trim().to_string());
            }
        }
    }

    // No header anywhere: decide the fallback start once
    if parse_state == ParseState::SeekingHeader {
        let start = usize::from(recognized);
        rules = lines[start..].iter().map(|l| l.trim().to_string()).collect();
    }

    Ok(StatusReport {
        status: state.unwrap_or_else(|| StatusReport::STATE_UNKNOWN.to_string()),
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE_SAMPLE: &str = "Status: active

To                         Action      From
--                         ------      ----
22/tcp                     ALLOW       Anywhere
";

    const NUMBERED_SAMPLE: &str = "Status: active

     To                         Action      From
     --                         ------      ----
[ 1] 22/tcp                     ALLOW IN    Anywhere                   # SSH
[ 2] 80/tcp                     ALLOW IN    Anywhere
[ 3] 22/tcp (v6)                ALLOW IN    Anywhere (v6)              # SSH

";

    #[test]
    fn test_active_sample() {
        let report = parse_status(ACTIVE_SAMPLE).unwrap();
        assert_eq!(report.status, "active");
        assert_eq!(report.rules.len(), 1);
        // Line boundaries trimmed, column spacing kept
        assert_eq!(report.rules[0], "22/tcp                     ALLOW       Anywhere");
        assert_eq!(
            report.rules[0].split_whitespace().collect::<Vec<_>>().join(" "),
            "22/tcp ALLOW Anywhere"
        );
    }

    #[test]
    fn test_numbered_sample_keeps_order() {
        let report = parse_status(NUMBERED_SAMPLE).unwrap();
        assert!(report.is_active());
        assert_eq!(report.rules.len(), 3);
        assert!(report.rules[0].starts_with("[ 1] 22/tcp"));
        assert!(report.rules[0].ends_with("# SSH"));
        assert!(report.rules[1].starts_with("[ 2] 80/tcp"));
        assert!(report.rules[2].starts_with("[ 3] 22/tcp (v6)"));
    }

    #[test]
    fn test_inactive_only() {
        let report = parse_status("Status: inactive").unwrap();
        assert_eq!(report.status, "inactive");
        assert!(report.rules.is_empty());
    }

    #[test]
    fn test_empty_output_is_error() {
        assert!(matches!(parse_status(""), Err(Error::EmptyOutput)));
        assert!(matches!(parse_status("\n\n  \n"), Err(Error::EmptyOutput)));
    }

    #[test]
    fn test_header_without_separator() {
        let text = "Status: active\nTo Action From\n22 ALLOW Anywhere\n";
        let report = parse_status(text).unwrap();
        assert_eq!(report.rules, ["22 ALLOW Anywhere"]);
    }

    #[test]
    fn test_only_first_separator_is_skipped() {
        let text = "Status: active\nTo Action From\n-- ------ ----\n----\n";
        let report = parse_status(text).unwrap();
        assert_eq!(report.rules, ["----"]);
    }

    #[test]
    fn test_blank_lines_inside_listing_are_kept() {
        let text = "Status: active\nTo Action From\n--\n1 ALLOW x\n\n2 DENY y\n";
        let report = parse_status(text).unwrap();
        assert_eq!(report.rules, ["1 ALLOW x", "", "2 DENY y"]);
    }

    #[test]
    fn test_fallback_with_state_line() {
        let text = "Status: active\n  rule one  \nrule two";
        let report = parse_status(text).unwrap();
        assert_eq!(report.status, "active");
        assert_eq!(report.rules, ["rule one", "rule two"]);
    }

    #[test]
    fn test_fallback_without_state_line() {
        let text = "something unexpected\nrule two";
        let report = parse_status(text).unwrap();
        assert_eq!(report.status, "unknown");
        assert_eq!(report.rules, ["something unexpected", "rule two"]);
    }

    #[test]
    fn test_header_at_end_yields_no_rules() {
        let report = parse_status("Status: active\nTo Action From").unwrap();
        assert!(report.rules.is_empty());
    }

    #[test]
    fn test_crlf_output() {
        let text = "Status: active\r\nTo Action From\r\n--\r\n22 ALLOW Anywhere\r\n";
        let report = parse_status(text).unwrap();
        assert_eq!(report.status, "active");
        assert_eq!(report.rules, ["22 ALLOW Anywhere"]);
    }
}
