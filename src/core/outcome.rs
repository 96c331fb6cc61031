//! Classification of ufw results
//!
//! ufw has no exit-code taxonomy for "nothing to do" situations: enabling an
//! active firewall, disabling an inactive one, or adding a rule that already
//! exists. The only signal is the message text, so every phrase ufwd relies
//! on lives in [`MARKERS`], keyed by operation and stream. When ufw changes a
//! message, this table is the one place to update.
//!
//! Markers are checked in table order and the first match wins, before the
//! exit status is looked at. A benign marker therefore turns a non-zero exit
//! into a non-error outcome.

use crate::command::Operation;
use crate::core::runner::ExecutionResult;
use serde::Serialize;

/// Which captured stream a marker phrase is searched in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
    /// Either stream, each searched on its own
    Any,
}

/// Where in a line the phrase may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Anywhere,
    /// The line, after trimming, must start with the phrase. Keeps rule
    /// comments echoed back in a listing from matching.
    LineStart,
}

impl Anchor {
    fn matches(self, text: &str, phrase: &str) -> bool {
        match self {
            Anchor::Anywhere => text.contains(phrase),
            Anchor::LineStart => text.lines().any(|line| line.trim().starts_with(phrase)),
        }
    }
}

impl Stream {
    fn contains(self, result: &ExecutionResult, phrase: &str, anchor: Anchor) -> bool {
        match self {
            Stream::Stdout => anchor.matches(&result.stdout, phrase),
            Stream::Stderr => anchor.matches(&result.stderr, phrase),
            Stream::Any => {
                anchor.matches(&result.stdout, phrase) || anchor.matches(&result.stderr, phrase)
            }
        }
    }
}

/// Outcome a marker maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkedOutcome {
    AlreadyActive,
    AlreadyInactive,
    DuplicateSkipped,
    NotFound,
    Inactive,
}

/// One known ufw message
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub operations: &'static [Operation],
    pub stream: Stream,
    pub anchor: Anchor,
    pub phrase: &'static str,
    pub outcome: MarkedOutcome,
}

const ADD_RULE_OPS: &[Operation] = &[
    Operation::Allow,
    Operation::Deny,
    Operation::AllowFrom,
    Operation::DenyFrom,
];

/// Known ufw message phrases, in precedence order
pub const MARKERS: &[Marker] = &[
    Marker {
        operations: &[Operation::Enable],
        stream: Stream::Any,
        anchor: Anchor::Anywhere,
        phrase: "Firewall is already active",
        outcome: MarkedOutcome::AlreadyActive,
    },
    Marker {
        operations: &[Operation::Disable],
        stream: Stream::Any,
        anchor: Anchor::Anywhere,
        phrase: "Firewall is not active",
        outcome: MarkedOutcome::AlreadyInactive,
    },
    Marker {
        operations: &[Operation::Delete],
        stream: Stream::Stderr,
        anchor: Anchor::Anywhere,
        phrase: "Rule not found",
        outcome: MarkedOutcome::NotFound,
    },
    Marker {
        operations: &[Operation::Delete],
        stream: Stream::Stderr,
        anchor: Anchor::Anywhere,
        phrase: "Could not find rule",
        outcome: MarkedOutcome::NotFound,
    },
    Marker {
        operations: &[Operation::Status],
        stream: Stream::Any,
        anchor: Anchor::LineStart,
        phrase: "Status: inactive",
        outcome: MarkedOutcome::Inactive,
    },
    Marker {
        operations: ADD_RULE_OPS,
        stream: Stream::Any,
        anchor: Anchor::Anywhere,
        phrase: "Skipping adding existing rule",
        outcome: MarkedOutcome::DuplicateSkipped,
    },
];

/// Details of a run that failed without a benign explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    pub message: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// The semantic result of one ufw invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// enable when the firewall was already enabled
    AlreadyActive,
    /// disable when the firewall was already disabled
    AlreadyInactive,
    /// ufw skipped a rule that is already present
    DuplicateSkipped,
    /// delete referenced a rule number that does not exist
    NotFound,
    /// status reported an inactive firewall
    Inactive,
    Failure(FailureDetail),
}

impl From<MarkedOutcome> for Outcome {
    fn from(marked: MarkedOutcome) -> Self {
        match marked {
            MarkedOutcome::AlreadyActive => Outcome::AlreadyActive,
            MarkedOutcome::AlreadyInactive => Outcome::AlreadyInactive,
            MarkedOutcome::DuplicateSkipped => Outcome::DuplicateSkipped,
            MarkedOutcome::NotFound => Outcome::NotFound,
            MarkedOutcome::Inactive => Outcome::Inactive,
        }
    }
}

impl Outcome {
    /// Requested end state already held; reported as success
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Outcome::AlreadyActive | Outcome::AlreadyInactive | Outcome::DuplicateSkipped
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::Inactive) || self.is_benign()
    }

    /// Informational note for benign outcomes
    pub fn note(&self) -> Option<&'static str> {
        match self {
            Outcome::AlreadyActive => Some("Firewall was already active"),
            Outcome::AlreadyInactive => Some("Firewall was already inactive"),
            Outcome::DuplicateSkipped => Some("Rule already exists; skipped"),
            _ => None,
        }
    }
}

/// Finds the first marker that matches `op` and the captured output.
pub fn find_marker(op: Operation, result: &ExecutionResult) -> Option<&'static Marker> {
    MARKERS
        .iter()
        .filter(|m| m.operations.contains(&op))
        .find(|m| m.stream.contains(result, m.phrase, m.anchor))
}

/// Maps an execution result to an [`Outcome`].
///
/// Precedence: marker table (in order), then exit status.
pub fn classify(op: Operation, result: &ExecutionResult) -> Outcome {
    if let Some(marker) = find_marker(op, result) {
        return marker.outcome.into();
    }

    if result.success {
        Outcome::Success
    } else {
        let status = result
            .exit_code
            .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
        Outcome::Failure(FailureDetail {
            message: format!("ufw {op} failed: exited with {status}"),
            stderr: result.stderr.clone(),
            exit_code: result.exit_code,
        })
    }
}
