//! Core firewall management functionality
//!
//! This module contains the types and logic for driving ufw.
//! It provides:
//!
//! - [`firewall`]: Validated rule specifications and the status report
//! - [`runner`]: Elevated ufw process execution with captured output
//! - [`outcome`]: Classification of ufw results, including benign no-ops
//! - [`status`]: Parsing of `ufw status numbered` output
//! - [`service`]: The [`service::Firewall`] facade used by the API and CLI
//! - [`error`]: Error types for firewall operations

pub mod error;
pub mod firewall;
pub mod outcome;
pub mod runner;
pub mod service;
pub mod status;

#[cfg(test)]
pub mod test_helpers;
