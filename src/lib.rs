//! ufwd - ufw firewall management over HTTP
//!
//! A small service that lets authenticated clients inspect and change a
//! host's ufw firewall without shell access.
//!
//! # Architecture
//!
//! - [`validators`] - Input validation and shell metacharacter rejection
//! - [`command`] - Argument vectors for every supported ufw operation
//! - [`elevation`] - Privilege escalation (sudo, run0, pkexec)
//! - [`core`] - Process execution, outcome classification, status parsing
//! - [`server`] - HTTP API with API key authentication and CORS
//! - [`audit`] - Audit log of every state-changing operation
//! - [`config`] - Command line and environment configuration
//! - [`utils`] - Utility functions (XDG directories, etc.)
//!
//! # Safety Features
//!
//! - No shell anywhere between a request and ufw; arguments are passed as a vector
//! - Shell metacharacters and quotes rejected in every user-supplied field
//! - Constant-length digest comparison of API keys
//! - Audit log with private file permissions

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod audit;
pub mod command;
pub mod config;
pub mod core;
pub mod elevation;
pub mod server;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::error::{Error, Result};
pub use core::firewall::{Action, IpRuleSpec, RuleIndex, RuleSpec, StatusReport};
pub use core::service::Firewall;
