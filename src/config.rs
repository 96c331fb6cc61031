//! Command line and environment configuration
//!
//! Every flag can also be set through an environment variable, so ufwd runs
//! unchanged from a systemd unit or a shell. A `.env` file in the working
//! directory is loaded first; variables already set in the environment win.
//! Configuration is read once at startup and never changes afterwards.

use crate::core::runner::{DEFAULT_UFW_PROGRAM, Runner};
use crate::elevation::ElevationMethod;
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 30737;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("UFW_API_KEY is not set (pass --api-key or set the environment variable)")]
    MissingApiKey,

    #[error("no valid CORS origin in '{0}'")]
    NoValidOrigins(String),
}

/// How the firewall tool is located and elevated
#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    /// Name or path of the ufw executable
    #[arg(long, env = "UFWD_UFW_COMMAND", default_value = DEFAULT_UFW_PROGRAM, global = true)]
    pub ufw_command: String,

    /// Privilege escalation: auto, sudo, run0, pkexec, or none
    #[arg(long, env = "UFWD_ELEVATION_METHOD", default_value = "auto", global = true)]
    pub elevation: ElevationMethod,
}

impl ToolArgs {
    pub fn runner(&self) -> Runner {
        Runner::new(self.ufw_command.clone(), self.elevation)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Shared secret expected in the X-API-KEY header
    #[arg(long, env = "UFW_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", default_value = DEFAULT_CORS_ORIGIN, global = true)]
    pub cors_origins: String,

    /// Listen port (also the port opened in ufw at startup)
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "UFWD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), global = true)]
    pub bind: IpAddr,

    /// Do not add `allow <port>/tcp` before listening
    #[arg(long, global = true)]
    pub no_port_rule: bool,

    /// Audit log path (default: $XDG_STATE_HOME/ufwd/audit.log)
    #[arg(long, env = "UFWD_AUDIT_LOG", global = true)]
    pub audit_log: Option<PathBuf>,
}

/// Validated server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub api_key: String,
    pub cors_origins: Vec<String>,
    pub addr: SocketAddr,
    pub register_port_rule: bool,
    pub audit_log: Option<PathBuf>,
}

impl ServeConfig {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl TryFrom<&ServeArgs> for ServeConfig {
    type Error = ConfigError;

    fn try_from(args: &ServeArgs) -> Result<Self, Self::Error> {
        let api_key = args
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let cors_origins = parse_origins(&args.cors_origins);
        if cors_origins.is_empty() {
            return Err(ConfigError::NoValidOrigins(args.cors_origins.clone()));
        }

        Ok(Self {
            api_key,
            cors_origins,
            addr: SocketAddr::new(args.bind, args.port),
            register_port_rule: !args.no_port_rule,
            audit_log: args.audit_log.clone(),
        })
    }
}

/// Loads `KEY=value` lines from `path`, or from `.env` in the working
/// directory, into the process environment without overriding variables
/// that are already set. Must run before the command line is parsed.
pub fn load_env_file(path: Option<&Path>) -> Result<PathBuf, dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    }
}

/// Splits a comma-separated origin list, trimming each entry.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
