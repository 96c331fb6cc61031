//! ufwd - ufw firewall management over HTTP
//!
//! Runs an authenticated HTTP API in front of the host's ufw, or performs a
//! single firewall operation from the command line.
//!
//! # Security
//!
//! - Runs as an unprivileged user and elevates only the ufw executable
//! - All inputs validated before elevation
//! - Audit trail of all state-changing operations
//!
//! # Usage
//!
//! ```bash
//! # Run the API (default when no subcommand is given)
//! UFW_API_KEY=change-me ufwd
//! ufwd serve --port 30737 --cors-origins https://panel.example
//!
//! # Local commands
//! ufwd status
//! ufwd allow 22/tcp --comment SSH
//! ufwd deny-from 203.0.113.7 --port 22/tcp
//! ufwd delete 3
//! ufwd enable
//! ```

use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ufwd::audit::AuditLog;
use ufwd::config::{ServeArgs, ServeConfig, ToolArgs};
use ufwd::core::error::UfwErrorPattern;
use ufwd::core::outcome::Outcome;
use ufwd::elevation::ElevationMethod;
use ufwd::{Action, Firewall, IpRuleSpec, RuleIndex, RuleSpec};

const DEFAULT_LOG_FILTER: &str = "ufwd=info,tower_http=info";

#[derive(Parser)]
#[command(name = "ufwd", version)]
#[command(about = "Authenticated HTTP API for managing ufw firewall rules", long_about = None)]
struct Cli {
    #[command(flatten)]
    tool: ToolArgs,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Show firewall state and numbered rules
    Status,
    /// Add an allow rule, e.g. `22/tcp` or `proto udp to any port 53`
    Allow {
        rule: String,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Add a deny rule
    Deny {
        rule: String,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Allow traffic from an address, optionally to one port/protocol
    AllowFrom {
        ip: String,
        #[arg(short, long, default_value = "")]
        port: String,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Deny traffic from an address, optionally to one port/protocol
    DenyFrom {
        ip: String,
        #[arg(short, long, default_value = "")]
        port: String,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Delete a rule by its number in `ufwd status`
    Delete { number: String },
    /// Enable the firewall
    Enable,
    /// Disable the firewall
    Disable,
}

fn main() -> ExitCode {
    // Before parsing, so env-backed flags see values from .env
    let env_file = ufwd::config::load_env_file(None);
    let cli = Cli::parse();
    init_tracing();

    match env_file {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(e) => tracing::warn!("Could not load .env file: {e}"),
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(stderr) = e.downcast_ref::<ufwd::Error>().and_then(ufwd::Error::stderr) {
                if !stderr.trim().is_empty() {
                    eprintln!("ufw: {}", stderr.trim_end());
                }
                if let Some(translation) = UfwErrorPattern::match_error(stderr) {
                    eprintln!("Hint: {}", translation.user_message);
                    for suggestion in &translation.suggestions {
                        eprintln!("  - {suggestion}");
                    }
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_firewall(tool: &ToolArgs, audit_path: Option<&Path>) -> Firewall {
    let firewall = Firewall::new(tool.runner());

    let audit = match audit_path {
        Some(path) => match ufwd::utils::ensure_parent_dir(path) {
            Ok(()) => Some(AuditLog::at(path)),
            Err(e) => {
                tracing::warn!("Audit log directory for {} unavailable: {e}", path.display());
                None
            }
        },
        None => AuditLog::new()
            .inspect_err(|e| tracing::warn!("Audit log disabled: {e}"))
            .ok(),
    };

    match audit {
        Some(audit) => {
            tracing::debug!("Audit log: {}", audit.path().display());
            firewall.with_audit(audit)
        }
        None => firewall,
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let firewall = build_firewall(&cli.tool, cli.serve.audit_log.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = ServeConfig::try_from(&cli.serve)?;

            if !nix::unistd::getuid().is_root() && cli.tool.elevation != ElevationMethod::None {
                tracing::info!(
                    "Not running as root; ufw will be run through '{}' elevation",
                    cli.tool.elevation
                );
            }

            ufwd::server::serve(&config, firewall).await?;
        }
        Commands::Status => {
            let report = firewall.status().await?;
            println!("Status: {}", report.status);
            for rule in &report.rules {
                println!("{rule}");
            }
        }
        Commands::Allow { rule, comment } => {
            let outcome = firewall
                .add_rule(Action::Allow, RuleSpec::new(&rule, &comment)?)
                .await?;
            print_outcome(&outcome, "Rule added");
        }
        Commands::Deny { rule, comment } => {
            let outcome = firewall
                .add_rule(Action::Deny, RuleSpec::new(&rule, &comment)?)
                .await?;
            print_outcome(&outcome, "Deny rule added");
        }
        Commands::AllowFrom { ip, port, comment } => {
            let outcome = firewall
                .add_ip_rule(Action::Allow, IpRuleSpec::new(&ip, &port, &comment)?)
                .await?;
            print_outcome(&outcome, "Allow rule from IP added");
        }
        Commands::DenyFrom { ip, port, comment } => {
            let outcome = firewall
                .add_ip_rule(Action::Deny, IpRuleSpec::new(&ip, &port, &comment)?)
                .await?;
            print_outcome(&outcome, "Deny rule from IP added");
        }
        Commands::Delete { number } => {
            let outcome = firewall.delete(RuleIndex::new(&number)?).await?;
            print_outcome(&outcome, &format!("Rule {number} deleted"));
        }
        Commands::Enable => {
            let outcome = firewall.enable().await?;
            print_outcome(&outcome, "Firewall enabled");
        }
        Commands::Disable => {
            let outcome = firewall.disable().await?;
            print_outcome(&outcome, "Firewall disabled");
        }
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome, message: &str) {
    match outcome.note() {
        Some(note) => println!("✓ {note}"),
        None => println!("✓ {message}"),
    }
}
