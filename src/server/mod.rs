//! HTTP API
//!
//! A thin boundary over [`Firewall`]: routes, the API key checkpoint, CORS,
//! and request tracing. All ufw interpretation happens in [`crate::core`].
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/ping` | health check |
//! | GET | `/status` | `ufw status numbered` |
//! | POST | `/rules/allow`, `/rules/deny` | `ufw allow\|deny <rule>` |
//! | POST | `/rules/allow/ip`, `/rules/deny/ip` | `ufw allow\|deny from <ip>` |
//! | DELETE | `/rules/delete/:number` | `ufw delete <n>` |
//! | POST | `/enable`, `/disable` | `ufw enable\|disable` |

pub mod auth;
pub mod error;
pub mod handlers;

use crate::config::ServeConfig;
use crate::core::firewall::{Action, RuleSpec};
use crate::core::outcome::Outcome;
use crate::core::service::Firewall;
use auth::ApiKey;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{delete, get, post};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Shared, read-only request state
#[derive(Debug, Clone)]
pub struct AppState {
    pub firewall: Arc<Firewall>,
    pub api_key: Arc<ApiKey>,
}

impl AppState {
    pub fn new(firewall: Firewall, api_key: &str) -> Self {
        Self {
            firewall: Arc::new(firewall),
            api_key: Arc::new(ApiKey::new(api_key)),
        }
    }
}

/// Builds the CORS policy for `origins`.
///
/// Entries that are not valid header values are skipped with a warning, as
/// is `*`, which cannot be combined with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            if origin == "*" {
                warn!("Ignoring wildcard CORS origin; credentials require explicit origins");
                return None;
            }
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!("Ignoring invalid CORS origin '{origin}'"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(auth::API_KEY_HEADER),
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/status", get(handlers::status))
        .route("/rules/allow", post(handlers::allow_rule))
        .route("/rules/deny", post(handlers::deny_rule))
        .route("/rules/allow/ip", post(handlers::allow_from_ip))
        .route("/rules/deny/ip", post(handlers::deny_from_ip))
        .route("/rules/delete/:number", delete(handlers::delete_rule))
        .route("/enable", post(handlers::enable))
        .route("/disable", post(handlers::disable))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Adds `allow <port>/tcp` so the API stays reachable once ufw is enabled.
///
/// Never fails startup: errors are logged and the server starts anyway.
pub async fn register_port_rule(firewall: &Firewall, port: u16) {
    let rule = format!("{port}/tcp");
    info!("Ensuring allow rule for API port {rule}");

    let spec = match RuleSpec::new(&rule, "") {
        Ok(spec) => spec,
        Err(e) => {
            warn!("Cannot build API port rule '{rule}': {e}");
            return;
        }
    };

    match firewall.add_rule(Action::Allow, spec).await {
        Ok(Outcome::DuplicateSkipped) => info!("Allow rule for API port {rule} already exists"),
        Ok(_) => info!("Added allow rule for API port {rule}"),
        Err(e) => warn!(
            "Could not add allow rule for API port {rule}: {e}. Check that ufwd can elevate ufw"
        ),
    }
}

/// Runs the API until Ctrl-C or SIGTERM.
pub async fn serve(config: &ServeConfig, firewall: Firewall) -> std::io::Result<()> {
    info!("Allowed CORS origins: {:?}", config.cors_origins);

    if config.register_port_rule {
        register_port_rule(&firewall, config.port()).await;
    }

    let app = router(AppState::new(firewall, &config.api_key), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("ufwd listening on http://{}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ufwd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
