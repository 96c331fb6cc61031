//! Route handlers
//!
//! Each handler validates its fields into core types, calls one
//! [`crate::core::service::Firewall`] operation, and echoes the request
//! fields back with a message. No handler looks at ufw output directly.

use super::AppState;
use super::error::ApiError;
use crate::core::firewall::{Action, IpRuleSpec, RuleIndex, RuleSpec, StatusReport};
use crate::core::outcome::Outcome;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    pub rule: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct IpRuleRequest {
    pub ip_address: String,
    #[serde(default)]
    pub port_protocol: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub message: String,
    pub rule: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct IpRuleResponse {
    pub message: String,
    pub ip_address: String,
    pub port_protocol: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub rule_number: String,
}

pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "pong".to_string(),
        note: None,
    })
}

pub async fn status(State(state): State<AppState>) -> Result<Json<StatusReport>, ApiError> {
    state
        .firewall
        .status()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core("Failed to get UFW status", &e))
}

pub async fn allow_rule(
    State(state): State<AppState>,
    body: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<Json<RuleResponse>, ApiError> {
    add_rule(&state, Action::Allow, body?.0).await
}

pub async fn deny_rule(
    State(state): State<AppState>,
    body: Result<Json<RuleRequest>, JsonRejection>,
) -> Result<Json<RuleResponse>, ApiError> {
    add_rule(&state, Action::Deny, body?.0).await
}

async fn add_rule(
    state: &AppState,
    action: Action,
    request: RuleRequest,
) -> Result<Json<RuleResponse>, ApiError> {
    let (context, message) = match action {
        Action::Allow => ("Failed to add allow rule", "Rule added successfully"),
        Action::Deny => ("Failed to add deny rule", "Deny rule added successfully"),
    };

    let outcome = async {
        let spec = RuleSpec::new(&request.rule, &request.comment)?;
        state.firewall.add_rule(action, spec).await
    }
    .await
    .map_err(|e| ApiError::from_core(context, &e))?;

    Ok(Json(RuleResponse {
        message: message.to_string(),
        rule: request.rule,
        comment: request.comment,
        note: outcome.note(),
    }))
}

pub async fn allow_from_ip(
    State(state): State<AppState>,
    body: Result<Json<IpRuleRequest>, JsonRejection>,
) -> Result<Json<IpRuleResponse>, ApiError> {
    add_ip_rule(&state, Action::Allow, body?.0).await
}

pub async fn deny_from_ip(
    State(state): State<AppState>,
    body: Result<Json<IpRuleRequest>, JsonRejection>,
) -> Result<Json<IpRuleResponse>, ApiError> {
    add_ip_rule(&state, Action::Deny, body?.0).await
}

async fn add_ip_rule(
    state: &AppState,
    action: Action,
    request: IpRuleRequest,
) -> Result<Json<IpRuleResponse>, ApiError> {
    let (context, message) = match action {
        Action::Allow => (
            "Failed to add allow rule from IP",
            "Allow rule from IP added successfully",
        ),
        Action::Deny => (
            "Failed to add deny rule from IP",
            "Deny rule from IP added successfully",
        ),
    };

    let outcome = async {
        let spec = IpRuleSpec::new(&request.ip_address, &request.port_protocol, &request.comment)?;
        state.firewall.add_ip_rule(action, spec).await
    }
    .await
    .map_err(|e| ApiError::from_core(context, &e))?;

    Ok(Json(IpRuleResponse {
        message: message.to_string(),
        ip_address: request.ip_address,
        port_protocol: request.port_protocol,
        comment: request.comment,
        note: outcome.note(),
    }))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    async {
        let index = RuleIndex::new(&number)?;
        state.firewall.delete(index).await
    }
    .await
    .map_err(|e| ApiError::from_core("Failed to delete rule", &e))?;

    Ok(Json(DeleteResponse {
        message: "Rule deleted successfully".to_string(),
        rule_number: number,
    }))
}

pub async fn enable(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    tracing::info!("Enabling ufw via API");
    let outcome = state
        .firewall
        .enable()
        .await
        .map_err(|e| ApiError::from_core("Failed to enable UFW", &e))?;

    Ok(Json(toggle_response("UFW enabled successfully", &outcome)))
}

pub async fn disable(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    tracing::info!("Disabling ufw via API");
    let outcome = state
        .firewall
        .disable()
        .await
        .map_err(|e| ApiError::from_core("Failed to disable UFW", &e))?;

    Ok(Json(toggle_response("UFW disabled successfully", &outcome)))
}

fn toggle_response(message: &str, outcome: &Outcome) -> MessageResponse {
    MessageResponse {
        message: message.to_string(),
        note: outcome.note(),
    }
}
