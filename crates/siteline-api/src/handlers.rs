//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use siteline_core::types::{ContactSubmission, JobApplication};

use crate::error::ApiError;
use crate::state::AppState;

/// Generic `{ success: true }` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// =============================================================================
// Chatbot
// =============================================================================

/// Request body for POST /chatbot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Kept loose so a non-string `message` is a 400, not a body rejection.
    #[serde(default)]
    pub message: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub message_count: usize,
    pub lead_collection_mode: bool,
    pub lead_step: u8,
}

/// POST /chatbot - one conversational turn.
pub async fn chatbot_message(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) =
        payload.map_err(|e| ApiError::internal("Failed to process message", e.body_text()))?;

    let message = match body.message.as_ref().and_then(Value::as_str) {
        Some(m) if !m.is_empty() => m,
        _ => return Err(ApiError::BadRequest("Message is required".to_string())),
    };

    let reply = state
        .engine
        .handle_message(body.session_id.as_deref(), message)
        .await?;

    Ok(Json(ChatResponse {
        success: true,
        response: reply.response,
        message_count: reply.message_count,
        lead_collection_mode: reply.lead_collection_mode,
        lead_step: reply.lead_step,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearParams {
    pub session_id: Option<String>,
}

/// DELETE /chatbot?sessionId=... - forget a conversation.
pub async fn chatbot_clear(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .engine
        .clear_session(params.session_id.as_deref())
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

// =============================================================================
// Site forms
// =============================================================================

/// Response for accepted form submissions.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validated_email(state: &AppState, value: Option<String>) -> Result<String, ApiError> {
    let email = required(value, "email")?;
    if !state.extractor.is_email(&email) {
        return Err(ApiError::BadRequest("email is not a valid address".to_string()));
    }
    Ok(email)
}

fn form_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

/// POST /contact - store a contact-form submission and notify the team.
pub async fn contact_submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let body = form_body(payload)?;
    let submission = ContactSubmission {
        id: Uuid::new_v4(),
        name: required(body.name, "name")?,
        email: validated_email(&state, body.email)?,
        phone: optional(body.phone),
        company: optional(body.company),
        subject: optional(body.subject),
        message: required(body.message, "message")?,
        created_at: Utc::now(),
    };

    state.contacts.save(&submission)?;
    info!(id = %submission.id, "Contact submission stored");

    if !state.notifier().notify_contact(&submission).await {
        warn!(id = %submission.id, "Contact notification not delivered");
    }

    Ok(Json(SubmissionResponse {
        success: true,
        id: submission.id,
    }))
}

/// POST /careers/apply - store a job application and notify the team.
pub async fn careers_apply(
    State(state): State<AppState>,
    payload: Result<Json<ApplicationRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let body = form_body(payload)?;
    let application = JobApplication {
        id: Uuid::new_v4(),
        name: required(body.name, "name")?,
        email: validated_email(&state, body.email)?,
        phone: optional(body.phone),
        position: required(body.position, "position")?,
        cover_letter: optional(body.cover_letter),
        resume_url: optional(body.resume_url),
        created_at: Utc::now(),
    };

    state.applications.save(&application)?;
    info!(id = %application.id, position = %application.position, "Job application stored");

    if !state.notifier().notify_application(&application).await {
        warn!(id = %application.id, "Application notification not delivered");
    }

    Ok(Json(SubmissionResponse {
        success: true,
        id: application.id,
    }))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub provider_available: bool,
}

/// GET /health - liveness plus chatbot status.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let active_sessions = state.engine.active_sessions().await?;
    let provider = state.engine.provider_availability().await;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions,
        provider_available: provider.available,
    }))
}
