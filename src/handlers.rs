use crate::consts::WEBHOOK_SECRET_HEADER;
use crate::error::AppError;
use crate::tasks::notify_caller;
use crate::types::{AppState, CallEvent, CallEventType, OutboundEmail, WebhookPayload};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace};

#[derive(Serialize, Debug)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Body of `POST /send-email`.  Every field is required.
#[derive(Deserialize, Debug, Default)]
pub struct SendEmailRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// What an inbound webhook asks of us.
enum Inbound {
    Ignored(CallEventType),
    Completed(CallEvent),
}

fn classify(payload: WebhookPayload) -> Result<Inbound, AppError> {
    let event_type = payload
        .event_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(CallEventType::parse)
        .ok_or_else(|| AppError::Validation("Missing event_type".to_string()))?;
    if event_type != CallEventType::Completed {
        return Ok(Inbound::Ignored(event_type));
    }
    let call_id = payload
        .call
        .and_then(|c| c.id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing call.id".to_string()))?;
    Ok(Inbound::Completed(CallEvent {
        event_type,
        call_id,
    }))
}

fn verify_secret(app_state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = app_state.webhook_secret.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided != expected {
        return Err(AppError::Unauthorized("Invalid webhook secret".to_string()));
    }
    Ok(())
}

/// POST /webhook
///
/// Call platform event hook.  Only `call.completed` triggers work; every other event is
/// acknowledged with 200 so the platform does not treat it as a delivery failure.
pub async fn call_webhook(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    verify_secret(&app_state, &headers)?;
    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON payload: {e}")))?;
    trace!(payload = ?payload, "webhook payload");

    let event = match classify(payload)? {
        Inbound::Ignored(event_type) => {
            debug!(event_type=%event_type, "ignoring webhook event");
            return Ok(Json(WebhookResponse {
                success: true,
                message: format!("Event ignored: {event_type}"),
                message_id: None,
            }));
        }
        Inbound::Completed(event) => event,
    };

    info!(call_id=%event.call_id, event_type=%event.event_type, "processing call event");
    let delivery = notify_caller(&event, &app_state).await?;
    info!(
        call_id=%event.call_id,
        recipient_fallback = delivery.recipient.is_fallback(),
        summary_fallback = delivery.summary.summary.is_fallback(),
        skills = delivery.summary.skills.len(),
        "call event handled"
    );
    Ok(Json(WebhookResponse {
        success: true,
        message: "Email sent successfully".to_string(),
        message_id: Some(delivery.message_id),
    }))
}

/// POST /send-email
///
/// Sends one HTML email through the configured mailer.
pub async fn send_email(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let rq: SendEmailRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON payload: {e}")))?;
    let field = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(sender), Some(recipient), Some(subject), Some(html_body)) = (
        field(rq.sender),
        field(rq.recipient),
        field(rq.subject),
        field(rq.body),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let message_id = app_state
        .mailer
        .send(OutboundEmail {
            sender,
            recipient,
            subject,
            html_body,
        })
        .await?;
    Ok(Json(WebhookResponse {
        success: true,
        message: "Email sent successfully".to_string(),
        message_id: Some(message_id),
    }))
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
