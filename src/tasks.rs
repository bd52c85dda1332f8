use crate::email_template;
use crate::error::AppError;
use crate::types::{AppState, CallEvent, OutboundEmail, Recipient, Resolved, SummaryResult};

use tracing::{debug, info, warn};

/// What was sent for a completed call.
#[derive(Debug)]
pub struct Delivery {
    pub message_id: String,
    pub recipient: Resolved<Recipient>,
    pub summary: SummaryResult,
}

/// Fetch the call, work out who to tell and what to say, and send exactly one email.
///
/// Every step runs in order on the current task.  Summary and directory outages degrade to
/// fallback values; everything else ends the request.
pub async fn notify_caller(event: &CallEvent, app_state: &AppState) -> Result<Delivery, AppError> {
    let record = app_state.call_data.fetch(&event.call_id).await?;
    let call_id = record.call_id.as_str();

    let phone_number = record.phone_number.as_deref().ok_or_else(|| {
        AppError::NotFound(format!("Call {call_id} has no caller phone number"))
    })?;
    if record.turns.is_empty() {
        return Err(AppError::NotFound(format!(
            "Transcript not found for call {call_id}"
        )));
    }

    let recipient = app_state.directory.resolve(phone_number).await?;
    if let Some(reason) = recipient.fallback_reason() {
        warn!(call_id, reason=%reason, "sending to placeholder recipient");
    }

    let transcript = record.transcript_text();
    let summary = SummaryResult {
        summary: app_state.summarizer.summarize(&transcript).await,
        skills: app_state.skills.extract(&transcript),
    };
    debug!(
        call_id,
        skills = ?summary.skills,
        fallback_summary = summary.summary.is_fallback(),
        "prepared call summary"
    );

    let html_body = email_template::render(
        &recipient.value().name,
        summary.summary.value(),
        &summary.skills,
        &transcript,
    );
    let email = OutboundEmail {
        sender: app_state.sender_email.clone(),
        recipient: recipient.value().email.clone(),
        subject: app_state.email_subject.clone(),
        html_body,
    };

    let message_id = app_state.mailer.send(email).await?;
    info!(call_id, message_id=%message_id, "call summary emailed");

    Ok(Delivery {
        message_id,
        recipient,
        summary,
    })
}
