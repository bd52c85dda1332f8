use crate::call_data::CallDataClient;
use crate::consts::CALL_COMPLETED_EVENT;
use crate::directory::UserDirectory;
use crate::mailer::Mailer;
use crate::skills::SkillExtractor;
use crate::summarizer::Summarizer;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Process-wide collaborators, built once from `Config` and shared read-only between requests.
pub struct AppState {
    pub call_data: Arc<dyn CallDataClient>,
    pub directory: Arc<dyn UserDirectory>,
    pub summarizer: Summarizer,
    pub skills: SkillExtractor,
    pub mailer: Arc<dyn Mailer>,
    pub sender_email: String,
    pub email_subject: String,
    pub webhook_secret: Option<String>,
}

/// Inbound webhook body, as sent by the call platform:
/// `{"event_type": "call.completed", "call": {"id": "..."}}`
#[derive(Deserialize, Debug, Default)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub call: Option<CallRef>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CallRef {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEventType {
    Completed,
    Other(String),
}

impl CallEventType {
    pub fn parse(raw: &str) -> Self {
        if raw == CALL_COMPLETED_EVENT {
            CallEventType::Completed
        } else {
            CallEventType::Other(raw.to_string())
        }
    }
}

impl fmt::Display for CallEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CallEventType::Completed => write!(f, "{CALL_COMPLETED_EVENT}"),
            CallEventType::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// A validated completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    pub event_type: CallEventType,
    pub call_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Assistant,
    User,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Assistant => "AI",
            Role::User => "User",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub call_id: String,
    pub phone_number: Option<String>,
    pub turns: Vec<TranscriptTurn>,
}

impl CallRecord {
    /// One `Label: text` line per turn, in call order.
    pub fn transcript_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.text))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

impl Recipient {
    /// Stand-in used when the directory cannot be queried.
    pub fn placeholder() -> Self {
        Self {
            name: "generic user".to_string(),
            email: "placeholder".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: Resolved<String>,
    pub skills: BTreeSet<String>,
}

/// A single message, moved into the mailer and gone after one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    SummarizationFailed(String),
    DirectoryUnavailable(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FallbackReason::SummarizationFailed(e) => write!(f, "summarization failed: {e}"),
            FallbackReason::DirectoryUnavailable(e) => write!(f, "directory unavailable: {e}"),
        }
    }
}

/// A value that came either from the real collaborator or from a static stand-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Primary(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Resolved<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolved::Primary(value) | Resolved::Fallback { value, .. } => value,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Resolved::Primary(_) => None,
            Resolved::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }
}
