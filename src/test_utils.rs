use crate::call_data::MockCallDataClient;
use crate::config::{Config, MailTransport};
use crate::directory::MockUserDirectory;
use crate::mailer::MockMailer;
use crate::skills::SkillExtractor;
use crate::summarizer::{MockSummaryBackend, Summarizer};
use crate::types::{AppState, CallRecord, Recipient, Role, TranscriptTurn};

use std::path::PathBuf;
use std::sync::Arc;

/// A complete config pointing every outbound URL at `base_url`.
pub fn test_config(base_url: String) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        vapi_api_key: "vapi-key".to_string(),
        vapi_base_url: base_url.clone(),
        database_url: "postgres://localhost/hackbuddy_test".to_string(),
        sender_email: "bot@example.com".to_string(),
        email_subject: "Your Hackbuddy Call Summary".to_string(),
        summarizer_url: format!("{base_url}/summarize"),
        summarizer_api_token: Some("hf-token".to_string()),
        webhook_secret: None,
        mail_transport: MailTransport::Gmail {
            credentials: PathBuf::from("credentials.json"),
            token_cache: PathBuf::from("tokencache.json"),
        },
    }
}

pub fn app_state(
    call_data: MockCallDataClient,
    directory: MockUserDirectory,
    backend: MockSummaryBackend,
    mailer: MockMailer,
) -> AppState {
    AppState {
        call_data: Arc::new(call_data),
        directory: Arc::new(directory),
        summarizer: Summarizer::new(Arc::new(backend)),
        skills: SkillExtractor::default(),
        mailer: Arc::new(mailer),
        sender_email: "bot@example.com".to_string(),
        email_subject: "Your Hackbuddy Call Summary".to_string(),
        webhook_secret: None,
    }
}

pub fn ada() -> Recipient {
    Recipient {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    }
}

pub fn call_record(phone_number: Option<&str>) -> CallRecord {
    CallRecord {
        call_id: "abc".to_string(),
        phone_number: phone_number.map(str::to_string),
        turns: vec![
            TranscriptTurn {
                role: Role::Assistant,
                text: "What are you looking for in a teammate?".to_string(),
            },
            TranscriptTurn {
                role: Role::User,
                text: "Someone who knows Python and Rust.".to_string(),
            },
        ],
    }
}
