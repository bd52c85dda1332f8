use crate::consts::{GMAIL_API_BASE, GMAIL_SEND_SCOPE};
use crate::error::AppError;
use crate::types::OutboundEmail;
use crate::utils::{b64_url_encode, GmailAuthenticator};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{authentication::Credentials, response::Code},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Delivers one message per call; no queueing, no retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns the provider's id for the sent message.
    async fn send(&self, email: OutboundEmail) -> Result<String, AppError>;
}

/// Supplies bearer tokens for the Gmail API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AppError>;
}

#[async_trait]
impl TokenSource for GmailAuthenticator {
    async fn access_token(&self) -> Result<String, AppError> {
        let token = self
            .token(&[GMAIL_SEND_SCOPE])
            .await
            .map_err(|e| AppError::Auth(format!("Gmail token refresh failed: {e}")))?;
        Ok(token.as_str().to_string())
    }
}

#[derive(Deserialize, Debug)]
struct GmailSendResponse {
    id: String,
}

/// Sends through the Gmail API `users.messages.send` endpoint.
pub struct GmailMailer {
    http_client: reqwest::Client,
    api_base: String,
    tokens: Arc<dyn TokenSource>,
}

impl GmailMailer {
    pub fn new(http_client: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_api_base(http_client, tokens, GMAIL_API_BASE)
    }

    pub fn with_api_base(
        http_client: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        api_base: &str,
    ) -> Self {
        Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(&self, email: OutboundEmail) -> Result<String, AppError> {
        let message = build_message(&email, &new_message_id(&email.sender))?;
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/gmail/v1/users/me/messages/send", self.api_base);
        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({ "raw": b64_url_encode(&message.formatted()) }))
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, "failed to reach Gmail API");
                AppError::Transport(format!("Gmail request failed: {e}"))
            })?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let status = resp.status();
                error!(status=%status, "Gmail rejected credentials");
                return Err(AppError::Auth(format!("Gmail rejected credentials ({status})")));
            }
            status if !status.is_success() => {
                let detail = resp.text().await.unwrap_or_default();
                error!(status=%status, detail=%detail, "Gmail send failed");
                return Err(AppError::Transport(format!("Gmail send failed ({status})")));
            }
            _ => {}
        }

        let sent: GmailSendResponse = resp.json().await?;
        info!(message_id=%sent.id, recipient=%email.recipient, "email sent via Gmail");
        Ok(sent.id)
    }
}

/// Sends through an SMTP relay with STARTTLS and password auth.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, user: &str, password: &str) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Transport(format!("Invalid SMTP relay '{host}': {e}")))?
            .port(port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<String, AppError> {
        let message_id = new_message_id(&email.sender);
        let message = build_message(&email, &message_id)?;
        self.transport.send(message).await.map_err(|e| {
            error!(error=%e, "SMTP send failed");
            smtp_failure(e.status(), &e)
        })?;
        info!(message_id=%message_id, recipient=%email.recipient, "email sent via SMTP");
        Ok(message_id)
    }
}

/// 530, 534 and 535 are the relay refusing our credentials.
fn is_auth_failure(code: Option<Code>) -> bool {
    matches!(
        code.map(|code| code.to_string()).as_deref(),
        Some("530" | "534" | "535")
    )
}

fn smtp_failure(code: Option<Code>, detail: impl std::fmt::Display) -> AppError {
    if is_auth_failure(code) {
        AppError::Auth(format!("SMTP authentication failed: {detail}"))
    } else {
        AppError::Transport(format!("SMTP send failed: {detail}"))
    }
}

fn new_message_id(sender: &str) -> String {
    let domain = sender
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim_end_matches('>'))
        .filter(|d| !d.is_empty())
        .unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

/// Single-part HTML message.  Bad addresses count as a send failure.
fn build_message(email: &OutboundEmail, message_id: &str) -> Result<Message, AppError> {
    let from: Mailbox = email.sender.parse().map_err(|e| {
        AppError::Transport(format!("Invalid sender address '{}': {e}", email.sender))
    })?;
    let to: Mailbox = email.recipient.parse().map_err(|e| {
        AppError::Transport(format!(
            "Invalid recipient address '{}': {e}",
            email.recipient
        ))
    })?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .message_id(Some(message_id.to_string()))
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone())
        .map_err(|e| AppError::Transport(format!("Failed to build message: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::transport::smtp::response::{Category, Detail, Severity};

    fn email(recipient: &str) -> OutboundEmail {
        OutboundEmail {
            sender: "Hackbuddy <bot@example.com>".to_string(),
            recipient: recipient.to_string(),
            subject: "Your Hackbuddy Call Summary".to_string(),
            html_body: "<p>Hello Ada</p>".to_string(),
        }
    }

    fn static_token() -> Arc<dyn TokenSource> {
        let mut tokens = MockTokenSource::new();
        tokens
            .expect_access_token()
            .returning(|| Ok("gmail-token".to_string()));
        Arc::new(tokens)
    }

    #[test]
    fn builds_html_message_with_headers() {
        let message = build_message(&email("ada@example.com"), "<id-1@example.com>").unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("To: ada@example.com"));
        assert!(formatted.contains("Subject: Your Hackbuddy Call Summary"));
        assert!(formatted.contains("Message-ID: <id-1@example.com>"));
        assert!(formatted.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn placeholder_recipient_cannot_be_addressed() {
        let err = build_message(&email("placeholder"), "<id@example.com>").unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[test]
    fn message_ids_use_sender_domain() {
        let id = new_message_id("Hackbuddy <bot@example.com>");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@example.com>"));
        assert_ne!(id, new_message_id("Hackbuddy <bot@example.com>"));
        assert!(new_message_id("nobody").ends_with("@localhost>"));
    }

    fn reply_code(category: Category, detail: Detail) -> Option<Code> {
        Some(Code::new(
            Severity::PermanentNegativeCompletion,
            category,
            detail,
        ))
    }

    #[test]
    fn smtp_credential_rejection_is_auth_error() {
        assert!(is_auth_failure(reply_code(Category::Unspecified3, Detail::Five)));
        assert!(matches!(
            smtp_failure(
                reply_code(Category::Unspecified3, Detail::Five),
                "535 5.7.8 bad credentials"
            ),
            AppError::Auth(_)
        ));
        assert!(is_auth_failure(reply_code(Category::Unspecified3, Detail::Zero)));
        assert!(is_auth_failure(reply_code(Category::Unspecified3, Detail::Four)));
    }

    #[test]
    fn other_smtp_failures_are_transport_errors() {
        assert!(!is_auth_failure(reply_code(Category::MailSystem, Detail::Zero)));
        assert!(matches!(
            smtp_failure(
                reply_code(Category::MailSystem, Detail::Zero),
                "550 mailbox unavailable"
            ),
            AppError::Transport(_)
        ));
        assert!(matches!(
            smtp_failure(None, "connection reset"),
            AppError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn gmail_send_returns_provider_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .match_header("authorization", "Bearer gmail-token")
            .match_body(mockito::Matcher::Regex(r#"^\{"raw":"[A-Za-z0-9_=-]+"\}$"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "18c2f0a1b2", "threadId": "18c2f0a1b2"}"#)
            .create_async()
            .await;

        let mailer =
            GmailMailer::with_api_base(reqwest::Client::new(), static_token(), &server.url());
        let id = mailer.send(email("ada@example.com")).await.unwrap();
        assert_eq!(id, "18c2f0a1b2");
    }

    #[tokio::test]
    async fn gmail_rejection_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .with_status(401)
            .create_async()
            .await;

        let mailer =
            GmailMailer::with_api_base(reqwest::Client::new(), static_token(), &server.url());
        let err = mailer.send(email("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn gmail_server_error_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .with_status(500)
            .create_async()
            .await;

        let mailer =
            GmailMailer::with_api_base(reqwest::Client::new(), static_token(), &server.url());
        let err = mailer.send(email("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn token_failure_skips_the_request() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .expect(0)
            .create_async()
            .await;

        let mut tokens = MockTokenSource::new();
        tokens
            .expect_access_token()
            .times(1)
            .returning(|| Err(AppError::Auth("refresh token revoked".to_string())));
        let mailer =
            GmailMailer::with_api_base(reqwest::Client::new(), Arc::new(tokens), &server.url());
        let err = mailer.send(email("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        m.assert_async().await;
    }
}
