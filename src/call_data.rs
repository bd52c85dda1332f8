use crate::config::Config;
use crate::error::AppError;
use crate::types::{CallRecord, Role, TranscriptTurn};
use crate::vapi_types::{VapiCall, VapiMessage, VapiRole, VapiTranscript};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Source of call metadata and transcripts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallDataClient: Send + Sync {
    async fn fetch(&self, call_id: &str) -> Result<CallRecord, AppError>;
}

/// Client for the Vapi REST API.
pub struct VapiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VapiClient {
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            base_url: config.vapi_base_url.clone(),
            api_key: config.vapi_api_key.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, call_id: &str) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, url=%url, "failed to reach call platform");
                AppError::Transport(format!("Call platform request failed: {e}"))
            })?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("Call not found: {call_id}")));
            }
            status if !status.is_success() => {
                error!(status=%status, url=%url, "call platform returned an error");
                return Err(AppError::Transport(format!(
                    "Call platform returned {status}"
                )));
            }
            _ => {}
        }

        resp.json::<T>().await.map_err(|e| {
            error!(error=%e, url=%url, "failed to decode call platform response");
            AppError::Transport(format!("Invalid call platform response: {e}"))
        })
    }
}

#[async_trait]
impl CallDataClient for VapiClient {
    async fn fetch(&self, call_id: &str) -> Result<CallRecord, AppError> {
        let call: VapiCall = self.get_json(&format!("/call/{call_id}"), call_id).await?;
        let transcript: VapiTranscript = self
            .get_json(&format!("/call/{call_id}/transcript"), call_id)
            .await?;
        let record = into_record(call_id, call, transcript);
        debug!(call_id, turns = record.turns.len(), "fetched call record");
        Ok(record)
    }
}

fn into_record(call_id: &str, call: VapiCall, transcript: VapiTranscript) -> CallRecord {
    CallRecord {
        call_id: call.id.clone().unwrap_or_else(|| call_id.to_string()),
        phone_number: call.caller_number(),
        turns: transcript
            .into_messages()
            .into_iter()
            .filter_map(into_turn)
            .collect(),
    }
}

fn into_turn(message: VapiMessage) -> Option<TranscriptTurn> {
    let role = match message.role {
        VapiRole::Assistant => Role::Assistant,
        VapiRole::User => Role::User,
        VapiRole::Other => return None,
    };
    let text = message.message.trim();
    if text.is_empty() {
        return None;
    }
    Some(TranscriptTurn {
        role,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config as config;

    #[test]
    fn maps_roles_and_drops_system_turns() {
        let transcript: VapiTranscript = serde_json::from_str(
            r#"{"messages": [
                {"role": "system", "message": "You are a recruiter."},
                {"role": "bot", "message": "Hi! What do you work on?"},
                {"role": "user", "text": " I write Python. "},
                {"role": "user", "message": ""}
            ]}"#,
        )
        .unwrap();
        let call: VapiCall =
            serde_json::from_str(r#"{"id": "abc", "customer": {"number": "+15551234567"}}"#)
                .unwrap();

        let record = into_record("abc", call, transcript);
        assert_eq!(record.phone_number.as_deref(), Some("+15551234567"));
        assert_eq!(
            record.turns,
            vec![
                TranscriptTurn {
                    role: Role::Assistant,
                    text: "Hi! What do you work on?".to_string()
                },
                TranscriptTurn {
                    role: Role::User,
                    text: "I write Python.".to_string()
                },
            ]
        );
    }

    #[test]
    fn accepts_bare_transcript_list() {
        let transcript: VapiTranscript =
            serde_json::from_str(r#"[{"role": "assistant", "message": "Hello"}]"#).unwrap();
        assert_eq!(transcript.into_messages().len(), 1);
    }

    #[test]
    fn top_level_phone_number_wins() {
        let call: VapiCall = serde_json::from_str(
            r#"{"phone_number": "+1 555 000 1111", "customer": {"number": "+15551234567"}}"#,
        )
        .unwrap();
        assert_eq!(call.caller_number().as_deref(), Some("+1 555 000 1111"));
    }

    #[tokio::test]
    async fn fetches_call_and_transcript() {
        let mut server = mockito::Server::new_async().await;
        let _call = server
            .mock("GET", "/call/abc")
            .match_header("authorization", "Bearer vapi-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "abc", "phone_number": "+15551234567"}"#)
            .create_async()
            .await;
        let _transcript = server
            .mock("GET", "/call/abc/transcript")
            .match_header("authorization", "Bearer vapi-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"messages": [{"role": "user", "message": "I know React"}]}"#)
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), &config(server.url()));
        let record = client.fetch("abc").await.unwrap();
        assert_eq!(record.call_id, "abc");
        assert_eq!(record.phone_number.as_deref(), Some("+15551234567"));
        assert_eq!(record.transcript_text(), "User: I know React");
    }

    #[tokio::test]
    async fn unknown_call_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _call = server
            .mock("GET", "/call/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), &config(server.url()));
        let err = client.fetch("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn provider_failure_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _call = server
            .mock("GET", "/call/abc")
            .with_status(502)
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), &config(server.url()));
        let err = client.fetch("abc").await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn undecodable_response_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _call = server
            .mock("GET", "/call/abc")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;
        let transcript = server
            .mock("GET", "/call/abc/transcript")
            .expect(0)
            .create_async()
            .await;

        let client = VapiClient::new(reqwest::Client::new(), &config(server.url()));
        let err = client.fetch("abc").await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
        transcript.assert_async().await;
    }
}
