use crate::config::Config;
use crate::consts::{
    MAX_SUMMARY_INPUT_CHARS, SUMMARY_FALLBACK, SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH,
};
use crate::error::AppError;
use crate::inference_types::{
    InferenceError, SummarizationOutput, SummarizationParameters, SummarizationPayload,
};
use crate::types::{FallbackReason, Resolved};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Output length bounds passed to the model, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub min_length: u32,
    pub max_length: u32,
}

/// A hosted text-summarization model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn generate(&self, input: &str, bounds: SummaryBounds) -> Result<String, AppError>;
}

/// Hugging Face style inference endpoint.
pub struct InferenceBackend {
    http_client: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl InferenceBackend {
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            url: config.summarizer_url.clone(),
            api_token: config.summarizer_api_token.clone(),
        }
    }
}

#[async_trait]
impl SummaryBackend for InferenceBackend {
    async fn generate(&self, input: &str, bounds: SummaryBounds) -> Result<String, AppError> {
        let payload = SummarizationPayload {
            inputs: input,
            parameters: SummarizationParameters {
                min_length: bounds.min_length,
                max_length: bounds.max_length,
                do_sample: false,
            },
        };
        let mut rq = self.http_client.post(&self.url).json(&payload);
        if let Some(token) = &self.api_token {
            rq = rq.bearer_auth(token);
        }
        let resp = rq.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = match resp.json::<InferenceError>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            error!(status=%status, detail=%detail, "summarization request failed");
            return Err(AppError::Transport(format!("Summarization failed: {detail}")));
        }

        let outputs: Vec<SummarizationOutput> = resp.json().await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Transport("Summarization returned no text".to_string()))
    }
}

/// Truncates transcripts and turns backend failures into a fixed fallback sentence.
pub struct Summarizer {
    backend: Arc<dyn SummaryBackend>,
    max_input_chars: usize,
    bounds: SummaryBounds,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self {
            backend,
            max_input_chars: MAX_SUMMARY_INPUT_CHARS,
            bounds: SummaryBounds {
                min_length: SUMMARY_MIN_LENGTH,
                max_length: SUMMARY_MAX_LENGTH,
            },
        }
    }

    pub async fn summarize(&self, text: &str) -> Resolved<String> {
        let input = truncate_chars(text, self.max_input_chars);
        debug!(
            input_chars = input.chars().count(),
            "requesting transcript summary"
        );
        match self.backend.generate(input, self.bounds).await {
            Ok(summary) => Resolved::Primary(summary),
            Err(e) => {
                warn!(error=%e, "summarization failed; using fallback summary");
                Resolved::Fallback {
                    value: SUMMARY_FALLBACK.to_string(),
                    reason: FallbackReason::SummarizationFailed(e.to_string()),
                }
            }
        }
    }
}

/// The first `max` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
