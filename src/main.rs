mod call_data;
mod config;
mod db_types;
mod directory;
mod email_template;
mod error;
mod handlers;
mod inference_types;
mod mailer;
mod skills;
mod summarizer;
mod tasks;
#[cfg(test)]
mod test_utils;
mod types;
mod utils;
mod vapi_types;

use crate::call_data::VapiClient;
use crate::config::{Config, MailTransport};
use crate::directory::PgUserDirectory;
use crate::mailer::{GmailMailer, Mailer, SmtpMailer};
use crate::skills::SkillExtractor;
use crate::summarizer::{InferenceBackend, Summarizer};
use crate::types::AppState;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const CALL_COMPLETED_EVENT: &str = "call.completed";
    pub const WEBHOOK_SECRET_HEADER: &str = "x-vapi-secret";
    pub const DEFAULT_VAPI_BASE_URL: &str = "https://api.vapi.ai";
    pub const DEFAULT_SUMMARIZER_URL: &str =
        "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";
    pub const DEFAULT_EMAIL_SUBJECT: &str = "Your Hackbuddy Call Summary";
    pub const MAX_SUMMARY_INPUT_CHARS: usize = 1_024;
    pub const SUMMARY_MIN_LENGTH: u32 = 30;
    pub const SUMMARY_MAX_LENGTH: u32 = 150;
    pub const SUMMARY_FALLBACK: &str =
        "We couldn't generate a summary for this call, but the full transcript is included below.";
    pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com";
    pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";
}

pub fn app(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handlers::call_webhook))
        .route("/send-email", post(handlers::send_email))
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let http_client = reqwest::Client::new();

    let directory = PgUserDirectory::connect(&config.database_url)
        .await
        .context("failed to connect to the profiles database")?;

    let mailer: Arc<dyn Mailer> = match &config.mail_transport {
        MailTransport::Gmail {
            credentials,
            token_cache,
        } => {
            let authenticator = utils::gmail_authenticator(credentials, token_cache).await?;
            Arc::new(GmailMailer::new(http_client.clone(), Arc::new(authenticator)))
        }
        MailTransport::Smtp {
            host,
            port,
            user,
            password,
        } => Arc::new(SmtpMailer::new(host, *port, user, password)?),
    };

    Ok(AppState {
        call_data: Arc::new(VapiClient::new(http_client.clone(), config)),
        directory: Arc::new(directory),
        summarizer: Summarizer::new(Arc::new(InferenceBackend::new(http_client, config))),
        skills: SkillExtractor::default(),
        mailer,
        sender_email: config.sender_email.clone(),
        email_subject: config.email_subject.clone(),
        webhook_secret: config.webhook_secret.clone(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("tower_http", tracing_subscriber::filter::LevelFilter::DEBUG),
            (
                "hackbuddy_notifier",
                tracing_subscriber::filter::LevelFilter::DEBUG,
            ),
        ]));
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let app_state = Arc::new(build_state(&config).await?);
    let app = app(app_state);

    info!(addr=%config.bind_addr, "listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
