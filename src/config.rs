use crate::consts::{DEFAULT_EMAIL_SUBJECT, DEFAULT_SUMMARIZER_URL, DEFAULT_VAPI_BASE_URL};

use lettre::message::Mailbox;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set!")]
    Missing(&'static str),
    #[error("{key} has an invalid value: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// How outbound mail leaves the process.
#[derive(Clone)]
pub enum MailTransport {
    /// Gmail API with an OAuth authorized-user secret; refreshed tokens are cached on disk.
    Gmail {
        credentials: PathBuf,
        token_cache: PathBuf,
    },
    /// Plain SMTP relay with STARTTLS.
    Smtp {
        host: String,
        port: u16,
        user: String,
        password: String,
    },
}

/// Validated settings, read once at startup and handed to each collaborator's constructor.
#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub vapi_api_key: String,
    pub vapi_base_url: String,
    pub database_url: String,
    pub sender_email: String,
    pub email_subject: String,
    pub summarizer_url: String,
    pub summarizer_api_token: Option<String>,
    pub webhook_secret: Option<String>,
    pub mail_transport: MailTransport,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    key: "BIND_ADDR",
                    value,
                })?,
            None => SocketAddr::from(([0, 0, 0, 0], 5000)),
        };

        let summarizer_api_token = get("SUMMARIZER_API_TOKEN");
        if summarizer_api_token.is_none() {
            warn!("SUMMARIZER_API_TOKEN not set; summarization requests will be unauthenticated");
        }
        let webhook_secret = get("WEBHOOK_SECRET");
        if webhook_secret.is_none() {
            warn!("WEBHOOK_SECRET not set; webhook requests will not be verified");
        }

        let sender_email = require("SENDER_EMAIL")?;
        if sender_email.parse::<Mailbox>().is_err() {
            return Err(ConfigError::Invalid {
                key: "SENDER_EMAIL",
                value: sender_email,
            });
        }

        let mail_transport = match get("MAIL_TRANSPORT").as_deref() {
            None | Some("gmail") => MailTransport::Gmail {
                credentials: PathBuf::from(require("GMAIL_CREDENTIALS")?),
                token_cache: PathBuf::from(
                    get("GMAIL_TOKEN_CACHE").unwrap_or_else(|| "tokencache.json".to_string()),
                ),
            },
            Some("smtp") => {
                let port = match get("SMTP_PORT") {
                    Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                        key: "SMTP_PORT",
                        value,
                    })?,
                    None => 587,
                };
                MailTransport::Smtp {
                    host: require("SMTP_HOST")?,
                    port,
                    user: require("SMTP_USER")?,
                    password: require("SMTP_PASSWORD")?,
                }
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "MAIL_TRANSPORT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            vapi_api_key: require("VAPI_API_KEY")?,
            vapi_base_url: get("VAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_VAPI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            database_url: require("DATABASE_URL")?,
            sender_email,
            email_subject: get("EMAIL_SUBJECT").unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT.to_string()),
            summarizer_url: get("SUMMARIZER_URL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZER_URL.to_string()),
            summarizer_api_token,
            webhook_secret,
            mail_transport,
        })
    }
}
