use crate::error::AppError;

use base64::{engine, Engine};
use std::path::Path;

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;
pub type GmailAuthenticator = yup_oauth2::authenticator::Authenticator<HttpsConnector>;

/// Encode a formatted MIME message the way the Gmail API expects its `raw` field.
pub fn b64_url_encode(raw_message: &[u8]) -> String {
    engine::general_purpose::URL_SAFE.encode(raw_message)
}

/// OAuth authenticator for an authorized-user secret (the `token.json` written by an
/// installed-app consent flow).  Refreshed tokens are persisted to `token_cache`.
pub async fn gmail_authenticator(
    credentials: &Path,
    token_cache: &Path,
) -> Result<GmailAuthenticator, AppError> {
    let conn = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http2()
        .build();
    let tls_client = hyper::Client::builder().build(conn);
    let secret = yup_oauth2::read_authorized_user_secret(credentials)
        .await
        .map_err(|e| {
            AppError::Auth(format!(
                "failed to read Gmail credentials from {}: {e}",
                credentials.display()
            ))
        })?;
    yup_oauth2::AuthorizedUserAuthenticator::builder(secret)
        .hyper_client(tls_client)
        .persist_tokens_to_disk(token_cache)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Gmail authenticator failed: {e}")))
}
