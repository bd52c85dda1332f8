use crate::db_types::Profile;
use crate::error::AppError;
use crate::types::{FallbackReason, Recipient, Resolved};

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{debug, warn};

/// Looks up who owns a phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `NotFound` when nobody has the number; query failures resolve to the placeholder.
    async fn resolve(&self, phone_number: &str) -> Result<Resolved<Recipient>, AppError>;
}

/// Directory backed by the `profiles` table.
pub struct PgUserDirectory {
    db_pool: Pool<Postgres>,
}

impl PgUserDirectory {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        Self { db_pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(db_pool))
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn resolve(&self, phone_number: &str) -> Result<Resolved<Recipient>, AppError> {
        let normalized = normalize_phone(phone_number);
        if !normalized.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::NotFound(format!(
                "No user found for phone number '{phone_number}'"
            )));
        }
        debug!(phone = %normalized, "looking up caller profile");
        let row = sqlx::query_as::<_, Profile>(
            "SELECT id, name, email FROM profiles WHERE phone_number = $1",
        )
        .bind(&normalized)
        .fetch_optional(&self.db_pool)
        .await;
        resolution(&normalized, row)
    }
}

/// Applies the lookup policy to a raw query outcome.
fn resolution(
    normalized: &str,
    row: Result<Option<Profile>, sqlx::Error>,
) -> Result<Resolved<Recipient>, AppError> {
    match row {
        Ok(Some(profile)) => {
            debug!(profile_id = %profile.id, "resolved caller profile");
            Ok(Resolved::Primary(Recipient {
                name: profile.name,
                email: profile.email,
            }))
        }
        Ok(None) | Err(sqlx::Error::RowNotFound) => Err(AppError::NotFound(format!(
            "No user found for phone number '{normalized}'"
        ))),
        Err(e) => {
            warn!(error=%e, "profile lookup failed; using placeholder recipient");
            Ok(Resolved::Fallback {
                value: Recipient::placeholder(),
                reason: FallbackReason::DirectoryUnavailable(e.to_string()),
            })
        }
    }
}

/// Keeps digits, plus a `+` when it leads the number.
///
/// `"+1 (555) 123-4567"` becomes `"+15551234567"`.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let mut normalized = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    normalized
}
