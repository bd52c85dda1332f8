use uuid::Uuid;

/// Row of the shared `profiles` table; only the columns this service reads.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
