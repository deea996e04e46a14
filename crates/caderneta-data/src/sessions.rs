use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionFilter {
    pub token: Option<String>,
    pub user_id: Option<u32>,
}

/// An authenticated session, keyed by an opaque random token.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: u32,
    pub created_at: NaiveDateTime,
}
