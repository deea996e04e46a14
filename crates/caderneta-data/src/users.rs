use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserFilter {
    pub id: Option<u32>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}
