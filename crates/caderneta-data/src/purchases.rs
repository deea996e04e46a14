use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PurchaseFilter {
    pub id: Option<u32>,
    pub person_id: Option<u32>,
    pub date_before: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
}

/// A dated line item in a member's purchase history. Amounts are stored
/// in base currency units, never as formatted strings.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Purchase {
    pub id: u32,
    pub person_id: u32,
    pub created_by: Option<u32>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}
