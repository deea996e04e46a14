use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, FromRow, Sqlite, Type,
};

use caderneta_format::parse_age_list;

use crate::{Purchase, PurchaseFilter, Query};

/// Marital status of a member record. Stored lowercase.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Widowed,
    Separated,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Widowed => "widowed",
            MaritalStatus::Separated => "separated",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "widowed" => Ok(MaritalStatus::Widowed),
            "separated" => Ok(MaritalStatus::Separated),
            other => Err(format!(
                "unknown marital status '{}', expected single, married, widowed or separated",
                other
            )),
        }
    }
}

/// List of dependents' ages, stored as comma-joined text.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeList(pub Vec<u32>);

impl AgeList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl fmt::Display for AgeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ages: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&ages.join(", "))
    }
}

impl FromStr for AgeList {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AgeList(parse_age_list(s)))
    }
}

impl Type<Sqlite> for AgeList {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }
}

impl<'q> Encode<'q, Sqlite> for AgeList {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        <String as Encode<'q, Sqlite>>::encode(self.to_string(), buf)
    }
}

impl<'r> Decode<'r, Sqlite> for AgeList {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(AgeList(parse_age_list(raw)))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersonFilter {
    pub id: Option<u32>,
    /// Case-insensitive substring match against name or record number.
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Person {
    pub id: u32,
    pub created_by: Option<u32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    pub name: String,
    pub age: Option<u32>,
    pub years_as_member: Option<u32>,
    pub record_number: Option<String>,
    pub marital_status: MaritalStatus,
    pub birth_date: Option<NaiveDate>,

    pub spouse_name: Option<String>,
    pub spouse_age: Option<u32>,
    pub spouse_years_as_member: Option<u32>,
    pub spouse_birth_date: Option<NaiveDate>,

    pub congregation: Option<String>,

    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,

    pub rent: Option<f64>,
    pub salary: Option<f64>,
    pub pension: Option<f64>,
    pub monthly_dues: Option<f64>,

    pub has_dependents: bool,
    pub dependents_at_home: Option<u32>,
    pub sons_ages: AgeList,
    pub daughters_ages: AgeList,
    pub sons_count: u32,
    pub daughters_count: u32,
    pub working_dependents: Option<u32>,
    pub dependents_salary: Option<f64>,
}

impl Person {
    /// Get the purchase history for this record.
    pub async fn get_purchases<DB>(&self, db: &DB) -> Result<Vec<Purchase>>
    where
        DB: Query<Purchase, Filter = PurchaseFilter>,
    {
        let purchases = db
            .query(&PurchaseFilter {
                person_id: Some(self.id),
                ..Default::default()
            })
            .await?;
        Ok(purchases)
    }

    /// Compose the display address from street, house number,
    /// neighborhood and city/state.
    pub fn compose_address(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        for value in [&self.street, &self.house_number, &self.neighborhood] {
            if let Some(part) = non_empty(value) {
                parts.push(part.to_string());
            }
        }
        match (non_empty(&self.city), non_empty(&self.state)) {
            (Some(city), Some(state)) => parts.push(format!("{}/{}", city, state)),
            (Some(city), None) => parts.push(city.to_string()),
            (None, Some(state)) => parts.push(state.to_string()),
            (None, None) => {}
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Enforce the record invariants and return the normalized value:
    /// spouse data exists only on married records, dependents data only
    /// when the flag is set, the derived counts always equal the age
    /// list lengths, and the display address is recomposed from its
    /// parts when any are present.
    pub fn normalized(mut self) -> Person {
        if self.marital_status != MaritalStatus::Married {
            self.spouse_name = None;
            self.spouse_age = None;
            self.spouse_years_as_member = None;
            self.spouse_birth_date = None;
        }
        if !self.has_dependents {
            self.dependents_at_home = None;
            self.sons_ages.clear();
            self.daughters_ages.clear();
            self.working_dependents = None;
            self.dependents_salary = None;
        }
        self.sons_count = self.sons_ages.len() as u32;
        self.daughters_count = self.daughters_ages.len() as u32;
        if let Some(address) = self.compose_address() {
            self.address = Some(address);
        }
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marital_status_round_trip() {
        for status in [
            MaritalStatus::Single,
            MaritalStatus::Married,
            MaritalStatus::Widowed,
            MaritalStatus::Separated,
        ] {
            assert_eq!(status.as_str().parse::<MaritalStatus>(), Ok(status));
        }
        assert!("divorced".parse::<MaritalStatus>().is_err());
        assert_eq!(" Married ".parse::<MaritalStatus>(), Ok(MaritalStatus::Married));
    }

    #[test]
    fn test_age_list_display_and_parse() {
        let ages: AgeList = "3, 7, 11".parse().unwrap();
        assert_eq!(ages, AgeList(vec![3, 7, 11]));
        assert_eq!(ages.to_string(), "3, 7, 11");
        assert_eq!("".parse::<AgeList>().unwrap(), AgeList::default());
    }

    #[test]
    fn test_normalized_clears_spouse_when_not_married() {
        let person = Person {
            marital_status: MaritalStatus::Single,
            spouse_name: Some("Maria".to_string()),
            spouse_age: Some(42),
            spouse_years_as_member: Some(10),
            spouse_birth_date: NaiveDate::from_ymd_opt(1982, 5, 1),
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.spouse_name, None);
        assert_eq!(person.spouse_age, None);
        assert_eq!(person.spouse_years_as_member, None);
        assert_eq!(person.spouse_birth_date, None);
    }

    #[test]
    fn test_normalized_keeps_spouse_when_married() {
        let person = Person {
            marital_status: MaritalStatus::Married,
            spouse_name: Some("Maria".to_string()),
            spouse_age: Some(42),
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.spouse_name.as_deref(), Some("Maria"));
        assert_eq!(person.spouse_age, Some(42));
    }

    #[test]
    fn test_normalized_clears_dependents_when_flag_unset() {
        let person = Person {
            has_dependents: false,
            dependents_at_home: Some(3),
            sons_ages: AgeList(vec![3, 7]),
            daughters_ages: AgeList(vec![5]),
            sons_count: 9,
            daughters_count: 9,
            working_dependents: Some(1),
            dependents_salary: Some(1500.0),
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.dependents_at_home, None);
        assert!(person.sons_ages.is_empty());
        assert!(person.daughters_ages.is_empty());
        assert_eq!(person.sons_count, 0);
        assert_eq!(person.daughters_count, 0);
        assert_eq!(person.working_dependents, None);
        assert_eq!(person.dependents_salary, None);
    }

    #[test]
    fn test_normalized_derives_counts_from_lists() {
        let person = Person {
            has_dependents: true,
            sons_ages: AgeList(vec![3, 7, 11]),
            daughters_ages: AgeList(vec![5]),
            sons_count: 0,
            daughters_count: 99,
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.sons_count, 3);
        assert_eq!(person.daughters_count, 1);
        assert_eq!(person.sons_ages, AgeList(vec![3, 7, 11]));
    }

    #[test]
    fn test_compose_address() {
        let person = Person {
            street: Some("Rua das Flores".to_string()),
            house_number: Some("123".to_string()),
            neighborhood: Some("Centro".to_string()),
            city: Some("Campinas".to_string()),
            state: Some("SP".to_string()),
            ..Default::default()
        };
        assert_eq!(
            person.compose_address().as_deref(),
            Some("Rua das Flores, 123, Centro, Campinas/SP")
        );

        let person = Person {
            city: Some("Campinas".to_string()),
            ..Default::default()
        };
        assert_eq!(person.compose_address().as_deref(), Some("Campinas"));

        let person = Person::default();
        assert_eq!(person.compose_address(), None);
    }

    #[test]
    fn test_normalized_recomposes_address() {
        let person = Person {
            street: Some("Rua Nova".to_string()),
            house_number: Some("7".to_string()),
            address: Some("stale".to_string()),
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.address.as_deref(), Some("Rua Nova, 7"));

        // A record with only a legacy composed address keeps it.
        let person = Person {
            address: Some("Rua Antiga, 1".to_string()),
            ..Default::default()
        };
        let person = person.normalized();
        assert_eq!(person.address.as_deref(), Some("Rua Antiga, 1"));
    }
}
