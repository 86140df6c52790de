//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Seating category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TableCategory {
    #[default]
    Standard,
    Vip,
}

impl TableCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableCategory::Standard => "standard",
            TableCategory::Vip => "vip",
        }
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub number: i32,
    pub capacity: i32,
    pub category: TableCategory,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    #[validate(range(min = 1, max = 9999))]
    pub number: i32,
    #[validate(range(min = 1, max = 50))]
    pub capacity: i32,
    pub category: Option<TableCategory>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[validate(range(min = 1, max = 9999))]
    pub number: Option<i32>,
    #[validate(range(min = 1, max = 50))]
    pub capacity: Option<i32>,
    pub category: Option<TableCategory>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// Table list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableListQuery {
    pub category: Option<TableCategory>,
}

/// Availability lookup (`checkTableAvailability`)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD` in the business timezone
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[validate(range(min = 1, max = 100))]
    pub party_size: i32,
    /// Minutes; defaults to the configured reservation duration
    #[validate(range(min = 15, max = 480))]
    pub duration: Option<i32>,
    pub category: Option<TableCategory>,
}
