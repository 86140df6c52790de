//! Menu Model (categories and items)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuCategoryCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuCategoryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    pub category_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: f64,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: Option<f64>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Toggle availability payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}

/// Item list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemQuery {
    pub category_id: Option<i64>,
    pub available: Option<bool>,
}

/// Category with its items (public menu)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSection {
    #[serde(flatten)]
    pub category: MenuCategory,
    pub items: Vec<MenuItem>,
}

/// Outcome of a delete that may fall back to archiving
///
/// Menu items still referenced by reservations or orders are made
/// unavailable; tables with reservation history are deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub archived: bool,
}

impl DeleteOutcome {
    pub fn deleted() -> Self {
        Self {
            deleted: true,
            archived: false,
        }
    }

    pub fn archived() -> Self {
        Self {
            deleted: false,
            archived: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_payload_limits() {
        let mut item = MenuItemCreate {
            category_id: 1,
            name: "Bacalhau à Brás".into(),
            description: None,
            price: 14.5,
            image_url: None,
            is_available: None,
            sort_order: None,
        };
        assert!(item.validate().is_ok());

        item.name = String::new();
        assert!(item.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(MenuItemUpdate::default().validate().is_ok());
        assert!(MenuCategoryUpdate::default().validate().is_ok());
    }
}
