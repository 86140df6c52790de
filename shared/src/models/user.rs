//! User Model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserRole {
    Admin,
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "customer" => Ok(UserRole::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    /// Session generation; tokens from older epochs are revoked
    #[serde(skip_serializing, default)]
    pub session_epoch: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// User with reservation count (admin detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub reservation_count: i64,
}

/// Usernames: letters, digits, `_`, `.` and `-`
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset")
            .with_message("username may only contain letters, digits, '_', '.' and '-'".into()))
    }
}

/// Self-registration payload (always creates a customer)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50), custom(function = "validate_username"))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

/// Login payload, `login` accepts a username or an email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    #[validate(length(min = 1, max = 254))]
    pub login: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Session returned by login/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

/// Own profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

/// Own password change
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Admin update of any user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Admin list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation() {
        let ok = RegisterRequest {
            username: "ana.silva".into(),
            email: "ana@example.pt".into(),
            password: "correct-horse".into(),
            full_name: "Ana Silva".into(),
            phone: None,
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            username: "a b".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            ..ok
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn login_accepts_username_or_email_keys() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"ana","password":"x"}"#).unwrap();
        assert_eq!(req.login, "ana");
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"ana@example.pt","password":"x"}"#).unwrap();
        assert_eq!(req.login, "ana@example.pt");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "ana".into(),
            email: "ana@example.pt".into(),
            password_hash: "$argon2id$secret".into(),
            full_name: "Ana".into(),
            phone: None,
            role: UserRole::Customer,
            is_active: true,
            session_epoch: 3,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("session_epoch").is_none());
        assert_eq!(json["role"], "customer");
    }
}
