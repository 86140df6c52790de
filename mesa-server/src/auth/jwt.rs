//! JWT session tokens
//!
//! Tokens are HS256-signed and carried either in the `mesa_session` cookie
//! or an `Authorization: Bearer` header.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::{User, UserRole};
use thiserror::Error;

/// Minimum accepted secret length
const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl JwtConfig {
    /// Config with an explicit secret and default claims
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 1440, // 24 hours
            issuer: "mesa-server".to_string(),
            audience: "mesa-clients".to_string(),
        }
    }

    /// Load from `JWT_*` environment variables
    ///
    /// Without `JWT_SECRET`, development gets a random secret (sessions do not
    /// survive restarts); production refuses to start.
    pub fn from_env(is_production: bool) -> Result<Self, JwtError> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(_) => {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            Err(_) if is_production => {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ));
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generate_printable_secret()?
            }
        };

        let defaults = Self::with_secret(String::new());
        Ok(Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_minutes),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        })
    }
}

/// JWT claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (Subject)
    pub sub: String,
    pub username: String,
    pub role: String,
    /// `users.session_epoch` at issue time
    pub epoch: i64,
    /// Expiry (seconds)
    pub exp: i64,
    /// Issued at (seconds)
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),

    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Generate a random printable secret (64 chars)
pub fn generate_printable_secret() -> Result<String, JwtError> {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect())
}

/// Issued session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Expiry in Unix millis
    pub expires_at: i64,
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a session token for a user
    pub fn generate_token(&self, user: &User) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            epoch: user.session_epoch,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: expiration.timestamp_millis(),
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("token validation failed: {e}")),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Current user context
///
/// Decoded from the JWT claims, then checked against the `users` row (see
/// [`crate::auth::session::resolve_session`]). Inserted into request extensions by [`crate::auth::require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken(format!("invalid subject: {}", claims.sub)))?;
        let role = claims.role.parse::<UserRole>().map_err(JwtError::InvalidToken)?;
        Ok(Self {
            id,
            username: claims.username,
            role,
        })
    }
}

impl CurrentUser {
    /// Admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins can access everything, customers only what they own
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret("unit-test-secret-unit-test-secret-0123"))
    }

    fn user(role: UserRole) -> User {
        User {
            id: 42,
            username: "ana".into(),
            email: "ana@example.pt".into(),
            password_hash: String::new(),
            full_name: "Ana".into(),
            phone: None,
            role,
            is_active: true,
            session_epoch: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn token_round_trip_into_current_user() {
        let service = service();
        let issued = service.generate_token(&user(UserRole::Customer)).unwrap();
        assert!(issued.expires_at > Utc::now().timestamp_millis());

        let claims = service.validate_token(&issued.token).unwrap();
        let current = CurrentUser::try_from(claims).unwrap();
        assert_eq!(current.id, 42);
        assert_eq!(current.role, UserRole::Customer);
        assert!(!current.is_admin());
        assert!(current.can_access(42));
        assert!(!current.can_access(7));
    }

    #[test]
    fn token_carries_session_epoch() {
        let service = service();
        let mut account = user(UserRole::Customer);
        account.session_epoch = 5;
        let issued = service.generate_token(&account).unwrap();
        assert_eq!(service.validate_token(&issued.token).unwrap().epoch, 5);
    }

    #[test]
    fn admin_can_access_anything() {
        let service = service();
        let issued = service.generate_token(&user(UserRole::Admin)).unwrap();
        let claims = service.validate_token(&issued.token).unwrap();
        let current = CurrentUser::try_from(claims).unwrap();
        assert!(current.is_admin());
        assert!(current.can_access(7));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issued = service().generate_token(&user(UserRole::Customer)).unwrap();
        let other =
            JwtService::with_config(JwtConfig::with_secret("another-secret-another-secret-987654"));
        assert!(matches!(
            other.validate_token(&issued.token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let mut config = JwtConfig::with_secret("unit-test-secret-unit-test-secret-0123");
        config.expiration_minutes = -10;
        let service = JwtService::with_config(config);
        let issued = service.generate_token(&user(UserRole::Customer)).unwrap();
        assert!(matches!(
            service.validate_token(&issued.token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn printable_secret_is_long_enough() {
        let a = generate_printable_secret().unwrap();
        let b = generate_printable_secret().unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
