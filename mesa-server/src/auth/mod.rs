//! Authentication
//!
//! - [`JwtService`] - session token issue/validation
//! - [`CurrentUser`] - caller context, also an axum extractor
//! - [`require_auth`] / [`require_admin`] - route guards
//! - [`RateLimiter`] - per-IP limits on login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use jwt::{Claims, CurrentUser, IssuedToken, JwtConfig, JwtError, JwtService};
pub use middleware::{is_public_route, require_admin, require_auth};
pub use password::{hash_password, verify_dummy_password, verify_password};
pub use rate_limit::{RateLimiter, login_rate_limit, register_rate_limit};
pub use session::{SESSION_COOKIE, removal_cookie, session_cookie};
