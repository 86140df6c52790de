use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | DATABASE_PATH | WORK_DIR/mesa.db | SQLite file |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | JWT_SECRET | generated in development | Session signing key (>= 32 chars) |
/// | JWT_EXPIRATION_MINUTES | 1440 | Session lifetime |
/// | COOKIE_SECURE | true in production | `Secure` flag on the session cookie |
/// | TIMEZONE | Europe/Lisbon | Business timezone |
/// | EUPAGO_API_KEY | (empty) | EuPago API key, also checked on callbacks |
/// | EUPAGO_BASE_URL | https://sandbox.eupago.pt | EuPago endpoint |
/// | EUPAGO_TIMEOUT_MS | 15000 | Gateway request timeout |
/// | ADMIN_USERNAME / ADMIN_EMAIL / ADMIN_PASSWORD | admin / admin@mesa.local / admin12345 | First-start admin |
/// | LOGIN_DELAY_MS | 500 | Fixed delay on login answers |
/// | AUTH_RATE_LIMIT_PER_MINUTE | 10 | Login/register attempts per IP per minute |
/// | LOG_LEVEL | info | Default level when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Daily rolling log files |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory
    pub work_dir: String,
    /// SQLite database file
    pub database_path: String,
    /// HTTP API port
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// JWT session settings
    pub jwt: JwtConfig,
    /// `Secure` attribute on the session cookie
    pub cookie_secure: bool,
    /// Business timezone for dates and opening hours
    pub timezone: Tz,
    /// EuPago gateway settings
    pub eupago: EuPagoConfig,
    /// Admin account created on first start
    pub admin: AdminBootstrap,
    /// Fixed delay before answering a login (milliseconds)
    pub login_delay_ms: u64,
    /// Login/register attempts per client IP per minute
    pub auth_rate_limit_per_minute: u32,
    /// Default log level
    pub log_level: String,
    /// Optional log directory
    pub log_dir: Option<String>,
    /// Request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

/// EuPago client settings
#[derive(Debug, Clone)]
pub struct EuPagoConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for EuPagoConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://sandbox.eupago.pt".to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// First-start admin credentials
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminBootstrap {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@mesa.local".to_string(),
            password: "admin12345".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults; a malformed `TIMEZONE` or a
    /// missing `JWT_SECRET` in production is an error.
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = env_or("ENVIRONMENT", "development");
        let is_production = environment == "production";
        let work_dir = env_or("WORK_DIR", "./data");
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| format!("{work_dir}/mesa.db"));

        let tz_name = env_or("TIMEZONE", "Europe/Lisbon");
        let timezone = crate::utils::time::parse_timezone(&tz_name)
            .ok_or_else(|| ServerError::Config(format!("Unknown TIMEZONE: {tz_name}")))?;

        let jwt = JwtConfig::from_env(is_production)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let eupago_defaults = EuPagoConfig::default();
        let admin_defaults = AdminBootstrap::default();

        Ok(Self {
            work_dir,
            database_path,
            http_port: env_parse("HTTP_PORT", 3000),
            jwt,
            cookie_secure: env_parse("COOKIE_SECURE", is_production),
            timezone,
            eupago: EuPagoConfig {
                api_key: env_or("EUPAGO_API_KEY", &eupago_defaults.api_key),
                base_url: env_or("EUPAGO_BASE_URL", &eupago_defaults.base_url),
                timeout_ms: env_parse("EUPAGO_TIMEOUT_MS", eupago_defaults.timeout_ms),
            },
            admin: AdminBootstrap {
                username: env_or("ADMIN_USERNAME", &admin_defaults.username),
                email: env_or("ADMIN_EMAIL", &admin_defaults.email),
                password: env_or("ADMIN_PASSWORD", &admin_defaults.password),
            },
            login_delay_ms: env_parse("LOGIN_DELAY_MS", 500),
            auth_rate_limit_per_minute: env_parse("AUTH_RATE_LIMIT_PER_MINUTE", 10),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            environment,
        })
    }

    /// Configuration for tests and embedding: everything explicit, no env
    pub fn for_database(database_path: impl Into<String>, jwt: JwtConfig) -> Self {
        Self {
            work_dir: ".".to_string(),
            database_path: database_path.into(),
            http_port: 0,
            environment: "test".to_string(),
            jwt,
            cookie_secure: false,
            timezone: chrono_tz::Europe::Lisbon,
            eupago: EuPagoConfig::default(),
            admin: AdminBootstrap::default(),
            login_delay_ms: 0,
            auth_rate_limit_per_minute: 1_000,
            log_level: "info".to_string(),
            log_dir: None,
            request_timeout_ms: 30_000,
        }
    }

    /// Production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
