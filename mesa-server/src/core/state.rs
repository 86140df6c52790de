use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::eupago::{EuPagoClient, PaymentGateway};

/// Server state - shared handles for every request
///
/// Cheap to clone: everything heavy sits behind `Arc` or is a pool handle.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | Configuration (immutable) |
/// | pool | SqlitePool | Database pool |
/// | jwt_service | Arc<JwtService> | Session tokens |
/// | gateway | Arc<dyn PaymentGateway> | EuPago (or a test double) |
/// | rate_limiter | RateLimiter | Login/register limits |
/// | started_at | Instant | For uptime in `/health` |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("environment", &self.config.environment)
            .field("database_path", &self.config.database_path)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Assemble state from already-built parts
    pub fn new(config: Config, pool: SqlitePool, gateway: Arc<dyn PaymentGateway>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            gateway,
            rate_limiter: RateLimiter::new(),
            started_at: Instant::now(),
        }
    }

    /// Open the database, bootstrap the admin and build the EuPago client
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db = DbService::new(&config.database_path)
            .await
            .map_err(|e| ServerError::Database(e.message))?;
        db.bootstrap_admin(&config.admin)
            .await
            .map_err(|e| ServerError::Bootstrap(e.message))?;

        if config.eupago.api_key.is_empty() {
            tracing::warn!("EUPAGO_API_KEY not set; online payments will fail");
        }
        let gateway = EuPagoClient::new(&config.eupago)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self::new(config.clone(), db.pool, Arc::new(gateway)))
    }

    /// Drop expired rate-limit windows every minute
    pub fn start_background_tasks(&self) {
        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    /// Seconds since startup
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
