//! Database Module
//!
//! Handles the SQLite connection pool, migrations and first-start bootstrap

pub mod repository;

use crate::auth::hash_password;
use crate::core::AdminBootstrap;
use crate::utils::AppError;
use shared::models::UserRole;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Database service - owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL mode and apply migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        if let Some(parent) = std::path::Path::new(db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::database(format!("Cannot create {parent:?}: {e}")))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // wait on write conflicts instead of failing immediately
            .busy_timeout(Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Create the first admin account if none exists
    ///
    /// Returns `true` when an account was created.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<bool, AppError> {
        if repository::user::count_admins(&self.pool).await? > 0 {
            return Ok(false);
        }

        let password_hash = hash_password(&admin.password)?;
        let user = repository::user::create(
            &self.pool,
            repository::user::NewUser {
                username: &admin.username,
                email: &admin.email,
                password_hash: &password_hash,
                full_name: "Administrator",
                phone: None,
                role: UserRole::Admin,
            },
        )
        .await?;

        tracing::warn!(
            username = %user.username,
            "Created initial admin account; change its password"
        );
        Ok(true)
    }

    /// `SELECT 1` liveness probe
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
