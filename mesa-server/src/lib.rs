//! Mesa - restaurant reservation and POS server
//!
//! # Modules
//!
//! ```text
//! mesa-server/src/
//! ├── core/      # configuration, state, server lifecycle
//! ├── auth/      # JWT sessions, guards, rate limiting
//! ├── api/       # HTTP routes and handlers
//! ├── db/        # SQLite pool, migrations, repositories
//! ├── eupago/    # payment gateway client
//! ├── booking.rs # overlap and opening-hours rules
//! ├── money.rs   # decimal money arithmetic
//! ├── services/  # router assembly
//! └── utils/     # errors, logging, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod db;
pub mod eupago;
pub mod money;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /__  _________ _
  / /|_/ / _ \/ ___/ __ `/
 / /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
    "#
    );
}
