//! Data models
//!
//! Shared between mesa-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake IDs, all timestamps are Unix milliseconds.

pub mod dining_table;
pub mod finance;
pub mod menu;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod setting;
pub mod user;

// Re-exports
pub use dining_table::*;
pub use finance::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use reservation::*;
pub use setting::*;
pub use user::*;
