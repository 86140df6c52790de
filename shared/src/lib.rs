//! Shared types for Mesa
//!
//! Wire/DB models, the unified error system and small utilities used by
//! the server and by API clients.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use types::PaginatedResponse;
