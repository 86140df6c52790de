//! Utilities
//!
//! - [`AppError`] - application error (from `shared::error`)
//! - [`logger`] - tracing setup
//! - [`time`] - business timezone conversions
//! - [`validation`] - input rules beyond `validator` derives

pub mod error;
pub mod logger;
pub mod time;
pub mod types;
pub mod validation;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, validate};
