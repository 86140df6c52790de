//! Service layer
//!
//! - [`https`] - router assembly and HTTP middleware

pub mod https;

pub use https::{build_app, build_router};
