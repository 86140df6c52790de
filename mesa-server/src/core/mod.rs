//! Core: configuration, state, server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - shared handles passed to every handler
//! - [`Server`] - HTTP server lifecycle
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{AdminBootstrap, Config, EuPagoConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
