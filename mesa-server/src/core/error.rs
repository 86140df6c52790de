//! Startup errors
//!
//! Request-time failures use [`crate::AppError`]; `ServerError` covers what
//! can go wrong while booting the process.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("bootstrap error: {0}")]
    Bootstrap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::AppError> for ServerError {
    fn from(err: crate::AppError) -> Self {
        ServerError::Database(err.message)
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
