//! Common error types for Artcast

use thiserror::Error;

/// Common result type for Artcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Artcast services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No valid session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to act on this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Illegal lifecycle transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation attempted in a state that does not permit it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Referenced local asset file is absent
    #[error("Asset missing: {0}")]
    AssetMissing(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
