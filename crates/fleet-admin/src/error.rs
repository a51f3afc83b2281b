//! Errors of the admin application.

use fleet_forms::FormError;
use thiserror::Error;

/// Everything a store, cache, view or import can fail with.
#[derive(Debug, Error)]
pub enum AdminError {
    /// SQLite query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form configuration or submission error.
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// No document with this id exists in the collection.
    #[error("{collection} document not found: {id}")]
    NotFound { collection: String, id: String },

    /// The collection slug is not part of the record catalog.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// Input the application refuses before it reaches a form.
    #[error("validation error: {0}")]
    Validation(String),

    /// The key-value cache failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AdminError>;
