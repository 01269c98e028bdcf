use cookbook_core::{FieldErrors, RecipeId};
use diesel::r2d2::PoolError;
use thiserror::Error;

/// Failures of the backing store. Always surfaced to the caller, never retried
/// here.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    Connection(#[from] PoolError),

    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Failed to encode recipe content: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Stored recipe {id} has unreadable {column}: {source}")]
    Corrupt {
        id: RecipeId,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a recipe operation can fail with.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Recipe {0} not found")]
    NotFound(RecipeId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
