//! Typed errors for the store crate.

use cookbook_model::RecipeId;
use thiserror::Error;

/// Errors that can occur while reading or writing recipes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No recipe has the requested id.
    #[error("recipe {0} not found")]
    NotFound(RecipeId),
    /// The database rejected a query or could not be reached.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Applying the schema failed.
    #[error("migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
