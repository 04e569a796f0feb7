//! Cookbook Store - recipe persistence
//!
//! This crate provides the [`RecipeStore`] seam and two implementations:
//! - PostgreSQL (sqlx), with native cascade delete
//! - In-memory, for running without a database and for tests
//!
//! Every operation is one atomic unit of work. Replacing a recipe's
//! ingredients deletes and re-inserts them inside the same transaction, so no
//! reader ever sees the recipe with a half-built ingredient list.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::StoreError;
pub use memory::MemoryRecipeStore;
pub use postgres::PgRecipeStore;

use async_trait::async_trait;
use cookbook_model::{NewRecipe, Recipe, RecipeChanges, RecipeId};

/// Persistence operations for recipes and their ingredients.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All recipes with their ingredients, ordered by id.
    async fn list(&self) -> Result<Vec<Recipe>, StoreError>;

    /// One recipe with its ingredients.
    async fn get(&self, id: RecipeId) -> Result<Recipe, StoreError>;

    /// Insert a recipe and its ingredients, returning the stored result.
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;

    /// Apply `changes` to an existing recipe, returning the stored result.
    async fn update(&self, id: RecipeId, changes: RecipeChanges) -> Result<Recipe, StoreError>;

    /// Remove a recipe and, with it, all of its ingredients.
    async fn delete(&self, id: RecipeId) -> Result<(), StoreError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
