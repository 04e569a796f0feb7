//! Recipe service: validates payloads, drives the store, records metrics.

use cookbook_model::{validate_create, validate_update, Recipe, RecipeId, RecipePayload};
use cookbook_store::RecipeStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::metrics::{ApiMetrics, Operation, Outcome};

#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    metrics: ApiMetrics,
}

impl RecipeService {
    pub fn new(store: Arc<dyn RecipeStore>, metrics: ApiMetrics) -> Self {
        Self { store, metrics }
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, ApiError> {
        let result = self.store.list().await.map_err(ApiError::from);
        if let Ok(recipes) = &result {
            debug!("Listed {} recipes", recipes.len());
        }
        self.observe(Operation::List, result)
    }

    pub async fn get(&self, id: RecipeId) -> Result<Recipe, ApiError> {
        let result = self.store.get(id).await.map_err(ApiError::from);
        self.observe(Operation::Get, result)
    }

    pub async fn create(&self, payload: &RecipePayload) -> Result<Recipe, ApiError> {
        let result = match validate_create(payload) {
            Ok(recipe) => self.store.create(recipe).await.map_err(ApiError::from),
            Err(errors) => Err(ApiError::from(errors)),
        };

        if let Ok(recipe) = &result {
            self.metrics.recipes_created.inc();
            info!("Recipe {} '{}' created", recipe.id, recipe);
        }
        self.observe(Operation::Create, result)
    }

    /// Apply a payload to an existing recipe. `partial` selects PATCH
    /// semantics (only supplied fields change) over PUT semantics.
    pub async fn update(
        &self,
        id: RecipeId,
        payload: &RecipePayload,
        partial: bool,
    ) -> Result<Recipe, ApiError> {
        let result = match validate_update(payload, partial) {
            Ok(changes) => {
                if changes.replaces_ingredients() {
                    debug!("Update of recipe {} replaces its ingredients", id);
                }
                self.store.update(id, changes).await.map_err(ApiError::from)
            }
            Err(errors) => Err(ApiError::from(errors)),
        };
        self.observe(Operation::Update, result)
    }

    pub async fn delete(&self, id: RecipeId) -> Result<(), ApiError> {
        let result = self.store.delete(id).await.map_err(ApiError::from);
        self.observe(Operation::Delete, result)
    }

    /// Whether the store is reachable.
    pub async fn ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Store not ready: {}", e);
                false
            }
        }
    }

    fn observe<T>(&self, operation: Operation, result: Result<T, ApiError>) -> Result<T, ApiError> {
        let outcome = match &result {
            Ok(_) => Outcome::Ok,
            Err(ApiError::Validation(_)) | Err(ApiError::BadRequest(_)) => Outcome::Invalid,
            Err(ApiError::NotFound(_)) => Outcome::NotFound,
            Err(ApiError::Internal(_)) => Outcome::Error,
        };
        if let Err(e) = &result {
            debug!("{} failed: {}", operation.as_str(), e);
        }
        self.metrics.record(operation, outcome);
        result
    }
}
