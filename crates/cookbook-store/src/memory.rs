//! In-memory recipe store
//!
//! Keeps the two tables as plain vectors behind a single `RwLock`. Writers
//! hold the lock for the whole operation, which gives every operation the
//! same all-or-nothing behaviour as a database transaction.

use async_trait::async_trait;
use cookbook_model::{Ingredient, NewIngredient, NewRecipe, Recipe, RecipeChanges, RecipeId};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::RecipeStore;

#[derive(Debug, Clone)]
struct RecipeRecord {
    id: RecipeId,
    name: String,
    description: String,
}

#[derive(Debug, Clone)]
struct IngredientRecord {
    id: i64,
    recipe_id: RecipeId,
    name: String,
}

#[derive(Debug, Default)]
struct Tables {
    last_recipe_id: RecipeId,
    last_ingredient_id: i64,
    recipes: Vec<RecipeRecord>,
    ingredients: Vec<IngredientRecord>,
}

impl Tables {
    fn recipe_index(&self, id: RecipeId) -> Result<usize, StoreError> {
        self.recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn ingredients_of(&self, recipe_id: RecipeId) -> Vec<Ingredient> {
        self.ingredients
            .iter()
            .filter(|i| i.recipe_id == recipe_id)
            .map(|i| Ingredient {
                id: i.id,
                name: i.name.clone(),
            })
            .collect()
    }

    fn assemble(&self, record: &RecipeRecord) -> Recipe {
        Recipe {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            ingredients: self.ingredients_of(record.id),
        }
    }

    fn insert_ingredients(&mut self, recipe_id: RecipeId, ingredients: Vec<NewIngredient>) {
        for ingredient in ingredients {
            self.last_ingredient_id += 1;
            self.ingredients.push(IngredientRecord {
                id: self.last_ingredient_id,
                recipe_id,
                name: ingredient.name,
            });
        }
    }

    fn remove_ingredients(&mut self, recipe_id: RecipeId) -> usize {
        let before = self.ingredients.len();
        self.ingredients.retain(|i| i.recipe_id != recipe_id);
        before - self.ingredients.len()
    }
}

/// Recipe store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    tables: RwLock<Tables>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ingredient rows across all recipes.
    pub async fn ingredient_count(&self) -> usize {
        self.tables.read().await.ingredients.len()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.recipes.iter().map(|r| tables.assemble(r)).collect())
    }

    async fn get(&self, id: RecipeId) -> Result<Recipe, StoreError> {
        let tables = self.tables.read().await;
        let index = tables.recipe_index(id)?;
        Ok(tables.assemble(&tables.recipes[index]))
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_recipe_id += 1;
        let record = RecipeRecord {
            id: tables.last_recipe_id,
            name: recipe.name,
            description: recipe.description,
        };
        tables.insert_ingredients(record.id, recipe.ingredients);
        let created = tables.assemble(&record);
        tables.recipes.push(record);

        info!(
            "Created recipe {} with {} ingredients",
            created.id,
            created.ingredients.len()
        );
        Ok(created)
    }

    async fn update(&self, id: RecipeId, changes: RecipeChanges) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        let index = tables.recipe_index(id)?;

        let record = &mut tables.recipes[index];
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }

        if let Some(replacement) = changes.ingredients {
            let removed = tables.remove_ingredients(id);
            debug!("Replacing {} ingredients of recipe {}", removed, id);
            tables.insert_ingredients(id, replacement);
        }

        info!("Updated recipe {}", id);
        Ok(tables.assemble(&tables.recipes[index]))
    }

    async fn delete(&self, id: RecipeId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let index = tables.recipe_index(id)?;
        let removed = tables.remove_ingredients(id);
        tables.recipes.remove(index);
        info!("Deleted recipe {} and {} ingredients", id, removed);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
