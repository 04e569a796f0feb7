//! PostgreSQL recipe store

use async_trait::async_trait;
use cookbook_model::{Ingredient, NewIngredient, NewRecipe, Recipe, RecipeChanges, RecipeId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::schema::MIGRATIONS;
use crate::RecipeStore;

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    description: String,
}

#[derive(Debug, FromRow)]
struct IngredientRow {
    id: i64,
    recipe_id: i64,
    name: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
        }
    }
}

impl RecipeRow {
    fn with_ingredients(self, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            description: self.description,
            ingredients,
        }
    }
}

/// Recipe store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and index if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Migration(e.to_string()))?;
        }
        tx.commit().await?;
        info!("Applied {} schema statements", MIGRATIONS.len());
        Ok(())
    }

    /// Begin a transaction that sees one consistent snapshot across statements.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

async fn fetch_recipe_row(
    tx: &mut Transaction<'_, Postgres>,
    id: RecipeId,
) -> Result<RecipeRow, StoreError> {
    sqlx::query_as::<_, RecipeRow>("SELECT id, name, description FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::NotFound(id))
}

async fn fetch_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: RecipeId,
) -> Result<Vec<Ingredient>, StoreError> {
    let rows: Vec<IngredientRow> = sqlx::query_as(
        "SELECT id, recipe_id, name FROM ingredients WHERE recipe_id = $1 ORDER BY id",
    )
    .bind(recipe_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().map(Ingredient::from).collect())
}

async fn insert_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: RecipeId,
    ingredients: &[NewIngredient],
) -> Result<Vec<Ingredient>, StoreError> {
    let mut inserted = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let row: IngredientRow = sqlx::query_as(
            "INSERT INTO ingredients (name, recipe_id) VALUES ($1, $2)
             RETURNING id, recipe_id, name",
        )
        .bind(&ingredient.name)
        .bind(recipe_id)
        .fetch_one(&mut **tx)
        .await?;
        inserted.push(row.into());
    }
    Ok(inserted)
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let mut tx = self.begin_snapshot().await?;

        let recipes: Vec<RecipeRow> =
            sqlx::query_as("SELECT id, name, description FROM recipes ORDER BY id")
                .fetch_all(&mut *tx)
                .await?;
        let ingredients: Vec<IngredientRow> = sqlx::query_as(
            "SELECT id, recipe_id, name FROM ingredients ORDER BY recipe_id, id",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut by_recipe: HashMap<RecipeId, Vec<Ingredient>> = HashMap::new();
        for row in ingredients {
            by_recipe.entry(row.recipe_id).or_default().push(row.into());
        }

        debug!("Loaded {} recipes", recipes.len());
        Ok(recipes
            .into_iter()
            .map(|row| {
                let ingredients = by_recipe.remove(&row.id).unwrap_or_default();
                row.with_ingredients(ingredients)
            })
            .collect())
    }

    async fn get(&self, id: RecipeId) -> Result<Recipe, StoreError> {
        let mut tx = self.begin_snapshot().await?;
        let row = fetch_recipe_row(&mut tx, id).await?;
        let ingredients = fetch_ingredients(&mut tx, id).await?;
        tx.commit().await?;
        Ok(row.with_ingredients(ingredients))
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: RecipeRow = sqlx::query_as(
            "INSERT INTO recipes (name, description) VALUES ($1, $2)
             RETURNING id, name, description",
        )
        .bind(&recipe.name)
        .bind(&recipe.description)
        .fetch_one(&mut *tx)
        .await?;
        let ingredients = insert_ingredients(&mut tx, row.id, &recipe.ingredients).await?;

        tx.commit().await?;
        info!("Created recipe {} with {} ingredients", row.id, ingredients.len());
        Ok(row.with_ingredients(ingredients))
    }

    async fn update(&self, id: RecipeId, changes: RecipeChanges) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: RecipeRow = sqlx::query_as(
            "UPDATE recipes
             SET name = COALESCE($2, name), description = COALESCE($3, description)
             WHERE id = $1
             RETURNING id, name, description",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        let ingredients = match &changes.ingredients {
            Some(replacement) => {
                let removed = sqlx::query("DELETE FROM ingredients WHERE recipe_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                debug!("Replacing {} ingredients of recipe {}", removed, id);
                insert_ingredients(&mut tx, id, replacement).await?
            }
            None => fetch_ingredients(&mut tx, id).await?,
        };

        tx.commit().await?;
        info!("Updated recipe {}", id);
        Ok(row.with_ingredients(ingredients))
    }

    async fn delete(&self, id: RecipeId) -> Result<(), StoreError> {
        // ingredients go with the recipe through ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!("Deleted recipe {}", id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
