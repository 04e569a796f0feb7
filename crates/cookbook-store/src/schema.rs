//! PostgreSQL schema for recipes and ingredients.
//!
//! Statements are idempotent and applied in order by
//! [`PgRecipeStore::migrate`](crate::PgRecipeStore::migrate).

pub const CREATE_RECIPES: &str = "CREATE TABLE IF NOT EXISTS recipes (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description VARCHAR(512) NOT NULL DEFAULT ''
)";

pub const CREATE_INGREDIENTS: &str = "CREATE TABLE IF NOT EXISTS ingredients (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    recipe_id BIGINT NOT NULL REFERENCES recipes (id) ON DELETE CASCADE
)";

pub const CREATE_INGREDIENTS_RECIPE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ingredients_recipe_id_idx ON ingredients (recipe_id)";

pub const MIGRATIONS: &[&str] = &[
    CREATE_RECIPES,
    CREATE_INGREDIENTS,
    CREATE_INGREDIENTS_RECIPE_INDEX,
];
