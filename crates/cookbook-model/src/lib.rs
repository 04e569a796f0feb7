//! Cookbook Model - recipe records and request payloads
//!
//! This crate defines the two persisted records (recipes and their
//! ingredients), the JSON payloads accepted by the API, and the validation
//! that turns a payload into a store command.

pub mod payload;
pub mod schema;
pub mod validation;

pub use payload::{Field, IngredientPayload, RecipePayload};
pub use schema::{
    Ingredient, NewIngredient, NewRecipe, Recipe, RecipeChanges, RecipeId,
    INGREDIENT_NAME_MAX_LEN, RECIPE_DESCRIPTION_MAX_LEN, RECIPE_NAME_MAX_LEN,
};
pub use validation::{validate_create, validate_update, FieldError, ValidationErrors};
