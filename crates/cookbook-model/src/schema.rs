//! Recipe and ingredient records as they are stored and served

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a recipe name, in characters.
pub const RECIPE_NAME_MAX_LEN: usize = 255;
/// Maximum length of a recipe description, in characters.
pub const RECIPE_DESCRIPTION_MAX_LEN: usize = 512;
/// Maximum length of an ingredient name, in characters.
pub const INGREDIENT_NAME_MAX_LEN: usize = 255;

/// System-assigned identifier of a recipe row.
pub type RecipeId = i64;

/// An ingredient of exactly one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// A recipe together with the ingredients it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Names of the recipe's ingredients, in storage order.
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A validated ingredient waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
}

impl NewIngredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A validated recipe waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<NewIngredient>,
}

/// Validated changes for an existing recipe.
///
/// `None` leaves the stored value as it is. `Some` for `ingredients`
/// deletes every current ingredient and inserts the given list in its place,
/// even when that list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<NewIngredient>>,
}

impl RecipeChanges {
    pub fn replaces_ingredients(&self) -> bool {
        self.ingredients.is_some()
    }
}
