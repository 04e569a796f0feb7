//! Payload validation for recipe create and update

use crate::payload::{Field, IngredientPayload, RecipePayload};
use crate::schema::{
    NewIngredient, NewRecipe, RecipeChanges, INGREDIENT_NAME_MAX_LEN,
    RECIPE_DESCRIPTION_MAX_LEN, RECIPE_NAME_MAX_LEN,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NULL_CHARACTER: &str = "Null characters are not allowed.";

/// A single rejected field, addressed by its JSON path (`ingredients[1].name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid recipe: {}", join(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any error was recorded against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Validate a create payload: `name` is required, `description` defaults to
/// empty and `ingredients` defaults to none.
pub fn validate_create(payload: &RecipePayload) -> Result<NewRecipe, ValidationErrors> {
    let mut errors = Vec::new();

    let name = required_text(&payload.name, "name", RECIPE_NAME_MAX_LEN, &mut errors);
    let description = optional_text(
        &payload.description,
        "description",
        RECIPE_DESCRIPTION_MAX_LEN,
        &mut errors,
    );
    let ingredients = ingredient_list(&payload.ingredients, &mut errors);

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(NewRecipe {
        name: name.unwrap_or_default(),
        description: description.unwrap_or_default(),
        ingredients: ingredients.unwrap_or_default(),
    })
}

/// Validate an update payload.
///
/// With `partial` set every field is optional and only supplied fields end up
/// in the changes. Without it the payload must be complete, exactly as for
/// create, and the result overwrites every field including the ingredient list.
pub fn validate_update(
    payload: &RecipePayload,
    partial: bool,
) -> Result<RecipeChanges, ValidationErrors> {
    if !partial {
        let recipe = validate_create(payload)?;
        return Ok(RecipeChanges {
            name: Some(recipe.name),
            description: Some(recipe.description),
            ingredients: Some(recipe.ingredients),
        });
    }

    let mut errors = Vec::new();

    let name = if payload.name.is_absent() {
        None
    } else {
        required_text(&payload.name, "name", RECIPE_NAME_MAX_LEN, &mut errors)
    };
    let description = optional_text(
        &payload.description,
        "description",
        RECIPE_DESCRIPTION_MAX_LEN,
        &mut errors,
    );
    let ingredients = ingredient_list(&payload.ingredients, &mut errors);

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(RecipeChanges {
        name,
        description,
        ingredients,
    })
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// A non-blank string no longer than `max` characters, trimmed.
fn required_text(
    field: &Field<String>,
    path: &str,
    max: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match field {
        Field::Absent => {
            errors.push(FieldError::new(path, REQUIRED));
            None
        }
        Field::Null => {
            errors.push(FieldError::new(path, NOT_NULL));
            None
        }
        Field::Value(raw) => {
            let value = raw.trim();
            if value.contains('\0') {
                errors.push(FieldError::new(path, NULL_CHARACTER));
                None
            } else if value.is_empty() {
                errors.push(FieldError::new(path, NOT_BLANK));
                None
            } else if value.chars().count() > max {
                errors.push(FieldError::new(path, too_long(max)));
                None
            } else {
                Some(value.to_string())
            }
        }
    }
}

/// A possibly empty string no longer than `max` characters, trimmed.
/// Returns `None` when the key was not sent or was rejected.
fn optional_text(
    field: &Field<String>,
    path: &str,
    max: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match field {
        Field::Absent => None,
        Field::Null => {
            errors.push(FieldError::new(path, NOT_NULL));
            None
        }
        Field::Value(raw) => {
            let value = raw.trim();
            if value.contains('\0') {
                errors.push(FieldError::new(path, NULL_CHARACTER));
                None
            } else if value.chars().count() > max {
                errors.push(FieldError::new(path, too_long(max)));
                None
            } else {
                Some(value.to_string())
            }
        }
    }
}

fn ingredient_list(
    field: &Field<Vec<IngredientPayload>>,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<NewIngredient>> {
    match field {
        Field::Absent => None,
        Field::Null => {
            errors.push(FieldError::new("ingredients", NOT_NULL));
            None
        }
        Field::Value(entries) => {
            let before = errors.len();
            let ingredients: Vec<NewIngredient> = entries
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| {
                    let path = format!("ingredients[{}].name", i);
                    required_text(&entry.name, &path, INGREDIENT_NAME_MAX_LEN, errors)
                        .map(NewIngredient::new)
                })
                .collect();
            (errors.len() == before).then_some(ingredients)
        }
    }
}
