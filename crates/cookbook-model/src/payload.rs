//! JSON request bodies for creating and updating recipes

use serde_json::{Map, Value};

use crate::validation::{FieldError, ValidationErrors};

const NOT_A_STRING: &str = "Not a valid string.";

/// A request field that may be missing, explicitly `null`, or set.
///
/// Partial updates need to tell "not sent" apart from "sent as null", which
/// a plain `Option` cannot do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

/// One entry of the `ingredients` list. Any `id` sent by the client is ignored.
#[derive(Debug, Clone, Default)]
pub struct IngredientPayload {
    pub name: Field<String>,
}

/// Body of `POST`, `PUT` and `PATCH` on the recipes resource.
#[derive(Debug, Clone, Default)]
pub struct RecipePayload {
    pub name: Field<String>,
    pub description: Field<String>,
    pub ingredients: Field<Vec<IngredientPayload>>,
}

impl RecipePayload {
    /// Read a payload out of a parsed JSON body.
    ///
    /// Values of the wrong JSON type are reported against their field path,
    /// in the same shape as the rule checks in [`crate::validate_create`].
    /// Unknown keys are ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();

        let Value::Object(object) = body else {
            errors.push(FieldError::new("non_field_errors", not_a_dict(body)));
            return Err(ValidationErrors(errors));
        };

        let payload = RecipePayload {
            name: text(object, "name", "name", &mut errors),
            description: text(object, "description", "description", &mut errors),
            ingredients: ingredients(object, &mut errors),
        };

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

fn text(object: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<FieldError>) -> Field<String> {
    match object.get(key) {
        None => Field::Absent,
        Some(Value::Null) => Field::Null,
        Some(Value::String(value)) => Field::Value(value.clone()),
        Some(_) => {
            errors.push(FieldError::new(path, NOT_A_STRING));
            Field::Absent
        }
    }
}

fn ingredients(
    object: &Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Field<Vec<IngredientPayload>> {
    let entries = match object.get("ingredients") {
        None => return Field::Absent,
        Some(Value::Null) => return Field::Null,
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            errors.push(FieldError::new(
                "ingredients",
                format!("Expected a list of items but got type \"{}\".", type_name(other)),
            ));
            return Field::Absent;
        }
    };

    let mut list = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let Value::Object(entry) = entry else {
            errors.push(FieldError::new(format!("ingredients[{}]", i), not_a_dict(entry)));
            continue;
        };
        list.push(IngredientPayload {
            name: text(entry, "name", &format!("ingredients[{}].name", i), errors),
        });
    }
    Field::Value(list)
}

fn not_a_dict(value: &Value) -> String {
    format!("Invalid data. Expected a dictionary, but got {}.", type_name(value))
}

// Short type names (`str`, `int`, `dict`) used in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
