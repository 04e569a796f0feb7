//! HTTP handlers for the `/recipes` resource.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cookbook_model::{Recipe, RecipeId, RecipePayload};
use serde_json::Value;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;

/// Build the recipes router.
pub fn recipe_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe)
                .put(replace_recipe)
                .patch(update_recipe)
                .delete(delete_recipe),
        )
        .with_state(state)
}

/// Ids that are not integers cannot name a recipe, so they are simply not found.
fn parse_id(raw: &str) -> Result<RecipeId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}

/// Syntax and content-type problems are rejected by the extractor. Field
/// type mismatches surface as validation errors.
fn read_payload(body: Result<Json<Value>, JsonRejection>) -> Result<RecipePayload, ApiError> {
    let Json(body) = body?;
    Ok(RecipePayload::from_json(&body)?)
}

// GET /recipes
async fn list_recipes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

// GET /recipes/:id
async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get(id).await?))
}

// POST /recipes
async fn create_recipe(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let payload = read_payload(body)?;
    let recipe = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

// PUT /recipes/:id
async fn replace_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id)?;
    let payload = read_payload(body)?;
    Ok(Json(state.service.update(id, &payload, false).await?))
}

// PATCH /recipes/:id
async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id)?;
    let payload = read_payload(body)?;
    Ok(Json(state.service.update(id, &payload, true).await?))
}

// DELETE /recipes/:id
async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_router;
    use axum::body::Body;
    use cookbook_store::MemoryRecipeStore;
    use http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_router(Arc::new(AppState::new(Arc::new(MemoryRecipeStore::new()))))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, body: Value) -> Recipe {
        let (status, value) = send(app, "POST", "/recipes", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_value(value).unwrap()
    }

    fn sorted_names(value: &Value) -> Vec<String> {
        let mut names: Vec<String> = value["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn create_recipe_returns_201_with_ingredients() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/recipes",
            Some(json!({
                "name": "Cabbage soup",
                "description": "Soup made from cabbage",
                "ingredients": [{"name": "Cabbage"}, {"name": "Water"}]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().is_some());
        assert_eq!(body["name"], "Cabbage soup");
        assert_eq!(body["description"], "Soup made from cabbage");
        assert_eq!(sorted_names(&body), vec!["Cabbage", "Water"]);
        assert!(body["ingredients"][0]["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn created_recipe_can_be_retrieved() {
        let app = test_app();
        let created = create(
            &app,
            json!({"name": "Sample recipe", "description": "Lovely food",
                   "ingredients": [{"name": "Salt"}]}),
        )
        .await;

        let (status, body) = send(&app, "GET", &format!("/recipes/{}", created.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sample recipe");
        assert_eq!(body["description"], "Lovely food");
        assert_eq!(sorted_names(&body), vec!["Salt"]);
    }

    #[tokio::test]
    async fn list_recipes_returns_all_in_order() {
        let app = test_app();
        create(&app, json!({"name": "Prawn salad"})).await;
        create(&app, json!({"name": "Cheese pie"})).await;

        let (status, body) = send(&app, "GET", "/recipes", None).await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body.as_array().unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0]["name"], "Prawn salad");
        assert_eq!(recipes[1]["name"], "Cheese pie");
        assert_eq!(recipes[0]["ingredients"], json!([]));
    }

    #[tokio::test]
    async fn list_is_empty_initially() {
        let (status, body) = send(&test_app(), "GET", "/recipes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn create_without_name_is_400() {
        let app = test_app();
        let (status, body) =
            send(&app, "POST", "/recipes", Some(json!({"description": "nameless"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"][0]["field"], "name");

        let (_, list) = send(&app, "GET", "/recipes", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn create_with_oversized_fields_is_400() {
        let app = test_app();
        let (status, _) =
            send(&app, "POST", "/recipes", Some(json!({"name": "n".repeat(256)}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/recipes",
            Some(json!({"name": "Pie", "description": "d".repeat(513)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/recipes",
            Some(json!({"name": "Pie", "ingredients": [{"name": "i".repeat(256)}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "ingredients[0].name");
    }

    #[tokio::test]
    async fn null_character_in_name_is_400() {
        let app = test_app();
        let (status, body) =
            send(&app, "POST", "/recipes", Some(json!({"name": "Soup\u{0}"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["message"], "Null characters are not allowed.");

        let (_, list) = send(&app, "GET", "/recipes", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn wrong_field_type_is_a_field_error() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/recipes",
            Some(json!({"name": 5, "ingredients": [{"name": ["Salt"]}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][1]["field"], "ingredients[0].name");
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = test_app();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recipes")
                    .header("content-type", "application/json")
                    .body(Body::from(b"not json".to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let app = test_app();
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recipes")
                    .body(Body::from(r#"{"name": "Pie"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_recipe_is_404() {
        let app = test_app();
        let (status, body) = send(&app, "GET", "/recipes/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "recipe 42 not found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_404() {
        let (status, _) = send(&test_app(), "GET", "/recipes/soup", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_recipe_returns_204_and_removes_it() {
        let app = test_app();
        let recipe = create(
            &app,
            json!({"name": "Moose burger", "description": "First catch your moose...",
                   "ingredients": [{"name": "Moose"}]}),
        )
        .await;
        let url = format!("/recipes/{}", recipe.id);

        let (status, body) = send(&app, "DELETE", &url, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "GET", &url, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", &url, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn partial_update_name_only() {
        let app = test_app();
        let recipe = create(
            &app,
            json!({"name": "Cheeseburger", "description": "A burger with cheese on",
                   "ingredients": [{"name": "Burger"}, {"name": "Cheese"}]}),
        )
        .await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/recipes/{}", recipe.id),
            Some(json!({"name": "Vegan Cheeseburger"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vegan Cheeseburger");
        assert_eq!(body["description"], "A burger with cheese on");
        assert_eq!(
            body["ingredients"],
            serde_json::to_value(&recipe.ingredients).unwrap()
        );
    }

    #[tokio::test]
    async fn partial_update_replaces_ingredients() {
        let app = test_app();
        let recipe = create(
            &app,
            json!({"name": "Vegan Cheeseburger", "description": "A burger with vegan cheese on",
                   "ingredients": [{"name": "Burger"}, {"name": "Cheese"}]}),
        )
        .await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/recipes/{}", recipe.id),
            Some(json!({"ingredients": [{"name": "Vegiburger"}, {"name": "Vegan cheese"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vegan Cheeseburger");
        assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);
        assert_eq!(sorted_names(&body), vec!["Vegan cheese", "Vegiburger"]);
    }

    #[tokio::test]
    async fn supplied_ingredient_ids_are_ignored() {
        let app = test_app();
        let recipe = create(&app, json!({"name": "Toast", "ingredients": [{"name": "Bread"}]})).await;
        let old_id = recipe.ingredients[0].id;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/recipes/{}", recipe.id),
            Some(json!({"ingredients": [{"id": old_id, "name": "Sourdough"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingredients"][0]["name"], "Sourdough");
        assert_ne!(body["ingredients"][0]["id"].as_i64().unwrap(), old_id);
    }

    #[tokio::test]
    async fn partial_update_unknown_recipe_is_404() {
        let (status, _) = send(
            &test_app(),
            "PATCH",
            "/recipes/9",
            Some(json!({"name": "Ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn partial_update_with_invalid_field_is_400() {
        let app = test_app();
        let recipe = create(&app, json!({"name": "Pie"})).await;
        let url = format!("/recipes/{}", recipe.id);

        let (status, body) = send(&app, "PATCH", &url, Some(json!({"description": null}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "description");

        let (_, unchanged) = send(&app, "GET", &url, None).await;
        assert_eq!(unchanged["name"], "Pie");
    }

    #[tokio::test]
    async fn full_update_replaces_everything() {
        let app = test_app();
        let recipe = create(
            &app,
            json!({"name": "Stew", "description": "Slow", "ingredients": [{"name": "Beef"}]}),
        )
        .await;
        let url = format!("/recipes/{}", recipe.id);

        let (status, body) = send(
            &app,
            "PUT",
            &url,
            Some(json!({"name": "Veg stew", "ingredients": [{"name": "Carrot"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Veg stew");
        assert_eq!(body["description"], "");
        assert_eq!(sorted_names(&body), vec!["Carrot"]);

        let (status, _) = send(&app, "PUT", &url, Some(json!({"description": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
