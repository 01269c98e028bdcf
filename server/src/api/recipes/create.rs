use crate::api::{json_rejection_response, ErrorResponse, ValidationErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use cookbook_core::{Recipe, RecipeRequest};

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body(content = RecipeRequest, example = json!({
        "name": "Red Beans & Rice",
        "ingredients": [{"name": "Kidney Beans", "quantity": 2, "unit": "Cup"}],
        "instructions": ["Boil beans."]
    })),
    responses(
        (status = 201, description = "Recipe created successfully", body = Recipe,
            headers(("Location" = String, description = "Path of the new recipe"))),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(service): State<AppState>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };

    match service.create(request) {
        Ok(recipe) => {
            tracing::info!(id = recipe.id, "recipe created");
            let location = format!("/recipes/{}", recipe.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(recipe),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
