use crate::api::{json_rejection_response, ErrorResponse, ValidationErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cookbook_core::{RecipeId, RecipeRequest};

/// Replaces the recipe's name, ingredients, and instructions wholesale.
/// The body is validated before the recipe is looked up, so an invalid body
/// gets 400 even when the id does not exist.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeRequest,
    responses(
        (status = 204, description = "Recipe updated successfully"),
        (status = 400, description = "Invalid request", body = ValidationErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(service): State<AppState>,
    Path(id): Path<RecipeId>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };

    match service.update(id, request) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
