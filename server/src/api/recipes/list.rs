use crate::api::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use cookbook_core::Recipe;

/// Every recipe is returned in full, ingredients and instructions included,
/// ordered by id.
#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes", body = Vec<Recipe>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_recipes(State(service): State<AppState>) -> impl IntoResponse {
    match service.list() {
        Ok(recipes) => (StatusCode::OK, Json(recipes)).into_response(),
        Err(e) => e.into_response(),
    }
}
