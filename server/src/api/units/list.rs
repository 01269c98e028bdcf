use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};

/// Unit names accepted in an ingredient's `unit` field, sorted alphabetically.
#[utoipa::path(
    get,
    path = "/units",
    tag = "units",
    responses(
        (status = 200, description = "Sorted unit names", body = Vec<String>,
            example = json!(["Cup", "FluidOunce", "Gallon", "Other", "Ounce", "Pint", "Pound", "Quart", "Tablespoon", "Teaspoon"]))
    )
)]
pub async fn list_units(State(service): State<AppState>) -> impl IntoResponse {
    Json(service.units())
}
