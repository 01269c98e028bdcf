pub mod recipes;
pub mod units;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cookbook_core::{FieldErrors, Ingredient, IngredientRequest, Recipe, RecipeRequest, Unit};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ServiceError;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Returned with 400 when a create/update request breaks validation rules.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    /// Field path (e.g. `ingredients[2].quantity`) to its error messages
    #[schema(value_type = Object, example = json!({"name": ["Name is required."]}))]
    pub errors: FieldErrors,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// A body that is not JSON, or not shaped like the request type at all, is a
/// bad request like any other invalid input.
pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(status = %rejection.status(), "rejected request body");
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse {
                    error: "Validation failed".to_string(),
                    errors,
                }),
            )
                .into_response(),
            ServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
            ServiceError::Storage(e) => {
                tracing::error!(error = %e, "recipe storage failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
            }
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "CookbookAPI", description = "Recipe CRUD API"),
        components(schemas(
            ErrorResponse,
            ValidationErrorResponse,
            Recipe,
            Ingredient,
            Unit,
            RecipeRequest,
            IngredientRequest,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![recipes::ApiDoc::openapi(), units::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}
