pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the /units endpoint
pub fn router() -> Router<AppState> {
    Router::new().route("/units", get(list::list_units))
}

#[derive(OpenApi)]
#[openapi(paths(list::list_units))]
pub struct ApiDoc;
