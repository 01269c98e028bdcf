pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the /recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/recipes/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
}

#[derive(OpenApi)]
#[openapi(paths(
    create::create_recipe,
    list::list_recipes,
    get::get_recipe,
    update::update_recipe,
    delete::delete_recipe,
))]
pub struct ApiDoc;
