use crate::{
    controller::{health_check_controller, oracle_controller},
    params, response, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Oracle Relay API"
        ),
        paths(
            health_check_controller::health_check,
            oracle_controller::ask,
        ),
        components(
            schemas(
                params::oracle::AskParams,
                response::oracle::AskResponse,
                response::oracle::ErrorResponse,
            )
        ),
        tags(
            (name = "oracle", description = "Personal oracle chat relay")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oracle_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oracle_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/oracle", post(oracle_controller::ask))
        .with_state(app_state)
}
