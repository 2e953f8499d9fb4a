//! Patient records router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::{ApiContext, SharedRegistry};

/// Build the patient records router.
pub fn patient_api_router(registry: SharedRegistry) -> Router {
    build_router(ApiContext::new(registry))
}

// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub(crate) fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::home::welcome))
        .route("/about", get(endpoints::home::about))
        .route("/health", get(endpoints::health::check))
        .route("/view", get(endpoints::patients::view))
        .route("/view/:id", get(endpoints::patients::view_one))
        .route("/sort", get(endpoints::patients::sort))
        .route("/create", post(endpoints::patients::create))
        .route("/edit/:id", put(endpoints::patients::edit))
        .route("/delete/:id", delete(endpoints::patients::remove))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}
