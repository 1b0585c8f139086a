use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{Deployment, routes};

pub fn router(deployment: Deployment) -> Router {
    let api_routes = Router::new()
        .merge(routes::boards::router(&deployment))
        .merge(routes::tasks::router(&deployment));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
