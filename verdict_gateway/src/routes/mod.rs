mod classify_video;
mod health;
mod metrics;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub use classify_video::classify_video;
pub use health::healthcheck;
pub use metrics::metrics_handler;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/classify", post(classify_video))
        .route("/metrics", get(metrics_handler))
}
