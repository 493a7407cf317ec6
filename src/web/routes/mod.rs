//! Contains all the routes that this application can handle.

mod waitlist;

use crate::AppState;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server.
/// The waitlist endpoint is method-dispatched on the root path: POST signs
/// up, OPTIONS answers the browser preflight, everything else is a 405.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(waitlist::signup)
                .options(waitlist::preflight)
                .fallback(waitlist::method_not_allowed),
        )
        .route("/health-check", get(health_check))
        .with_state(app_state)
}
