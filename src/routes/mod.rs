//! Route definitions for the loan portal

use axum::{routing::get, Router};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

mod admin;
mod auth;
mod loan;

pub use admin::admin_routes;
pub use auth::auth_routes;
pub use loan::{loan_routes, review_routes};

/// The whole portal with its middleware stack (CORS is added by the binary)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(auth_routes())
        .merge(loan_routes())
        .merge(review_routes())
        .merge(admin_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
