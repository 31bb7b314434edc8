//! Loan route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{dashboard, loans, review};
use crate::state::AppState;

/// Customer pages, dashboard and profile
pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", get(dashboard::profile))
        .route("/loans", get(loans::my_loans))
        .route("/loans/apply", get(loans::apply_page).post(loans::apply))
        .route("/loans/:id", get(loans::loan_detail))
        .route("/loans/:id/payments", post(loans::pay))
}

/// Admin loan review
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/loans", get(review::review_list))
        .route("/admin/loans/:id/approve", post(review::approve))
        .route("/admin/loans/:id/reject", post(review::reject))
}
