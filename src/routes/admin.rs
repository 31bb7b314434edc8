//! Owner-only administration routes

use axum::{routing::get, Router};

use crate::handlers::{audit, banks, users};
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/banks", get(banks::list_banks).post(banks::create_bank))
        .route(
            "/admin/banks/:code",
            get(banks::get_bank)
                .put(banks::update_bank)
                .delete(banks::delete_bank),
        )
        .route("/admin/users", get(users::list_users))
        .route(
            "/admin/users/:id",
            axum::routing::put(users::update_user).delete(users::delete_user),
        )
        .route("/admin/audit-logs", get(audit::list_audit_logs))
        .route(
            "/admin/audit-logs/:entity_type/:entity_id",
            get(audit::entity_history),
        )
}
