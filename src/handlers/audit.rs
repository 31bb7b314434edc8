//! Audit log (owner)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::PageResult;
use crate::access::View;
use crate::models::{AuditLog, AuditQuery};
use crate::state::AppState;
use crate::views::AuditLogView;

/// GET /admin/audit-logs?action=&user_id=&start_date=&end_date=
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filters): Query<AuditQuery>,
) -> PageResult<Json<AuditLogView>> {
    state.authorize(View::AuditLog).await?;
    let entries = state.audit.list_audit_logs(&filters).await?;
    Ok(Json(AuditLogView::build(filters, entries)))
}

/// GET /admin/audit-logs/:entity_type/:entity_id
pub async fn entity_history(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, u64)>,
) -> PageResult<Json<Vec<AuditLog>>> {
    state.authorize(View::AuditLog).await?;
    Ok(Json(
        state.audit.entity_history(&entity_type, entity_id).await?,
    ))
}
