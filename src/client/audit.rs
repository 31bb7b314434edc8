use axum::async_trait;

use super::{encoded_path, ApiClient};
use crate::error::PortalResult;
use crate::models::{AuditLog, AuditQuery};

/// Read-only access to the backend's audit log
#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn list_audit_logs(&self, query: &AuditQuery) -> PortalResult<Vec<AuditLog>>;

    /// Every recorded action on one entity, e.g. `("peminjaman", 12)`
    async fn entity_history(&self, entity_type: &str, entity_id: u64)
        -> PortalResult<Vec<AuditLog>>;
}

#[async_trait]
impl AuditTrail for ApiClient {
    async fn list_audit_logs(&self, query: &AuditQuery) -> PortalResult<Vec<AuditLog>> {
        self.get_query("/api/audit-logs", query).await
    }

    async fn entity_history(
        &self,
        entity_type: &str,
        entity_id: u64,
    ) -> PortalResult<Vec<AuditLog>> {
        let id = entity_id.to_string();
        let path = encoded_path(&["api", "audit-logs", "entity", entity_type, &id])?;
        self.get(&path).await
    }
}
