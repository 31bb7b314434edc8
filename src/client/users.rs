use axum::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::error::PortalResult;
use crate::models::{User, UserId, UserUpdate};

/// Account administration (owner only on the backend)
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> PortalResult<Vec<User>>;

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> PortalResult<User>;

    async fn delete_user(&self, id: UserId) -> PortalResult<()>;
}

#[async_trait]
impl UserDirectory for ApiClient {
    async fn list_users(&self) -> PortalResult<Vec<User>> {
        self.get("/api/users").await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> PortalResult<User> {
        self.send(Method::PUT, &format!("/api/users/{}", id), update)
            .await
    }

    async fn delete_user(&self, id: UserId) -> PortalResult<()> {
        self.send_empty(Method::DELETE, &format!("/api/users/{}", id))
            .await
    }
}
