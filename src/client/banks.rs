use axum::async_trait;
use reqwest::Method;

use super::{encoded_path, ApiClient};
use crate::error::PortalResult;
use crate::models::{Bank, BankForm};

/// Bank reference data. Plain CRUD, keyed by bank code.
#[async_trait]
pub trait BankDirectory: Send + Sync {
    async fn list_banks(&self) -> PortalResult<Vec<Bank>>;

    async fn get_bank(&self, code: &str) -> PortalResult<Bank>;

    async fn create_bank(&self, form: &BankForm) -> PortalResult<Bank>;

    async fn update_bank(&self, code: &str, form: &BankForm) -> PortalResult<Bank>;

    async fn delete_bank(&self, code: &str) -> PortalResult<()>;
}

#[async_trait]
impl BankDirectory for ApiClient {
    async fn list_banks(&self) -> PortalResult<Vec<Bank>> {
        self.get("/api/bank").await
    }

    async fn get_bank(&self, code: &str) -> PortalResult<Bank> {
        self.get(&encoded_path(&["api", "bank", code])?).await
    }

    async fn create_bank(&self, form: &BankForm) -> PortalResult<Bank> {
        self.send(Method::POST, "/api/bank", form).await
    }

    async fn update_bank(&self, code: &str, form: &BankForm) -> PortalResult<Bank> {
        self.send(Method::PUT, &encoded_path(&["api", "bank", code])?, form)
            .await
    }

    async fn delete_bank(&self, code: &str) -> PortalResult<()> {
        self.send_empty(Method::DELETE, &encoded_path(&["api", "bank", code])?)
            .await
    }
}
