use axum::async_trait;
use reqwest::Method;

use super::{ApiClient, Credentials};
use crate::error::PortalResult;
use crate::models::{CreateLoanRequest, Loan, LoanId, LoanLedger, PaymentReceipt, PaymentRequest};

/// Source of loan and payment records.
///
/// The backend is the authority: it serializes concurrent payments and
/// enforces the final rules. Callers re-fetch instead of patching local state.
#[async_trait]
pub trait LoanDataSource: Send + Sync {
    async fn list_my_loans(&self) -> PortalResult<Vec<Loan>>;

    /// Every loan on the platform (admin and owner)
    async fn list_all_loans(&self) -> PortalResult<Vec<Loan>>;

    async fn get_loan(&self, id: LoanId) -> PortalResult<Loan>;

    async fn create_loan(&self, request: &CreateLoanRequest) -> PortalResult<Loan>;

    async fn approve_loan(&self, id: LoanId) -> PortalResult<Loan>;

    async fn reject_loan(&self, id: LoanId) -> PortalResult<Loan>;

    /// The loan with its full payment history
    async fn loan_with_payments(&self, id: LoanId) -> PortalResult<LoanLedger>;

    async fn submit_payment(
        &self,
        id: LoanId,
        request: &PaymentRequest,
    ) -> PortalResult<PaymentReceipt>;
}

#[async_trait]
impl LoanDataSource for ApiClient {
    async fn list_my_loans(&self) -> PortalResult<Vec<Loan>> {
        self.get("/api/peminjaman/my").await
    }

    async fn list_all_loans(&self) -> PortalResult<Vec<Loan>> {
        self.get("/api/peminjaman").await
    }

    async fn get_loan(&self, id: LoanId) -> PortalResult<Loan> {
        self.get(&format!("/api/peminjaman/{}", id)).await
    }

    async fn create_loan(&self, request: &CreateLoanRequest) -> PortalResult<Loan> {
        self.send(Method::POST, "/api/peminjaman", request).await
    }

    async fn approve_loan(&self, id: LoanId) -> PortalResult<Loan> {
        let path = format!("/api/peminjaman/{}/approve", id);
        self.call(Method::PUT, &path, None::<&()>, Credentials::Session)
            .await
    }

    async fn reject_loan(&self, id: LoanId) -> PortalResult<Loan> {
        let path = format!("/api/peminjaman/{}/reject", id);
        self.call(Method::PUT, &path, None::<&()>, Credentials::Session)
            .await
    }

    async fn loan_with_payments(&self, id: LoanId) -> PortalResult<LoanLedger> {
        self.get(&format!("/api/peminjaman/{}/pembayaran", id))
            .await
    }

    async fn submit_payment(
        &self,
        id: LoanId,
        request: &PaymentRequest,
    ) -> PortalResult<PaymentReceipt> {
        self.send(
            Method::POST,
            &format!("/api/peminjaman/{}/pembayaran", id),
            request,
        )
        .await
    }
}
