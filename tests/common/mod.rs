//! Shared fixtures: an in-memory lending backend behind the portal's traits
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use loan_portal::client::{
    AuditTrail, BankDirectory, IdentityProvider, LoanDataSource, UserDirectory,
};
use loan_portal::error::{PortalError, PortalResult};
use loan_portal::models::*;
use loan_portal::routes;
use loan_portal::session::{ClearReason, SessionStore};
use loan_portal::state::AppState;

pub fn user(id: UserId, role: Role) -> User {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("User {}", id),
        "username": format!("user_{}", id),
        "email": format!("user{}@example.com", id),
        "role": role.as_str(),
    }))
    .unwrap()
}

pub fn loan(id: LoanId, principal: &str, status: LoanStatus) -> Loan {
    Loan {
        id,
        borrower_id: 1,
        principal: RawAmount::new(principal),
        term: LoanTerm::SixMonths,
        status,
        created_at: None,
        borrower: Some(user(1, Role::Customer)),
    }
}

pub fn payment(id: PaymentId, loan_id: LoanId, amount: &str) -> Payment {
    Payment {
        id,
        loan_id,
        amount: RawAmount::new(amount),
        method: Some("Transfer".to_string()),
        note: None,
        paid_at: None,
    }
}

/// Behaves like the lending API, records what it was asked to do
#[derive(Default)]
pub struct FakeBackend {
    pub loans: Mutex<Vec<Loan>>,
    pub payments: Mutex<Vec<Payment>>,
    pub banks: Mutex<Vec<Bank>>,
    pub users: Mutex<Vec<User>>,
    pub submitted: Mutex<Vec<(LoanId, PaymentRequest)>>,
    /// Session to clear when `expire_session` is set, like a real `401`
    pub session: Mutex<Option<SessionStore>>,
    pub expire_session: Mutex<bool>,
    /// Ledger fetches so far
    pub ledger_calls: Mutex<usize>,
    /// Ledger fetches from this call number on time out
    pub ledger_fails_from: Mutex<Option<usize>>,
    /// When set, payments are refused with this message
    pub refuse_payments: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn with_loans(loans: Vec<Loan>) -> Arc<Self> {
        let backend = Self::default();
        *backend.loans.lock().unwrap() = loans;
        Arc::new(backend)
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    async fn guard(&self) -> PortalResult<()> {
        let expire = *self.expire_session.lock().unwrap();
        if expire {
            let session = self.session.lock().unwrap().clone();
            if let Some(session) = session {
                session.clear(ClearReason::Expired).await?;
            }
            return Err(PortalError::SessionExpired);
        }
        Ok(())
    }

    fn find_loan(&self, id: LoanId) -> PortalResult<Loan> {
        self.loans
            .lock()
            .unwrap()
            .iter()
            .find(|loan| loan.id == id)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(format!("Peminjaman {} tidak ditemukan", id)))
    }

    fn set_status(&self, id: LoanId, status: LoanStatus) -> PortalResult<Loan> {
        let mut loans = self.loans.lock().unwrap();
        let loan = loans
            .iter_mut()
            .find(|loan| loan.id == id)
            .ok_or_else(|| PortalError::NotFound("not found".to_string()))?;
        loan.status = status;
        Ok(loan.clone())
    }
}

#[async_trait]
impl LoanDataSource for FakeBackend {
    async fn list_my_loans(&self) -> PortalResult<Vec<Loan>> {
        self.guard().await?;
        Ok(self.loans.lock().unwrap().clone())
    }

    async fn list_all_loans(&self) -> PortalResult<Vec<Loan>> {
        self.guard().await?;
        Ok(self.loans.lock().unwrap().clone())
    }

    async fn get_loan(&self, id: LoanId) -> PortalResult<Loan> {
        self.guard().await?;
        self.find_loan(id)
    }

    async fn create_loan(&self, request: &CreateLoanRequest) -> PortalResult<Loan> {
        self.guard().await?;
        let mut loans = self.loans.lock().unwrap();
        let id = loans.iter().map(|loan| loan.id).max().unwrap_or(0) + 1;
        let mut created = loan(id, &request.principal, LoanStatus::Pending);
        created.term = request.term;
        loans.push(created.clone());
        Ok(created)
    }

    async fn approve_loan(&self, id: LoanId) -> PortalResult<Loan> {
        self.guard().await?;
        self.set_status(id, LoanStatus::Approved)
    }

    async fn reject_loan(&self, id: LoanId) -> PortalResult<Loan> {
        self.guard().await?;
        self.set_status(id, LoanStatus::Rejected)
    }

    async fn loan_with_payments(&self, id: LoanId) -> PortalResult<LoanLedger> {
        self.guard().await?;
        let call = {
            let mut calls = self.ledger_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let fails_from = *self.ledger_fails_from.lock().unwrap();
        if fails_from.is_some_and(|from| call >= from) {
            return Err(PortalError::Transient("timeout".to_string()));
        }

        let loan = self.find_loan(id)?;
        let payments = self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|payment| payment.loan_id == id)
            .cloned()
            .collect();
        Ok(LoanLedger {
            loan,
            payments,
            summary: None,
        })
    }

    async fn submit_payment(
        &self,
        id: LoanId,
        request: &PaymentRequest,
    ) -> PortalResult<PaymentReceipt> {
        self.guard().await?;
        let refusal = self.refuse_payments.lock().unwrap().clone();
        if let Some(message) = refusal {
            return Err(PortalError::Rejected(message));
        }
        self.submitted.lock().unwrap().push((id, request.clone()));
        let mut payments = self.payments.lock().unwrap();
        let next_id = payments.len() as u64 + 1;
        payments.push(payment(next_id, id, &request.amount));
        Ok(PaymentReceipt {
            message: Some("Pembayaran berhasil".to_string()),
            ..PaymentReceipt::default()
        })
    }
}

#[async_trait]
impl IdentityProvider for FakeBackend {
    async fn current_user(&self) -> PortalResult<User> {
        self.guard().await?;
        Ok(user(1, Role::Customer))
    }

    async fn login(&self, credentials: &LoginRequest) -> PortalResult<SignIn> {
        if credentials.password != "Rahasia123" {
            return Err(PortalError::Rejected("Email atau password salah".to_string()));
        }
        Ok(SignIn {
            user: user(1, Role::Customer),
            token: "fake-token".to_string(),
        })
    }

    async fn register(&self, form: &RegisterRequest) -> PortalResult<SignIn> {
        let mut created = user(2, Role::Customer);
        created.email = form.email.clone();
        Ok(SignIn {
            user: created,
            token: "fresh-token".to_string(),
        })
    }

    async fn logout(&self) -> PortalResult<()> {
        Err(PortalError::Transient("backend down".to_string()))
    }
}

#[async_trait]
impl BankDirectory for FakeBackend {
    async fn list_banks(&self) -> PortalResult<Vec<Bank>> {
        Ok(self.banks.lock().unwrap().clone())
    }

    async fn get_bank(&self, code: &str) -> PortalResult<Bank> {
        self.banks
            .lock()
            .unwrap()
            .iter()
            .find(|bank| bank.code == code)
            .cloned()
            .ok_or_else(|| PortalError::NotFound("Bank tidak ditemukan".to_string()))
    }

    async fn create_bank(&self, form: &BankForm) -> PortalResult<Bank> {
        let bank = Bank {
            code: form.code.clone(),
            name: form.name.clone(),
            address: Some(form.address.clone()),
            city: Some(form.city.clone()),
            province: Some(form.province.clone()),
        };
        self.banks.lock().unwrap().push(bank.clone());
        Ok(bank)
    }

    async fn update_bank(&self, code: &str, form: &BankForm) -> PortalResult<Bank> {
        let mut banks = self.banks.lock().unwrap();
        let bank = banks
            .iter_mut()
            .find(|bank| bank.code == code)
            .ok_or_else(|| PortalError::NotFound("Bank tidak ditemukan".to_string()))?;
        bank.name = form.name.clone();
        Ok(bank.clone())
    }

    async fn delete_bank(&self, code: &str) -> PortalResult<()> {
        self.banks.lock().unwrap().retain(|bank| bank.code != code);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FakeBackend {
    async fn list_users(&self) -> PortalResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> PortalResult<User> {
        let mut updated = user(id, update.role);
        updated.name = update.name.clone();
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> PortalResult<()> {
        self.users.lock().unwrap().retain(|user| user.id != id);
        Ok(())
    }
}

#[async_trait]
impl AuditTrail for FakeBackend {
    async fn list_audit_logs(&self, _query: &AuditQuery) -> PortalResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }

    async fn entity_history(
        &self,
        _entity_type: &str,
        _entity_id: u64,
    ) -> PortalResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }
}

/// Session already signed in as `role` (user id 1 for customers, 7 otherwise)
pub async fn signed_in(role: Role) -> SessionStore {
    let session = SessionStore::in_memory();
    let id = if role == Role::Customer { 1 } else { 7 };
    session
        .establish("fake-token".to_string(), &user(id, role))
        .await
        .unwrap();
    session
}

pub fn portal(backend: Arc<FakeBackend>, session: SessionStore) -> Router {
    *backend.session.lock().unwrap() = Some(session.clone());
    let state = AppState::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend,
        session,
    );
    routes::router(state)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
