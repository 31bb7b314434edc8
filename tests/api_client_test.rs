//! API client tests against a throwaway lending backend
//!
//! Each test starts a small axum app on an ephemeral port that answers the
//! way the real backend does: sometimes wrapped in `{data}`, sometimes bare.

mod common;

use std::time::Duration;

use axum::{
    extract::{Json, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use loan_portal::client::{ApiClient, BankDirectory, IdentityProvider, LoanDataSource};
use loan_portal::error::PortalError;
use loan_portal::models::{CreateLoanRequest, LoanStatus, LoanTerm, LoginRequest, Role};
use loan_portal::session::SessionStore;

const TOKEN: &str = "tok-1";

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
        .into_response()
}

fn owner_json() -> Value {
    json!({
        "id": 9,
        "name": "Pemilik",
        "username": "pemilik",
        "email": "owner@example.com",
        "role": "owner",
        "created_at": "2025-01-01T00:00:00.000000Z"
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "Rahasia123" {
        Json(json!({"message": "Login berhasil", "token": TOKEN})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Email atau password salah"})),
        )
            .into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(TOKEN) => Json(json!({"data": owner_json()})).into_response(),
        _ => unauthenticated(),
    }
}

async fn my_loans(headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(TOKEN) {
        return unauthenticated();
    }
    Json(json!({
        "message": "ok",
        "data": [
            {
                "id": 1,
                "user_id": 9,
                "nominal": "5000000.00",
                "rentang": "6 Bulan",
                "status": "disetujui"
            },
            {"id": 2, "user_id": 9, "nominal": 2000000, "rentang": "3 Bulan", "status": "lunas"}
        ]
    }))
    .into_response()
}

async fn create_loan() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "The given data was invalid.",
            "errors": {
                "nominal": ["Nominal minimal Rp 1.000.000"],
                "rentang": "Rentang wajib diisi"
            }
        })),
    )
        .into_response()
}

async fn ledger() -> Json<Value> {
    Json(json!({
        "loan": {
            "id": 1,
            "user_id": 9,
            "nominal": "5000000.00",
            "rentang": "6 Bulan",
            "status": "disetujui"
        },
        "payments": [
            {"id": 1, "peminjaman_id": 1, "nominal": "2000000.00", "metode": "Transfer"},
            {"id": 2, "peminjaman_id": 1, "nominal": "oops"}
        ],
        "summary": {"total_pinjam": "5000000.00", "total_bayar": "2000000.00", "sisa": "3000000.00"}
    }))
}

async fn banks() -> Json<Value> {
    Json(json!({
        "data": [{"kode_bank": "014", "nama_bank": "BCA", "kota": "Jakarta"}],
        "current_page": 1,
        "last_page": 1,
        "per_page": 15,
        "total": 1
    }))
}

async fn bank(Path(code): Path<String>) -> Json<Value> {
    Json(json!({"kode_bank": code, "nama_bank": "Echo"}))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(|| async { unauthenticated() }))
        .route("/api/peminjaman/my", get(my_loans))
        .route("/api/peminjaman", post(create_loan))
        .route("/api/peminjaman/1/pembayaran", get(ledger))
        .route("/api/bank", get(banks))
        .route("/api/bank/:code", get(bank));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn client(base_url: &str, session: SessionStore) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5), session).unwrap()
}

async fn signed_in_with(token: &str) -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .establish(token.to_string(), &common::user(9, Role::Owner))
        .await
        .unwrap();
    session
}

// ============================================================================
// Identity
// ============================================================================

#[tokio::test]
async fn test_login_fetches_user_when_response_omits_it() {
    let base_url = spawn_backend().await;
    let session = SessionStore::in_memory();
    let api = client(&base_url, session.clone());

    let sign_in = api
        .login(&LoginRequest {
            email: "owner@example.com".to_string(),
            password: "Rahasia123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(sign_in.token, TOKEN);
    assert_eq!(sign_in.user.id, 9);
    assert_eq!(sign_in.user.role, Role::Owner);
    // Establishing the session is left to the caller
    assert!(session.token().await.is_none());
}

#[tokio::test]
async fn test_bad_credentials_are_rejected_not_expired() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, SessionStore::in_memory());

    let err = api
        .login(&LoginRequest {
            email: "owner@example.com".to_string(),
            password: "salah".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        PortalError::Rejected(message) => assert_eq!(message, "Email atau password salah"),
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_call_clears_session() {
    let base_url = spawn_backend().await;
    let session = signed_in_with("stale").await;
    let mut events = session.subscribe();
    let api = client(&base_url, session.clone());

    let err = api.list_my_loans().await.unwrap_err();
    assert!(matches!(err, PortalError::SessionExpired));
    assert!(session.current().await.is_none());
    assert!(events.try_recv().is_ok());
}

#[tokio::test]
async fn test_logout_401_still_reports_expiry() {
    let base_url = spawn_backend().await;
    let session = signed_in_with(TOKEN).await;
    let api = client(&base_url, session.clone());

    let err = api.logout().await.unwrap_err();
    assert!(matches!(err, PortalError::SessionExpired));
    assert!(session.token().await.is_none());
}

// ============================================================================
// Loans
// ============================================================================

#[tokio::test]
async fn test_wrapped_listing_decodes_with_bearer_token() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, signed_in_with(TOKEN).await);

    let loans = api.list_my_loans().await.unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0].status, LoanStatus::Approved);
    assert_eq!(loans[0].principal.value(), dec!(5000000));
    assert_eq!(loans[1].status, LoanStatus::Closed);
    assert_eq!(loans[1].term, LoanTerm::ThreeMonths);
}

#[tokio::test]
async fn test_bare_ledger_decodes() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, signed_in_with(TOKEN).await);

    let ledger = api.loan_with_payments(1).await.unwrap();
    assert_eq!(ledger.loan.id, 1);
    assert_eq!(ledger.payments.len(), 2);
    assert_eq!(ledger.payments[1].amount.value(), dec!(0));

    let summary = loan_portal::ledger::summarize(&ledger.loan, &ledger.payments);
    let remote = ledger.summary.unwrap();
    assert_eq!(loan_portal::ledger::remote_drift(&summary, &remote), None);
}

#[tokio::test]
async fn test_unprocessable_maps_to_field_errors() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, signed_in_with(TOKEN).await);

    let err = api
        .create_loan(&CreateLoanRequest {
            principal: "500".to_string(),
            term: LoanTerm::SixMonths,
        })
        .await
        .unwrap_err();

    match err {
        PortalError::Validation { message, fields } => {
            assert_eq!(message, "The given data was invalid.");
            assert_eq!(fields["nominal"], "Nominal minimal Rp 1.000.000");
            assert_eq!(fields["rentang"], "Rentang wajib diisi");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_paginated_banks_decode() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, signed_in_with(TOKEN).await);

    let banks = api.list_banks().await.unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].code, "014");
    assert_eq!(banks[0].city.as_deref(), Some("Jakarta"));
}

#[tokio::test]
async fn test_bank_code_stays_one_segment() {
    let base_url = spawn_backend().await;
    let api = client(&base_url, signed_in_with(TOKEN).await);

    let bank = api.get_bank("../users").await.unwrap();
    assert_eq!(bank.code, "../users");

    let err = api.get_bank("..").await.unwrap_err();
    assert!(matches!(err, PortalError::Rejected(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transient() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}", addr), signed_in_with(TOKEN).await);
    let err = api.list_my_loans().await.unwrap_err();
    assert!(matches!(err, PortalError::Transient(_)));
}
