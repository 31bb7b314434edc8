//! Customer loan pages: listing, application, detail and repayment

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use serde::Serialize;

use super::PageResult;
use crate::access::View;
use crate::models::{LoanId, LoanTerm};
use crate::payment::{self, LoanApplicationForm, PaymentForm, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT};
use crate::state::AppState;
use crate::views::{LoanLedgerView, LoanListView, Money};

/// Loan application page: the choices the form offers
#[derive(Debug, Serialize)]
pub struct ApplyPage {
    pub terms: Vec<LoanTerm>,
    pub min_amount: Money,
    pub max_amount: Money,
}

impl Default for ApplyPage {
    fn default() -> Self {
        Self {
            terms: vec![
                LoanTerm::ThreeMonths,
                LoanTerm::SixMonths,
                LoanTerm::TwelveMonths,
            ],
            min_amount: Money::from(MIN_LOAN_AMOUNT),
            max_amount: Money::from(MAX_LOAN_AMOUNT),
        }
    }
}

/// GET /loans - The signed-in customer's loans
pub async fn my_loans(State(state): State<AppState>) -> PageResult<Json<LoanListView>> {
    state.authorize(View::MyLoans).await?;
    let loans = state.loans.list_my_loans().await?;
    Ok(Json(LoanListView::build(&loans)))
}

/// GET /loans/apply
pub async fn apply_page(State(state): State<AppState>) -> PageResult<Json<ApplyPage>> {
    state.authorize(View::ApplyLoan).await?;
    Ok(Json(ApplyPage::default()))
}

/// POST /loans/apply - Submit an application, then show the new loan
pub async fn apply(
    State(state): State<AppState>,
    Json(form): Json<LoanApplicationForm>,
) -> PageResult<Redirect> {
    state.authorize(View::ApplyLoan).await?;
    let loan = payment::apply_for_loan(state.loans.as_ref(), form).await?;
    Ok(Redirect::to(&format!("/loans/{}", loan.id)))
}

/// GET /loans/:id - Ledger, progress and payment eligibility
pub async fn loan_detail(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
) -> PageResult<Json<LoanLedgerView>> {
    let actor = state.authorize(View::LoanDetail).await?;
    let ledger = state.loans.loan_with_payments(id).await?;
    Ok(Json(LoanLedgerView::build(&ledger, &actor)))
}

/// POST /loans/:id/payments - Record a repayment and return the refreshed ledger
pub async fn pay(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
    Json(form): Json<PaymentForm>,
) -> PageResult<Json<LoanLedgerView>> {
    let actor = state.authorize(View::LoanDetail).await?;
    let view = payment::submit_payment(state.loans.as_ref(), &actor, id, form).await?;
    Ok(Json(view))
}
