//! Admin loan review

use axum::{
    extract::{Path, State},
    Json,
};

use super::PageResult;
use crate::access::View;
use crate::error::PortalError;
use crate::models::{LoanId, LoanStatus};
use crate::state::AppState;
use crate::views::ReviewListView;

/// GET /admin/loans - Every loan, pending ones actionable
pub async fn review_list(State(state): State<AppState>) -> PageResult<Json<ReviewListView>> {
    state.authorize(View::ReviewLoans).await?;
    let loans = state.loans.list_all_loans().await?;
    Ok(Json(ReviewListView::build(&loans)))
}

/// POST /admin/loans/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
) -> PageResult<Json<ReviewListView>> {
    decide(&state, id, LoanStatus::Approved).await
}

/// POST /admin/loans/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
) -> PageResult<Json<ReviewListView>> {
    decide(&state, id, LoanStatus::Rejected).await
}

/// Review is one-shot: a loan that already left `pending` is refused before
/// the backend is asked.
async fn decide(
    state: &AppState,
    id: LoanId,
    decision: LoanStatus,
) -> PageResult<Json<ReviewListView>> {
    state.authorize(View::ReviewLoans).await?;

    let loan = state.loans.get_loan(id).await?;
    if !loan.status.can_transition_to(decision) {
        return Err(PortalError::Rejected(format!(
            "Loan #{} is already {} and cannot be reviewed again",
            id,
            loan.status.code()
        ))
        .into());
    }

    match decision {
        LoanStatus::Approved => state.loans.approve_loan(id).await?,
        _ => state.loans.reject_loan(id).await?,
    };
    tracing::info!(loan_id = id, decision = decision.code(), "Loan reviewed");

    let loans = state.loans.list_all_loans().await?;
    Ok(Json(ReviewListView::build(&loans)))
}
