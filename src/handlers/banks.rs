//! Bank reference maintenance (owner)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::PageResult;
use crate::access::View;
use crate::models::{Bank, BankForm};
use crate::state::AppState;
use crate::validation;
use crate::views::BankListView;

/// GET /admin/banks
pub async fn list_banks(State(state): State<AppState>) -> PageResult<Json<BankListView>> {
    state.authorize(View::Banks).await?;
    let banks = state.banks.list_banks().await?;
    Ok(Json(BankListView::build(banks)))
}

/// GET /admin/banks/:code
pub async fn get_bank(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> PageResult<Json<Bank>> {
    state.authorize(View::Banks).await?;
    Ok(Json(state.banks.get_bank(&code).await?))
}

/// POST /admin/banks
pub async fn create_bank(
    State(state): State<AppState>,
    Json(form): Json<BankForm>,
) -> PageResult<(StatusCode, Json<Bank>)> {
    state.authorize(View::Banks).await?;
    validation::check(&form)?;
    let bank = state.banks.create_bank(&form).await?;
    tracing::info!(code = %bank.code, "Bank created");
    Ok((StatusCode::CREATED, Json(bank)))
}

/// PUT /admin/banks/:code
pub async fn update_bank(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(form): Json<BankForm>,
) -> PageResult<Json<Bank>> {
    state.authorize(View::Banks).await?;
    validation::check(&form)?;
    let bank = state.banks.update_bank(&code, &form).await?;
    tracing::info!(code = %code, "Bank updated");
    Ok(Json(bank))
}

/// DELETE /admin/banks/:code
pub async fn delete_bank(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> PageResult<StatusCode> {
    state.authorize(View::Banks).await?;
    state.banks.delete_bank(&code).await?;
    tracing::info!(code = %code, "Bank deleted");
    Ok(StatusCode::NO_CONTENT)
}
