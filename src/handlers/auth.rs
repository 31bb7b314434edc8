//! Sign-in, registration and sign-out

use axum::{extract::State, response::Redirect, Json};
use serde::Serialize;

use super::PageResult;
use crate::access::View;
use crate::error::PortalError;
use crate::models::{Bank, LoginRequest, RegisterRequest, SignIn};
use crate::session::ClearReason;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub view: View,
    pub register_path: &'static str,
}

/// Registration page: the form needs the bank list for its picker
#[derive(Debug, Serialize)]
pub struct RegisterPage {
    pub view: View,
    pub banks: Vec<Bank>,
}

async fn start_session(state: &AppState, sign_in: SignIn) -> Result<Redirect, PortalError> {
    state
        .session
        .establish(sign_in.token, &sign_in.user)
        .await?;
    tracing::info!(user_id = sign_in.user.id, role = sign_in.user.role.as_str(), "Signed in");
    Ok(Redirect::to(View::Dashboard.path()))
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> PageResult<Json<LoginPage>> {
    state.authorize(View::Login).await?;
    Ok(Json(LoginPage {
        view: View::Login,
        register_path: View::Register.path(),
    }))
}

/// POST /login - Sign in and land on the dashboard
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> PageResult<Redirect> {
    state.authorize(View::Login).await?;
    validation::check(&credentials)?;

    let sign_in = state.identity.login(&credentials).await?;
    Ok(start_session(&state, sign_in).await?)
}

/// GET /register
pub async fn register_page(State(state): State<AppState>) -> PageResult<Json<RegisterPage>> {
    state.authorize(View::Register).await?;
    let banks = state.banks.list_banks().await?;
    Ok(Json(RegisterPage {
        view: View::Register,
        banks,
    }))
}

/// POST /register - Create the account and sign it in
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> PageResult<Redirect> {
    state.authorize(View::Register).await?;
    form.check().map_err(PortalError::from)?;

    let sign_in = state.identity.register(&form).await?;
    Ok(start_session(&state, sign_in).await?)
}

/// POST /logout - Always ends the local session, even if the backend call fails
pub async fn logout(State(state): State<AppState>) -> PageResult<Redirect> {
    if state.session.token().await.is_some() {
        if let Err(e) = state.identity.logout().await {
            tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
    }
    state.session.clear(ClearReason::SignedOut).await.map_err(PortalError::from)?;
    Ok(Redirect::to(View::Login.path()))
}
