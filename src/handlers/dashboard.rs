//! Dashboard and profile

use axum::{extract::State, Json};

use super::PageResult;
use crate::access::View;
use crate::error::PortalError;
use crate::state::AppState;
use crate::views::{DashboardView, ProfileView};

/// GET /dashboard - Menu for the signed-in role
pub async fn dashboard(State(state): State<AppState>) -> PageResult<Json<DashboardView>> {
    state.authorize(View::Dashboard).await?;
    let session = state
        .session
        .current()
        .await
        .ok_or(PortalError::SessionExpired)?;
    Ok(Json(DashboardView::build(&session.user.name, session.user.role)))
}

/// GET /profile - Fresh copy of the account from the backend
pub async fn profile(State(state): State<AppState>) -> PageResult<Json<ProfileView>> {
    state.authorize(View::Profile).await?;
    let user = state.identity.current_user().await?;
    state
        .session
        .update_user(&user)
        .await
        .map_err(PortalError::from)?;
    Ok(Json(ProfileView::from(user)))
}
