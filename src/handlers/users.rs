//! User administration (owner)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::PageResult;
use crate::access::View;
use crate::error::PortalError;
use crate::models::{UserId, UserUpdate};
use crate::state::AppState;
use crate::validation;
use crate::views::{UserListView, UserRow};

/// GET /admin/users
pub async fn list_users(State(state): State<AppState>) -> PageResult<Json<UserListView>> {
    state.authorize(View::Users).await?;
    let users = state.users.list_users().await?;
    Ok(Json(UserListView::build(&users)))
}

/// PUT /admin/users/:id - The password is only sent when one was typed
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> PageResult<Json<UserRow>> {
    state.authorize(View::Users).await?;
    let update = update.normalized();
    validation::check(&update)?;

    let user = state.users.update_user(id, &update).await?;
    tracing::info!(user_id = id, role = user.role.as_str(), "User updated");
    Ok(Json(UserRow::from(&user)))
}

/// DELETE /admin/users/:id - Owners cannot delete their own account
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> PageResult<StatusCode> {
    state.authorize(View::Users).await?;
    let own_id = state.session.current().await.map(|session| session.user.id);
    if own_id == Some(id) {
        return Err(PortalError::Rejected("You cannot delete your own account".to_string()).into());
    }

    state.users.delete_user(id).await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
