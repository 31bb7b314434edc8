//! Role-gated view access
//!
//! A plain allow-list per view. No role hierarchy: owners are not implicitly
//! admins, every view names the roles it accepts.

use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use crate::models::Role;

/// The identity facts access decisions are made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Option<Role>,
}

impl Actor {
    pub fn guest() -> Self {
        Self { role: None }
    }

    pub fn signed_in(role: Role) -> Self {
        Self { role: Some(role) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.role.is_some()
    }
}

/// Who a view is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Signed-out visitors only (sign-in, registration)
    Guests,
    /// Any signed-in role
    Authenticated,
    Roles(&'static [Role]),
}

/// Every gated page of the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Register,
    Dashboard,
    Profile,
    MyLoans,
    LoanDetail,
    ApplyLoan,
    ReviewLoans,
    Banks,
    Users,
    AuditLog,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::Profile => "/profile",
            View::MyLoans => "/loans",
            View::LoanDetail => "/loans/:id",
            View::ApplyLoan => "/loans/apply",
            View::ReviewLoans => "/admin/loans",
            View::Banks => "/admin/banks",
            View::Users => "/admin/users",
            View::AuditLog => "/admin/audit-logs",
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            View::Login | View::Register => Audience::Guests,
            View::Dashboard | View::Profile | View::MyLoans => Audience::Authenticated,
            View::LoanDetail => Audience::Roles(&[Role::Customer, Role::Admin, Role::Owner]),
            View::ApplyLoan => Audience::Roles(&[Role::Customer]),
            View::ReviewLoans => Audience::Roles(&[Role::Admin, Role::Owner]),
            View::Banks | View::Users | View::AuditLog => Audience::Roles(&[Role::Owner]),
        }
    }
}

/// Why the actor is sent elsewhere instead of seeing the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    SignInRequired,
    /// Silent downgrade to the landing page, not an error page
    RoleNotAllowed,
    AlreadySignedIn,
}

impl RedirectReason {
    pub fn target(&self) -> &'static str {
        match self {
            RedirectReason::SignInRequired => View::Login.path(),
            RedirectReason::RoleNotAllowed | RedirectReason::AlreadySignedIn => {
                View::Dashboard.path()
            }
        }
    }
}

impl IntoResponse for RedirectReason {
    fn into_response(self) -> Response {
        tracing::debug!(reason = ?self, target = self.target(), "Redirecting");
        Redirect::to(self.target()).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(Actor),
    Redirect(RedirectReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }
}

/// Decides whether `actor` may open `view`.
pub fn check(view: View, actor: &Actor) -> AccessDecision {
    match (view.audience(), actor.role) {
        (Audience::Guests, None) => AccessDecision::Granted(*actor),
        (Audience::Guests, Some(_)) => AccessDecision::Redirect(RedirectReason::AlreadySignedIn),
        (_, None) => AccessDecision::Redirect(RedirectReason::SignInRequired),
        (Audience::Authenticated, Some(_)) => AccessDecision::Granted(*actor),
        (Audience::Roles(allowed), Some(role)) if allowed.contains(&role) => {
            AccessDecision::Granted(*actor)
        }
        (Audience::Roles(_), Some(_)) => AccessDecision::Redirect(RedirectReason::RoleNotAllowed),
    }
}
