//! Page handlers for the loan portal
//!
//! Every gated handler starts with `state.authorize(View::..)`; a refused
//! check becomes a redirect, anything else that fails becomes a
//! [`PortalError`] response.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::access::RedirectReason;
use crate::error::PortalError;
use crate::state::AppState;

pub mod audit;
pub mod auth;
pub mod banks;
pub mod dashboard;
pub mod loans;
pub mod review;
pub mod users;

/// Why a page was not rendered
#[derive(Debug)]
pub enum PageRejection {
    Redirect(RedirectReason),
    Error(PortalError),
}

impl From<RedirectReason> for PageRejection {
    fn from(reason: RedirectReason) -> Self {
        PageRejection::Redirect(reason)
    }
}

impl From<PortalError> for PageRejection {
    fn from(err: PortalError) -> Self {
        PageRejection::Error(err)
    }
}

impl IntoResponse for PageRejection {
    fn into_response(self) -> Response {
        match self {
            PageRejection::Redirect(reason) => reason.into_response(),
            PageRejection::Error(err) => err.into_response(),
        }
    }
}

pub type PageResult<T> = Result<T, PageRejection>;

/// GET / - Send visitors to their landing page
pub async fn root() -> Redirect {
    Redirect::to("/dashboard")
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    signed_in: bool,
    version: &'static str,
}

/// GET /health - Portal liveness (does not call the lending API)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        signed_in: state.session.actor().await.is_authenticated(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
