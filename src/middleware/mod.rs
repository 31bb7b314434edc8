//! Middleware for the loan portal
//!
//! Request tracing and security headers. Access gating is not middleware:
//! each handler asks [`crate::state::AppState::authorize`] for its view.

mod security;
mod tracing;

pub use security::security_headers;
pub use self::tracing::{request_tracing, REQUEST_ID_HEADER};
