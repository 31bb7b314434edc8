//! Application state shared across handlers

use std::sync::Arc;

use crate::access::{check, AccessDecision, Actor, RedirectReason, View};
use crate::client::{
    ApiClient, AuditTrail, BankDirectory, IdentityProvider, LoanDataSource, UserDirectory,
};
use crate::session::SessionStore;

/// Shared application state
///
/// Every collaborator sits behind a trait object so the router can run
/// against the real lending API or against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub loans: Arc<dyn LoanDataSource>,
    pub identity: Arc<dyn IdentityProvider>,
    pub banks: Arc<dyn BankDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub audit: Arc<dyn AuditTrail>,
    pub session: SessionStore,
}

impl AppState {
    pub fn new(
        loans: Arc<dyn LoanDataSource>,
        identity: Arc<dyn IdentityProvider>,
        banks: Arc<dyn BankDirectory>,
        users: Arc<dyn UserDirectory>,
        audit: Arc<dyn AuditTrail>,
        session: SessionStore,
    ) -> Self {
        Self {
            loans,
            identity,
            banks,
            users,
            audit,
            session,
        }
    }

    /// Wires every collaborator to the one API client
    pub fn from_client(client: ApiClient) -> Self {
        let session = client.session().clone();
        let client = Arc::new(client);
        Self::new(
            client.clone(),
            client.clone(),
            client.clone(),
            client.clone(),
            client,
            session,
        )
    }

    /// Access check for `view` against the current session
    pub async fn authorize(&self, view: View) -> Result<Actor, RedirectReason> {
        let actor = self.session.actor().await;
        match check(view, &actor) {
            AccessDecision::Granted(actor) => Ok(actor),
            AccessDecision::Redirect(reason) => {
                tracing::debug!(view = view.path(), ?reason, "Access denied");
                Err(reason)
            }
        }
    }
}
