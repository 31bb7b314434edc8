use axum::async_trait;
use reqwest::Method;

use super::{ApiClient, Credentials};
use crate::error::{PortalError, PortalResult};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, SignIn, User};

/// Who is signed in, and how to sign in or out
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> PortalResult<User>;

    async fn login(&self, credentials: &LoginRequest) -> PortalResult<SignIn>;

    /// Creates the account and signs it in
    async fn register(&self, form: &RegisterRequest) -> PortalResult<SignIn>;

    /// Revokes the token on the backend. Local session state is the caller's.
    async fn logout(&self) -> PortalResult<()>;
}

impl ApiClient {
    /// Turns a login/register response into a sign-in, fetching the user
    /// with the new token when the response left it out.
    async fn complete_sign_in(&self, response: LoginResponse) -> PortalResult<SignIn> {
        let token = response
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| PortalError::Upstream("Sign-in response carried no token".to_string()))?;

        let user = match response.user {
            Some(user) => user,
            None => {
                self.call(
                    Method::GET,
                    "/auth/me",
                    None::<&()>,
                    Credentials::Token(&token),
                )
                .await?
            }
        };

        Ok(SignIn { user, token })
    }
}

#[async_trait]
impl IdentityProvider for ApiClient {
    async fn current_user(&self) -> PortalResult<User> {
        self.get("/auth/me").await
    }

    async fn login(&self, credentials: &LoginRequest) -> PortalResult<SignIn> {
        let response: LoginResponse = self
            .call(
                Method::POST,
                "/auth/login",
                Some(credentials),
                Credentials::Anonymous,
            )
            .await?;
        self.complete_sign_in(response).await
    }

    async fn register(&self, form: &RegisterRequest) -> PortalResult<SignIn> {
        let response: LoginResponse = self
            .call(
                Method::POST,
                "/auth/register",
                Some(form),
                Credentials::Anonymous,
            )
            .await?;
        self.complete_sign_in(response).await
    }

    async fn logout(&self) -> PortalResult<()> {
        self.send_empty(Method::POST, "/auth/logout").await
    }
}
