//! Client for the remote lending API
//!
//! [`ApiClient`] is the only component that talks to the backend. It
//! implements each collaborator trait the portal depends on
//! ([`LoanDataSource`], [`IdentityProvider`], [`BankDirectory`],
//! [`UserDirectory`], [`AuditTrail`]), so handlers can be exercised against
//! in-memory fakes.
//!
//! Every call is a single request/response: no retries, no backoff. A `401`
//! on an authenticated call clears the process-wide session.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PortalError, PortalResult};
use crate::session::{ClearReason, SessionStore};

mod audit;
mod banks;
mod identity;
mod loans;
mod users;

pub use audit::AuditTrail;
pub use banks::BankDirectory;
pub use identity::IdentityProvider;
pub use loans::LoanDataSource;
pub use users::UserDirectory;

/// Error body produced by the backend on failures
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Value>,
}

impl ApiErrorBody {
    fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }

    /// First message per field; the backend sends either a list or a string
    fn fields(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .filter_map(|(field, value)| {
                let message = match value {
                    Value::Array(items) => items.first().and_then(Value::as_str),
                    Value::String(message) => Some(message.as_str()),
                    _ => None,
                }?;
                Some((field.clone(), message.to_string()))
            })
            .collect()
    }
}

/// Who a request is sent as
#[derive(Debug, Clone, Copy)]
enum Credentials<'a> {
    /// Whatever the session holds, if anything
    Session,
    /// A token that is not (yet) in the session
    Token(&'a str),
    /// No token at all (sign-in, registration)
    Anonymous,
}

/// HTTP client for the lending API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: SessionStore) -> PortalResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PortalError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        self.call(Method::GET, path, None::<&()>, Credentials::Session)
            .await
    }

    async fn get_query<Q, T>(&self, path: &str, query: &Q) -> PortalResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.get(self.url(path)).query(query);
        let raw = self
            .execute(Method::GET, path, builder, Credentials::Session)
            .await?;
        decode(&raw)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> PortalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(method, path, Some(body), Credentials::Session)
            .await
    }

    /// Call whose response body is irrelevant (deletes, logout)
    async fn send_empty(&self, method: Method, path: &str) -> PortalResult<()> {
        let builder = self.http.request(method.clone(), self.url(path));
        self.execute(method, path, builder, Credentials::Session)
            .await
            .map(|_| ())
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credentials: Credentials<'_>,
    ) -> PortalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let raw = self.execute(method, path, builder, credentials).await?;
        decode(&raw)
    }

    /// Sends the request and maps any failure into the portal's error taxonomy.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
        credentials: Credentials<'_>,
    ) -> PortalResult<String> {
        let token = match credentials {
            Credentials::Session => self.session.token().await,
            Credentials::Token(token) => Some(token.to_string()),
            Credentials::Anonymous => None,
        };
        let authenticated = token.is_some();
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Lending API request failed");
            PortalError::from(e)
        })?;

        let status = response.status();
        let raw = response.text().await.map_err(PortalError::from)?;
        tracing::debug!(%method, path, status = status.as_u16(), "Lending API call");

        if status.is_success() {
            return Ok(raw);
        }

        tracing::warn!(%method, path, status = status.as_u16(), "Lending API refused request");
        let body = ApiErrorBody::parse(&raw);

        if status == StatusCode::UNAUTHORIZED && authenticated {
            if matches!(credentials, Credentials::Session) {
                self.session.clear(ClearReason::Expired).await?;
            }
            return Err(PortalError::SessionExpired);
        }

        Err(map_status(status, &body))
    }
}

/// Builds an absolute API path from raw segments, percent-encoding each one.
///
/// Segments come from page URLs, already decoded: a `/`, `?` or `%` in one
/// is escaped, and `.`/`..`/blank segments are refused outright.
pub(crate) fn encoded_path(segments: &[&str]) -> PortalResult<String> {
    if let Some(bad) = segments
        .iter()
        .find(|segment| matches!(segment.trim(), "" | "." | ".."))
    {
        return Err(PortalError::Rejected(format!(
            "Invalid identifier '{}'",
            bad
        )));
    }

    let mut url = Url::parse("http://localhost/")
        .map_err(|e| PortalError::Internal(format!("Failed to build API path: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| PortalError::Internal("Failed to build API path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

fn map_status(status: StatusCode, body: &ApiErrorBody) -> PortalError {
    let message = body.message();
    match status {
        StatusCode::UNAUTHORIZED => {
            PortalError::Rejected(message.unwrap_or_else(|| "Invalid credentials".to_string()))
        }
        StatusCode::FORBIDDEN => PortalError::Forbidden(
            message.unwrap_or_else(|| "You are not allowed to do that".to_string()),
        ),
        StatusCode::NOT_FOUND => {
            PortalError::NotFound(message.unwrap_or_else(|| "Not found".to_string()))
        }
        StatusCode::UNPROCESSABLE_ENTITY => PortalError::Validation {
            message: message.unwrap_or_else(|| "The given data was invalid".to_string()),
            fields: body.fields(),
        },
        s if s.is_client_error() => PortalError::Rejected(
            message.unwrap_or_else(|| format!("Request rejected ({})", s.as_u16())),
        ),
        s => PortalError::Upstream(
            message.unwrap_or_else(|| format!("Lending service returned {}", s.as_u16())),
        ),
    }
}

/// Decodes a success body that may or may not be wrapped in `{ data, message }`.
///
/// The `data` member wins when it has the expected shape; otherwise the body
/// is read as the payload itself (which also covers paginated listings whose
/// own `data` member is part of the payload).
fn decode<T: DeserializeOwned>(raw: &str) -> PortalResult<T> {
    let value: Value = if raw.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(raw)?
    };

    if let Some(data) = value.get("data") {
        if let Ok(payload) = T::deserialize(data) {
            return Ok(payload);
        }
    }
    T::deserialize(&value).map_err(PortalError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Loan, Paginated};

    const LOAN: &str = r#"{
        "id": 1, "user_id": 2, "nominal": "1000000", "rentang": "3 Bulan", "status": "pending"
    }"#;

    #[test]
    fn test_encoded_path_escapes_segments() {
        assert_eq!(encoded_path(&["api", "bank", "014"]).unwrap(), "/api/bank/014");
        assert_eq!(
            encoded_path(&["api", "bank", "../users"]).unwrap(),
            "/api/bank/..%2Fusers"
        );
        assert_eq!(
            encoded_path(&["api", "audit-logs", "entity", "loan?x=1", "3"]).unwrap(),
            "/api/audit-logs/entity/loan%3Fx=1/3"
        );
        assert!(matches!(
            encoded_path(&["api", "bank", ".."]),
            Err(PortalError::Rejected(_))
        ));
        assert!(encoded_path(&["api", "bank", " "]).is_err());
    }

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare: Loan = decode(LOAN).unwrap();
        assert_eq!(bare.id, 1);

        let wrapped: Loan =
            decode(&format!(r#"{{"data": {}, "message": "ok"}}"#, LOAN)).unwrap();
        assert_eq!(wrapped.id, 1);

        let list: Vec<Loan> = decode(&format!(r#"{{"data": [{}]}}"#, LOAN)).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_decode_paginated_keeps_its_own_data() {
        let page: Paginated<Loan> = decode(&format!(
            r#"{{"data": [{}], "current_page": 1, "last_page": 3, "per_page": 15, "total": 31}}"#,
            LOAN
        ))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 31);
    }

    #[test]
    fn test_decode_garbage_is_upstream_error() {
        let result: PortalResult<Loan> = decode("<html>oops</html>");
        assert!(matches!(result, Err(PortalError::Upstream(_))));
    }

    #[test]
    fn test_map_status() {
        let body = ApiErrorBody::parse(
            r#"{
                "message": "The given data was invalid.",
                "errors": {"nominal": ["Nominal wajib diisi"], "rentang": "Rentang tidak valid"}
            }"#,
        );
        match map_status(StatusCode::UNPROCESSABLE_ENTITY, &body) {
            PortalError::Validation { message, fields } => {
                assert_eq!(message, "The given data was invalid.");
                assert_eq!(fields["nominal"], "Nominal wajib diisi");
                assert_eq!(fields["rentang"], "Rentang tidak valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let body = ApiErrorBody::parse(r#"{"message": "Pinjaman sudah diproses"}"#);
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, &body),
            PortalError::Rejected(m) if m == "Pinjaman sudah diproses"
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, &ApiErrorBody::default()),
            PortalError::Forbidden(_)
        ));
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, &ApiErrorBody::parse("boom")),
            PortalError::Upstream(_)
        ));
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, &ApiErrorBody::default()),
            PortalError::Rejected(m) if m == "Invalid credentials"
        ));
    }
}
