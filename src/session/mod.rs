//! Process-wide session store
//!
//! Holds the bearer token and the signed-in user for the whole portal. The
//! store has an explicit lifecycle: [`SessionStore::init`] restores a saved
//! session at start-up, [`SessionStore::establish`] records a sign-in and
//! [`SessionStore::clear`] drops it (sign-out, or any `401` from the
//! lending API). Every change is announced on a broadcast channel.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use crate::access::Actor;
use crate::error::PortalError;
use crate::models::{Role, User, UserId};

/// Session persistence errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<SessionError> for PortalError {
    fn from(err: SessionError) -> Self {
        PortalError::Internal(err.to_string())
    }
}

/// The part of the user kept with the token. KYC fields are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    SignedOut,
    Expired,
}

impl ClearReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearReason::SignedOut => "signed_out",
            ClearReason::Expired => "expired",
        }
    }
}

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Restored { user_id: UserId, role: Role },
    SignedIn { user_id: UserId, role: Role },
    Updated { user_id: UserId, role: Role },
    Cleared { reason: ClearReason },
}

/// Shared, cloneable handle to the current session
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<SessionEvent>,
    file: Option<PathBuf>,
}

impl SessionStore {
    /// Store backed by a JSON file (client-side storage)
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self::with_file(Some(path.into()))
    }

    /// Store that forgets everything on exit
    pub fn in_memory() -> Self {
        Self::with_file(None)
    }

    fn with_file(file: Option<PathBuf>) -> Self {
        let (events, _rx) = broadcast::channel(32);
        Self {
            current: Arc::new(RwLock::new(None)),
            events,
            file,
        }
    }

    /// Restores a saved session, if there is one.
    ///
    /// A missing file means "signed out". An unreadable or corrupt file is
    /// discarded with a warning rather than blocking start-up.
    pub async fn init(&self) -> Result<Option<SessionUser>, SessionError> {
        let Some(path) = &self.file else {
            return Ok(None);
        };

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let session: Session = match serde_json::from_slice(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Discarding corrupt session file"
                );
                self.remove_file().await?;
                return Ok(None);
            }
        };

        let user = session.user.clone();
        *self.current.write().await = Some(session);
        self.notify(SessionEvent::Restored {
            user_id: user.id,
            role: user.role,
        });
        Ok(Some(user))
    }

    /// Records a successful sign-in
    pub async fn establish(&self, token: String, user: &User) -> Result<(), SessionError> {
        let session = Session {
            token,
            user: SessionUser::from(user),
        };
        self.save(&session).await?;
        *self.current.write().await = Some(session);
        self.notify(SessionEvent::SignedIn {
            user_id: user.id,
            role: user.role,
        });
        Ok(())
    }

    /// Refreshes the stored user after a profile fetch. No-op when signed out.
    pub async fn update_user(&self, user: &User) -> Result<(), SessionError> {
        let updated = {
            let mut current = self.current.write().await;
            match current.as_mut() {
                Some(session) => {
                    session.user = SessionUser::from(user);
                    Some(session.clone())
                }
                None => None,
            }
        };

        if let Some(session) = updated {
            self.save(&session).await?;
            self.notify(SessionEvent::Updated {
                user_id: user.id,
                role: user.role,
            });
        }
        Ok(())
    }

    /// Drops the session. Clearing an empty store is a no-op.
    pub async fn clear(&self, reason: ClearReason) -> Result<(), SessionError> {
        let previous = self.current.write().await.take();
        if previous.is_none() {
            return Ok(());
        }
        self.remove_file().await?;
        self.notify(SessionEvent::Cleared { reason });
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Identity as seen by the access checks
    pub async fn actor(&self) -> Actor {
        match self.current.read().await.as_ref() {
            Some(session) => Actor::signed_in(session.user.role),
            None => Actor::guest(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No session subscribers");
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let io_error = |source| SessionError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let raw = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(path, raw).await.map_err(io_error)?;
        Ok(())
    }

    async fn remove_file(&self) -> Result<(), SessionError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
