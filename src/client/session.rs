//! Signed-in user state shared by every request a client makes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::gate::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl UserProfile {
    pub fn is_host(&self) -> bool {
        matches!(self.role, UserRole::Host | UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store holds invalid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Cheap to clone; clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Option<PathBuf>,
}

impl SessionContext {
    /// A context that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restores the session persisted at `path`, if any. A missing file
    /// yields a signed-out context; an unreadable one is discarded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let restored = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => Some(session),
                Err(e) => {
                    log::warn!("Discarding unreadable session at {}: {}", path.display(), e);
                    remove_if_present(&path)?;
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            current: Arc::new(RwLock::new(restored)),
            store: Some(path),
        })
    }

    pub fn sign_in(&self, session: Session) -> Result<(), SessionError> {
        self.persist(Some(&session))?;
        log::info!("Signed in as {}", session.user.email);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Replaces the profile of the signed-in user, keeping the token.
    pub fn update_user(&self, user: UserProfile) -> Result<(), SessionError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            session.user = user;
            self.persist(Some(&*session))?;
        }
        Ok(())
    }

    /// Signs out locally and forgets the persisted session.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.persist(None)
    }

    /// Clears the session only while it still holds `token`, so a rejection
    /// of an older token leaves a newer sign-in alone. Returns whether the
    /// session was cleared.
    pub fn clear_if_token(&self, token: Option<&str>) -> Result<bool, SessionError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let held = guard.as_ref().map(|s| s.token.as_str());
        if held.is_none() || held != token {
            return Ok(false);
        }
        guard.take();
        self.persist(None)?;
        Ok(true)
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.current().map(|s| s.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn persist(&self, session: Option<&Session>) -> Result<(), SessionError> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        match session {
            Some(session) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                std::fs::write(path, serde_json::to_vec_pretty(session)?)?;
            }
            None => remove_if_present(path)?,
        }
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), SessionError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
