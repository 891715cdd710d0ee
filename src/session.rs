//! Authenticated session: bearer token plus the logged-in user's profile,
//! mirrored to a JSON file so a restart resumes where login left off.
//!
//! There is no ambient global here; callers construct a [`SessionStore`] from
//! config, load or establish a [`Session`], and pass it down explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: String, user: User) -> Self {
        Self { token, user }
    }

    /// Value for the `Authorization` header on every API call.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// On-disk mirror of the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, if any. An unreadable or stale file is
    /// treated the same as no session at all.
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!("Discarding unreadable session file: {}", err);
                None
            }
        }
    }

    /// Persist the session established at login.
    pub fn save(&self, session: &Session) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        tracing::debug!("Session saved for {}", session.user.email);
        Ok(())
    }

    /// Teardown: remove the mirror. Called on logout and whenever the backend
    /// answers 401.
    pub fn clear(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Load the session or explain how to get one.
    pub fn require(&self) -> ApiResult<Session> {
        self.load().ok_or_else(|| {
            ApiError::Unauthenticated("no active session, run `labtrack login` first".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_session() -> Session {
        Session::new(
            "token-123".to_string(),
            User {
                id: 1,
                name: "Test User".to_string(),
                email: "user@example.com".to_string(),
                role: Role::CompanyUser,
                company_id: Some(10),
                company_name: None,
                department_id: None,
                department_name: None,
                phone: None,
                active: true,
            },
        )
    }

    #[test]
    fn test_save_load_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        assert!(store.load().is_none());

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "token-123");
        assert_eq!(loaded.user.role, Role::CompanyUser);
        assert_eq!(loaded.auth_header(), "Bearer token-123");

        store.clear().unwrap();
        assert!(store.load().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_treated_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = SessionStore::new(path);
        assert!(store.load().is_none());
        assert!(store.require().is_err());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested/dir/session.json"));
        store.save(&sample_session()).unwrap();
        assert!(store.load().is_some());
    }
}
