//! Authenticated identity and sign-out

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "nombreUsuario")]
    pub display_name: String,
    #[serde(rename = "rol", default)]
    pub role: Option<String>,
}

impl User {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            role: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    /// Read a session written by the login tooling
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read session {}", path.display()))?;
        let session: Session = serde_json::from_str(&content)
            .with_context(|| format!("parse session {}", path.display()))?;
        if session.token.trim().is_empty() {
            anyhow::bail!("session {} has an empty token", path.display());
        }
        Ok(session)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-out request failed: {0}")]
    Transport(String),
    #[error("sign-out endpoint returned {status}")]
    Status { status: u16 },
    #[error("could not remove session file: {0}")]
    Session(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutState {
    Active,
    Pending,
    SignedOut,
}

/// Read-only view of who is signed in, plus the sign-out handshake
#[derive(Debug)]
pub struct SessionGate {
    session: Session,
    source: Option<PathBuf>,
    state: SignOutState,
    pending: bool,
}

impl SessionGate {
    /// `source` is the file the session came from, removed on sign-out
    pub fn new(session: Session, source: Option<PathBuf>) -> Self {
        Self {
            session,
            source,
            state: SignOutState::Active,
            pending: false,
        }
    }

    pub fn current_user(&self) -> &User {
        &self.session.user
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SignOutState {
        self.state
    }

    /// Ask the auth collaborator to invalidate the session. Repeated calls
    /// while one is pending are ignored.
    pub fn sign_out(&mut self) -> bool {
        if self.state != SignOutState::Active {
            return false;
        }
        self.state = SignOutState::Pending;
        self.pending = true;
        tracing::info!(user = %self.session.user.display_name, "signing out");
        true
    }

    pub fn take_sign_out_request(&mut self) -> Option<Session> {
        if self.pending {
            self.pending = false;
            Some(self.session.clone())
        } else {
            None
        }
    }

    /// Finish sign-out once the remote call settled. The local session is
    /// cleared either way so the dashboard can be left.
    pub fn complete_sign_out(&mut self) -> Result<(), AuthError> {
        self.state = SignOutState::SignedOut;
        self.session.token.clear();
        let Some(path) = self.source.as_ref() else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Session(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "abc".into(),
            user: User::named("ana"),
        }
    }

    #[test]
    fn test_load_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"token":"t-1","user":{"nombreUsuario":"prof.ana","rol":"profesor"}}"#,
        )
        .unwrap();
        let session = Session::load(&path).unwrap();
        assert_eq!(session.token, "t-1");
        assert_eq!(session.user.display_name, "prof.ana");
        assert_eq!(session.user.role.as_deref(), Some("profesor"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token":" ","user":{"nombreUsuario":"x"}}"#).unwrap();
        assert!(Session::load(&path).is_err());
    }

    #[test]
    fn test_sign_out_handshake() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();

        let mut gate = SessionGate::new(session(), Some(path.clone()));
        assert!(gate.sign_out());
        assert!(!gate.sign_out());
        assert_eq!(gate.state(), SignOutState::Pending);
        assert_eq!(gate.take_sign_out_request().map(|s| s.token), Some("abc".into()));
        assert!(gate.take_sign_out_request().is_none());

        gate.complete_sign_out().unwrap();
        assert_eq!(gate.state(), SignOutState::SignedOut);
        assert!(!path.exists());
        assert!(gate.session().token.is_empty());
    }

    #[test]
    fn test_complete_without_file() {
        let mut gate = SessionGate::new(session(), None);
        gate.sign_out();
        assert!(gate.complete_sign_out().is_ok());
        assert_eq!(gate.current_user().display_name, "ana");
    }
}
