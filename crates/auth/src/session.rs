//! Opaque session tokens and the resolution boundary.
//!
//! Tokens are opaque strings: nothing in this system inspects their contents.
//! The transport layer hands a bearer token to a [`SessionValidator`] and gets
//! back the [`Actor`] it belongs to, or an error.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::actor::Actor;

/// An opaque session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Token unknown, expired, or revoked. Indistinguishable on purpose.
    #[error("invalid session token")]
    InvalidToken,
}

/// Resolve an opaque token into the actor it identifies.
///
/// Implementations are the authentication collaborator (session table, SSO,
/// whatever). The core only needs this one method.
pub trait SessionValidator: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Actor, SessionError>;
}

/// In-memory token registry for dev and tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Actor>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `actor` and return its freshly minted token.
    pub fn issue(&self, actor: Actor) -> SessionToken {
        let token = Uuid::now_v7().simple().to_string();
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(token.clone(), actor);
        SessionToken::new(token)
    }

    /// Register a session under a caller-chosen token (dev bootstrap).
    pub fn issue_with_token(&self, token: impl Into<String>, actor: Actor) -> SessionToken {
        let token = token.into();
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(token.clone(), actor);
        SessionToken::new(token)
    }

    pub fn revoke(&self, token: &str) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(token);
    }
}

impl SessionValidator for InMemorySessionStore {
    fn resolve(&self, token: &str) -> Result<Actor, SessionError> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(token)
            .copied()
            .ok_or(SessionError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use stackassign_core::UserId;

    #[test]
    fn issued_token_resolves_to_actor() {
        let store = InMemorySessionStore::new();
        let actor = Actor::customer(UserId::new());

        let token = store.issue(actor);
        let resolved = store.resolve(token.as_str()).unwrap();

        assert_eq!(resolved, actor);
        assert_eq!(resolved.role, Role::Customer);
    }

    #[test]
    fn unknown_token_is_rejected() {
        let store = InMemorySessionStore::new();
        assert_eq!(
            store.resolve("nope").unwrap_err(),
            SessionError::InvalidToken
        );
    }

    #[test]
    fn revoked_token_stops_resolving() {
        let store = InMemorySessionStore::new();
        let token = store.issue(Actor::admin(UserId::new()));

        store.revoke(token.as_str());

        assert!(store.resolve(token.as_str()).is_err());
    }
}
