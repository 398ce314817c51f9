//! Identity backend boundary.
//!
//! The hosted identity service is opaque to this crate: it is reached only
//! through [`IdentityBackend`].

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wemakit_core::DomainError;

use crate::Actor;

/// Credential presented by a client session (bearer token).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens stay out of logs.
impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid actor profile: {0}")]
    Profile(#[from] DomainError),
}

/// Identity service contract.
///
/// `Ok(None)` means "no valid session for this token"; `Err` means the
/// backend could not answer.
#[async_trait::async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn check_session(&self, token: &AccessToken) -> Result<Option<Actor>, IdentityError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityError>;
}

/// In-memory identity backend (dev/test).
///
/// Tokens map directly to actors; signing out revokes the token.
#[derive(Debug, Default)]
pub struct InMemoryIdentityBackend {
    sessions: RwLock<HashMap<AccessToken, Actor>>,
    failure: RwLock<Option<String>>,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryIdentityBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `actor`, validating its profile first.
    pub fn insert(&self, token: AccessToken, actor: Actor) -> Result<(), IdentityError> {
        actor.validate()?;
        write(&self.sessions).insert(token, actor);
        Ok(())
    }

    pub fn is_active(&self, token: &AccessToken) -> bool {
        read(&self.sessions).contains_key(token)
    }

    /// Make every call fail with `Unavailable(reason)` until cleared.
    pub fn fail_with(&self, reason: Option<String>) {
        *write(&self.failure) = reason;
    }

    /// Delay every `check_session` call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *write(&self.latency) = latency;
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        match read(&self.failure).as_ref() {
            Some(reason) => Err(IdentityError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IdentityBackend for InMemoryIdentityBackend {
    async fn check_session(&self, token: &AccessToken) -> Result<Option<Actor>, IdentityError> {
        let latency = *read(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check_available()?;
        Ok(read(&self.sessions).get(token).cloned())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityError> {
        self.check_available()?;
        write(&self.sessions).remove(token);
        Ok(())
    }
}

// A poisoned lock only means another thread panicked mid-write of a plain map;
// the data is still usable.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
