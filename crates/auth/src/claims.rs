//! Signed session tokens (HS256) and the identity backend that verifies them.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wemakit_core::{ActorId, AuthId};

use crate::{AccessToken, Actor, IdentityBackend, IdentityError, Role};

/// Session token claims.
///
/// Carries the actor profile so a verified token is enough to rebuild the
/// session without another backend round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// External identity reference.
    pub sub: AuthId,
    pub actor_id: ActorId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl SessionClaims {
    pub fn for_actor(actor: &Actor, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: actor.auth_id.clone(),
            actor_id: actor.id,
            email: actor.email.clone(),
            name: actor.display_name.clone(),
            role: actor.role,
            company: actor.company.clone(),
            website: actor.website.clone(),
            avatar_url: actor.avatar_url.clone(),
            capacity: actor.capacity,
            iat: issued_at,
            exp: issued_at + ttl,
        }
    }

    pub fn into_actor(self) -> Actor {
        Actor {
            id: self.actor_id,
            auth_id: self.sub,
            email: self.email,
            display_name: self.name,
            role: self.role,
            company: self.company,
            website: self.website,
            avatar_url: self.avatar_url,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claims' time window.
///
/// Signature verification happens before this, in [`JwtIdentityBackend`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Identity backend over HS256-signed session tokens.
///
/// A token that fails verification is "no session", not a backend failure.
/// Signing out revokes the token for the lifetime of this backend.
pub struct JwtIdentityBackend {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    revoked: RwLock<HashSet<String>>,
}

impl JwtIdentityBackend {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims`, against our own clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            revoked: RwLock::new(HashSet::new()),
        }
    }

    /// Issue a token for `actor`, valid for `ttl` from now.
    pub fn mint(&self, actor: &Actor, ttl: Duration) -> Result<AccessToken, IdentityError> {
        actor.validate()?;
        let claims = SessionClaims::for_actor(actor, Utc::now(), ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))
    }

    /// Verify signature, revocation and time window; `None` for any rejection.
    pub fn verify(&self, token: &AccessToken, now: DateTime<Utc>) -> Result<Option<Actor>, IdentityError> {
        if self.is_revoked(token) {
            tracing::debug!("session token revoked");
            return Ok(None);
        }

        let data = match jsonwebtoken::decode::<SessionClaims>(token.as_str(), &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                return Ok(None);
            }
        };

        if let Err(e) = validate_claims(&data.claims, now) {
            tracing::debug!(error = %e, "session token outside its validity window");
            return Ok(None);
        }

        let actor = data.claims.into_actor();
        actor.validate()?;
        Ok(Some(actor))
    }

    fn is_revoked(&self, token: &AccessToken) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(token.as_str())
    }
}

#[async_trait::async_trait]
impl IdentityBackend for JwtIdentityBackend {
    async fn check_session(&self, token: &AccessToken) -> Result<Option<Actor>, IdentityError> {
        self.verify(token, Utc::now())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityError> {
        self.revoked
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn designer() -> Actor {
        Actor::new(ActorId::new(), AuthId::new("auth|d1"), "dev@studio.test", "Devi", Role::Designer)
            .with_capacity(5)
    }

    #[test]
    fn claims_window_checks() {
        let now = Utc::now();
        let claims = SessionClaims::for_actor(&designer(), now, Duration::minutes(10));

        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(10)),
            Err(TokenValidationError::Expired)
        );

        let inverted = SessionClaims::for_actor(&designer(), now, Duration::minutes(-1));
        assert_eq!(validate_claims(&inverted, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn minted_token_verifies_back_to_actor() {
        let backend = JwtIdentityBackend::new(b"test-secret");
        let actor = designer();
        let token = backend.mint(&actor, Duration::minutes(5)).unwrap();

        let resolved = backend.verify(&token, Utc::now()).unwrap();
        assert_eq!(resolved, Some(actor));
    }

    #[test]
    fn wrong_secret_and_garbage_resolve_to_no_session() {
        let issuer = JwtIdentityBackend::new(b"issuer-secret");
        let verifier = JwtIdentityBackend::new(b"other-secret");
        let token = issuer.mint(&designer(), Duration::minutes(5)).unwrap();

        assert_eq!(verifier.verify(&token, Utc::now()).unwrap(), None);
        assert_eq!(verifier.verify(&AccessToken::new("not.a.jwt"), Utc::now()).unwrap(), None);
    }

    #[test]
    fn expired_token_resolves_to_no_session() {
        let backend = JwtIdentityBackend::new(b"test-secret");
        let token = backend.mint(&designer(), Duration::minutes(1)).unwrap();

        let later = Utc::now() + Duration::minutes(2);
        assert_eq!(backend.verify(&token, later).unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_revokes_token() {
        let backend = JwtIdentityBackend::new(b"test-secret");
        let token = backend.mint(&designer(), Duration::minutes(5)).unwrap();

        assert!(backend.check_session(&token).await.unwrap().is_some());
        backend.sign_out(&token).await.unwrap();
        assert!(backend.check_session(&token).await.unwrap().is_none());
    }
}
