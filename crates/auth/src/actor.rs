//! The authenticated identity and its profile.

use serde::{Deserialize, Serialize};

use wemakit_core::{ActorId, AuthId, DomainError, DomainResult, Entity};

use crate::{Role, RoleSet};

/// An authenticated actor (client, designer or admin).
///
/// # Invariants
/// - `email` looks like an address and `display_name` is not blank.
/// - `capacity` is only set for designers.
///
/// Owned by the session; replaced wholesale when the actor re-authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub auth_id: AuthId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Concurrent requests a designer can take on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl Actor {
    /// Minimal actor with only the required profile fields set.
    pub fn new(
        id: ActorId,
        auth_id: AuthId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            auth_id,
            email: email.into(),
            display_name: display_name.into(),
            role,
            company: None,
            website: None,
            avatar_url: None,
            capacity: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.email.contains('@') {
            return Err(DomainError::validation(format!("invalid email '{}'", self.email)));
        }
        if self.display_name.trim().is_empty() {
            return Err(DomainError::validation("display name must not be blank"));
        }
        if self.capacity.is_some() && self.role != Role::Designer {
            return Err(DomainError::invariant(format!(
                "capacity is designer-only (actor role is {})",
                self.role
            )));
        }
        Ok(())
    }

    /// Whether this actor's role is in the resource's declared role set.
    pub fn may_access(&self, allowed: &RoleSet) -> bool {
        allowed.contains(self.role)
    }
}

impl Entity for Actor {
    type Id = ActorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
