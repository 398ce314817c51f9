use serde::{Serialize, ser::SerializeStruct};

use crate::{Actor, Role};

/// Authentication state of the current session.
///
/// While `Loading`, neither `is_authenticated` nor `user` is authoritative and
/// nothing may be gated on them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// Identity check not finished yet.
    #[default]
    Loading,
    Authenticated(Actor),
    Unauthenticated,
}

impl Session {
    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&Actor> {
        match self {
            Session::Authenticated(actor) => Some(actor),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|a| a.role)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Session::Loading => "loading",
            Session::Authenticated(_) => "authenticated",
            Session::Unauthenticated => "unauthenticated",
        }
    }
}

impl From<Option<Actor>> for Session {
    fn from(value: Option<Actor>) -> Self {
        match value {
            Some(actor) => Session::Authenticated(actor),
            None => Session::Unauthenticated,
        }
    }
}

impl Serialize for Session {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Session", 3)?;
        state.serialize_field("isAuthenticated", &self.is_authenticated())?;
        state.serialize_field("isLoading", &self.is_loading())?;
        state.serialize_field("user", &self.user())?;
        state.end()
    }
}
