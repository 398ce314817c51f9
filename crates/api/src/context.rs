use std::sync::Arc;

use wemakit_auth::{Session, SessionResolver};

/// Session handle for a request.
///
/// Inserted by the session middleware; guards and handlers read it, only the
/// resolver writes.
#[derive(Clone)]
pub struct SessionContext {
    resolver: Arc<SessionResolver>,
}

impl SessionContext {
    pub fn new(resolver: Arc<SessionResolver>) -> Self {
        Self { resolver }
    }

    pub fn session(&self) -> Session {
        self.resolver.session()
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }
}
