//! Session resolver: the single writer of the current [`Session`].
//!
//! Readers (route guard, navigation, profile views) either take a snapshot with
//! [`SessionResolver::session`] or subscribe to transitions with
//! [`SessionResolver::subscribe`]. Readers never write back.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::{AccessToken, IdentityBackend, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    /// A sign-in event happened; nobody has started its identity check.
    Pending,
    InFlight,
    Settled,
}

struct ResolverState {
    token: Option<AccessToken>,
    /// Bumped on every sign-in/sign-out; completions from older generations are dropped.
    generation: u64,
    check: Check,
}

enum Step {
    Done(Session),
    Wait,
    Run(Option<AccessToken>, u64),
}

/// Resolves and publishes the session for one client.
///
/// Each sign-in event gets exactly one identity check, however many callers
/// ask for the session while it runs. A backend failure settles the session to
/// `Unauthenticated` so nothing waits on it forever.
pub struct SessionResolver {
    backend: Arc<dyn IdentityBackend>,
    state: watch::Sender<Session>,
    inner: Mutex<ResolverState>,
}

impl SessionResolver {
    /// New resolver in the `Loading` state. `token` is the credential of the
    /// current sign-in, if any.
    pub fn new(backend: Arc<dyn IdentityBackend>, token: Option<AccessToken>) -> Self {
        let (state, _) = watch::channel(Session::Loading);
        Self {
            backend,
            state,
            inner: Mutex::new(ResolverState {
                token,
                generation: 0,
                check: Check::Pending,
            }),
        }
    }

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Run the identity check for the current sign-in (once) and return the
    /// settled session.
    pub async fn resolve(&self) -> Session {
        loop {
            // Subscribe before inspecting state so a settle between the two is not missed.
            let mut rx = self.state.subscribe();

            let step = {
                let mut inner = self.lock();
                match inner.check {
                    Check::Settled => Step::Done(self.session()),
                    Check::InFlight => Step::Wait,
                    Check::Pending => {
                        inner.check = Check::InFlight;
                        Step::Run(inner.token.clone(), inner.generation)
                    }
                }
            };

            match step {
                Step::Done(session) => return session,
                Step::Wait => {
                    // Sender lives as long as `self`; `changed` only errors once it is gone.
                    let _ = rx.changed().await;
                }
                Step::Run(token, generation) => {
                    let mut run = InFlightCheck {
                        resolver: self,
                        generation,
                        finished: false,
                    };
                    let outcome = self.check(token).await;
                    run.finished = true;
                    if let Some(session) = self.settle(generation, outcome) {
                        return session;
                    }
                }
            }
        }
    }

    /// Start a new sign-in event with `token`.
    ///
    /// The session returns to `Loading` until the next [`resolve`](Self::resolve).
    pub fn sign_in(&self, token: AccessToken) {
        let mut inner = self.lock();
        inner.token = Some(token);
        inner.generation += 1;
        inner.check = Check::Pending;
        self.state.send_replace(Session::Loading);
        tracing::debug!(generation = inner.generation, "session sign-in started");
    }

    /// Clear the actor and publish `Unauthenticated`, then tell the backend.
    ///
    /// Local sign-out always happens; a backend failure is only logged.
    /// Navigating to the login view is up to the caller.
    pub async fn sign_out(&self) {
        let token = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.check = Check::Settled;
            self.state.send_replace(Session::Unauthenticated);
            tracing::debug!(generation = inner.generation, "session signed out");
            inner.token.take()
        };

        if let Some(token) = token {
            if let Err(e) = self.backend.sign_out(&token).await {
                tracing::warn!(error = %e, "identity backend sign-out failed");
            }
        }
    }

    async fn check(&self, token: Option<AccessToken>) -> Session {
        let Some(token) = token else {
            return Session::Unauthenticated;
        };

        match self.backend.check_session(&token).await {
            Ok(actor) => Session::from(actor),
            Err(e) => {
                tracing::warn!(error = %e, "identity check failed; treating session as unauthenticated");
                Session::Unauthenticated
            }
        }
    }

    /// Publish `outcome` if `generation` is still current.
    fn settle(&self, generation: u64, outcome: Session) -> Option<Session> {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "discarding stale identity check");
            return None;
        }
        inner.check = Check::Settled;
        tracing::debug!(
            generation,
            state = outcome.label(),
            role = outcome.role().map(|r| r.as_str()),
            "session resolved"
        );
        self.state.send_replace(outcome.clone());
        Some(outcome)
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Hands the check back to `Pending` if the resolving future is dropped mid-check,
/// and wakes waiters so one of them can pick it up.
struct InFlightCheck<'a> {
    resolver: &'a SessionResolver,
    generation: u64,
    finished: bool,
}

impl Drop for InFlightCheck<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut inner = self.resolver.lock();
        if inner.generation == self.generation && inner.check == Check::InFlight {
            inner.check = Check::Pending;
            self.resolver.state.send_modify(|_| {});
        }
    }
}
