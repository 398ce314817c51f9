//! HTTP application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use wemakit_auth::{IdentityBackend, JwtIdentityBackend, LandingError, RoleLandings, RouteTable};

use crate::config::Config;
use crate::middleware;

pub mod errors;
pub mod routes;

/// Shared, read-only state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub landings: RoleLandings,
    pub login_path: String,
}

/// Build the full HTTP router with the JWT identity backend (entrypoint used by `main.rs`).
pub fn build_app(config: &Config) -> Result<Router, LandingError> {
    let backend = Arc::new(JwtIdentityBackend::new(config.jwt_secret.as_bytes()));
    build_app_with_backend(config, backend)
}

/// Build the router over an arbitrary identity backend.
///
/// Fails if a role's landing page is not reachable for that role.
pub fn build_app_with_backend(config: &Config, backend: Arc<dyn IdentityBackend>) -> Result<Router, LandingError> {
    let routes = RouteTable::dashboard();
    let landings = RoleLandings::default();
    landings.verify(&routes)?;

    let state = AppState {
        routes: Arc::new(routes),
        landings,
        login_path: config.login_path.clone(),
    };
    let session_state = middleware::SessionState { backend };

    let guarded = routes::router(&state);

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(guarded)
        .fallback(errors::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(state))
                .layer(axum::middleware::from_fn_with_state(
                    session_state,
                    middleware::session_middleware,
                )),
        ))
}
