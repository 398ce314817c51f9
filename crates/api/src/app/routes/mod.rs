use axum::{
    Router,
    routing::{get, post},
};

use wemakit_auth::RouteGuard;

use crate::app::AppState;
use crate::middleware;

pub mod dashboard;
pub mod navigation;
pub mod system;

/// Session endpoints plus every guarded dashboard route in the table.
pub fn router(state: &AppState) -> Router {
    let router = Router::new()
        .route(&state.login_path, get(system::login))
        .route("/session", get(system::session))
        .route("/logout", post(system::logout))
        .route(
            "/navigation",
            get(navigation::menu).route_layer(axum::middleware::from_fn_with_state(
                guard_with(state, RouteGuard::authenticated()),
                middleware::guard_middleware,
            )),
        );

    state.routes.iter().fold(router, |router, route| {
        router.route(
            &route.path,
            get(dashboard::view).route_layer(axum::middleware::from_fn_with_state(
                guard_with(state, route.guard()),
                middleware::guard_middleware,
            )),
        )
    })
}

fn guard_with(state: &AppState, guard: RouteGuard) -> RouteGuard {
    guard
        .with_landings(state.landings.clone())
        .with_login_path(state.login_path.clone())
}
