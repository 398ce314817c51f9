use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Current session as seen by the client.
pub async fn session(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(session.session())
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

/// Login view; echoes where the user was headed so the login flow can return there.
pub async fn login(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    Json(serde_json::json!({
        "view": "login",
        "from": query.from,
    }))
}

pub async fn logout(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Redirect {
    let role = session.session().role();
    session.resolver().sign_out().await;
    tracing::info!(role = role.map(|r| r.as_str()), "signed out");

    Redirect::to(&state.login_path)
}
