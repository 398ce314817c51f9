use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use wemakit_auth::{DEFAULT_NAVIGATION, visible_entries};

use crate::app::{AppState, errors};
use crate::context::SessionContext;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Path currently shown; defaults to the actor's landing page.
    pub path: Option<String>,
}

/// GET /navigation - menu entries visible to the current role, with highlight state
pub async fn menu(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<MenuQuery>,
) -> Response {
    let Some(role) = session.session().role() else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no active session");
    };

    let current = query.path.unwrap_or_else(|| state.landings.landing_for(role).to_string());
    let items = visible_entries(DEFAULT_NAVIGATION, role, &current);

    Json(serde_json::json!({
        "role": role,
        "path": current,
        "items": items,
    }))
    .into_response()
}
