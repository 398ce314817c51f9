use axum::{
    Json,
    extract::Extension,
    http::Uri,
    response::IntoResponse,
};

use wemakit_auth::DEFAULT_NAVIGATION;

use crate::context::SessionContext;

/// Placeholder dashboard view; page data is fetched by the client.
pub async fn view(Extension(session): Extension<SessionContext>, uri: Uri) -> impl IntoResponse {
    let path = uri.path();
    let title = DEFAULT_NAVIGATION
        .iter()
        .find(|item| item.path == path)
        .map(|item| item.title)
        .unwrap_or("Dashboard");

    Json(serde_json::json!({
        "view": title,
        "path": path,
        "role": session.session().role(),
    }))
}
