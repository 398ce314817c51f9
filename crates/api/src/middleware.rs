use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use wemakit_auth::{AccessToken, GuardDecision, IdentityBackend, RouteGuard, SessionResolver};

use crate::context::SessionContext;

#[derive(Clone)]
pub struct SessionState {
    pub backend: Arc<dyn IdentityBackend>,
}

/// Resolve the caller's session and attach it to the request.
///
/// Never rejects: a missing or bad token is an unauthenticated session, and
/// the route guard decides what that means for the route.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = extract_bearer(req.headers());
    let resolver = Arc::new(SessionResolver::new(state.backend.clone(), token));
    resolver.resolve().await;

    req.extensions_mut().insert(SessionContext::new(resolver));
    next.run(req).await
}

/// Apply `guard` to the wrapped route.
pub async fn guard_middleware(
    State(guard): State<RouteGuard>,
    Extension(session): Extension<SessionContext>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let requested = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let snapshot = session.session();
    let decision = guard.evaluate(&snapshot, &requested);
    tracing::debug!(path = %requested, decision = decision.label(), "route guard evaluated");

    match decision {
        GuardDecision::Render => next.run(req).await,
        GuardDecision::Loading => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
            Json(serde_json::json!({ "status": "loading" })),
        )
            .into_response(),
        GuardDecision::Redirect(redirect) => {
            tracing::info!(
                path = %requested,
                role = snapshot.role().map(|r| r.as_str()),
                to = %redirect.to,
                "route guard redirected request"
            );
            let location = match &redirect.from {
                Some(from) => format!("{}?from={}", redirect.to, urlencoding::encode(from)),
                None => redirect.to,
            };
            // 303: the guarded URL does not stay in history.
            Redirect::to(&location).into_response()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<AccessToken> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(AccessToken::new(token))
}
