use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, header::LOCATION};
use wemakit_api::config::Config;
use wemakit_auth::{Actor, Role, SessionClaims};
use wemakit_core::{ActorId, AuthId};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = Config::from_lookup(|key| match key {
            "WEMAKIT_JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("config");

        // Same router as prod, bound to an ephemeral port.
        let app = wemakit_api::app::build_app(&config).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    // Redirects are the guard's output; inspect them instead of following.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn actor(role: Role) -> Actor {
    let actor = Actor::new(
        ActorId::new(),
        AuthId::new(format!("auth|{role}")),
        format!("{role}@wemakit.test"),
        format!("Test {role}"),
        role,
    );
    match role {
        Role::Designer => actor.with_capacity(3),
        _ => actor,
    }
}

fn mint_jwt(actor: &Actor, ttl: ChronoDuration) -> String {
    let claims = SessionClaims::for_actor(actor, Utc::now(), ttl);

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token_for(role: Role) -> String {
    mint_jwt(&actor(role), ChronoDuration::minutes(10))
}

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = client().get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_without_token_is_unauthenticated() {
    let srv = TestServer::spawn().await;
    let res = client().get(srv.url("/session")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["isLoading"], false);
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn session_reflects_token_actor() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(srv.url("/session"))
        .bearer_auth(token_for(Role::Designer))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["user"]["role"], "designer");
    assert_eq!(body["user"]["capacity"], 3);
}

#[tokio::test]
async fn unauthenticated_request_redirects_to_login_with_origin() {
    let srv = TestServer::spawn().await;
    let res = client().get(srv.url("/dashboard/tasks?sort=due")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login?from=%2Fdashboard%2Ftasks%3Fsort%3Ddue");
}

#[tokio::test]
async fn login_view_echoes_origin() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(srv.url("/login?from=%2Fdashboard%2Ftasks"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["view"], "login");
    assert_eq!(body["from"], "/dashboard/tasks");
}

#[tokio::test]
async fn client_is_sent_to_own_dashboard_from_staff_route() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(srv.url("/dashboard/tasks"))
        .bearer_auth(token_for(Role::Client))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/client");
}

#[tokio::test]
async fn own_dashboard_renders_for_every_role() {
    let srv = TestServer::spawn().await;
    let http = client();

    for role in Role::ALL {
        let path = wemakit_auth::dashboard_root(role);
        let res = http
            .get(srv.url(&path))
            .bearer_auth(token_for(role))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK, "{role} could not open {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["path"], path);
        assert_eq!(body["role"], role.as_str());
    }
}

#[tokio::test]
async fn admin_renders_shared_route() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(srv.url("/dashboard/settings"))
        .bearer_auth(token_for(Role::Admin))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["view"], "Settings");
}

#[tokio::test]
async fn navigation_is_filtered_and_highlighted() {
    let srv = TestServer::spawn().await;
    let res = client()
        .get(srv.url("/navigation?path=/dashboard/tasks/42"))
        .bearer_auth(token_for(Role::Designer))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "designer");

    let items = body["items"].as_array().unwrap();
    let titles: Vec<_> = items.iter().map(|i| i["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Brand Assets", "Workspace", "Tasks", "Portfolio", "Settings"]);

    let active: Vec<_> = items
        .iter()
        .filter(|i| i["active"] == true)
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(active, vec!["Tasks"]);
}

#[tokio::test]
async fn navigation_requires_a_session() {
    let srv = TestServer::spawn().await;
    let res = client().get(srv.url("/navigation")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login?from="));
}

#[tokio::test]
async fn logout_revokes_token_and_redirects_to_login() {
    let srv = TestServer::spawn().await;
    let http = client();
    let token = token_for(Role::Client);

    let res = http
        .post(srv.url("/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = http
        .get(srv.url("/dashboard/client"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/login"));
}

#[tokio::test]
async fn expired_or_forged_tokens_count_as_signed_out() {
    let srv = TestServer::spawn().await;
    let http = client();

    let expired = mint_jwt(&actor(Role::Admin), ChronoDuration::seconds(-30));
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &SessionClaims::for_actor(&actor(Role::Admin), Utc::now(), ChronoDuration::minutes(5)),
        &EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    for token in [expired, forged] {
        let res = http
            .get(srv.url("/dashboard/admin"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(location(&res).starts_with("/login"));
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let srv = TestServer::spawn().await;
    let res = client().get(srv.url("/dashboard/nowhere")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}
