//! End-to-end tests: the real router and services against a temp SQLite
//! database and a fake inference service on loopback.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode as AxumStatus;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

use hogwarts_types::config::AppConfig;

use super::router::build_router;
use crate::state::AppState;

const NARRATION: [&str; 3] = [
    "data: {\"type\":\"text\",\"content\":\"Candles float \"}\n\n",
    "data: {\"type\":\"text\",\"content\":\"over the Great Hall.\"}\n\n",
    "data: [DONE]\n\n",
];

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Sets its flag when the owning upstream body is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Fake inference service. `/chat` streams [`NARRATION`] unless the system
/// prompt mentions "overloaded" (503) or "endless" (one record, then a body
/// that never ends; `dropped` is set once that body is released).
async fn spawn_upstream(dropped: Arc<AtomicBool>) -> String {
    let router = Router::new()
        .route(
            "/chat",
            post(move |Json(body): Json<Value>| {
                let dropped = dropped.clone();
                async move {
                    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
                    if prompt.contains("overloaded") {
                        return (AxumStatus::SERVICE_UNAVAILABLE, "busy").into_response();
                    }
                    if prompt.contains("endless") {
                        let flag = DropFlag(dropped);
                        let endless = async_stream::stream! {
                            let _flag = flag;
                            yield Ok::<_, Infallible>("data: first\n\n".to_string());
                            std::future::pending::<()>().await;
                        };
                        return (AxumStatus::OK, Body::from_stream(endless)).into_response();
                    }
                    let chunks = NARRATION.iter().map(|c| Ok::<_, Infallible>(c.to_string()));
                    (AxumStatus::OK, Body::from_stream(futures_util::stream::iter(chunks)))
                        .into_response()
                }
            }),
        )
        .route(
            "/multiagent/chat",
            post(|Json(body): Json<Value>| async move {
                let location = body["game_state"]["status"]["location"]
                    .as_str()
                    .unwrap_or("nowhere")
                    .to_string();
                format!("data: {{\"type\":\"text\",\"content\":\"{location}\"}}\n\n")
            }),
        );
    serve(router).await
}

struct TestApp {
    base: String,
    client: reqwest::Client,
    upstream_dropped: Arc<AtomicBool>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());
        let upstream_dropped = Arc::new(AtomicBool::new(false));
        config.upstream.base_url = spawn_upstream(upstream_dropped.clone()).await;
        config.auth.jwt_secret = Some("test-secret".to_string());

        let state = AppState::init(&config).await.unwrap();
        let base = serve(build_router(state, &config.server.allowed_origins)).await;
        Self {
            base,
            client: reqwest::Client::new(),
            upstream_dropped,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Register and log in; returns the bearer token.
    async fn login(&self, username: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "username": username, "password": "wingardium" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": "wingardium" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

fn chat_body(api_key: &str, multi_agent: bool, persona: &str) -> Value {
    json!({
        "messages": [{ "role": "user", "content": "Look around" }],
        "summary": ["Arrived at Hogwarts"],
        "persona": persona,
        "game_state": {
            "status": { "location": "Great Hall", "current_year": 1992, "current_month": 1, "game_mode": "weekly" },
            "inventory": {}, "spells": {}, "relationships": {}, "world_log": []
        },
        "api_key": api_key,
        "model": "deepseek-chat",
        "multi_agent": multi_agent,
    })
}

#[tokio::test]
async fn test_chat_streams_upstream_bytes_verbatim() {
    let app = TestApp::start().await;
    let token = app.login("hermione").await;

    let res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&chat_body("sk-test", false, "bookish"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/event-stream");
    assert_eq!(res.headers()["cache-control"], "no-cache");
    assert_eq!(res.headers()["x-accel-buffering"], "no");
    assert_eq!(res.text().await.unwrap(), NARRATION.concat());
}

#[tokio::test]
async fn test_client_disconnect_releases_upstream_stream() {
    let app = TestApp::start().await;
    let token = app.login("seamus").await;

    let mut res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&chat_body("sk-test", false, "endless storyteller"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let first = tokio::time::timeout(Duration::from_secs(5), res.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(first.as_ref(), b"data: first\n\n");
    assert!(!app.upstream_dropped.load(Ordering::SeqCst));

    drop(res);

    let released = tokio::time::timeout(Duration::from_secs(5), async {
        while !app.upstream_dropped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "upstream body still held after the client went away");
}

#[tokio::test]
async fn test_multi_agent_chat_reaches_multiagent_route() {
    let app = TestApp::start().await;
    let token = app.login("luna").await;

    let res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&chat_body("sk-test", true, ""))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        "data: {\"type\":\"text\",\"content\":\"Great Hall\"}\n\n"
    );
}

#[tokio::test]
async fn test_chat_rejections() {
    let app = TestApp::start().await;

    let res = app
        .client
        .post(app.url("/api/chat"))
        .json(&chat_body("sk-test", false, ""))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = app.login("neville").await;
    let res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&chat_body("  ", false, ""))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_error_status_maps_to_500() {
    let app = TestApp::start().await;
    let token = app.login("percy").await;

    let res = app
        .client
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&chat_body("sk-test", false, "overloaded prefect"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_summarize_returns_aggregated_text() {
    let app = TestApp::start().await;
    let token = app.login("ginny").await;

    let res = app
        .client
        .post(app.url("/api/ai/summarize"))
        .bearer_auth(&token)
        .json(&json!({
            "messages": [{ "role": "user", "content": "I board the train" }],
            "api_key": "sk-test",
            "model": "deepseek-chat",
        }))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["summary"], "Candles float over the Great Hall.");
}

#[tokio::test]
async fn test_account_flow() {
    let app = TestApp::start().await;
    let token = app.login("fred").await;

    let res = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "username": "fred", "password": "another1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "fred", "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .get(app.url("/api/auth/user"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "fred");
}

#[tokio::test]
async fn test_character_lifecycle() {
    let app = TestApp::start().await;
    let token = app.login("harry").await;
    let other = app.login("draco").await;

    let res = app
        .client
        .post(app.url("/api/characters"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Harry", "wand": "holly, phoenix feather" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await.unwrap()["character_id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = app
        .client
        .get(app.url(&format!("/api/characters/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let character: Value = res.json().await.unwrap();
    assert_eq!(character["game_state"]["status"]["hp"], 100);
    assert_eq!(character["game_state"]["status"]["current_year"], 1991);

    let mut state = character["game_state"].clone();
    state["status"]["location"] = json!("Gryffindor Tower");
    let res = app
        .client
        .put(app.url(&format!("/api/characters/{id}/state")))
        .bearer_auth(&token)
        .json(&json!({ "game_state": state, "summary": ["Sorted into Gryffindor"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["game_state"]["status"]["location"], "Gryffindor Tower");
    assert_eq!(updated["summary"][0], "Sorted into Gryffindor");

    let list: Value = app
        .client
        .get(app.url("/api/characters"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let res = app
        .client
        .delete(app.url(&format!("/api/characters/{id}")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .client
        .delete(app.url(&format!("/api/characters/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app
        .client
        .get(app.url("/api/characters/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::start().await;
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
