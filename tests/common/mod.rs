#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use moodmate_api::auth::jwt::Claims;
use moodmate_api::config::{AppEnv, Config, InsightConfig};
use moodmate_api::db::MemoryMoodStore;
use moodmate_api::services::insights::InsightClient;
use moodmate_api::AppState;

pub const JWT_SECRET: &str = "test-secret";

/// Build a test `Config` pointing the insight client at `insight_url`.
pub fn test_config(insight_url: &str) -> Config {
    Config {
        database_url: "memory://".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        jwt_secret: JWT_SECRET.to_string(),
        insight: InsightConfig {
            api_key: "test-key".to_string(),
            api_url: insight_url.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 1,
        },
        app_env: AppEnv::Production,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryMoodStore>,
    pub config: Arc<Config>,
}

impl TestApp {
    pub fn new() -> Self {
        // Nothing listens on the discard port; only insight tests replace it.
        Self::with_config(test_config("http://127.0.0.1:9/v1/chat/completions"))
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryMoodStore::new());
        let config = Arc::new(config);
        let state = AppState {
            store: store.clone(),
            config: config.clone(),
            insights: InsightClient::new(reqwest::Client::new()),
        };
        Self {
            router: moodmate_api::app(state),
            store,
            config,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + chrono::Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .expect("token should sign")
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should read")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// A chat-completions stand-in on an ephemeral port.
pub struct StubUpstream {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl StubUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub enum StubBehavior {
    Complete(&'static str),
    Fail(StatusCode, Value),
    /// Sleep past the client timeout on the first call, then complete.
    SlowOnce(Duration, &'static str),
    Garbage,
}

pub async fn spawn_upstream(behavior: StubBehavior) -> StubUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let handler = move |Json(body): Json<Value>| {
        let behavior = behavior.clone();
        let counter = counter.clone();
        async move {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(body["messages"].as_array().map(Vec::len), Some(2));
            match behavior {
                StubBehavior::Complete(text) => (StatusCode::OK, Json(completion(text))),
                StubBehavior::Fail(status, body) => (status, Json(body)),
                StubBehavior::SlowOnce(delay, text) => {
                    if call == 0 {
                        tokio::time::sleep(delay).await;
                    }
                    (StatusCode::OK, Json(completion(text)))
                }
                StubBehavior::Garbage => (StatusCode::OK, Json(serde_json::json!({ "nope": 1 }))),
            }
        }
    };

    let router = Router::new().route("/v1/chat/completions", post(handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub should bind");
    let addr: SocketAddr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    StubUpstream {
        url: format!("http://{addr}/v1/chat/completions"),
        hits,
    }
}

/// An address with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}

fn completion(text: &str) -> Value {
    serde_json::json!({
        "id": "cmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }]
    })
}
