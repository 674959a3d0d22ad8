//! Test harness for HTTP integration tests.
//!
//! Builds the real router from a `ServerConfig` and drives it in-process with
//! `tower::ServiceExt::oneshot`. A fake search backend runs on an ephemeral
//! port so the results relay has something to talk to.

use axum::{
    body::Body,
    extract::RawQuery,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use livesearch_server::build_router;
use livesearch_server::config::{BackendConfig, ServerConfig};
use livesearch_server::types::AppContext;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

pub struct TestHarness {
    pub router: Router,
    _docroot: TempDir,
}

impl TestHarness {
    /// Harness with a docroot holding `livesearch.css`. `configure` may adjust
    /// the config before the router is built.
    pub fn new(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let docroot = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(docroot.path().join("livesearch.css"), "#results { margin: 0 }\n")
            .expect("Failed to write stylesheet");

        let mut config = ServerConfig { docroot: docroot.path().to_path_buf(), ..Default::default() };
        configure(&mut config);
        config.validate().expect("invalid test config");

        let ctx = AppContext::new(config).expect("Failed to build app context");
        Self { router: build_router(ctx), _docroot: docroot }
    }

    /// Harness relaying to `addr`.
    pub fn with_backend(addr: &str) -> Self {
        let addr = addr.to_string();
        Self::new(move |c| c.backend = Some(BackendConfig::from_addr(addr)))
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse { status, content_type, body: String::from_utf8_lossy(&bytes).into_owned() }
    }
}

/// Fake backend results endpoint. Echoes the raw query string it received,
/// answers `q=boom` with a 500, and sleeps on `q=slow`.
async fn fake_results(RawQuery(query): RawQuery) -> impl IntoResponse {
    let query = query.unwrap_or_default();
    if query.starts_with("q=boom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<p class=\"oops\">index unavailable</p>".to_string());
    }
    if query.starts_with("q=slow") {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    (StatusCode::OK, format!("<ul class=\"results\"><li>{query}</li></ul>"))
}

/// Spawn the fake backend; returns its base URL.
pub async fn spawn_fake_backend() -> String {
    let app = Router::new().route("/serveSearchResults", get(fake_results));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
