//! Results fetch over the browser's `fetch` API.

use gloo_net::http::Request;
use livesearch_core::{FetchError, SearchBackend};

/// Same-origin GET; the body is handed back untouched.
pub(crate) struct HttpBackend;

impl SearchBackend for HttpBackend {
    async fn fetch_results(&self, url: &str) -> Result<String, FetchError> {
        let response = Request::get(url)
            .header("accept", "text/html")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        response.text().await.map_err(|e| FetchError::Body(e.to_string()))
    }
}
