use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use livesearch_core::params::{PARAM_CONTEXT, PARAM_FOLD_CASE, PARAM_QUERY, PARAM_REGEX};
use livesearch_core::view::html_escape;
use livesearch_core::CaseSensitivity;
use serde::Deserialize;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::AppContext;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

// ---------------------------------------------------------------------------
// Page + health
// ---------------------------------------------------------------------------

pub async fn search_page(State(ctx): State<AppContext>) -> Html<String> {
    Html(ctx.page_html.to_string())
}

pub async fn api_health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": ctx.config.backend.as_ref().map(|b| b.id.as_str()),
    }))
}

// ---------------------------------------------------------------------------
// Results relay
// ---------------------------------------------------------------------------

/// Why a results request could not be relayed. Rendered as an HTML fragment
/// so the page can show it in place of results.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("You must specify a {} to match", .regex.then_some("regex").unwrap_or("string"))]
    EmptyQuery { regex: bool },

    #[error("No search backend is configured")]
    NoBackend,

    #[error("Search backend '{backend}' timed out after {secs}s")]
    Timeout { backend: String, secs: u64 },

    #[error("Could not reach search backend '{backend}': {reason}")]
    Unreachable { backend: String, reason: String },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::EmptyQuery { .. } => StatusCode::BAD_REQUEST,
            RelayError::NoBackend => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = format!(
            r#"<div class="search-error" role="alert">{}</div>"#,
            html_escape(&self.to_string())
        );
        (self.status(), [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    q: Option<String>,
    fold_case: Option<String>,
    regex: Option<String>,
    context: Option<String>,
}

/// Normalized parameters forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayParams {
    pub query: String,
    pub fold_case: CaseSensitivity,
    pub regex: bool,
    pub context: bool,
}

impl RelayParams {
    /// A flag is off only when it reads `false`; regex and context both
    /// default to on when absent.
    fn flag(value: Option<&str>) -> bool {
        !value.is_some_and(|v| v.trim().eq_ignore_ascii_case("false"))
    }

    pub fn from_query(q: &ResultsQuery) -> Result<Self, RelayError> {
        let regex = Self::flag(q.regex.as_deref());
        let query = q.q.clone().unwrap_or_default();
        if query.trim().is_empty() {
            return Err(RelayError::EmptyQuery { regex });
        }
        let fold_case = match q.fold_case.as_deref() {
            None => CaseSensitivity::Auto,
            Some(v) => v.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Invalid fold_case, using auto");
                CaseSensitivity::Auto
            }),
        };
        Ok(Self { query, fold_case, regex, context: Self::flag(q.context.as_deref()) })
    }

    fn as_pairs(&self) -> [(&'static str, String); 4] {
        [
            (PARAM_QUERY, self.query.clone()),
            (PARAM_FOLD_CASE, self.fold_case.as_str().to_string()),
            (PARAM_REGEX, self.regex.to_string()),
            (PARAM_CONTEXT, self.context.to_string()),
        ]
    }
}

/// `GET <results_path>`: validate, relay to the backend, pass its status and
/// markup straight through.
pub async fn serve_search_results(
    State(ctx): State<AppContext>,
    Query(q): Query<ResultsQuery>,
) -> Result<Response, RelayError> {
    let params = RelayParams::from_query(&q)?;
    let backend = ctx.config.backend.as_ref().ok_or(RelayError::NoBackend)?;

    let start = Instant::now();
    let response = ctx
        .client
        .get(backend.results_url())
        .query(&params.as_pairs())
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RelayError::Timeout {
                    backend: backend.id.clone(),
                    secs: ctx.config.request_timeout_secs,
                }
            } else {
                RelayError::Unreachable { backend: backend.id.clone(), reason: e.to_string() }
            }
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| RelayError::Unreachable {
        backend: backend.id.clone(),
        reason: e.to_string(),
    })?;
    let time_ms = start.elapsed().as_millis() as u64;

    if status.is_success() {
        info!(
            backend = backend.id.as_str(),
            query = params.query.as_str(),
            bytes = body.len(),
            time_ms,
            "Relayed search results"
        );
    } else {
        warn!(
            backend = backend.id.as_str(),
            query = params.query.as_str(),
            status = status.as_u16(),
            time_ms,
            "Search backend returned an error"
        );
    }

    Ok((status, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response())
}
