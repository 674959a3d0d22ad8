//! livesearch server: hosts the search panel page and relays result requests.
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with typo warnings
//! - [`page`]: The search page and its init payload
//! - [`api`]: HTTP handlers: page, health, results relay
//! - [`types`]: Shared application state

pub mod api;
pub mod config;
pub mod page;
pub mod types;

use std::path::PathBuf;

use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use api::{api_health, search_page, serve_search_results};
use types::AppContext;

// ---------------------------------------------------------------------------
// Cross-platform path helpers
// ---------------------------------------------------------------------------

/// Platform-aware home directory: `HOME` on Unix, `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok().map(PathBuf::from)
}

/// Platform-aware config directory: `~/.livesearch` on Unix, `%APPDATA%/livesearch` on Windows.
pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(|a| PathBuf::from(a).join("livesearch"))
    } else {
        home_dir().map(|h| h.join(".livesearch"))
    }
}

/// `config.toml` in [`config_dir`], if it exists.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml")).filter(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(ctx: AppContext) -> Router {
    let results_path = ctx.config.results_path.clone();
    let static_files = ServeDir::new(&ctx.config.docroot);

    Router::new()
        .route("/", get(search_page))
        .route("/health", get(api_health))
        .route(&results_path, get(serve_search_results))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(ctx)
}
