use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::page::render_search_page;

/// Axum application state: configuration, the pre-rendered page, and the HTTP
/// client used to reach the search backend.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub page_html: Arc<str>,
    pub client: reqwest::Client,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("livesearch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let page_html = Arc::from(render_search_page(&config));
        Ok(Self { config: Arc::new(config), page_html, client })
    }
}
