//! Server configuration loaded from a TOML file.
//!
//! ```toml
//! listen = "127.0.0.1:8910"
//! docroot = "web"
//! header_html = "<a href='/'>code search</a>"
//! results_path = "/serveSearchResults"
//! request_timeout_secs = 30
//!
//! [backend]
//! id = "main"
//! addr = "http://127.0.0.1:9999"
//! path = "/serveSearchResults"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_LISTEN_PORT: u16 = 8910;

/// Known top-level keys, for typo warnings.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "listen",
    "docroot",
    "header_html",
    "footer_html",
    "results_path",
    "request_timeout_secs",
    "backend",
];

const KNOWN_BACKEND_KEYS: &[&str] = &["id", "addr", "path"];

/// Paths the router serves itself; the results endpoint may not shadow them.
const RESERVED_PATHS: &[&str] = &["/", "/health"];

/// Characters the router reads as captures or wildcards.
const ROUTE_SYNTAX: &[char] = &['{', '}', '*', ':'];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The search service the results endpoint relays to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_id")]
    pub id: String,
    /// Base URL, e.g. `http://127.0.0.1:9999`.
    pub addr: String,
    /// Path on the backend that renders results markup.
    #[serde(default = "default_results_path")]
    pub path: String,
}

impl BackendConfig {
    pub fn from_addr(addr: impl Into<String>) -> Self {
        Self { id: default_backend_id(), addr: addr.into(), path: default_results_path() }
    }

    /// Full URL of the backend results endpoint, without query string.
    pub fn results_url(&self) -> String {
        format!("{}{}", self.addr.trim_end_matches('/'), self.path)
    }
}

fn default_backend_id() -> String {
    "default".to_string()
}

fn default_results_path() -> String {
    livesearch_core::config::DEFAULT_RESULTS_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `HOST:PORT` to listen on. When unset, the CLI decides.
    pub listen: Option<String>,
    /// Directory served under `/static` (holds `pkg/` with the wasm bundle).
    pub docroot: PathBuf,
    /// Site markup injected at the top of the page body.
    pub header_html: String,
    /// Site markup injected just before `</body>`.
    pub footer_html: String,
    /// Path of the results endpoint, handed to the page in its init payload.
    pub results_path: String,
    /// Timeout for a relayed backend request.
    pub request_timeout_secs: u64,
    pub backend: Option<BackendConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: None,
            docroot: PathBuf::from("web"),
            header_html: String::new(),
            footer_html: String::new(),
            results_path: default_results_path(),
            request_timeout_secs: 30,
            backend: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.results_path.starts_with('/')
            || RESERVED_PATHS.contains(&self.results_path.as_str())
            || self.results_path.starts_with("/static")
        {
            return Err(ConfigError::Invalid(format!(
                "results_path '{}' must start with '/' and not clash with /, /health or /static",
                self.results_path
            )));
        }
        if self.results_path.contains(ROUTE_SYNTAX) {
            return Err(ConfigError::Invalid(format!(
                "results_path '{}' must be a literal path (no '{{', '}}', '*' or ':')",
                self.results_path
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        if let Some(backend) = &self.backend {
            if !(backend.addr.starts_with("http://") || backend.addr.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "backend '{}' addr '{}' must be an http:// or https:// URL",
                    backend.id, backend.addr
                )));
            }
            if !backend.path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "backend '{}' path '{}' must start with '/'",
                    backend.id, backend.path
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest known key within edit distance 3, if any.
fn suggest_key(key: &str, known: &[&'static str]) -> Option<&'static str> {
    known
        .iter()
        .copied()
        .min_by_key(|k| edit_distance(key, k))
        .filter(|k| edit_distance(key, k) <= 3)
}

fn warn_unknown_keys(table: &toml::Table, known: &[&'static str], prefix: &str) {
    for key in table.keys() {
        if known.contains(&key.as_str()) {
            continue;
        }
        match suggest_key(key, known) {
            Some(suggestion) => warn!(
                key = %format!("{prefix}{key}"),
                suggestion,
                "Unknown config key; did you mean '{prefix}{suggestion}'?"
            ),
            None => warn!(
                key = %format!("{prefix}{key}"),
                "Unknown config key (known keys: {})",
                known.join(", ")
            ),
        }
    }
}

/// Parse and validate config text. Unknown keys are warned about, not rejected.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let table: toml::Table = content.parse()?;
    warn_unknown_keys(&table, KNOWN_CONFIG_KEYS, "");
    if let Some(backend) = table.get("backend").and_then(|v| v.as_table()) {
        warn_unknown_keys(backend, KNOWN_BACKEND_KEYS, "backend.");
    }

    let config: ServerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    debug!(path = %path.display(), "Loading config");
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_config(&content)
}
