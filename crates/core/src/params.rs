//! Query-string codec.
//!
//! The page URL is the durable, shareable encoding of [`SearchOptions`]; the
//! backend request URL carries the same four parameters. Both go through
//! [`SearchParams`], so values are percent-encoded exactly once, the same way,
//! in both places.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::warn;

use crate::options::SearchOptions;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_FOLD_CASE: &str = "fold_case";
pub const PARAM_REGEX: &str = "regex";
pub const PARAM_CONTEXT: &str = "context";

/// Characters left unescaped in a query component (same set as `encodeURIComponent`
/// minus the sub-delimiters).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encode one key or value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decode one key or value. `+` is a space; invalid UTF-8 is replaced.
pub fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// SearchParams
// ---------------------------------------------------------------------------

/// Ordered, decoded key/value pairs of a URL query string.
///
/// Mirrors the browser's `URLSearchParams`: `set` replaces the first entry with
/// that key (dropping duplicates) and keeps every other parameter in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut idx = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = idx <= first || k != key;
                    idx += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ---------------------------------------------------------------------------
// SearchOptions <-> params
// ---------------------------------------------------------------------------

/// A present flag is on only when it reads `true`; absent falls back to `default`.
fn decode_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => v.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}

/// Decode search options from URL parameters. Never fails: anything missing or
/// malformed falls back to its default.
pub fn decode_options(params: &SearchParams) -> SearchOptions {
    let defaults = SearchOptions::default();

    let case_sensitivity = match params.get(PARAM_FOLD_CASE) {
        None => defaults.case_sensitivity,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring fold_case parameter");
            defaults.case_sensitivity
        }),
    };

    SearchOptions {
        query: params.get(PARAM_QUERY).unwrap_or_default().to_string(),
        use_regex: decode_flag(params.get(PARAM_REGEX), defaults.use_regex),
        show_context: decode_flag(params.get(PARAM_CONTEXT), defaults.show_context),
        case_sensitivity,
    }
}

/// Write all four options into `params`, leaving unrelated parameters alone.
pub fn encode_options(options: &SearchOptions, params: &mut SearchParams) {
    params.set(PARAM_QUERY, options.query.as_str());
    params.set(PARAM_REGEX, options.use_regex.to_string());
    params.set(PARAM_CONTEXT, options.show_context.to_string());
    params.set(PARAM_FOLD_CASE, options.case_sensitivity.as_str());
}

/// Backend request URL for `options`: `<path>?q=..&fold_case=..&regex=..&context=..`.
pub fn search_url(path: &str, options: &SearchOptions) -> String {
    let mut params = SearchParams::new();
    params.set(PARAM_QUERY, options.query.as_str());
    params.set(PARAM_FOLD_CASE, options.case_sensitivity.as_str());
    params.set(PARAM_REGEX, options.use_regex.to_string());
    params.set(PARAM_CONTEXT, options.show_context.to_string());
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{}", params.to_query_string())
}
