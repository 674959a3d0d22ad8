//! Panel settings carried in the page's init payload.

use serde::Deserialize;

use crate::error::PanelError;

pub const DEFAULT_RESULTS_PATH: &str = "/serveSearchResults";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Path of the endpoint that renders results markup.
    pub results_path: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { results_path: DEFAULT_RESULTS_PATH.to_string() }
    }
}

impl PanelConfig {
    /// Decode the JSON init payload. `null`, empty and non-object payloads
    /// yield the defaults; unknown keys are ignored.
    pub fn from_init_json(raw: &str) -> Result<Self, PanelError> {
        let value: serde_json::Value = match raw.trim() {
            "" => return Ok(Self::default()),
            trimmed => serde_json::from_str(trimmed)?,
        };
        if !value.is_object() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }
}
