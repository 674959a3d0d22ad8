//! `window.location` / `window.history` behind the core `Navigation` trait.

use livesearch_core::{Navigation, SearchParams};
use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::Window;

pub(crate) struct BrowserNavigation {
    window: Window,
}

impl BrowserNavigation {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Navigation for BrowserNavigation {
    fn current_params(&self) -> SearchParams {
        let search = self.window.location().search().unwrap_or_default();
        SearchParams::parse(&search)
    }

    fn push_params(&self, params: &SearchParams) {
        let location = self.window.location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let hash = location.hash().unwrap_or_default();
        let url = if params.is_empty() {
            format!("{path}{hash}")
        } else {
            format!("{path}?{}{hash}", params.to_query_string())
        };

        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url)));
        if let Err(e) = pushed {
            warn!(url = url.as_str(), error = ?e, "history.pushState failed");
        }
    }
}
