//! The page elements the panel drives.

use crate::error::FetchError;
use crate::options::{CaseSensitivity, OptionField};

/// The search box, case selector, toggle buttons and results container.
pub trait PanelView {
    /// Set the text shown in the search box.
    fn set_query_text(&self, text: &str);

    /// Set the selected value of the case-sensitivity selector.
    fn set_case_sensitivity(&self, mode: CaseSensitivity);

    /// Reflect a toggle's state in its button (`data-selected`).
    fn set_toggle_state(&self, field: OptionField, selected: bool);

    /// Replace the content of the results container with `html`, keeping the
    /// container element itself in place.
    fn replace_results(&self, html: &str);

    /// Show a failed search inside the results container.
    fn show_error(&self, error: &FetchError) {
        self.replace_results(&error_fragment(error));
    }
}

/// A clicked toggle button: its `name` attribute picks the option, its
/// `data-selected` attribute holds the displayed state.
pub trait ToggleControl {
    fn option_name(&self) -> Option<String>;
    fn is_selected(&self) -> bool;
    fn set_selected(&self, selected: bool);
}

// ---------------------------------------------------------------------------
// Error markup
// ---------------------------------------------------------------------------

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inline error state for the results container.
///
/// An error status that carries a body is shown as that body: it comes from
/// the same service, and with the same trust, as the results markup.
pub fn error_fragment(error: &FetchError) -> String {
    match error {
        FetchError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
        other => format!(
            r#"<div class="search-error" role="alert">Search failed: {}</div>"#,
            html_escape(&other.to_string())
        ),
    }
}
