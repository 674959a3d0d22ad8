//! The panel's five page elements, located once at startup.

use livesearch_core::{CaseSensitivity, OptionField, PanelError, PanelView, ToggleControl};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

pub(crate) const SEARCH_BOX: &str = "#searchbox";
pub(crate) const RESULTS: &str = "#resultarea > #results";
pub(crate) const CASE_SELECT: &str = "#case-sensitivity-toggle";
pub(crate) const REGEX_TOGGLE: &str = "button[id=toggle-regex]";
pub(crate) const CONTEXT_TOGGLE: &str = "button[id=toggle-context]";

const SELECTED_ATTR: &str = "data-selected";

fn find(document: &Document, selector: &'static str) -> Result<Element, PanelError> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .ok_or(PanelError::MissingElement(selector))
}

fn find_as<T: JsCast>(
    document: &Document,
    selector: &'static str,
    expected: &'static str,
) -> Result<T, PanelError> {
    find(document, selector)?
        .dyn_into::<T>()
        .map_err(|_| PanelError::WrongElementType { selector, expected })
}

// ---------------------------------------------------------------------------
// DomView
// ---------------------------------------------------------------------------

pub(crate) struct DomView {
    pub(crate) search_box: HtmlInputElement,
    pub(crate) case_select: HtmlSelectElement,
    pub(crate) regex_toggle: Element,
    pub(crate) context_toggle: Element,
    results: Element,
}

impl DomView {
    /// Look up every element the panel needs. Any missing element is fatal.
    pub(crate) fn locate(document: &Document) -> Result<Self, PanelError> {
        Ok(Self {
            search_box: find_as(document, SEARCH_BOX, "an <input>")?,
            case_select: find_as(document, CASE_SELECT, "a <select>")?,
            regex_toggle: find(document, REGEX_TOGGLE)?,
            context_toggle: find(document, CONTEXT_TOGGLE)?,
            results: find(document, RESULTS)?,
        })
    }

    fn toggle(&self, field: OptionField) -> &Element {
        match field {
            OptionField::Regex => &self.regex_toggle,
            OptionField::Context => &self.context_toggle,
        }
    }
}

impl PanelView for DomView {
    fn set_query_text(&self, text: &str) {
        self.search_box.set_value(text);
    }

    fn set_case_sensitivity(&self, mode: CaseSensitivity) {
        self.case_select.set_value(mode.as_str());
    }

    fn set_toggle_state(&self, field: OptionField, selected: bool) {
        DomToggle(self.toggle(field).clone()).set_selected(selected);
    }

    fn replace_results(&self, html: &str) {
        self.results.set_inner_html(html);
    }
}

// ---------------------------------------------------------------------------
// DomToggle
// ---------------------------------------------------------------------------

/// A toggle `<button>` carrying `name` and `data-selected`.
#[derive(Clone)]
pub(crate) struct DomToggle(pub(crate) Element);

impl ToggleControl for DomToggle {
    fn option_name(&self) -> Option<String> {
        self.0.get_attribute("name")
    }

    fn is_selected(&self) -> bool {
        self.0.get_attribute(SELECTED_ATTR).as_deref() == Some("true")
    }

    fn set_selected(&self, selected: bool) {
        let value = if selected { "true" } else { "false" };
        if self.0.set_attribute(SELECTED_ATTR, value).is_err() {
            warn!(id = self.0.id().as_str(), "Could not update data-selected");
        }
    }
}
