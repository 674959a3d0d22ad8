//! The search option model: query text plus the three user-controlled switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Case sensitivity
// ---------------------------------------------------------------------------

/// Tri-state case-folding mode, serialized as `auto` / `true` / `false`.
///
/// `True` and `False` are the literal values of the `fold_case` parameter, so
/// `True` means "fold case" (case-insensitive) and `False` means exact case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    /// Let the backend decide (case-insensitive unless the query has uppercase).
    #[default]
    Auto,
    True,
    False,
}

impl CaseSensitivity {
    pub const ALL: [CaseSensitivity; 3] =
        [CaseSensitivity::Auto, CaseSensitivity::True, CaseSensitivity::False];

    pub fn as_str(self) -> &'static str {
        match self {
            CaseSensitivity::Auto => "auto",
            CaseSensitivity::True => "true",
            CaseSensitivity::False => "false",
        }
    }
}

impl fmt::Display for CaseSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `fold_case` value is not one of the three accepted strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fold_case value '{0}' (expected auto, true or false)")]
pub struct InvalidCaseSensitivity(pub String);

impl FromStr for CaseSensitivity {
    type Err = InvalidCaseSensitivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(CaseSensitivity::Auto),
            "true" => Ok(CaseSensitivity::True),
            "false" => Ok(CaseSensitivity::False),
            _ => Err(InvalidCaseSensitivity(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Toggle-able options
// ---------------------------------------------------------------------------

/// A boolean option that a toggle button controls, addressed by the button's
/// `name` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionField {
    Regex,
    Context,
}

impl OptionField {
    pub const ALL: [OptionField; 2] = [OptionField::Regex, OptionField::Context];

    /// The `name` attribute (and URL parameter) this field is bound to.
    pub fn name(self) -> &'static str {
        match self {
            OptionField::Regex => "regex",
            OptionField::Context => "context",
        }
    }

    /// Resolve a toggle button's `name` attribute.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "regex" => Some(OptionField::Regex),
            "context" => Some(OptionField::Context),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

/// The complete, always-populated set of user-controllable search options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Search expression. Empty means "no search yet".
    pub query: String,
    pub use_regex: bool,
    pub show_context: bool,
    pub case_sensitivity: CaseSensitivity,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            use_regex: false,
            // Context is on unless the URL says otherwise; regex is off.
            show_context: true,
            case_sensitivity: CaseSensitivity::Auto,
        }
    }
}

impl SearchOptions {
    pub fn flag(&self, field: OptionField) -> bool {
        match field {
            OptionField::Regex => self.use_regex,
            OptionField::Context => self.show_context,
        }
    }

    pub fn set_flag(&mut self, field: OptionField, value: bool) {
        match field {
            OptionField::Regex => self.use_regex = value,
            OptionField::Context => self.show_context = value,
        }
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }
}
