//! Error types for the search panel.

use thiserror::Error;

/// Failure of a single results fetch. Always caught at the call boundary and
/// rendered inline; never propagated out of an event handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (offline, DNS, aborted, CORS).
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("search backend returned HTTP {status}")]
    Status { status: u16, body: String },

    /// A response arrived but its body could not be read as text.
    #[error("could not read response body: {0}")]
    Body(String),
}

/// Errors raised by the panel controller and its bindings.
#[derive(Debug, Error)]
pub enum PanelError {
    /// A required element is absent from the host page. Fatal at startup.
    #[error("required element '{0}' not found on the page")]
    MissingElement(&'static str),

    /// An element was found but has the wrong type (e.g. not an `<input>`).
    #[error("element '{selector}' is not {expected}")]
    WrongElementType { selector: &'static str, expected: &'static str },

    /// A toggle button's `name` attribute does not name a search option.
    #[error("toggle button names unknown option '{0}'")]
    UnknownOption(String),

    /// A browser API the panel depends on is unavailable.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("invalid init payload: {0}")]
    InitPayload(#[from] serde_json::Error),
}
