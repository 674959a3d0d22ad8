//! livesearch core: the browser-independent half of the search panel.
//!
//! The panel keeps a flat set of search options in lockstep with the page URL
//! and swaps backend-rendered results markup into the page. Everything that
//! touches the browser sits behind three traits, so this crate builds and
//! tests natively.
//!
//! # Modules
//!
//! - [`options`]: `SearchOptions`, `CaseSensitivity`, toggle-able `OptionField`s
//! - [`params`]: query-string codec shared by the page URL and the backend URL
//! - [`controller`]: `SearchPanelController`: restore, sync, search, event handlers
//! - [`navigation`]: address-bar access (`Navigation`) plus an in-memory history
//! - [`backend`]: the results fetch (`SearchBackend`)
//! - [`view`]: the page elements (`PanelView`, `ToggleControl`) and inline error markup
//! - [`config`]: `PanelConfig` decoded from the page's init payload
//! - [`error`]: `PanelError`, `FetchError`

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod options;
pub mod params;
pub mod view;

pub use backend::SearchBackend;
pub use config::PanelConfig;
pub use controller::{SearchOutcome, SearchPanelController};
pub use error::{FetchError, PanelError};
pub use navigation::{MemoryNavigation, Navigation};
pub use options::{CaseSensitivity, OptionField, SearchOptions};
pub use params::SearchParams;
pub use view::{PanelView, ToggleControl};
