//! Address-bar access, injected so the controller never touches `window.location`.

use std::cell::RefCell;

use crate::params::SearchParams;

/// Reads and pushes the page's URL query parameters.
pub trait Navigation {
    /// Parameters of the URL currently shown in the address bar.
    fn current_params(&self) -> SearchParams;

    /// Push a new history entry with `params` as its query string, without
    /// reloading the page.
    fn push_params(&self, params: &SearchParams);
}

/// History kept in memory: the last entry is the current URL.
#[derive(Debug)]
pub struct MemoryNavigation {
    entries: RefCell<Vec<SearchParams>>,
}

impl MemoryNavigation {
    pub fn new(initial: SearchParams) -> Self {
        Self { entries: RefCell::new(vec![initial]) }
    }

    pub fn from_query(query: &str) -> Self {
        Self::new(SearchParams::parse(query))
    }

    /// Number of history entries, including the initial one.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop the current entry, like the browser's back button. Returns false
    /// when already at the first entry.
    pub fn back(&self) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.len() > 1 {
            entries.pop();
            true
        } else {
            false
        }
    }
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new(SearchParams::new())
    }
}

impl Navigation for MemoryNavigation {
    fn current_params(&self) -> SearchParams {
        self.entries.borrow().last().cloned().unwrap_or_default()
    }

    fn push_params(&self, params: &SearchParams) {
        self.entries.borrow_mut().push(params.clone());
    }
}
