//! The search panel controller.
//!
//! Owns the live [`SearchOptions`], keeps them mirrored in the page URL, and
//! turns every change into a results fetch. All collaborators are injected, so
//! the same controller runs in the browser and in tests.
//!
//! Every mutation goes through [`SearchPanelController::update_search_param_state`],
//! which pushes a history entry and then searches. There is no debouncing:
//! each keystroke issues a request. Responses are ordered by a request
//! sequence number and only the most recently issued one is rendered.

use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};
use web_time::Instant;

use crate::backend::SearchBackend;
use crate::config::PanelConfig;
use crate::error::{FetchError, PanelError};
use crate::navigation::Navigation;
use crate::options::{CaseSensitivity, OptionField, SearchOptions};
use crate::params::{decode_options, encode_options, search_url};
use crate::view::{PanelView, ToggleControl};

/// What a call to [`SearchPanelController::do_search`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query; no request was made.
    Skipped,
    /// The response was the latest one and is now displayed.
    Rendered,
    /// A newer search was issued while this one was in flight; its response
    /// was dropped.
    Stale,
    /// The latest search failed; the error is displayed inline.
    Failed(FetchError),
}

pub struct SearchPanelController<N, B, V> {
    config: PanelConfig,
    navigation: N,
    backend: B,
    view: V,
    options: RefCell<SearchOptions>,
    /// Sequence number of the most recently issued search.
    issued: Cell<u64>,
}

impl<N, B, V> SearchPanelController<N, B, V>
where
    N: Navigation,
    B: SearchBackend,
    V: PanelView,
{
    pub fn new(config: PanelConfig, navigation: N, backend: B, view: V) -> Self {
        Self {
            config,
            navigation,
            backend,
            view,
            options: RefCell::new(SearchOptions::default()),
            issued: Cell::new(0),
        }
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> SearchOptions {
        self.options.borrow().clone()
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    // -----------------------------------------------------------------------
    // URL <-> state
    // -----------------------------------------------------------------------

    /// Rebuild the options from the current URL and make the controls match.
    /// Does not search.
    pub fn init_state_from_params(&self) {
        let options = decode_options(&self.navigation.current_params());

        self.view.set_query_text(&options.query);
        self.view.set_case_sensitivity(options.case_sensitivity);
        for field in OptionField::ALL {
            self.view.set_toggle_state(field, options.flag(field));
        }

        debug!(
            query = options.query.as_str(),
            regex = options.use_regex,
            context = options.show_context,
            fold_case = %options.case_sensitivity,
            "Restored search options from URL"
        );
        *self.options.borrow_mut() = options;
    }

    /// Mirror the options into a new history entry, then search.
    pub async fn update_search_param_state(&self) -> SearchOutcome {
        let mut params = self.navigation.current_params();
        encode_options(&self.options.borrow(), &mut params);
        self.navigation.push_params(&params);
        self.do_search().await
    }

    /// Back/forward navigation: take the options from the URL again and show
    /// the matching results. Does not push a new entry. An entry without a
    /// query clears the results.
    pub async fn restore_from_history(&self) -> SearchOutcome {
        self.init_state_from_params();
        let outcome = self.do_search().await;
        if outcome == SearchOutcome::Skipped {
            self.view.replace_results("");
        }
        outcome
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Fetch results for the current options and display them.
    ///
    /// Every call takes a new sequence number, including calls skipped for an
    /// empty query, so clearing the box also invalidates searches in flight.
    /// Failures never escape: they are rendered into the results container.
    pub async fn do_search(&self) -> SearchOutcome {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);

        let url = {
            let options = self.options.borrow();
            if !options.has_query() {
                return SearchOutcome::Skipped;
            }
            search_url(&self.config.results_path, &options)
        };

        debug!(seq, url = url.as_str(), "Issuing search");
        let start = Instant::now();
        let result = self.backend.fetch_results(&url).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let latest = self.issued.get();
        if seq != latest {
            debug!(seq, latest, elapsed_ms, "Dropping stale search response");
            return SearchOutcome::Stale;
        }

        match result {
            Ok(html) => {
                let render_start = Instant::now();
                self.view.replace_results(&html);
                info!(
                    seq,
                    bytes = html.len(),
                    elapsed_ms,
                    render_ms = render_start.elapsed().as_millis() as u64,
                    "Rendered search results"
                );
                SearchOutcome::Rendered
            }
            Err(e) => {
                warn!(seq, error = %e, elapsed_ms, "Search failed");
                self.view.show_error(&e);
                SearchOutcome::Failed(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Search box input.
    pub async fn update_query(&self, text: String) -> SearchOutcome {
        self.options.borrow_mut().query = text;
        self.update_search_param_state().await
    }

    /// Toggle button click. The button's `name` picks the option; its
    /// `data-selected` state is flipped and becomes the option's value.
    pub async fn toggle_control<T>(&self, button: &T) -> Result<SearchOutcome, PanelError>
    where
        T: ToggleControl + ?Sized,
    {
        let name = button.option_name().unwrap_or_default();
        let field = OptionField::from_name(&name).ok_or(PanelError::UnknownOption(name))?;

        let selected = !button.is_selected();
        button.set_selected(selected);
        self.options.borrow_mut().set_flag(field, selected);
        debug!(option = field.name(), selected, "Toggled search option");

        Ok(self.update_search_param_state().await)
    }

    /// Case selector change.
    pub async fn set_case_sensitivity(&self, mode: CaseSensitivity) -> SearchOutcome {
        self.options.borrow_mut().case_sensitivity = mode;
        self.update_search_param_state().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryNavigation;
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingView {
        query_text: RefCell<String>,
        case: Cell<Option<CaseSensitivity>>,
        toggles: RefCell<HashMap<OptionField, bool>>,
        results: RefCell<String>,
        renders: Cell<usize>,
    }

    impl RecordingView {
        fn results(&self) -> String {
            self.results.borrow().clone()
        }
    }

    impl PanelView for RecordingView {
        fn set_query_text(&self, text: &str) {
            *self.query_text.borrow_mut() = text.to_string();
        }
        fn set_case_sensitivity(&self, mode: CaseSensitivity) {
            self.case.set(Some(mode));
        }
        fn set_toggle_state(&self, field: OptionField, selected: bool) {
            self.toggles.borrow_mut().insert(field, selected);
        }
        fn replace_results(&self, html: &str) {
            *self.results.borrow_mut() = html.to_string();
            self.renders.set(self.renders.get() + 1);
        }
    }

    /// Answers immediately, echoing the URL, unless told to fail.
    #[derive(Default)]
    struct ScriptedBackend {
        requests: RefCell<Vec<String>>,
        fail_with: RefCell<Option<FetchError>>,
    }

    impl ScriptedBackend {
        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl SearchBackend for ScriptedBackend {
        async fn fetch_results(&self, url: &str) -> Result<String, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            match self.fail_with.borrow().clone() {
                Some(e) => Err(e),
                None => Ok(format!("<ul>{url}</ul>")),
            }
        }
    }

    /// Holds every request open until the test answers it.
    #[derive(Default)]
    struct GatedBackend {
        pending: RefCell<Vec<(String, oneshot::Sender<Result<String, FetchError>>)>>,
    }

    impl GatedBackend {
        fn pending_len(&self) -> usize {
            self.pending.borrow().len()
        }

        fn respond(&self, query: &str, result: Result<String, FetchError>) {
            let needle = format!("q={query}&");
            let mut pending = self.pending.borrow_mut();
            let idx = pending
                .iter()
                .position(|(url, _)| url.contains(&needle))
                .unwrap_or_else(|| panic!("no pending request for {query}"));
            let (_, tx) = pending.remove(idx);
            tx.send(result).unwrap();
        }
    }

    impl SearchBackend for GatedBackend {
        async fn fetch_results(&self, url: &str) -> Result<String, FetchError> {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push((url.to_string(), tx));
            rx.await.unwrap_or_else(|_| Err(FetchError::Transport("dropped".into())))
        }
    }

    struct FakeToggle {
        name: Option<String>,
        selected: Cell<bool>,
    }

    impl FakeToggle {
        fn named(name: &str, selected: bool) -> Self {
            Self { name: Some(name.to_string()), selected: Cell::new(selected) }
        }
    }

    impl ToggleControl for FakeToggle {
        fn option_name(&self) -> Option<String> {
            self.name.clone()
        }
        fn is_selected(&self) -> bool {
            self.selected.get()
        }
        fn set_selected(&self, selected: bool) {
            self.selected.set(selected);
        }
    }

    type TestController<B> = SearchPanelController<MemoryNavigation, B, RecordingView>;

    fn controller<B: SearchBackend>(backend: B, url_query: &str) -> TestController<B> {
        let ctrl = SearchPanelController::new(
            PanelConfig::default(),
            MemoryNavigation::from_query(url_query),
            backend,
            RecordingView::default(),
        );
        ctrl.init_state_from_params();
        ctrl
    }

    async fn yield_until(cond: impl Fn() -> bool) {
        while !cond() {
            tokio::task::yield_now().await;
        }
    }

    // -----------------------------------------------------------------------
    // State restore
    // -----------------------------------------------------------------------

    #[test]
    fn restores_state_and_controls_from_url() {
        let ctrl = controller(ScriptedBackend::default(), "q=hello%20world&fold_case=true");

        let opts = ctrl.options();
        assert_eq!(opts.query, "hello world");
        assert_eq!(opts.case_sensitivity, CaseSensitivity::True);
        assert!(!opts.use_regex);
        assert!(opts.show_context);

        let view = ctrl.view();
        assert_eq!(*view.query_text.borrow(), "hello world");
        assert_eq!(view.case.get(), Some(CaseSensitivity::True));
        assert_eq!(view.toggles.borrow().get(&OptionField::Regex), Some(&false));
        assert_eq!(view.toggles.borrow().get(&OptionField::Context), Some(&true));

        // Restoring never searches on its own.
        assert!(ctrl.backend().requests().is_empty());
        assert_eq!(view.renders.get(), 0);
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_query_makes_no_request() {
        let ctrl = controller(ScriptedBackend::default(), "");
        assert_eq!(ctrl.do_search().await, SearchOutcome::Skipped);
        assert_eq!(ctrl.update_query(String::new()).await, SearchOutcome::Skipped);
        assert!(ctrl.backend().requests().is_empty());
        assert_eq!(ctrl.view().renders.get(), 0);
    }

    #[tokio::test]
    async fn query_issues_exactly_one_request_with_current_flags() {
        let ctrl = controller(ScriptedBackend::default(), "");
        let outcome = ctrl.update_query("foo".to_string()).await;

        assert_eq!(outcome, SearchOutcome::Rendered);
        let expected = "/serveSearchResults?q=foo&fold_case=auto&regex=false&context=true";
        assert_eq!(ctrl.backend().requests(), vec![expected.to_string()]);
        assert_eq!(ctrl.view().results(), format!("<ul>{expected}</ul>"));
    }

    #[tokio::test]
    async fn update_pushes_history_and_keeps_other_params() {
        let ctrl = controller(ScriptedBackend::default(), "repo=livegrep");
        ctrl.update_query("needle".to_string()).await;

        let nav = ctrl.navigation();
        assert_eq!(nav.len(), 2);
        let params = nav.current_params();
        assert_eq!(params.get("repo"), Some("livegrep"));
        assert_eq!(params.get("q"), Some("needle"));
        assert_eq!(params.get("regex"), Some("false"));
        assert_eq!(params.get("context"), Some("true"));
        assert_eq!(params.get("fold_case"), Some("auto"));
    }

    #[tokio::test]
    async fn case_selector_change_reaches_url_and_request() {
        let ctrl = controller(ScriptedBackend::default(), "q=Foo");
        ctrl.set_case_sensitivity(CaseSensitivity::False).await;

        assert_eq!(ctrl.navigation().current_params().get("fold_case"), Some("false"));
        assert!(ctrl.backend().requests()[0].contains("fold_case=false"));
    }

    #[tokio::test]
    async fn failed_search_is_rendered_inline() {
        let backend = ScriptedBackend::default();
        *backend.fail_with.borrow_mut() =
            Some(FetchError::Status { status: 500, body: String::new() });
        let ctrl = controller(backend, "");

        let outcome = ctrl.update_query("boom".to_string()).await;
        assert!(matches!(outcome, SearchOutcome::Failed(FetchError::Status { status: 500, .. })));
        let results = ctrl.view().results();
        assert!(results.contains("search-error"), "{results}");
        assert!(results.contains("HTTP 500"), "{results}");
    }

    // -----------------------------------------------------------------------
    // Toggles
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn toggling_twice_restores_option_and_button() {
        let ctrl = controller(ScriptedBackend::default(), "q=foo");
        let button = FakeToggle::named("regex", false);

        ctrl.toggle_control(&button).await.unwrap();
        assert!(ctrl.options().use_regex);
        assert!(button.is_selected());
        assert!(ctrl.backend().requests()[0].contains("regex=true"));

        ctrl.toggle_control(&button).await.unwrap();
        assert!(!ctrl.options().use_regex);
        assert!(!button.is_selected());
        assert_eq!(ctrl.backend().requests().len(), 2);
    }

    #[tokio::test]
    async fn context_toggle_uses_button_state() {
        let ctrl = controller(ScriptedBackend::default(), "");
        let button = FakeToggle::named("context", true);

        let outcome = ctrl.toggle_control(&button).await.unwrap();
        assert_eq!(outcome, SearchOutcome::Skipped);
        assert!(!ctrl.options().show_context);
        assert_eq!(ctrl.navigation().current_params().get("context"), Some("false"));
    }

    #[tokio::test]
    async fn unknown_toggle_name_changes_nothing() {
        let ctrl = controller(ScriptedBackend::default(), "q=foo");
        let button = FakeToggle::named("case", false);

        let err = ctrl.toggle_control(&button).await.unwrap_err();
        assert!(matches!(err, PanelError::UnknownOption(ref n) if n == "case"));
        assert!(!button.is_selected());
        assert_eq!(ctrl.navigation().len(), 1);
        assert!(ctrl.backend().requests().is_empty());

        let unnamed = FakeToggle { name: None, selected: Cell::new(false) };
        assert!(ctrl.toggle_control(&unnamed).await.is_err());
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn newer_results_win_when_older_response_arrives_last() {
        let ctrl = controller(GatedBackend::default(), "");

        let first = ctrl.update_query("first".to_string());
        let second = async {
            yield_until(|| ctrl.backend().pending_len() == 1).await;
            ctrl.update_query("second".to_string()).await
        };
        let driver = async {
            yield_until(|| ctrl.backend().pending_len() == 2).await;
            ctrl.backend().respond("second", Ok("<p>second</p>".to_string()));
            tokio::task::yield_now().await;
            ctrl.backend().respond("first", Ok("<p>first</p>".to_string()));
        };

        let (first, second, ()) = tokio::join!(first, second, driver);
        assert_eq!(first, SearchOutcome::Stale);
        assert_eq!(second, SearchOutcome::Rendered);
        assert_eq!(ctrl.view().results(), "<p>second</p>");
        assert_eq!(ctrl.view().renders.get(), 1);
    }

    #[tokio::test]
    async fn stale_failure_does_not_replace_newer_results() {
        let ctrl = controller(GatedBackend::default(), "");

        let first = ctrl.update_query("first".to_string());
        let second = async {
            yield_until(|| ctrl.backend().pending_len() == 1).await;
            ctrl.update_query("second".to_string()).await
        };
        let driver = async {
            yield_until(|| ctrl.backend().pending_len() == 2).await;
            ctrl.backend().respond("second", Ok("<p>second</p>".to_string()));
            tokio::task::yield_now().await;
            ctrl.backend().respond("first", Err(FetchError::Transport("reset".into())));
        };

        let (first, _, ()) = tokio::join!(first, second, driver);
        assert_eq!(first, SearchOutcome::Stale);
        assert_eq!(ctrl.view().results(), "<p>second</p>");
    }

    #[tokio::test]
    async fn clearing_the_query_drops_search_in_flight() {
        let ctrl = controller(GatedBackend::default(), "");

        let typed = ctrl.update_query("abc".to_string());
        let cleared = async {
            yield_until(|| ctrl.backend().pending_len() == 1).await;
            let outcome = ctrl.update_query(String::new()).await;
            ctrl.backend().respond("abc", Ok("<p>abc</p>".to_string()));
            outcome
        };

        let (typed, cleared) = tokio::join!(typed, cleared);
        assert_eq!(cleared, SearchOutcome::Skipped);
        assert_eq!(typed, SearchOutcome::Stale);
        assert_eq!(ctrl.view().renders.get(), 0);
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn back_navigation_restores_previous_search() {
        let ctrl = controller(ScriptedBackend::default(), "");
        ctrl.update_query("one".to_string()).await;
        ctrl.update_query("two".to_string()).await;

        assert!(ctrl.navigation().back());
        let outcome = ctrl.restore_from_history().await;

        assert_eq!(outcome, SearchOutcome::Rendered);
        assert_eq!(ctrl.options().query, "one");
        assert_eq!(*ctrl.view().query_text.borrow(), "one");
        let requests = ctrl.backend().requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].contains("q=one&"));
        // Restoring does not push another entry.
        assert_eq!(ctrl.navigation().len(), 2);
    }

    #[tokio::test]
    async fn back_to_empty_entry_clears_results() {
        let ctrl = controller(ScriptedBackend::default(), "");
        ctrl.update_query("foo".to_string()).await;
        assert!(ctrl.view().results().contains("q=foo&"));

        assert!(ctrl.navigation().back());
        let outcome = ctrl.restore_from_history().await;

        assert_eq!(outcome, SearchOutcome::Skipped);
        assert_eq!(ctrl.options().query, "");
        assert_eq!(*ctrl.view().query_text.borrow(), "");
        assert_eq!(ctrl.view().results(), "");
        assert_eq!(ctrl.backend().requests().len(), 1);
    }
}
