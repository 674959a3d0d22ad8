//! livesearch web: binds the core search panel controller to the page.
//!
//! The host page loads the wasm bundle and calls `init(initData)`. From then
//! on every input, toggle click, case change and back/forward navigation is
//! routed into one `SearchPanelController`, which lives (together with its
//! event listeners) in a thread-local slot for the lifetime of the page.

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod navigation;

#[cfg(target_arch = "wasm32")]
pub use wasm::init;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Once;

    use livesearch_core::{CaseSensitivity, PanelConfig, PanelError, SearchPanelController};
    use tracing::{debug, info, warn};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent, Window};

    use crate::dom::{DomToggle, DomView};
    use crate::fetch::HttpBackend;
    use crate::navigation::BrowserNavigation;

    type Controller = SearchPanelController<BrowserNavigation, HttpBackend, DomView>;

    /// A registered DOM listener. Dropping it unregisters the callback.
    struct Listener {
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        fn attach(
            target: &EventTarget,
            event: &'static str,
            handler: impl FnMut(Event) + 'static,
        ) -> Result<Self, PanelError> {
            let callback =
                Closure::<dyn FnMut(Event)>::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
            target
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                .map_err(|_| PanelError::Unavailable("addEventListener"))?;
            Ok(Self { target: target.clone(), event, callback })
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        }
    }

    struct Panel {
        _controller: Rc<Controller>,
        _listeners: Vec<Listener>,
    }

    thread_local! {
        static PANEL: RefCell<Option<Panel>> = const { RefCell::new(None) };
    }

    static TRACING: Once = Once::new();

    /// Page entry point. `init_data` is the page's bootstrap payload; its
    /// `results_path` key, when present, overrides the results endpoint.
    #[wasm_bindgen]
    pub fn init(init_data: JsValue) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        TRACING.call_once(tracing_wasm::set_as_global_default);

        start(init_data).map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))
    }

    fn start(init_data: JsValue) -> Result<(), PanelError> {
        let raw = js_sys::JSON::stringify(&init_data)
            .ok()
            .and_then(|s| s.as_string())
            .unwrap_or_default();
        debug!(init_data = raw.as_str(), "Initializing search panel");
        let config = PanelConfig::from_init_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring init payload");
            PanelConfig::default()
        });

        let window = web_sys::window().ok_or(PanelError::Unavailable("window"))?;
        let document = window.document().ok_or(PanelError::Unavailable("document"))?;
        let view = DomView::locate(&document)?;

        let search_box = view.search_box.clone();
        let case_select = view.case_select.clone();
        let toggles = [view.regex_toggle.clone(), view.context_toggle.clone()];

        let controller = Rc::new(SearchPanelController::new(
            config,
            BrowserNavigation::new(window.clone()),
            HttpBackend,
            view,
        ));

        let mut listeners = Vec::new();

        for toggle in toggles {
            let ctrl = Rc::clone(&controller);
            let button = DomToggle(toggle.clone());
            listeners.push(Listener::attach(&toggle, "click", move |_| {
                let ctrl = Rc::clone(&ctrl);
                let button = button.clone();
                spawn_local(async move {
                    if let Err(e) = ctrl.toggle_control(&button).await {
                        warn!(error = %e, "Ignoring toggle click");
                    }
                });
            })?);
        }

        {
            let ctrl = Rc::clone(&controller);
            let input = search_box.clone();
            listeners.push(Listener::attach(&search_box, "input", move |_| {
                let ctrl = Rc::clone(&ctrl);
                let text = input.value();
                spawn_local(async move {
                    ctrl.update_query(text).await;
                });
            })?);
        }

        {
            let ctrl = Rc::clone(&controller);
            let select = case_select.clone();
            listeners.push(Listener::attach(&case_select, "change", move |_| {
                let ctrl = Rc::clone(&ctrl);
                let mode = select.value().parse().unwrap_or_else(|e| {
                    warn!(error = %e, "Unexpected case selector value");
                    CaseSensitivity::Auto
                });
                spawn_local(async move {
                    ctrl.set_case_sensitivity(mode).await;
                });
            })?);
        }

        {
            let ctrl = Rc::clone(&controller);
            listeners.push(Listener::attach(&window, "popstate", move |_| {
                let ctrl = Rc::clone(&ctrl);
                spawn_local(async move {
                    ctrl.restore_from_history().await;
                });
            })?);
        }

        {
            let ctrl = Rc::clone(&controller);
            let win = window.clone();
            let input = search_box.clone();
            listeners.push(Listener::attach(&document, "keydown", move |event| {
                if let Some(text) = focus_shortcut(&win, &input, &event) {
                    let ctrl = Rc::clone(&ctrl);
                    spawn_local(async move {
                        ctrl.update_query(text).await;
                    });
                }
            })?);
        }

        controller.init_state_from_params();
        info!(
            results_path = controller.config().results_path.as_str(),
            query = controller.options().query.as_str(),
            "Search panel ready"
        );

        PANEL.with(|slot| {
            *slot.borrow_mut() = Some(Panel { _controller: controller, _listeners: listeners });
        });
        Ok(())
    }

    /// `/` outside an editable field focuses the search box. When text is
    /// selected on the page it becomes the new query, which is returned.
    fn focus_shortcut(window: &Window, input: &HtmlInputElement, event: &Event) -> Option<String> {
        let key_event = event.dyn_ref::<KeyboardEvent>()?;
        if key_event.key() != "/" || key_event.ctrl_key() || key_event.meta_key() || key_event.alt_key()
        {
            return None;
        }
        if event.target().is_some_and(|t| is_editable(&t)) {
            return None;
        }

        event.prevent_default();
        let selected = window
            .get_selection()
            .ok()
            .flatten()
            .map(|s| String::from(s.to_string()))
            .filter(|s| !s.trim().is_empty());
        let _ = input.focus();

        let text = selected?;
        input.set_value(&text);
        Some(text)
    }

    fn is_editable(target: &EventTarget) -> bool {
        match target.dyn_ref::<HtmlElement>() {
            Some(el) => {
                matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
                    || el.is_content_editable()
            }
            None => false,
        }
    }
}
