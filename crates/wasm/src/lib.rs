use std::collections::HashMap;

use folio_flow_core::{Coordinator, NavigationOutcome, SubscriptionId};
use folio_flow_protocol::{Environment, IntersectionEntry, NavKey, PageSnapshot};
use wasm_bindgen::prelude::*;

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// A section coordinator owned by the page script.
///
/// The page constructs one instance at load, forwards DOM input to it, and
/// applies the JSON commands returned by `take_commands` after each call.
#[wasm_bindgen]
pub struct ContentFlow {
    inner: Coordinator,
    subscriptions: HashMap<u32, SubscriptionId>,
    next_handle: u32,
}

#[wasm_bindgen]
impl ContentFlow {
    /// Build from JSON config overrides and a JSON page snapshot.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        page_json: &str,
        reduced_motion: bool,
        touch_capable: bool,
    ) -> Result<ContentFlow, JsError> {
        let env = Environment {
            reduced_motion,
            touch_capable,
        };
        let inner = Coordinator::from_json(config_json, env, page_json).map_err(js_error)?;
        Ok(Self {
            inner,
            subscriptions: HashMap::new(),
            next_handle: 0,
        })
    }

    pub fn on_scroll(&mut self, y: f64, now: f64) {
        self.inner.on_scroll(y, now);
    }

    pub fn on_frame(&mut self, now: f64) {
        self.inner.on_frame(now);
    }

    /// Forward native `IntersectionObserver` entries as a JSON array.
    pub fn on_intersection(&mut self, entries_json: &str, now: f64) -> Result<(), JsError> {
        let entries: Vec<IntersectionEntry> =
            serde_json::from_str(entries_json).map_err(js_error)?;
        self.inner.on_intersection(&entries, now);
        Ok(())
    }

    /// `key` is `KeyboardEvent.key`. Returns whether the page should call
    /// `preventDefault`.
    pub fn on_key(&mut self, key: &str, editing: bool, now: f64) -> bool {
        NavKey::from_dom_key(key).is_some_and(|key| self.inner.on_key(key, editing, now))
    }

    pub fn on_touch_start(&mut self, y: f64, now: f64) {
        self.inner.on_touch_start(y, now);
    }

    pub fn on_touch_end(&mut self, y: f64, now: f64) -> bool {
        self.inner.on_touch_end(y, now) == Some(NavigationOutcome::Started)
    }

    pub fn on_marker_click(&mut self, section_id: &str, now: f64) -> bool {
        self.inner.on_marker_click(section_id, now) == NavigationOutcome::Started
    }

    pub fn navigate_to_section(&mut self, section_id: &str, now: f64) -> bool {
        self.inner.navigate_to_section(section_id, now) == NavigationOutcome::Started
    }

    pub fn navigate_to_next(&mut self, now: f64) -> bool {
        self.inner.navigate_to_next(now) == NavigationOutcome::Started
    }

    pub fn navigate_to_previous(&mut self, now: f64) -> bool {
        self.inner.navigate_to_previous(now) == NavigationOutcome::Started
    }

    pub fn navigate_to_first(&mut self, now: f64) -> bool {
        self.inner.navigate_to_first(now) == NavigationOutcome::Started
    }

    pub fn navigate_to_last(&mut self, now: f64) -> bool {
        self.inner.navigate_to_last(now) == NavigationOutcome::Started
    }

    pub fn cancel_navigation(&mut self) -> bool {
        self.inner.cancel_navigation()
    }

    pub fn current_section(&self) -> Option<String> {
        self.inner.current_section().map(String::from)
    }

    pub fn section_progress(&self, section_id: &str) -> f64 {
        self.inner.section_progress(section_id)
    }

    pub fn is_section_visible(&self, section_id: &str) -> bool {
        self.inner.is_section_visible(section_id)
    }

    pub fn is_transitioning(&self) -> bool {
        self.inner.is_transitioning()
    }

    pub fn scroll_direction(&self) -> String {
        self.inner.scroll_direction().as_str().to_owned()
    }

    /// Whether the page should request another animation frame.
    pub fn wants_frame(&self) -> bool {
        self.inner.wants_frame()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.next_deadline()
    }

    /// Drain queued host commands as a JSON array.
    pub fn take_commands(&mut self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner.take_commands()).map_err(js_error)
    }

    /// Re-scan the page from a fresh JSON snapshot.
    pub fn refresh(&mut self, page_json: &str) -> Result<(), JsError> {
        let snapshot: PageSnapshot = serde_json::from_str(page_json).map_err(js_error)?;
        self.inner.refresh(snapshot);
        Ok(())
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
        self.subscriptions.clear();
    }

    /// Register `callback(eventJson)` for every flow event. Returns a handle
    /// for `unsubscribe`.
    pub fn subscribe(&mut self, callback: js_sys::Function) -> u32 {
        let id = self.inner.subscribe(move |event| {
            let json = match serde_json::to_string(event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!(%err, "flow event could not be serialized");
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                tracing::warn!(?err, "flow event subscriber threw");
            }
        });
        let handle = self.next_handle;
        self.next_handle += 1;
        self.subscriptions.insert(handle, id);
        handle
    }

    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        self.subscriptions
            .remove(&handle)
            .is_some_and(|id| self.inner.unsubscribe(id))
    }
}
