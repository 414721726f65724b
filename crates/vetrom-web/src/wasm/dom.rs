#![forbid(unsafe_code)]

//! DOM plumbing shared by the widget bindings: errors, console, clock,
//! listeners, `localStorage`, and the ambient capabilities the style crate
//! asks for.

use std::time::Duration;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlElement, Node, Storage, Window};

use vetrom_runtime::logging::LOG_TARGET;
use vetrom_runtime::{KeyValueStore, StorageError};
use vetrom_style::theme::{effective_background, resolve_direction};
use vetrom_style::{AmbientSnapshot, CssNamedColors, NamedColorResolver};

// ---------------------------------------------------------------------------
// Errors and console
// ---------------------------------------------------------------------------

/// Failure while building a widget's DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    NoWindow,
    NoDocument,
    /// A required element is absent or of the wrong type.
    Missing(&'static str),
    /// A DOM call threw.
    Js(String),
    /// The page state was already borrowed by an outer handler.
    Busy,
}

impl core::fmt::Display for DomError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::Missing(what) => write!(f, "missing element: {what}"),
            Self::Js(msg) => write!(f, "DOM error: {msg}"),
            Self::Busy => write!(f, "page state is busy"),
        }
    }
}

impl std::error::Error for DomError {}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_message(&value))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

pub fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(func) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(func) = func.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = func.call1(&console, &JsValue::from_str(msg));
}

pub fn console_error(msg: &str) {
    console_call("error", msg);
}

// ---------------------------------------------------------------------------
// Globals and clocks
// ---------------------------------------------------------------------------

pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

pub fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::NoDocument)
}

/// Monotonic page clock for UI deadlines.
pub fn now() -> Duration {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

/// Wall clock in epoch milliseconds, for stored records.
pub fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

// ---------------------------------------------------------------------------
// Elements and events
// ---------------------------------------------------------------------------

/// Register `handler` for `event` on `target` for the page's lifetime.
///
/// Events that are not an `E` are skipped.
pub fn listen<E, F>(target: &EventTarget, event: &str, mut handler: F)
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    if let Err(err) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        tracing::warn!(target: LOG_TARGET, event, error = %js_message(&err), "cannot add listener");
    }
    closure.forget();
}

/// First descendant matching `selector`, cast to `T`.
pub fn find<T: JsCast>(root: &Element, selector: &'static str) -> Result<T, DomError> {
    root.query_selector(selector)?
        .ok_or(DomError::Missing(selector))?
        .dyn_into::<T>()
        .map_err(|_| DomError::Missing(selector))
}

/// New element with a class name, cast to `T`.
pub fn create<T: JsCast>(document: &Document, tag: &str, class: &str) -> Result<T, DomError> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element
        .dyn_into::<T>()
        .map_err(|_| DomError::Js(format!("<{tag}> is not the expected element type")))
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

/// Replace the text of `element` unless it already reads `text`. Each write
/// swaps in a new text node, which page observers see as an added node.
pub fn set_text(element: &Node, text: &str) {
    if element.text_content().as_deref() != Some(text) {
        element.set_text_content(Some(text));
    }
}

pub fn toggle_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

/// Whether the event target lies inside `container`.
pub fn contains_target(container: &Element, target: Option<&EventTarget>) -> bool {
    target
        .and_then(|t| t.dyn_ref::<Node>())
        .is_some_and(|node| container.contains(Some(node)))
}

/// Add a `<style id>` to `<head>` unless one with that id exists.
pub fn inject_style(document: &Document, id: &str, css: &str) -> Result<(), DomError> {
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let style = document.create_element("style")?;
    style.set_id(id);
    style.set_text_content(Some(css));
    let head = document.head().ok_or(DomError::Missing("head"))?;
    head.append_child(&style)?;
    Ok(())
}

/// `navigator.clipboard.writeText(text)`; the returned promise is not awaited.
pub fn write_clipboard(text: &str) -> Result<(), DomError> {
    let window = window()?;
    let navigator = Reflect::get(&window, &"navigator".into())?;
    let clipboard = Reflect::get(&navigator, &"clipboard".into())?;
    let write = Reflect::get(&clipboard, &"writeText".into())?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| DomError::Missing("navigator.clipboard"))?;
    write.call1(&clipboard, &JsValue::from_str(text))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// localStorage
// ---------------------------------------------------------------------------

/// [`KeyValueStore`] over `window.localStorage`.
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    /// Open the store. Denied or missing storage yields an always-failing store.
    pub fn open(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = %js_message(&err), "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(|err| StorageError::Read {
            key: key.to_string(),
            message: js_message(&err),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(|err| StorageError::Write {
            key: key.to_string(),
            message: js_message(&err),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(|err| StorageError::Write {
            key: key.to_string(),
            message: js_message(&err),
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let storage = self.storage()?;
        let read_error = |err: JsValue| StorageError::Read {
            key: String::new(),
            message: js_message(&err),
        };
        let len = storage.length().map_err(read_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = storage.key(i).map_err(read_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// Ambient capabilities
// ---------------------------------------------------------------------------

fn computed(window: &Window, element: &Element, property: &str) -> Option<String> {
    window
        .get_computed_style(element)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value(property).ok())
}

/// Named colors: the built-in table first, then the browser's own parser.
pub struct DomNamedColors {
    window: Window,
    document: Document,
}

impl DomNamedColors {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// Let the browser compute a color the table does not know.
    fn probe(&self, name: &str) -> Option<String> {
        let probe: HtmlElement = self.document.create_element("span").ok()?.dyn_into().ok()?;
        probe.style().set_property("color", name).ok()?;
        // Rejected values leave the declaration empty.
        if probe.style().get_property_value("color").ok()?.is_empty() {
            return None;
        }
        self.document.body()?.append_child(&probe).ok()?;
        let color = computed(&self.window, &probe, "color");
        probe.remove();
        color.filter(|c| !c.is_empty())
    }
}

impl NamedColorResolver for DomNamedColors {
    fn resolve(&self, name: &str) -> Option<String> {
        CssNamedColors.resolve(name).or_else(|| self.probe(name))
    }
}

/// Snapshot the background and direction `element` sits on.
pub fn ambient_for(window: &Window, document: &Document, element: &Element, max_depth: usize) -> AmbientSnapshot {
    let mut backgrounds = Vec::new();
    let mut directions = Vec::new();
    let mut node = Some(element.clone());
    while let Some(el) = node {
        if backgrounds.len() < max_depth {
            backgrounds.push(computed(window, &el, "background-color").unwrap_or_default());
        }
        directions.push(
            el.get_attribute("dir")
                .or_else(|| computed(window, &el, "direction")),
        );
        node = el.parent_element();
    }
    let document_background = document
        .body()
        .and_then(|body| computed(window, &body, "background-color"));
    AmbientSnapshot::new(
        effective_background(backgrounds, document_background.as_deref(), max_depth),
        resolve_direction(directions),
    )
}
