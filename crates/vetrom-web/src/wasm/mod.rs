#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the Vetrom page.
//!
//! [`VetromPage`] owns a [`PageCore`] plus the DOM views of every widget it
//! created. The whole document is scanned on construction and on
//! [`VetromPage::refresh`]; afterwards only nodes added outside widget
//! chrome are examined. Only compiled on `wasm32` targets.

mod code_block;
mod dom;
mod gallery;
mod player;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, KeyboardEvent, MouseEvent, MutationObserver,
    MutationObserverInit, MutationRecord, Window,
};

use tracing::Level;

use vetrom_runtime::PositionCache;
use vetrom_runtime::logging::LOG_TARGET;

use crate::console::{ConsoleLayer, console_method};
use crate::page::{PageCore, load_options};
use crate::scan::{APPLIED_ATTR, BUILT_CHROME_SELECTOR, SCAN_SELECTOR, WidgetKind, classify};

use self::dom::{DomError, LocalStore, console_call, console_error, listen, now, now_ms};

/// Period of the shared timer driving copy labels, control auto-hide,
/// periodic saves, and thumbnail timeouts.
const TICK_MS: i32 = 250;

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "vetrom panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("vetrom panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Route `tracing` events at WARN and above to `console.*`.
fn install_console_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let layer = ConsoleLayer::new(Level::WARN, |level, line: &str| {
        console_call(console_method(level), line);
    });
    // A host that installed its own subscriber keeps it.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
    install_console_logging();
}

// ---------------------------------------------------------------------------
// Page state
// ---------------------------------------------------------------------------

pub(crate) struct PageState {
    core: PageCore,
    cache: PositionCache<LocalStore>,
    code_blocks: Vec<code_block::CodeBlockView>,
    /// Indexed like the gallery registry in `core`.
    galleries: Vec<gallery::GalleryView>,
    /// Created on first open.
    lightbox: Option<gallery::LightboxView>,
    players: Vec<player::PlayerView>,
}

pub(crate) type Shared = Rc<RefCell<PageState>>;

/// Run `f` on the page state. Returns `None` when an outer handler still
/// holds it, which happens when a DOM call dispatches an event synchronously.
pub(crate) fn with_state<R>(shared: &Shared, f: impl FnOnce(&mut PageState) -> R) -> Option<R> {
    match shared.try_borrow_mut() {
        Ok(mut state) => Some(f(&mut state)),
        Err(_) => {
            tracing::debug!(target: LOG_TARGET, "nested event skipped");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Turn every unprocessed candidate in the document into a widget.
fn scan(shared: &Shared) -> Result<usize, DomError> {
    let document = dom::document()?;
    let nodes = document.query_selector_all(SCAN_SELECTOR)?;
    let candidates = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<HtmlElement>().ok());
    attach_all(shared, &document, candidates)
}

/// Candidates among the nodes the mutation `records` added, each added
/// element plus its descendants. Mutations inside chrome the widgets built
/// are skipped.
fn added_candidates(records: &js_sys::Array) -> Vec<HtmlElement> {
    let mut out = Vec::new();
    for record in records.iter().filter_map(|r| r.dyn_into::<MutationRecord>().ok()) {
        let in_chrome = record
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|t| matches!(t.closest(BUILT_CHROME_SELECTOR), Ok(Some(_))));
        if in_chrome {
            continue;
        }
        let added = record.added_nodes();
        for i in 0..added.length() {
            let Some(element) = added.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if element.matches(SCAN_SELECTOR).unwrap_or(false)
                && let Ok(html) = element.clone().dyn_into::<HtmlElement>()
            {
                out.push(html);
            }
            let Ok(nested) = element.query_selector_all(SCAN_SELECTOR) else {
                continue;
            };
            out.extend(
                (0..nested.length())
                    .filter_map(|j| nested.item(j))
                    .filter_map(|n| n.dyn_into::<HtmlElement>().ok()),
            );
        }
    }
    out
}

/// Build a widget from each unmarked candidate. Returns how many were
/// created; failures are logged and the element stays marked.
fn attach_all(
    shared: &Shared,
    document: &Document,
    candidates: impl IntoIterator<Item = HtmlElement>,
) -> Result<usize, DomError> {
    let mut created = 0;
    for element in candidates {
        if element.has_attribute(APPLIED_ATTR) {
            continue;
        }
        let Some(kind) = classify(&element.tag_name(), &element.class_name()) else {
            continue;
        };
        element.set_attribute(APPLIED_ATTR, "")?;
        let result = match kind {
            WidgetKind::CodeBlock => code_block::attach(shared, document, element),
            WidgetKind::Gallery => gallery::attach(shared, document, element),
            WidgetKind::PlayerV1 | WidgetKind::PlayerV2 => player::attach(shared, document, element, kind),
        };
        match result {
            Ok(()) => created += 1,
            Err(err) => tracing::warn!(target: LOG_TARGET, ?kind, error = %err, "widget setup failed"),
        }
    }
    if created > 0 {
        tracing::debug!(target: LOG_TARGET, created, "scan complete");
    }
    Ok(created)
}

fn observe_mutations(shared: &Shared, document: &Document) -> Result<(), DomError> {
    let body = document.body().ok_or(DomError::Missing("body"))?;
    let s = shared.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let candidates = added_candidates(&records);
            if candidates.is_empty() {
                return;
            }
            let result = dom::document().and_then(|document| attach_all(&s, &document, candidates));
            if let Err(err) = result {
                tracing::warn!(target: LOG_TARGET, error = %err, "rescan failed");
            }
        },
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&body, &init)?;
    callback.forget();
    Ok(())
}

// ---------------------------------------------------------------------------
// Page-wide listeners
// ---------------------------------------------------------------------------

fn tick(shared: &Shared) {
    let (now, now_ms) = (now(), now_ms());
    with_state(shared, |state| {
        for view in &mut state.code_blocks {
            view.tick(now);
        }
        player::tick_all(state, now, now_ms);
    });
}

fn install_listeners(shared: &Shared, window: &Window, document: &Document) -> Result<(), DomError> {
    let s = shared.clone();
    listen(document, "keydown", move |event: KeyboardEvent| {
        gallery::handle_key(&s, &event.key());
    });

    let s = shared.clone();
    listen(document, "click", move |event: MouseEvent| {
        player::outside_click(&s, event.target().as_ref());
    });

    listen(document, "contextmenu", move |event: MouseEvent| {
        let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
        if target.as_ref().is_some_and(gallery::blocks_context_menu) {
            event.prevent_default();
        }
    });

    let s = shared.clone();
    listen(document, "fullscreenchange", move |_: web_sys::Event| {
        player::fullscreen_changed(&s);
    });

    let s = shared.clone();
    listen(window, "beforeunload", move |_: web_sys::Event| {
        player::unload_all(&s, now_ms());
    });

    let s = shared.clone();
    let timer = Closure::<dyn FnMut()>::new(move || tick(&s));
    window.set_interval_with_callback_and_timeout_and_arguments_0(timer.as_ref().unchecked_ref(), TICK_MS)?;
    timer.forget();

    observe_mutations(shared, document)
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Every Vetrom widget on the page.
///
/// Construct once after the document has loaded:
/// `const page = new VetromPage(optionsJson)`.
#[wasm_bindgen]
pub struct VetromPage {
    shared: Shared,
}

#[wasm_bindgen]
impl VetromPage {
    /// Purge expired positions, install page listeners, and build every
    /// widget present. `options_json` may be omitted; malformed options are
    /// logged and replaced by defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<VetromPage, JsValue> {
        install_panic_hook();
        let window = dom::window()?;
        let document = dom::document()?;
        let options = load_options(options_json.as_deref());

        let mut cache = PositionCache::new(LocalStore::open(&window), options.cache.clone());
        match cache.purge_expired(now_ms()) {
            Ok(report) => tracing::debug!(
                target: LOG_TARGET,
                scanned = report.scanned,
                expired = report.expired,
                corrupt = report.corrupt,
                "purged stored positions"
            ),
            Err(err) => tracing::warn!(target: LOG_TARGET, error = %err, "position purge failed"),
        }

        let shared = Rc::new(RefCell::new(PageState {
            core: PageCore::new(options),
            cache,
            code_blocks: Vec::new(),
            galleries: Vec::new(),
            lightbox: None,
            players: Vec::new(),
        }));
        install_listeners(&shared, &window, &document)?;
        scan(&shared)?;
        Ok(Self { shared })
    }

    /// Scan for widgets added since the last pass. Returns how many were created.
    pub fn refresh(&self) -> Result<u32, JsValue> {
        Ok(scan(&self.shared)? as u32)
    }

    /// `[{index, currentSlide, totalSlides, isRTL}]` for every gallery.
    #[wasm_bindgen(js_name = getGalleries)]
    pub fn get_galleries(&self) -> JsValue {
        let json = with_state(&self.shared, |state| state.core.galleries_json())
            .unwrap_or_else(|| "[]".to_string());
        js_sys::JSON::parse(&json).unwrap_or_else(|_| js_sys::Array::new().into())
    }

    /// Move a carousel. Invalid indices are ignored and return `false`.
    #[wasm_bindgen(js_name = goToSlide)]
    pub fn go_to_slide(&self, gallery: usize, slide: usize) -> bool {
        gallery::go_to_slide(&self.shared, gallery, slide)
    }

    #[wasm_bindgen(js_name = openLightbox)]
    pub fn open_lightbox(&self, gallery: usize, slide: usize) -> bool {
        gallery::open_lightbox(&self.shared, gallery, slide)
    }

    #[wasm_bindgen(js_name = closeLightbox)]
    pub fn close_lightbox(&self) -> bool {
        gallery::close_lightbox(&self.shared)
    }
}
