#![cfg(target_arch = "wasm32")]

//! Browser smoke tests, run with `wasm-pack test --headless --chrome`.

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, HtmlElement};

use vetrom_web::VetromPage;

wasm_bindgen_test_configure!(run_in_browser);

fn body() -> HtmlElement {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .expect("document body")
}

fn document() -> Document {
    web_sys::window().and_then(|w| w.document()).expect("document")
}

fn div(class: &str) -> HtmlElement {
    let element: HtmlElement = document()
        .create_element("div")
        .expect("div")
        .dyn_into()
        .expect("html element");
    element.set_class_name(class);
    element
}

/// Resolve after a zero-delay timeout, once pending observer callbacks ran.
async fn next_task() {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .expect("timeout");
    });
    JsFuture::from(promise).await.expect("timer");
}

#[wasm_bindgen_test]
fn code_block_gets_colors_and_copy_button() {
    let page = VetromPage::new(None).expect("page");
    let block: HtmlElement = web_sys::window()
        .and_then(|w| w.document())
        .expect("document")
        .create_element("div")
        .expect("div")
        .dyn_into()
        .expect("html element");
    block.set_class_name("vetrom-codeblock");
    block.set_id("copy-_222222");
    block.set_inner_html("<code>let x = 1;</code>");
    body().append_child(&block).expect("append");

    assert_eq!(page.refresh().expect("refresh"), 1);
    assert!(block.has_attribute("data-vetrom-applied"));
    assert_eq!(block.style().get_property_value("background-color").expect("style"), "rgb(34, 34, 34)");
    let button = block.query_selector(".vetrom-copy-btn").expect("query").expect("copy button");
    assert_eq!(button.text_content().as_deref(), Some("COPY"));

    // Already applied: a second pass creates nothing.
    assert_eq!(page.refresh().expect("refresh"), 0);
    block.remove();
}

#[wasm_bindgen_test]
fn gallery_api_rejects_unknown_indices() {
    let page = VetromPage::new(Some("{not json".to_string())).expect("page with bad options");
    assert!(!page.go_to_slide(99, 0));
    assert!(!page.open_lightbox(99, 0));
    assert!(!page.close_lightbox());
}

#[wasm_bindgen_test]
async fn added_subtrees_are_scanned_but_widget_chrome_is_not() {
    let _page = VetromPage::new(None).expect("page");

    let chrome = div("vetrom-player-container");
    body().append_child(&chrome).expect("append chrome");
    next_task().await;
    let inside = div("vetrom-codeblock");
    inside.set_id("copy-_333333");
    chrome.append_child(&inside).expect("append inside chrome");

    let wrapper = div("article");
    let nested = div("vetrom-codeblock");
    nested.set_id("copy-_444444");
    wrapper.append_child(&nested).expect("nest");
    body().append_child(&wrapper).expect("append wrapper");

    next_task().await;
    assert!(nested.has_attribute("data-vetrom-applied"));
    assert!(!inside.has_attribute("data-vetrom-applied"));

    chrome.remove();
    wrapper.remove();
}
