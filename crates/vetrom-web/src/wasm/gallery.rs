#![forbid(unsafe_code)]

//! Carousel DOM and the page-wide lightbox overlay.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlMediaElement, MouseEvent, Node};

use vetrom_config::parse_gallery_classes;
use vetrom_runtime::logging::LOG_TARGET;
use vetrom_runtime::{Gallery, LightboxKey, LightboxState, MediaItem};
use vetrom_style::resolve_gallery_theme;

use super::dom::{
    DomError, DomNamedColors, ambient_for, create, document, find, inject_style,
    listen, set_style, toggle_class, window,
};
use super::{PageState, Shared, with_state};
use crate::markup::{GALLERY_CSS, GALLERY_STYLE_ID, gallery_control_html, lightbox_html, lightbox_image_html};
use crate::page::in_video_control_strip;
use crate::scan::{GALLERY_CONTAINER_CLASS, LIGHTBOX_OVERLAY_CLASS};

const SLIDE_CLASS: &str = "vetrom-gallery-slide";
const LIGHTBOX_VIDEO_CLASS: &str = "vetrom-lightbox-video";

pub(crate) struct GalleryView {
    wrapper: HtmlElement,
    /// Slide media in carousel order.
    media: Vec<Element>,
    /// Pristine copies of `media`, cloned into the lightbox.
    templates: Vec<Element>,
    variables: [(&'static str, String); 5],
}

pub(crate) struct LightboxView {
    overlay: HtmlElement,
    content: Element,
    /// `(gallery, slide)` currently rendered.
    shown: Option<(usize, usize)>,
}

fn pause(element: &Element) {
    if let Some(media) = element.dyn_ref::<HtmlMediaElement>() {
        let _ = media.pause();
    }
}

fn media_item(element: &Element) -> Option<MediaItem> {
    let source = element
        .query_selector("source")
        .ok()
        .flatten()
        .and_then(|s| s.get_attribute("src"));
    MediaItem::classify(
        &element.tag_name(),
        &element.get_attribute("src").unwrap_or_default(),
        element.get_attribute("alt").as_deref(),
        source.as_deref(),
    )
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

/// Replace a gallery root with a carousel built from its `img`/`video`
/// descendants. Roots without media are left untouched.
pub(crate) fn attach(shared: &Shared, document: &Document, root: HtmlElement) -> Result<(), DomError> {
    let config = parse_gallery_classes(&root.class_name()).ok_or(DomError::Missing("gallery class"))?;
    let nodes = root.query_selector_all("img, video")?;
    let (mut elements, items): (Vec<Element>, Vec<MediaItem>) = (0..nodes.length())
        .filter_map(|i| nodes.item(i)?.dyn_into::<Element>().ok())
        .filter_map(|el| media_item(&el).map(|item| (el, item)))
        .unzip();
    if items.is_empty() {
        tracing::debug!(target: LOG_TARGET, "gallery without media left untouched");
        return Ok(());
    }

    inject_style(document, GALLERY_STYLE_ID, GALLERY_CSS)?;
    let window = window()?;
    let depth = with_state(shared, |state| state.core.options().gallery.max_ancestor_depth)
        .ok_or(DomError::Busy)?;
    let ambient = ambient_for(&window, document, &root, depth);
    let names = DomNamedColors::new(window, document.clone());
    let theme = resolve_gallery_theme(config.theme, config.color.as_deref(), &ambient, &names);
    let gallery = Gallery::new(items, ambient.direction).ok_or(DomError::Missing("img, video"))?;
    let rtl = gallery.direction().is_rtl();
    if rtl {
        elements.reverse();
    }

    let container: HtmlElement = create(document, "div", GALLERY_CONTAINER_CLASS)?;
    if rtl {
        container.set_attribute("dir", "rtl")?;
    }
    let variables = theme.gallery_css_variables();
    for (name, value) in &variables {
        set_style(&container, name, value);
    }

    let wrapper: HtmlElement = create(document, "div", "vetrom-gallery-image-wrapper")?;
    let mut slides = Vec::with_capacity(elements.len());
    let mut templates = Vec::with_capacity(elements.len());
    for element in &elements {
        let template = element
            .clone_node_with_deep(true)?
            .dyn_into::<Element>()
            .map_err(|_| DomError::Missing("media clone"))?;
        templates.push(template);
        let slide: Element = create(document, "div", SLIDE_CLASS)?;
        slide.append_child(element)?;
        wrapper.append_child(&slide)?;
        slides.push(slide);
    }
    container.append_child(&wrapper)?;
    let controls = format!("{}{}", gallery_control_html(false), gallery_control_html(true));
    container.insert_adjacent_html("beforeend", &controls)?;
    root.replace_with_with_node_1(&container)?;

    let view = GalleryView {
        wrapper,
        media: elements,
        templates,
        variables,
    };
    let index = with_state(shared, |state| {
        let index = state.core.galleries_mut().register(gallery);
        state.galleries.push(view);
        render(state, index);
        index
    })
    .ok_or(DomError::Busy)?;

    for (slide_index, slide) in slides.iter().enumerate() {
        let s = shared.clone();
        listen(slide, "click", move |event: MouseEvent| {
            slide_click(&s, index, slide_index, &event);
        });
    }
    for (selector, forward) in [(".vetrom-gallery-control.prev", false), (".vetrom-gallery-control.next", true)] {
        let button: Element = find(&container, selector)?;
        let s = shared.clone();
        listen(&button, "click", move |event: MouseEvent| {
            event.stop_propagation();
            step(&s, index, forward);
        });
    }
    Ok(())
}

/// Clicks on a slide open the lightbox, except in a video's native controls.
fn slide_click(shared: &Shared, gallery: usize, slide: usize, event: &MouseEvent) {
    if let Some(video) = event.target().and_then(|t| t.dyn_into::<HtmlMediaElement>().ok()) {
        let rect = video.get_bounding_client_rect();
        if in_video_control_strip(f64::from(event.client_y()) - rect.top(), rect.height()) {
            return;
        }
        event.prevent_default();
        let _ = video.pause();
    }
    open_lightbox(shared, gallery, slide);
}

fn step(shared: &Shared, index: usize, forward: bool) {
    with_state(shared, |state| {
        if let Some(gallery) = state.core.galleries_mut().get_mut(index) {
            if forward {
                gallery.next();
            } else {
                gallery.prev();
            }
        }
        render(state, index);
    });
}

/// Move the track to the current slide and pause every other video.
fn render(state: &PageState, index: usize) {
    let (Some(gallery), Some(view)) = (state.core.galleries().get(index), state.galleries.get(index)) else {
        return;
    };
    set_style(&view.wrapper, "transform", &gallery.transform_css());
    for i in gallery.offscreen_videos() {
        if let Some(media) = view.media.get(i) {
            pause(media);
        }
    }
}

pub(crate) fn go_to_slide(shared: &Shared, gallery: usize, slide: usize) -> bool {
    with_state(shared, |state| {
        let moved = state.core.go_to_slide(gallery, slide);
        if moved {
            render(state, gallery);
        }
        moved
    })
    .unwrap_or(false)
}

/// Right clicks on gallery and lightbox media are suppressed.
pub(crate) fn blocks_context_menu(target: &Element) -> bool {
    let tag = target.tag_name();
    if !(tag.eq_ignore_ascii_case("img") || tag.eq_ignore_ascii_case("video")) {
        return false;
    }
    let classes = target.class_list();
    target.closest(&format!(".{SLIDE_CLASS}")).ok().flatten().is_some()
        || classes.contains("vetrom-lightbox-image")
        || classes.contains(LIGHTBOX_VIDEO_CLASS)
}

// ---------------------------------------------------------------------------
// Lightbox
// ---------------------------------------------------------------------------

fn ensure_lightbox(shared: &Shared, state: &mut PageState) -> Result<(), DomError> {
    if state.lightbox.is_some() {
        return Ok(());
    }
    let document = document()?;
    let overlay: HtmlElement = create(&document, "div", LIGHTBOX_OVERLAY_CLASS)?;
    overlay.set_inner_html(&lightbox_html());
    let content: Element = find(&overlay, ".vetrom-lightbox-content")?;
    let close: Element = find(&overlay, ".vetrom-lightbox-close")?;
    let prev: Element = find(&overlay, ".vetrom-lightbox-control.prev")?;
    let next: Element = find(&overlay, ".vetrom-lightbox-control.next")?;
    document.body().ok_or(DomError::Missing("body"))?.append_child(&overlay)?;

    let s = shared.clone();
    listen(&close, "click", move |event: MouseEvent| {
        event.stop_propagation();
        close_lightbox(&s);
    });
    for (button, forward) in [(prev, false), (next, true)] {
        let s = shared.clone();
        listen(&button, "click", move |event: MouseEvent| {
            event.stop_propagation();
            step_lightbox(&s, forward);
        });
    }
    let s = shared.clone();
    let backdrop = overlay.clone();
    listen(&overlay, "click", move |event: MouseEvent| {
        let target: Option<Node> = event.target().and_then(|t| t.dyn_into().ok());
        if backdrop.is_same_node(target.as_ref()) {
            close_lightbox(&s);
        }
    });

    state.lightbox = Some(LightboxView {
        overlay,
        content,
        shown: None,
    });
    Ok(())
}

/// Bring the overlay in line with the registry's lightbox state.
fn render_lightbox(state: &mut PageState) {
    let Some(view) = state.lightbox.as_mut() else {
        return;
    };
    let open = match state.core.galleries().lightbox() {
        LightboxState::Open { gallery, slide } => Some((gallery, slide)),
        LightboxState::Closed => None,
    };
    if view.shown == open {
        return;
    }
    if let Ok(Some(video)) = view.content.query_selector("video") {
        pause(&video);
    }
    view.content.set_inner_html("");
    view.shown = open;
    let body = document().ok().and_then(|d| d.body());

    let Some((gallery, slide)) = open else {
        toggle_class(&view.overlay, "active", false);
        if let Some(body) = body {
            let _ = body.style().remove_property("overflow");
        }
        return;
    };

    let item = state.core.galleries().lightbox_item();
    match item.and_then(lightbox_image_html) {
        Some(html) => view.content.set_inner_html(&html),
        None => {
            let clone = state
                .galleries
                .get(gallery)
                .and_then(|g| g.templates.get(slide))
                .and_then(|template| template.clone_node_with_deep(true).ok())
                .and_then(|node| node.dyn_into::<Element>().ok());
            if let Some(clone) = clone {
                let _ = clone.class_list().add_1(LIGHTBOX_VIDEO_CLASS);
                let _ = view.content.append_child(&clone);
            }
        }
    }
    if let Some(g) = state.galleries.get(gallery) {
        for (name, value) in &g.variables {
            set_style(&view.overlay, name, value);
        }
    }
    toggle_class(&view.overlay, "active", true);
    if let Some(body) = body {
        set_style(&body, "overflow", "hidden");
    }
}

pub(crate) fn open_lightbox(shared: &Shared, gallery: usize, slide: usize) -> bool {
    with_state(shared, |state| {
        if !state.core.open_lightbox(gallery, slide) {
            return false;
        }
        if let Err(err) = ensure_lightbox(shared, state) {
            tracing::warn!(target: LOG_TARGET, error = %err, "lightbox unavailable");
            state.core.close_lightbox();
            return false;
        }
        render_lightbox(state);
        true
    })
    .unwrap_or(false)
}

pub(crate) fn close_lightbox(shared: &Shared) -> bool {
    with_state(shared, |state| {
        let Some((gallery, _)) = state.core.close_lightbox() else {
            return false;
        };
        render_lightbox(state);
        render(state, gallery);
        true
    })
    .unwrap_or(false)
}

fn step_lightbox(shared: &Shared, forward: bool) {
    with_state(shared, |state| {
        let registry = state.core.galleries_mut();
        if forward {
            registry.lightbox_next();
        } else {
            registry.lightbox_prev();
        }
        render_lightbox(state);
    });
}

/// Document keydown; only acts while the lightbox is open.
pub(crate) fn handle_key(shared: &Shared, key: &str) {
    with_state(shared, |state| {
        let gallery = match state.core.galleries().lightbox() {
            LightboxState::Open { gallery, .. } => gallery,
            LightboxState::Closed => return,
        };
        let Some(action) = state.core.handle_key(key) else {
            return;
        };
        render_lightbox(state);
        if matches!(action, LightboxKey::Close) {
            render(state, gallery);
        }
    });
}
