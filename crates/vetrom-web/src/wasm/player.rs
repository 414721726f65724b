#![forbid(unsafe_code)]

//! `<video>` players, both generations.
//!
//! Every decision lives in [`PlayerSession`]; this module reads the media
//! element into a [`MediaSnapshot`], forwards events, applies the returned
//! [`PlayerEffect`], and then re-renders the chrome from session state.

use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, HtmlSourceElement, HtmlTrackElement, HtmlVideoElement, KeyboardEvent,
    MouseEvent, Node, PointerEvent, TextTrackMode, TouchEvent,
};

use vetrom_config::{
    ChapterMark, MediaConfig, format_time, marker_percent, parse_chapter_id, parse_checkpoints,
    parse_media_classes,
};
use vetrom_runtime::logging::LOG_TARGET;
use vetrom_runtime::player::{inner_height, progress_percent};
use vetrom_runtime::thumbnail::{frame_size, hover_time, thumbnail_key};
use vetrom_runtime::{
    Generation, MediaSnapshot, MenuState, PlayerEffect, PlayerSession, PositionCache,
    PositionIdentity, QualitySource, QualitySwitch, Submenu, SubtitleChoice, SubtitleTrack,
    ThumbnailLookup, Volume,
};
use vetrom_style::resolve_player_palette;

use super::dom::{
    DomError, DomNamedColors, LocalStore, ambient_for, contains_target, create, document, find,
    inject_style, js_message, listen, now, now_ms, set_style, set_text, toggle_class, window,
};
use super::{PageState, Shared, with_state};
use crate::markup::{
    ICON_EXIT_FULLSCREEN, ICON_FULLSCREEN, ICON_MUTED, ICON_PAUSE, ICON_PLAY, ICON_SKIP_BACK,
    ICON_SKIP_FORWARD, ICON_VOLUME, PLAYER_CSS, PLAYER_STYLE_ID, SECURE_BADGE_HTML, TOOLTIP_HTML,
    center_overlay_html, checkpoints_menu_html, controls_html, settings_menu_html,
};
use crate::scan::{PLAYER_CONTAINER_CLASS, WidgetKind, checkpoint_selector, same_source_slots};

/// How long the volume panel stays up after a keyboard volume change.
const VOLUME_FLASH: Duration = Duration::from_millis(500);
const THUMBNAIL_QUALITY: f64 = 0.55;
/// Every player video, both generations.
const PLAYER_SELECTOR: &str = "video[class*=\"vetrom-media\"]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Idle,
    Progress,
    Volume,
}

/// Hidden twin of the player's video, seeked to grab preview frames.
struct Thumbs {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    in_flight: Option<u64>,
    /// Latest request made while another capture was running.
    queued: Option<u64>,
}

impl Thumbs {
    fn new(document: &Document, src: &str) -> Result<Self, DomError> {
        let video: HtmlVideoElement = create(document, "video", "vetrom-thumb-source")?;
        video.set_muted(true);
        video.set_preload("auto");
        video.set_cross_origin(Some("anonymous"));
        video.set_src(src);
        set_style(&video, "display", "none");
        document.body().ok_or(DomError::Missing("body"))?.append_child(&video)?;
        let canvas: HtmlCanvasElement = create(document, "canvas", "vetrom-thumb-canvas")?;
        Ok(Self {
            video,
            canvas,
            in_flight: None,
            queued: None,
        })
    }

    fn start(&mut self, key: u64, fallback_duration: f64) {
        self.in_flight = Some(key);
        let duration = [self.video.duration(), fallback_duration]
            .into_iter()
            .find(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0);
        self.video.set_current_time((key as f64).clamp(0.0, duration));
    }

    /// Start the queued capture, if any, after the current one settled.
    fn next(&mut self, fallback_duration: f64) {
        self.in_flight = None;
        if let Some(key) = self.queued.take() {
            self.start(key, fallback_duration);
        }
    }

    /// JPEG data URL of the current frame. `None` for cross-origin media.
    fn draw(&self) -> Option<String> {
        let (width, height) = frame_size(self.video.video_width(), self.video.video_height());
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let (w, h) = (f64::from(width), f64::from(height));
        ctx.set_fill_style_str("#000");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, w, h)
            .ok()?;
        self.canvas
            .to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(THUMBNAIL_QUALITY))
            .ok()
    }
}

pub(crate) struct PlayerView {
    session: PlayerSession,
    video: HtmlVideoElement,
    container: HtmlElement,
    inner: HtmlElement,
    controls: Element,
    skip_buttons: Vec<HtmlElement>,
    center: HtmlElement,
    /// Bar button and the big center button.
    play_buttons: [Element; 2],
    fullscreen_btn: Element,
    volume_btn: Element,
    time: Element,
    progress_bar: Element,
    progress_line: HtmlElement,
    progress_thumb: HtmlElement,
    volume_panel: HtmlElement,
    volume_track: Element,
    volume_fill: HtmlElement,
    volume_thumb: HtmlElement,
    volume_percent: Element,
    settings_menu: Element,
    /// v1 only: the chapters button and its own menu.
    checkpoints: Option<(HtmlElement, Element)>,
    tooltip: HtmlElement,
    tooltip_time: Element,
    tooltip_frame: HtmlImageElement,
    badge: Option<HtmlElement>,
    tracks: Vec<HtmlTrackElement>,
    thumbs: Option<Thumbs>,
    play_rejected: Closure<dyn FnMut(JsValue)>,
    drag: Drag,
    volume_hover: bool,
    volume_flash_until: Option<Duration>,
    pending_resume: Option<QualitySwitch>,
    fullscreen: bool,
    hover_key: Option<u64>,
    rendered_paused: Option<bool>,
    rendered_silent: Option<bool>,
}

impl PlayerView {
    fn media(&self) -> MediaSnapshot {
        MediaSnapshot::new(self.video.current_time(), self.video.duration(), self.video.paused())
    }

    fn apply(&mut self, effect: PlayerEffect) {
        match effect {
            PlayerEffect::TogglePlay => {
                if self.video.paused() {
                    self.play();
                } else if let Err(err) = self.video.pause() {
                    tracing::warn!(target: LOG_TARGET, error = %js_message(&err), "pause failed");
                }
            }
            PlayerEffect::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerEffect::Seek(time) => self.video.set_current_time(time),
            PlayerEffect::SetVolume { level, muted } => {
                self.video.set_volume(level);
                self.video.set_muted(muted);
            }
            PlayerEffect::SetRate(rate) => self.video.set_playback_rate(rate),
            PlayerEffect::SwitchSource(switch) => {
                tracing::debug!(target: LOG_TARGET, src = %switch.src, resume_at = switch.resume_at, "switching source");
                self.video.set_src(&switch.src);
                self.video.load();
                self.pending_resume = Some(switch);
            }
            PlayerEffect::SubtitleModes(modes) => {
                for (element, showing) in self.tracks.iter().zip(modes) {
                    if let Some(track) = element.track() {
                        track.set_mode(if showing { TextTrackMode::Showing } else { TextTrackMode::Hidden });
                    }
                }
            }
        }
    }

    fn play(&self) {
        match self.video.play() {
            // Autoplay policies reject the promise; nothing to recover.
            Ok(promise) => {
                let _ = promise.catch(&self.play_rejected);
            }
            Err(err) => tracing::warn!(target: LOG_TARGET, error = %js_message(&err), "play failed"),
        }
    }

    fn toggle_fullscreen(&self) {
        let Ok(document) = document() else {
            return;
        };
        if document.fullscreen_element().is_some() {
            document.exit_fullscreen();
        } else if let Err(err) = self.container.request_fullscreen() {
            tracing::warn!(target: LOG_TARGET, error = %js_message(&err), "fullscreen request failed");
        }
    }

    /// Size the inner wrap to the video's aspect ratio, or fill the screen.
    fn fit_height(&self) {
        if self.fullscreen {
            set_style(&self.inner, "height", "100vh");
            return;
        }
        let width = f64::from(self.container.client_width());
        let height = inner_height(
            width,
            f64::from(self.video.video_width()),
            f64::from(self.video.video_height()),
        );
        set_style(&self.inner, "height", &format!("{height}px"));
    }

    fn render_menus(&self) {
        self.settings_menu.set_inner_html(&settings_menu_html(&self.session));
        if let Some((button, menu)) = &self.checkpoints {
            let chapters = self.session.chapters();
            menu.set_inner_html(&checkpoints_menu_html(chapters));
            set_style(button, "display", if chapters.is_empty() { "none" } else { "inline-flex" });
        }
    }

    fn render_markers(&self) {
        if let Ok(old) = self.progress_bar.query_selector_all(".vetrom-chapter-marker") {
            for i in 0..old.length() {
                if let Some(marker) = old.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    marker.remove();
                }
            }
        }
        let Ok(document) = document() else {
            return;
        };
        let duration = self.video.duration();
        for (i, chapter) in self.session.chapters().iter().enumerate() {
            let Some(percent) = marker_percent(chapter.offset_seconds, duration) else {
                continue;
            };
            let Ok(marker) = create::<HtmlElement>(&document, "div", "vetrom-chapter-marker") else {
                continue;
            };
            set_style(&marker, "left", &format!("{percent}%"));
            marker.set_title(&format!("{} \u{2013} {}", chapter.label, format_time(chapter.offset_seconds)));
            let _ = marker.set_attribute("data-chapter", &i.to_string());
            let _ = self.progress_bar.append_child(&marker);
        }
    }

    /// Bring the DOM in line with session and media state.
    fn sync(&mut self, now: Duration) {
        let media = self.media();

        let visible = self.session.controls().is_visible();
        toggle_class(&self.controls, "visible", visible);
        for button in &self.skip_buttons {
            toggle_class(button, "visible", visible);
        }
        set_style(&self.center, "display", if visible { "flex" } else { "none" });

        if self.rendered_paused != Some(media.paused) {
            let icon = if media.paused { ICON_PLAY } else { ICON_PAUSE };
            for button in &self.play_buttons {
                button.set_inner_html(icon);
            }
            self.rendered_paused = Some(media.paused);
        }
        set_text(&self.time, &format_time(media.time));
        let percent = progress_percent(media.time, media.duration);
        set_style(&self.progress_line, "width", &format!("{percent}%"));
        set_style(&self.progress_thumb, "left", &format!("{percent}%"));

        let volume = self.session.volume();
        let silent = volume.is_muted() || volume.level() == 0.0;
        let shown = volume.display_percent();
        if self.rendered_silent != Some(silent) {
            self.volume_btn.set_inner_html(if silent { ICON_MUTED } else { ICON_VOLUME });
            self.rendered_silent = Some(silent);
        }
        set_style(&self.volume_fill, "height", &format!("{shown}%"));
        set_style(&self.volume_thumb, "bottom", &format!("{shown}%"));
        set_text(&self.volume_percent, &format!("{shown}%"));
        let flashing = self.volume_flash_until.is_some_and(|until| now < until);
        let panel = self.volume_hover || flashing || self.drag == Drag::Volume;
        set_style(&self.volume_panel, "display", if panel { "flex" } else { "none" });

        self.sync_menus();

        if let Some(badge) = &self.badge {
            match self.session.badge().position() {
                Some((x, y)) => {
                    set_style(badge, "left", &format!("{x}px"));
                    set_style(badge, "top", &format!("{y}px"));
                    toggle_class(badge, "visible", true);
                }
                None => toggle_class(badge, "visible", false),
            }
        }
    }

    fn sync_menus(&self) {
        let state = self.session.menu().state();
        match self.session.generation() {
            Generation::V1 => {
                toggle_class(&self.settings_menu, "open", state == MenuState::Main);
                if let Some((_, menu)) = &self.checkpoints {
                    toggle_class(menu, "open", state == MenuState::Open(Submenu::Chapters));
                }
            }
            Generation::V2 => {
                toggle_class(&self.settings_menu, "open", state != MenuState::Closed);
                let submenu = match state {
                    MenuState::Open(submenu) => Some(submenu),
                    MenuState::Closed | MenuState::Main => None,
                };
                if let Ok(Some(main)) = self.settings_menu.query_selector(".vetrom-menu-main") {
                    toggle_class(&main, "hidden", submenu.is_some());
                }
                let Ok(views) = self.settings_menu.query_selector_all("[data-submenu]") else {
                    return;
                };
                for i in 0..views.length() {
                    let Some(view) = views.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                        continue;
                    };
                    let name = view.get_attribute("data-submenu");
                    let active = submenu.is_some_and(|s| name.as_deref() == Some(s.as_str()));
                    toggle_class(&view, "active", active);
                }
            }
        }
    }

    /// Dispatch a click inside either menu by its data attributes.
    fn menu_click(&mut self, target: &Element, now: Duration) {
        let closest = |selector: &str| target.closest(selector).ok().flatten();
        if let Some(header) = closest("[data-section]") {
            if let Some(submenu) = header.get_attribute("data-section").as_deref().and_then(Submenu::from_section) {
                self.session.open_submenu(submenu);
            }
            return;
        }
        if closest("[data-back]").is_some() {
            self.session.submenu_back();
            return;
        }

        let media = self.media();
        let attr = |selector: &str, name: &str| closest(selector).and_then(|item| item.get_attribute(name));
        let effect = if let Some(rate) = attr("[data-speed]", "data-speed") {
            rate.parse::<f64>()
                .ok()
                .and_then(|rate| self.session.select_speed(rate, now, media.paused))
        } else if let Some(index) = attr("[data-quality]", "data-quality") {
            index
                .parse::<usize>()
                .ok()
                .and_then(|index| self.session.select_quality(index, media))
        } else if let Some(choice) = attr("[data-subtitle]", "data-subtitle") {
            SubtitleChoice::parse(&choice).map(|choice| self.session.select_subtitle(choice))
        } else if let Some(index) = attr("[data-chapter]", "data-chapter") {
            index
                .parse::<usize>()
                .ok()
                .and_then(|index| self.session.select_chapter(index, now, media))
        } else {
            None
        };
        if let Some(effect) = effect {
            self.apply(effect);
            self.render_menus();
        }
    }

    fn loaded_metadata(&mut self, cache: &mut PositionCache<LocalStore>) {
        if let Some(switch) = self.pending_resume.take() {
            self.video.set_current_time(switch.resume_at);
            if switch.resume_playing {
                self.play();
            }
        } else if let Some(effect) = self.session.on_metadata(cache, self.video.duration(), now_ms()) {
            self.apply(effect);
        }
        self.fit_height();
        self.render_markers();
    }

    // -- pointer helpers --

    fn seek_to_pointer(&mut self, client_x: f64) {
        let rect = self.progress_bar.get_bounding_client_rect();
        let effect = self.session.seek_pointer(client_x - rect.left(), rect.width(), self.media());
        self.apply(effect);
    }

    fn volume_to_pointer(&mut self, client_y: f64) {
        let rect = self.volume_track.get_bounding_client_rect();
        let effect = self.session.volume_pointer(client_y - rect.top(), rect.height());
        self.apply(effect);
    }

    // -- thumbnails --

    fn hover_progress(&mut self, client_x: f64, now: Duration) {
        let container = self.container.get_bounding_client_rect();
        set_style(&self.tooltip, "left", &format!("{}px", client_x - container.left()));
        set_style(&self.tooltip, "display", "flex");

        let bar = self.progress_bar.get_bounding_client_rect();
        let time = hover_time(client_x - bar.left(), bar.width(), self.video.duration());
        set_text(&self.tooltip_time, &format_time(time));

        let key = thumbnail_key(time);
        self.hover_key = Some(key);
        let (ready, request) = match self.session.thumbnails_mut().lookup(key, now) {
            ThumbnailLookup::Ready(url) => {
                self.tooltip_frame.set_src(url);
                (true, false)
            }
            ThumbnailLookup::Pending => (false, false),
            ThumbnailLookup::Request => (false, true),
        };
        set_style(&self.tooltip_frame, "visibility", if ready { "visible" } else { "hidden" });
        if request {
            self.request_thumbnail(key);
        }
    }

    fn hide_tooltip(&mut self) {
        set_style(&self.tooltip, "display", "none");
        self.hover_key = None;
    }

    fn request_thumbnail(&mut self, key: u64) {
        let Some(thumbs) = self.thumbs.as_mut() else {
            self.session.thumbnails_mut().resolve(key, None);
            return;
        };
        if thumbs.in_flight.is_some() {
            thumbs.queued = Some(key);
        } else {
            thumbs.start(key, self.video.duration());
        }
    }

    /// The hidden video finished seeking (`captured`) or failed.
    fn capture_settled(&mut self, captured: bool) {
        let fallback = self.video.duration();
        let Some(thumbs) = self.thumbs.as_mut() else {
            return;
        };
        let Some(key) = thumbs.in_flight else {
            return;
        };
        let url = if captured { thumbs.draw() } else { None };
        thumbs.next(fallback);
        if url.is_none() {
            tracing::debug!(target: LOG_TARGET, key, "thumbnail unavailable");
        }
        let accepted = self.session.thumbnails_mut().resolve(key, url.clone());
        if accepted
            && self.hover_key == Some(key)
            && let Some(url) = url
        {
            self.tooltip_frame.set_src(&url);
            set_style(&self.tooltip_frame, "visibility", "visible");
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// `currentSrc`, then the `src` property, then the first `<source>`.
fn media_src(video: &HtmlVideoElement) -> String {
    let current = video.current_src();
    if !current.is_empty() {
        return current;
    }
    let src = video.src();
    if !src.is_empty() {
        return src;
    }
    video
        .query_selector("source")
        .ok()
        .flatten()
        .and_then(|s| s.dyn_into::<HtmlSourceElement>().ok())
        .map(|s| s.src())
        .unwrap_or_default()
}

/// This video's slot among players sharing its source.
fn same_source_slot(document: &Document, video: &HtmlVideoElement) -> Option<(usize, usize)> {
    let nodes = document.query_selector_all(PLAYER_SELECTOR).ok()?;
    let videos: Vec<HtmlVideoElement> = (0..nodes.length())
        .filter_map(|i| nodes.item(i)?.dyn_into().ok())
        .collect();
    let node: &Node = video;
    let position = videos.iter().position(|v| v.is_same_node(Some(node)))?;
    let sources: Vec<String> = videos.iter().map(media_src).collect();
    same_source_slots(&sources).get(position).copied()
}

fn identity_for(document: &Document, video: &HtmlVideoElement, config: &MediaConfig) -> PositionIdentity {
    let id = video.id();
    let mut identity = PositionIdentity::new(media_src(video))
        .with_instance(config.instance.clone())
        .with_element_id((!id.is_empty()).then_some(id))
        .with_container(config.instance.clone());
    if let Some((index, count)) = same_source_slot(document, video) {
        identity = identity.with_same_source(index, count);
    }
    identity
}

fn chapters_for(document: &Document, video: &HtmlVideoElement, generation: Generation) -> Vec<ChapterMark> {
    let id = video.id();
    if id.is_empty() {
        return Vec::new();
    }
    match generation {
        Generation::V2 => parse_chapter_id(&id),
        Generation::V1 => document
            .query_selector(&checkpoint_selector(&id))
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("points"))
            .map(|points| parse_checkpoints(&points))
            .unwrap_or_default(),
    }
}

fn elements<T: JsCast>(root: &Element, selector: &str) -> Vec<T> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i)?.dyn_into::<T>().ok())
        .collect()
}

fn quality_sources(video: &HtmlVideoElement) -> Vec<QualitySource> {
    elements::<Element>(video, "source[label][res]")
        .into_iter()
        .map(|source| QualitySource {
            src: source.get_attribute("src").unwrap_or_default(),
            label: source.get_attribute("label").unwrap_or_default(),
            res: source.get_attribute("res").unwrap_or_default(),
        })
        .collect()
}

fn subtitle_tracks(tracks: &[HtmlTrackElement]) -> Vec<SubtitleTrack> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| SubtitleTrack::new(&track.label(), &track.srclang(), i, track.default()))
        .collect()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

pub(crate) fn attach(shared: &Shared, document: &Document, element: HtmlElement, kind: WidgetKind) -> Result<(), DomError> {
    let video: HtmlVideoElement = element.dyn_into().map_err(|_| DomError::Missing("video"))?;
    let generation = match kind {
        WidgetKind::PlayerV1 => Generation::V1,
        _ => Generation::V2,
    };
    inject_style(document, PLAYER_STYLE_ID, PLAYER_CSS)?;
    let window = window()?;
    let options = with_state(shared, |state| state.core.options().clone()).ok_or(DomError::Busy)?;
    let config = match generation {
        Generation::V1 => MediaConfig::default(),
        Generation::V2 => parse_media_classes(&video.class_name()),
    };

    let tracks = elements::<HtmlTrackElement>(&video, "track[kind=\"subtitles\"]");
    let src = media_src(&video);
    let mut session = PlayerSession::new(generation, &options, identity_for(document, &video, &config), config.secure)
        .with_chapters(chapters_for(document, &video, generation))
        .with_volume(Volume::new(video.volume(), video.muted()));
    if generation == Generation::V2 {
        session = session
            .with_quality(quality_sources(&video))
            .with_subtitles(subtitle_tracks(&tracks));
    }
    // Sample the page around the video before it is wrapped.
    let palette = (generation == Generation::V2).then(|| {
        let ambient = ambient_for(&window, document, &video, options.gallery.max_ancestor_depth);
        let names = DomNamedColors::new(window.clone(), document.clone());
        resolve_player_palette(config.theme, config.color.as_deref(), &ambient, &names)
    });

    // -- DOM --

    video.set_controls(false);
    let container: HtmlElement = create(document, "div", PLAYER_CONTAINER_CLASS)?;
    container.set_tab_index(0);
    if let Some(instance) = &config.instance {
        container.set_attribute("data-instance", instance)?;
    }
    if let Some(palette) = &palette {
        for (name, value) in palette.css_variables() {
            set_style(&container, name, &value);
        }
    }
    let parent = video.parent_node().ok_or(DomError::Missing("video parent"))?;
    parent.insert_before(&container, Some(&video))?;
    let inner: HtmlElement = create(document, "div", "vetrom-media-inner")?;
    container.append_child(&inner)?;
    inner.append_child(&video)?;

    let controls: Element = create(document, "div", "vetrom-controls")?;
    controls.set_inner_html(&controls_html(generation));
    container.append_child(&controls)?;

    let mut skip_buttons = Vec::with_capacity(2);
    for (class, icon) in [("vetrom-skip-btn vetrom-skip-back", ICON_SKIP_BACK), ("vetrom-skip-btn vetrom-skip-forward", ICON_SKIP_FORWARD)] {
        let button: HtmlElement = create(document, "button", class)?;
        button.set_inner_html(icon);
        inner.append_child(&button)?;
        skip_buttons.push(button);
    }

    let center: HtmlElement = create(document, "div", "vetrom-center-overlay")?;
    center.set_inner_html(&center_overlay_html());
    container.append_child(&center)?;

    let settings_menu: Element = create(document, "div", "vetrom-settings-menu")?;
    container.append_child(&settings_menu)?;
    let checkpoints = match generation {
        Generation::V1 => {
            let button: HtmlElement = find(&controls, ".vetrom-chapters-btn")?;
            let menu: Element = create(document, "div", "vetrom-checkpoints-menu")?;
            container.append_child(&menu)?;
            Some((button, menu))
        }
        Generation::V2 => None,
    };

    let tooltip: HtmlElement = create(document, "div", "vetrom-thumb-tooltip")?;
    tooltip.set_inner_html(TOOLTIP_HTML);
    set_style(&tooltip, "display", "none");
    container.append_child(&tooltip)?;

    let badge = if config.secure {
        let badge: HtmlElement = create(document, "div", "vetrom-secure-badge")?;
        badge.set_inner_html(SECURE_BADGE_HTML);
        if let Some(palette) = &palette {
            for (name, value) in palette.css_variables() {
                set_style(&badge, name, &value);
            }
        }
        document.body().ok_or(DomError::Missing("body"))?.append_child(&badge)?;
        Some(badge)
    } else {
        None
    };

    let thumbs = if src.is_empty() {
        None
    } else {
        match Thumbs::new(document, &src) {
            Ok(thumbs) => Some(thumbs),
            Err(err) => {
                tracing::debug!(target: LOG_TARGET, error = %err, "thumbnail source unavailable");
                None
            }
        }
    };

    let volume_wrap: Element = find(&controls, ".vetrom-volume-wrap")?;
    let play_btn: Element = find(&controls, ".vetrom-play-btn")?;
    let big_btn: Element = find(&center, ".big-btn")?;
    let settings_btn: Element = find(&controls, ".vetrom-settings-btn")?;
    let volume_btn: Element = find(&controls, ".vetrom-volume-btn")?;
    let fullscreen_btn: Element = find(&controls, ".vetrom-fullscreen-btn")?;

    let mut view = PlayerView {
        session,
        video: video.clone(),
        container: container.clone(),
        inner,
        controls: controls.clone(),
        skip_buttons: skip_buttons.clone(),
        center,
        play_buttons: [play_btn.clone(), big_btn.clone()],
        fullscreen_btn: fullscreen_btn.clone(),
        volume_btn: volume_btn.clone(),
        time: find(&controls, ".vetrom-current-time")?,
        progress_bar: find(&controls, ".vetrom-progress-bar")?,
        progress_line: find(&controls, ".vetrom-progress-line")?,
        progress_thumb: find(&controls, ".vetrom-progress-thumb")?,
        volume_panel: find(&controls, ".vetrom-volume-panel")?,
        volume_track: find(&controls, ".vetrom-volume-vertical")?,
        volume_fill: find(&controls, ".vol-fill")?,
        volume_thumb: find(&controls, ".vol-thumb")?,
        volume_percent: find(&controls, ".vetrom-volume-percent")?,
        settings_menu: settings_menu.clone(),
        checkpoints: checkpoints.clone(),
        tooltip_time: find(&tooltip, ".thumb-time")?,
        tooltip_frame: find(&tooltip, ".thumb-frame")?,
        tooltip,
        badge,
        tracks,
        thumbs,
        play_rejected: Closure::new(|err: JsValue| {
            tracing::debug!(target: LOG_TARGET, error = %js_message(&err), "play() rejected");
        }),
        drag: Drag::Idle,
        volume_hover: false,
        volume_flash_until: None,
        pending_resume: None,
        fullscreen: false,
        hover_key: None,
        rendered_paused: None,
        rendered_silent: None,
    };
    view.render_menus();
    if !view.tracks.is_empty() {
        let modes = view.session.subtitles().modes();
        view.apply(PlayerEffect::SubtitleModes(modes));
    }
    view.fit_height();
    let start = now();
    view.session.start(start, video.paused());
    view.sync(start);
    let progress_bar = view.progress_bar.clone();
    let volume_track = view.volume_track.clone();
    let thumb_video = view.thumbs.as_ref().map(|t| t.video.clone());
    let has_metadata = video.ready_state() >= 1;

    let index = with_state(shared, |state| {
        state.players.push(view);
        state.players.len() - 1
    })
    .ok_or(DomError::Busy)?;
    tracing::debug!(target: LOG_TARGET, index, ?generation, secure = config.secure, "player attached");

    // -- media events --

    on(shared, index, &video, "play", |view, _, _: web_sys::Event| {
        view.session.on_play(now(), now_ms());
    });
    on(shared, index, &video, "pause", |view, cache, _: web_sys::Event| {
        let media = view.media();
        view.session.on_pause(cache, media, now(), now_ms());
    });
    on(shared, index, &video, "ended", |view, cache, _: web_sys::Event| {
        view.session.on_ended(cache);
    });
    on(shared, index, &video, "timeupdate", |view, cache, _: web_sys::Event| {
        let media = view.media();
        view.session.on_time_update(cache, media, now_ms());
    });
    on(shared, index, &video, "loadedmetadata", |view, cache, _: web_sys::Event| {
        view.loaded_metadata(cache);
    });
    if has_metadata {
        with_player(shared, index, |view, cache| {
            view.loaded_metadata(cache);
            view.sync(now());
        });
    }

    // -- surface --

    on(shared, index, &video, "click", |view, _, event: MouseEvent| {
        // The second click of a double click belongs to `dblclick`.
        if event.detail() > 1 || view.drag != Drag::Idle {
            return;
        }
        let paused = view.video.paused();
        view.session.surface_click(now(), paused);
    });
    on(shared, index, &video, "dblclick", |view, _, _: MouseEvent| {
        view.toggle_fullscreen();
    });
    on(shared, index, &container, "mousemove", |view, _, _: MouseEvent| {
        let paused = view.video.paused();
        view.session.pointer_moved(now(), paused);
    });
    on(shared, index, &container, "mouseleave", |view, _, _: MouseEvent| {
        let paused = view.video.paused();
        view.session.pointer_left(paused);
    });
    on(shared, index, &container, "keydown", |view, _, event: KeyboardEvent| {
        let media = view.media();
        let Some(outcome) = view.session.handle_key(&event.key(), &event.code(), now(), media) else {
            return;
        };
        if outcome.prevent_default {
            event.prevent_default();
        }
        if matches!(outcome.effect, PlayerEffect::SetVolume { .. }) {
            view.volume_flash_until = Some(now() + VOLUME_FLASH);
        }
        view.apply(outcome.effect);
    });
    on(shared, index, &container, "contextmenu", |view, _, event: MouseEvent| {
        let target = event.target();
        if !contains_target(&view.inner, target.as_ref()) {
            return;
        }
        if view.session.context_menu(f64::from(event.client_x()), f64::from(event.client_y())) {
            event.prevent_default();
        }
    });
    on(shared, index, &video, "touchstart", |view, _, event: TouchEvent| {
        if let Some(touch) = event.touches().get(0) {
            view.session.touch_start(now(), f64::from(touch.client_x()), f64::from(touch.client_y()));
        }
    });
    for event in ["touchend", "touchmove", "touchcancel"] {
        on(shared, index, &video, event, |view, _, _: TouchEvent| {
            view.session.touch_cancel();
        });
    }

    // -- buttons --

    for button in [&play_btn, &big_btn] {
        on(shared, index, button, "click", |view, _, event: MouseEvent| {
            event.stop_propagation();
            view.apply(PlayerEffect::TogglePlay);
        });
    }
    for (button, forward) in skip_buttons.iter().zip([false, true]) {
        on(shared, index, button, "click", move |view, _, event: MouseEvent| {
            event.stop_propagation();
            let media = view.media();
            let effect = view.session.skip(forward, now(), media);
            view.apply(effect);
        });
    }
    on(shared, index, &volume_btn, "click", |view, _, event: MouseEvent| {
        event.stop_propagation();
        let effect = view.session.toggle_mute();
        view.apply(effect);
    });
    on(shared, index, &fullscreen_btn, "click", |view, _, event: MouseEvent| {
        event.stop_propagation();
        view.toggle_fullscreen();
    });
    on(shared, index, &settings_btn, "click", |view, _, event: MouseEvent| {
        event.stop_propagation();
        view.session.toggle_settings();
    });
    let mut menus = vec![settings_menu];
    if let Some((button, menu)) = checkpoints {
        on(shared, index, &button, "click", |view, _, event: MouseEvent| {
            event.stop_propagation();
            view.session.toggle_chapters();
        });
        menus.push(menu);
    }
    for menu in &menus {
        on(shared, index, menu, "click", |view, _, event: MouseEvent| {
            event.stop_propagation();
            if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                view.menu_click(&target, now());
            }
        });
    }

    // -- volume panel --

    for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
        on(shared, index, &volume_wrap, event, move |view, _, _: MouseEvent| {
            view.volume_hover = hovered;
        });
    }
    on(shared, index, &volume_track, "pointerdown", |view, _, event: PointerEvent| {
        event.prevent_default();
        event.stop_propagation();
        view.drag = Drag::Volume;
        view.volume_to_pointer(f64::from(event.client_y()));
    });

    // -- progress bar --

    on(shared, index, &progress_bar, "pointerdown", |view, _, event: PointerEvent| {
        event.prevent_default();
        event.stop_propagation();
        let marker = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|t| t.closest(".vetrom-chapter-marker").ok().flatten());
        if let Some(index) = marker
            .and_then(|m| m.get_attribute("data-chapter"))
            .and_then(|i| i.parse::<usize>().ok())
        {
            let media = view.media();
            if let Some(effect) = view.session.select_chapter(index, now(), media) {
                view.apply(effect);
                view.render_menus();
            }
            return;
        }
        view.drag = Drag::Progress;
        toggle_class(&view.progress_bar, "dragging", true);
        view.seek_to_pointer(f64::from(event.client_x()));
    });
    on(shared, index, &progress_bar, "mousemove", |view, _, event: MouseEvent| {
        view.hover_progress(f64::from(event.client_x()), now());
    });
    on(shared, index, &progress_bar, "mouseleave", |view, _, _: MouseEvent| {
        view.hide_tooltip();
    });
    on(shared, index, &progress_bar, "click", |_, _, event: MouseEvent| {
        event.stop_propagation();
    });

    on(shared, index, &window, "pointermove", |view, _, event: PointerEvent| match view.drag {
        Drag::Progress => view.seek_to_pointer(f64::from(event.client_x())),
        Drag::Volume => view.volume_to_pointer(f64::from(event.client_y())),
        Drag::Idle => {}
    });
    on(shared, index, &window, "pointerup", |view, _, _: PointerEvent| {
        if view.drag == Drag::Idle {
            return;
        }
        view.drag = Drag::Idle;
        toggle_class(&view.progress_bar, "dragging", false);
        let paused = view.video.paused();
        view.session.pointer_moved(now(), paused);
    });
    on(shared, index, &window, "resize", |view, _, _: web_sys::Event| {
        view.fit_height();
    });

    // -- thumbnails --

    if let Some(thumb_video) = thumb_video {
        on(shared, index, &thumb_video, "seeked", |view, _, _: web_sys::Event| {
            view.capture_settled(true);
        });
        on(shared, index, &thumb_video, "error", |view, _, _: web_sys::Event| {
            view.capture_settled(false);
        });
    }
    Ok(())
}

fn with_player<R>(
    shared: &Shared,
    index: usize,
    f: impl FnOnce(&mut PlayerView, &mut PositionCache<LocalStore>) -> R,
) -> Option<R> {
    with_state(shared, |state| {
        let PageState { players, cache, .. } = state;
        players.get_mut(index).map(|view| f(view, cache))
    })
    .flatten()
}

/// Listen on `target` for player `index`; the view is re-rendered after
/// every handler.
fn on<E, F>(shared: &Shared, index: usize, target: &EventTarget, event: &str, mut handler: F)
where
    E: JsCast + 'static,
    F: FnMut(&mut PlayerView, &mut PositionCache<LocalStore>, E) + 'static,
{
    let s = shared.clone();
    listen(target, event, move |e: E| {
        with_player(&s, index, |view, cache| {
            handler(view, cache, e);
            view.sync(now());
        });
    });
}

// ---------------------------------------------------------------------------
// Page-wide hooks
// ---------------------------------------------------------------------------

pub(crate) fn tick_all(state: &mut PageState, now: Duration, now_ms: u64) {
    let PageState { players, cache, .. } = state;
    for view in players.iter_mut() {
        let media = view.media();
        let outcome = view.session.tick(cache, media, now, now_ms);
        if let Some(thumbs) = view.thumbs.as_mut()
            && thumbs.in_flight.is_some_and(|key| outcome.expired_thumbnails.contains(&key))
        {
            tracing::debug!(target: LOG_TARGET, key = ?thumbs.in_flight, "thumbnail capture timed out");
            thumbs.next(media.duration);
        }
        view.sync(now);
    }
}

/// Close menus and the badge of every player the click landed outside of.
pub(crate) fn outside_click(shared: &Shared, target: Option<&EventTarget>) {
    let now = now();
    with_state(shared, |state| {
        for view in &mut state.players {
            let mut regions: Vec<&Element> = vec![&view.controls, &view.settings_menu];
            if let Some((_, menu)) = &view.checkpoints {
                regions.push(menu);
            }
            if let Some(badge) = &view.badge {
                regions.push(badge);
            }
            if regions.into_iter().any(|region| contains_target(region, target)) {
                continue;
            }
            if view.session.menu().is_open() || view.session.badge().position().is_some() {
                view.session.outside_click();
                view.sync(now);
            }
        }
    });
}

pub(crate) fn fullscreen_changed(shared: &Shared) {
    let fullscreen = document().ok().and_then(|d| d.fullscreen_element());
    let now = now();
    with_state(shared, |state| {
        for view in &mut state.players {
            let is_full = fullscreen.as_ref().is_some_and(|element| {
                let node: &Node = element;
                view.container.is_same_node(Some(node))
            });
            if is_full == view.fullscreen {
                continue;
            }
            view.fullscreen = is_full;
            toggle_class(&view.container, "fullscreen", is_full);
            view.fullscreen_btn
                .set_inner_html(if is_full { ICON_EXIT_FULLSCREEN } else { ICON_FULLSCREEN });
            let paused = view.video.paused();
            view.session.fullscreen_changed(now, paused);
            view.fit_height();
            view.sync(now);
        }
    });
}

/// Flush every player's position before the page goes away.
pub(crate) fn unload_all(shared: &Shared, now_ms: u64) {
    with_state(shared, |state| {
        let PageState { players, cache, .. } = state;
        for view in players.iter_mut() {
            let media = view.media();
            view.session.on_unload(cache, media, now_ms);
        }
    });
}
