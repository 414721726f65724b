#![forbid(unsafe_code)]

//! Stylesheets and `innerHTML` fragments for every widget.
//!
//! Each stylesheet is injected once as a `<style>` element, keyed by its id.
//! Fragments interpolate user-supplied labels only through [`escape_html`].

use vetrom_config::{ChapterMark, format_time};
use vetrom_runtime::player::PLAYBACK_SPEEDS;
use vetrom_runtime::{Generation, MediaItem, PlayerSession};

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape text for use in element content and quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Stylesheets
// ---------------------------------------------------------------------------

pub const CODE_BLOCK_STYLE_ID: &str = "vetrom-codeblock-style";
pub const GALLERY_STYLE_ID: &str = "vetrom-gallery-style";
pub const PLAYER_STYLE_ID: &str = "vetrom-player-style";

pub const CODE_BLOCK_CSS: &str = r#"
.vetrom-codeblock {
    position: relative;
    margin: 2rem 0;
    padding: 2rem;
    border-radius: 12px;
    overflow-x: auto;
    transition: background-color 0.25s ease, color 0.25s ease;
}
.vetrom-copy-btn {
    position: absolute;
    top: 1rem;
    right: 1rem;
    padding: 0.35rem 0.75rem;
    border: none;
    border-radius: 6px;
    font: 600 0.75rem/1 system-ui, sans-serif;
    letter-spacing: 0.05em;
    cursor: pointer;
    background: rgba(255, 255, 255, 0.15);
    color: inherit;
    transition: opacity 0.2s ease;
}
"#;

pub const GALLERY_CSS: &str = r#"
:root {
    --vetrom-bg: #ffffff;
    --vetrom-text: #000000;
    --vetrom-accent: rgba(0, 0, 0, 0.5);
    --vetrom-text-rgb: 0, 0, 0;
    --vetrom-lightbox-icon-color: #ffffff;
}
.vetrom-gallery-container {
    position: relative;
    max-width: 100%;
    padding-bottom: 50.625%;
    height: 0;
    overflow: hidden;
    border-radius: 8px;
    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
    margin: 20px auto;
}
.vetrom-gallery-image-wrapper {
    position: absolute;
    inset: 0;
    display: flex;
    transition: transform 0.3s ease-in-out;
    cursor: pointer;
}
.vetrom-gallery-container[dir="rtl"] .vetrom-gallery-image-wrapper { direction: rtl; }
.vetrom-gallery-container[dir="rtl"] .vetrom-gallery-control.prev { left: auto; right: 10px; transform: translateY(-50%) rotate(180deg); }
.vetrom-gallery-container[dir="rtl"] .vetrom-gallery-control.next { right: auto; left: 10px; transform: translateY(-50%) rotate(180deg); }
.vetrom-gallery-slide {
    flex: 0 0 100%;
    height: 100%;
    box-sizing: border-box;
    display: flex;
    align-items: center;
    justify-content: center;
    user-select: none;
    background-color: var(--vetrom-bg);
}
.vetrom-gallery-slide img,
.vetrom-gallery-slide video {
    display: block;
    width: 100%;
    height: 100%;
    border-radius: 8px;
    object-fit: contain;
    -webkit-user-drag: none;
    user-select: none;
}
.vetrom-gallery-control {
    position: absolute;
    top: 50%;
    transform: translateY(-50%);
    width: 40px;
    height: 40px;
    padding: 10px;
    border: none;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    background: var(--vetrom-accent);
    color: var(--vetrom-text);
    cursor: pointer;
    z-index: 10;
    transition: background 0.2s;
}
.vetrom-gallery-control:hover { background: rgba(var(--vetrom-text-rgb), 0.7); }
.vetrom-gallery-control svg { width: 32px; height: 32px; }
.vetrom-gallery-control.prev { left: 10px; }
.vetrom-gallery-control.next { right: 10px; }
.vetrom-lightbox-overlay {
    position: fixed;
    inset: 0;
    background: rgba(0, 0, 0, 0.95);
    z-index: 9999;
    display: none;
    align-items: center;
    justify-content: center;
    opacity: 0;
    transition: opacity 0.3s;
}
.vetrom-lightbox-overlay.active { display: flex; opacity: 1; }
.vetrom-lightbox-content {
    position: relative;
    max-width: calc(100vw - 80px);
    max-height: calc(100vh - 80px);
    width: 100%;
    height: 100%;
    display: flex;
    align-items: center;
    justify-content: center;
}
.vetrom-lightbox-image,
.vetrom-lightbox-video {
    max-width: 100%;
    max-height: 100%;
    display: block;
    object-fit: contain;
    border-radius: 4px;
    -webkit-user-drag: none;
    user-select: none;
}
.vetrom-lightbox-video { background: #000; }
.vetrom-lightbox-close,
.vetrom-lightbox-control {
    position: absolute;
    width: 50px;
    height: 50px;
    border: none;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    background: var(--vetrom-accent);
    color: var(--vetrom-lightbox-icon-color);
    cursor: pointer;
    z-index: 10000;
    user-select: none;
}
.vetrom-lightbox-close { top: 20px; right: 30px; font-size: 40px; font-weight: bold; line-height: 1; }
.vetrom-lightbox-close:hover { color: #ccc; }
.vetrom-lightbox-control { top: 50%; transform: translateY(-50%); padding: 10px; transition: background 0.2s; }
.vetrom-lightbox-control:hover { background: rgba(var(--vetrom-text-rgb), 0.7); }
.vetrom-lightbox-control svg { width: 40px; height: 40px; }
.vetrom-lightbox-control.prev { left: 20px; }
.vetrom-lightbox-control.next { right: 20px; }
"#;

pub const PLAYER_CSS: &str = r#"
.vetrom-player-container {
    position: relative;
    width: 100%;
    max-width: 980px;
    margin: 18px auto;
    background: #0b0b0b;
    border-radius: 10px;
    box-shadow: 0 8px 30px rgba(0,0,0,0.6);
    font-family: Inter, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial;
}
.vetrom-player-container .vetrom-media-inner { position: relative; overflow: hidden; border-radius: 8px; background: #000; }
.vetrom-player-container video { position: absolute; left: 0; top: 5px; width: 100%; height: calc(100% - 10px); object-fit: contain; z-index: 1; }
.vetrom-player-container.fullscreen { max-width: 100vw; border-radius: 0; box-shadow: none; }
.vetrom-controls {
    position: absolute;
    left: 0;
    right: 0;
    bottom: 0;
    height: 56px;
    display: flex;
    align-items: center;
    gap: 8px;
    padding: 6px 12px;
    background: linear-gradient(to top, rgba(0,0,0,0.75), rgba(0,0,0,0.15));
    border-radius: 8px;
    color: #fff;
    z-index: 40;
    opacity: 0;
    transform: translateY(8px);
    transition: opacity 0.18s, transform 0.18s;
}
.vetrom-controls.visible { opacity: 1; transform: translateY(0); }
.vetrom-controls .vetrom-btn {
    background: transparent;
    border: none;
    padding: 6px;
    border-radius: 6px;
    display: inline-flex;
    align-items: center;
    justify-content: center;
    min-width: 32px;
    min-height: 32px;
    cursor: pointer;
    color: var(--vetrom-primary, #87CEFA);
    font-size: 18px;
}
.vetrom-controls .vetrom-btn:hover { background: rgba(255,255,255,0.1); }
.vetrom-btn svg { width: 20px; height: 20px; fill: currentColor; pointer-events: none; }
.vetrom-time { font-size: 13px; color: #fff; white-space: nowrap; }
.vetrom-progress-wrap { flex: 1; display: flex; align-items: center; }
.vetrom-progress-bar { position: relative; flex: 1; height: 8px; background: rgba(255,255,255,0.08); border-radius: 8px; cursor: pointer; }
.vetrom-progress-line { position: absolute; left: 0; top: 0; bottom: 0; width: 0; background: var(--vetrom-primary, #87CEFA); border-radius: 8px; pointer-events: none; z-index: 2; }
.vetrom-progress-thumb { position: absolute; top: 50%; transform: translate(-50%, -50%); width: 12px; height: 12px; border-radius: 50%; background: var(--vetrom-secondary, #fff); display: none; z-index: 3; }
.vetrom-progress-bar:hover .vetrom-progress-thumb,
.vetrom-progress-bar.dragging .vetrom-progress-thumb { display: block; }
.vetrom-chapter-marker { position: absolute; top: -4px; width: 4px; height: 16px; background: var(--vetrom-accent, #FFD700); border-radius: 3px; z-index: 4; cursor: pointer; }
.vetrom-skip-btn {
    position: absolute;
    top: 6px;
    bottom: 14px;
    height: fit-content;
    margin: auto 0;
    background: transparent;
    border: none;
    color: var(--vetrom-primary, #87CEFA);
    opacity: 0;
    z-index: 30;
    cursor: pointer;
    transition: opacity 0.2s;
}
.vetrom-skip-btn svg { width: 64px; height: 64px; fill: currentColor; }
.vetrom-skip-btn.visible { opacity: 1; }
.vetrom-skip-back { left: 24%; }
.vetrom-skip-forward { right: 24%; }
.vetrom-center-overlay { position: absolute; left: 50%; top: 50%; transform: translate(-50%, -50%); z-index: 45; display: flex; flex-direction: column; align-items: center; }
.vetrom-center-overlay .big-btn { width: 70px; height: 70px; border: none; border-radius: 50%; background: transparent; cursor: pointer; color: var(--vetrom-primary, #87CEFA); }
.vetrom-center-overlay .big-btn svg { width: 48px; height: 48px; fill: currentColor; }
.vetrom-center-overlay .big-caption { margin-top: 8px; color: #fff; font-weight: 600; font-size: 14px; }
.vetrom-settings-menu,
.vetrom-checkpoints-menu {
    position: absolute;
    bottom: 72px;
    right: 12px;
    width: 280px;
    max-height: 400px;
    overflow-y: auto;
    background: rgba(12,12,12,0.95);
    border-radius: 8px;
    color: #fff;
    z-index: 50;
    display: none;
}
.vetrom-settings-menu.open,
.vetrom-checkpoints-menu.open { display: block; }
.vetrom-menu-main { padding: 10px; }
.vetrom-menu-main.hidden { display: none; }
.vetrom-menu-submenu-view { display: none; flex-direction: column; }
.vetrom-menu-submenu-view.active { display: flex; }
.vetrom-submenu-header { padding: 12px; display: flex; gap: 12px; cursor: pointer; color: var(--vetrom-accent, #FFD700); font-weight: 600; border-bottom: 1px solid rgba(255,255,255,0.1); }
.vetrom-submenu-content { padding: 10px; }
.vetrom-menu-header,
.vetrom-menu-item,
.vetrom-settings-menu > [data-speed],
.vetrom-checkpoint-item { padding: 10px 12px; border-radius: 6px; cursor: pointer; font-size: 13px; display: flex; justify-content: space-between; }
.vetrom-menu-header:hover,
.vetrom-menu-item:hover,
.vetrom-checkpoint-item:hover { background: rgba(255,255,255,0.04); color: var(--vetrom-primary, #87CEFA); }
.vetrom-menu-item.active,
[data-speed].active { background: rgba(255,255,255,0.08); color: var(--vetrom-accent, #FFD700); }
.vetrom-thumb-tooltip { position: absolute; bottom: 56px; transform: translateX(-50%); display: flex; flex-direction: column; align-items: center; z-index: 60; pointer-events: none; }
.vetrom-thumb-tooltip .thumb-time { background: rgba(0,0,0,0.75); padding: 4px 8px; border-radius: 6px; color: #fff; font-size: 12px; margin-bottom: 6px; }
.vetrom-thumb-tooltip .thumb-img { width: 160px; border-radius: 6px; background: #000; overflow: hidden; }
.vetrom-thumb-tooltip img { width: 160px; height: 90px; display: block; object-fit: cover; }
.vetrom-volume-wrap { position: relative; display: flex; align-items: center; }
.vetrom-volume-panel { position: absolute; bottom: 70px; left: 50%; transform: translateX(-50%); width: 64px; padding: 15px 8px 8px; background: rgba(12,12,12,0.95); border-radius: 10px; flex-direction: column; align-items: center; gap: 8px; z-index: 55; }
.vetrom-volume-vertical { position: relative; width: 12px; height: 120px; background: rgba(255,255,255,0.06); border-radius: 8px; }
.vetrom-volume-vertical .vol-fill { position: absolute; left: 0; right: 0; bottom: 0; background: var(--vetrom-primary, #87CEFA); border-radius: 8px; }
.vetrom-volume-vertical .vol-thumb { position: absolute; left: 50%; transform: translate(-50%, 50%); width: 18px; height: 18px; border-radius: 50%; background: var(--vetrom-secondary, #fff); pointer-events: none; }
.vetrom-volume-percent { font-size: 12px; color: #fff; }
.vetrom-secure-badge { position: fixed; background: rgba(12,12,12,0.95); padding: 12px 16px; border-radius: 8px; color: #fff; z-index: 9999; display: none; align-items: center; gap: 12px; }
.vetrom-secure-badge.visible { display: flex; }
.vetrom-secure-badge span { color: var(--vetrom-primary, #87CEFA); font-weight: 600; font-size: 14px; }
@media (max-width: 1024px) {
    .vetrom-controls { height: 48px; padding: 4px 8px; gap: 6px; }
    .vetrom-skip-btn svg { width: 48px; height: 48px; }
    .vetrom-settings-menu, .vetrom-checkpoints-menu { bottom: 60px; width: 240px; }
}
"#;

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub const ICON_PLAY: &str = r#"<svg viewBox="0 0 24 24"><path d="M7 4v16l13-8z"/></svg>"#;
pub const ICON_PAUSE: &str = r#"<svg viewBox="0 0 24 24"><path d="M6 4h4v16H6zm8 0h4v16h-4z"/></svg>"#;
pub const ICON_VOLUME: &str = r#"<svg viewBox="0 0 24 24"><path d="M3 9v6h4l5 5V4L7 9zm13.5 3A4.5 4.5 0 0 0 14 8v8a4.5 4.5 0 0 0 2.5-4z"/></svg>"#;
pub const ICON_MUTED: &str = r#"<svg viewBox="0 0 24 24"><path d="M3 9v6h4l5 5V4L7 9zm13.6 3 2.9-2.9-1.4-1.4-2.9 2.9-2.9-2.9-1.4 1.4 2.9 2.9-2.9 2.9 1.4 1.4 2.9-2.9 2.9 2.9 1.4-1.4z"/></svg>"#;
pub const ICON_SETTINGS: &str = r#"<svg viewBox="0 0 24 24"><path d="M19.4 13a7.5 7.5 0 0 0 0-2l2.1-1.6-2-3.5-2.5 1a7.3 7.3 0 0 0-1.7-1L15 3h-4l-.4 2.9a7.3 7.3 0 0 0-1.7 1l-2.5-1-2 3.5L6.6 11a7.5 7.5 0 0 0 0 2l-2.1 1.6 2 3.5 2.5-1a7.3 7.3 0 0 0 1.7 1L11 21h4l.4-2.9a7.3 7.3 0 0 0 1.7-1l2.5 1 2-3.5zM13 15.5a3.5 3.5 0 1 1 0-7 3.5 3.5 0 0 1 0 7z"/></svg>"#;
pub const ICON_CHAPTERS: &str = r#"<svg viewBox="0 0 24 24"><path d="M4 6h16v2H4zm0 5h16v2H4zm0 5h10v2H4z"/></svg>"#;
pub const ICON_FULLSCREEN: &str = r#"<svg viewBox="0 0 24 24"><path d="M4 4h6v2H6v4H4zm10 0h6v6h-2V6h-4zM4 14h2v4h4v2H4zm14 0h2v6h-6v-2h4z"/></svg>"#;
pub const ICON_EXIT_FULLSCREEN: &str = r#"<svg viewBox="0 0 24 24"><path d="M8 4h2v6H4V8h4zm6 0h2v4h4v2h-6zM4 14h6v6H8v-4H4zm10 0h6v2h-4v4h-2z"/></svg>"#;
pub const ICON_SKIP_BACK: &str = r#"<svg viewBox="0 0 24 24"><path d="M12 5V1L7 6l5 5V7a6 6 0 1 1-6 6H4a8 8 0 1 0 8-8z"/></svg>"#;
pub const ICON_SKIP_FORWARD: &str = r#"<svg viewBox="0 0 24 24"><path d="M12 5V1l5 5-5 5V7a6 6 0 1 0 6 6h2a8 8 0 1 1-8-8z"/></svg>"#;
pub const ICON_PREV: &str = r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M15.4 7.4 14 6l-6 6 6 6 1.4-1.4-4.6-4.6z"/></svg>"#;
pub const ICON_NEXT: &str = r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M8.6 16.6 10 18l6-6-6-6-1.4 1.4 4.6 4.6z"/></svg>"#;

// ---------------------------------------------------------------------------
// Player fragments
// ---------------------------------------------------------------------------

/// Control bar. v1 carries its own chapters button.
#[must_use]
pub fn controls_html(generation: Generation) -> String {
    let chapters_btn = match generation {
        Generation::V1 => format!(
            r#"<button class="vetrom-btn vetrom-chapters-btn" style="display:none" title="Chapters">{ICON_CHAPTERS}</button>"#
        ),
        Generation::V2 => String::new(),
    };
    format!(
        concat!(
            r#"<button class="vetrom-btn vetrom-play-btn" title="Play/Pause">{play}</button>"#,
            r#"<div class="vetrom-time vetrom-current-time">00:00</div>"#,
            r#"<div class="vetrom-progress-wrap"><div class="vetrom-progress-bar" aria-hidden="true">"#,
            r#"<div class="vetrom-progress-line"></div><div class="vetrom-progress-thumb" aria-hidden="true"></div>"#,
            r#"</div></div>"#,
            r#"<div class="vetrom-volume-wrap"><button class="vetrom-btn vetrom-volume-btn" title="Volume">{volume}</button>{panel}</div>"#,
            r#"<button class="vetrom-btn vetrom-settings-btn" title="Settings">{settings}</button>"#,
            "{chapters}",
            r#"<button class="vetrom-btn vetrom-fullscreen-btn" title="Fullscreen">{fullscreen}</button>"#,
        ),
        play = ICON_PLAY,
        volume = ICON_VOLUME,
        panel = VOLUME_PANEL_HTML,
        settings = ICON_SETTINGS,
        chapters = chapters_btn,
        fullscreen = ICON_FULLSCREEN,
    )
}

pub const VOLUME_PANEL_HTML: &str = concat!(
    r#"<div class="vetrom-volume-panel" style="display:none">"#,
    r#"<div class="vetrom-volume-vertical"><div class="vol-fill"></div><div class="vol-thumb"></div></div>"#,
    r#"<div class="vetrom-volume-percent">0%</div></div>"#,
);

/// Hover preview over the progress bar. The frame image is filled from the
/// thumbnail cache.
pub const TOOLTIP_HTML: &str = concat!(
    r#"<div class="thumb-time">00:00</div>"#,
    r#"<div class="thumb-img"><img class="thumb-frame" alt=""></div>"#,
);

#[must_use]
pub fn center_overlay_html() -> String {
    format!(r#"<button class="big-btn" title="Play/Pause">{ICON_PLAY}</button><div class="big-caption"></div>"#)
}

pub const SECURE_BADGE_HTML: &str = r#"<span>VetroM Player</span>"#;

/// Label of a speed entry.
#[must_use]
pub fn speed_label(rate: f64, generation: Generation) -> String {
    match generation {
        Generation::V1 if rate == 1.0 => "1x (Normal)".to_string(),
        Generation::V2 if rate == 1.0 => "Normal".to_string(),
        _ => format!("{rate}x"),
    }
}

fn active(is_active: bool) -> &'static str {
    if is_active { " active" } else { "" }
}

fn speed_items(session: &PlayerSession, item_class: &str) -> String {
    PLAYBACK_SPEEDS
        .iter()
        .map(|&rate| {
            format!(
                r#"<div class="{item_class}{}" data-speed="{rate}">{}</div>"#,
                active(rate == session.rate()),
                speed_label(rate, session.generation()),
            )
        })
        .collect()
}

fn submenu_view(name: &str, title: &str, items: &str) -> String {
    format!(
        concat!(
            r#"<div class="vetrom-menu-submenu-view" data-submenu="{name}">"#,
            r#"<div class="vetrom-submenu-header" data-back="{name}"><span>&lsaquo;</span><span>{title}</span></div>"#,
            r#"<div class="vetrom-submenu-content">{items}</div></div>"#,
        ),
        name = name,
        title = title,
        items = items,
    )
}

/// Settings menu content for the session's current state.
///
/// v1 renders a flat speed list. v2 renders the main view with one header
/// per available section, plus a submenu view per section.
#[must_use]
pub fn settings_menu_html(session: &PlayerSession) -> String {
    if session.generation() == Generation::V1 {
        return speed_items(session, "vetrom-speed-item");
    }

    let mut main = String::from(r#"<div class="vetrom-menu-main">"#);
    let mut views = String::new();
    let mut section = |name: &str, title: &str, items: String| {
        main.push_str(&format!(
            r#"<div class="vetrom-menu-section"><div class="vetrom-menu-header" data-section="{name}">{title} <span>&rsaquo;</span></div></div>"#
        ));
        views.push_str(&submenu_view(name, title, &items));
    };

    section("speed", "Speed", speed_items(session, "vetrom-menu-item"));

    if let Some(quality) = session.quality() {
        let items = quality
            .sources()
            .iter()
            .enumerate()
            .map(|(i, source)| {
                format!(
                    r#"<div class="vetrom-menu-item{}" data-quality="{i}">{}</div>"#,
                    active(i == quality.current()),
                    escape_html(&source.label),
                )
            })
            .collect();
        section("quality", "Quality", items);
    }

    let tracks = session.subtitles().tracks();
    if !tracks.is_empty() {
        let showing = session.subtitles().showing();
        let mut items = format!(
            r#"<div class="vetrom-menu-item{}" data-subtitle="off">Off</div>"#,
            active(showing.is_none())
        );
        for (i, track) in tracks.iter().enumerate() {
            items.push_str(&format!(
                r#"<div class="vetrom-menu-item{}" data-subtitle="{i}">{}</div>"#,
                active(showing == Some(i)),
                escape_html(&track.label),
            ));
        }
        section("subtitles", "Subtitles", items);
    }

    if !session.chapters().is_empty() {
        section("chapters", "Chapters", chapter_items(session.chapters(), "vetrom-menu-item"));
    }

    main.push_str("</div>");
    main.push_str(&views);
    main
}

fn chapter_items(chapters: &[ChapterMark], item_class: &str) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let label = escape_html(&chapter.label);
            format!(
                r#"<div class="{item_class}" data-chapter="{i}" title="{label}">{label} &ndash; {}</div>"#,
                format_time(chapter.offset_seconds),
            )
        })
        .collect()
}

/// v1 chapter list, shown from its own button.
#[must_use]
pub fn checkpoints_menu_html(chapters: &[ChapterMark]) -> String {
    chapter_items(chapters, "vetrom-checkpoint-item")
}

// ---------------------------------------------------------------------------
// Gallery fragments
// ---------------------------------------------------------------------------

#[must_use]
pub fn gallery_control_html(forward: bool) -> String {
    let (class, label, icon) = if forward {
        ("next", "Next", ICON_NEXT)
    } else {
        ("prev", "Previous", ICON_PREV)
    };
    format!(r#"<button class="vetrom-gallery-control {class}" aria-label="{label}">{icon}</button>"#)
}

/// Lightbox overlay content, with an empty media slot.
#[must_use]
pub fn lightbox_html() -> String {
    format!(
        concat!(
            r#"<span class="vetrom-lightbox-close" role="button" aria-label="Close">&times;</span>"#,
            r#"<button class="vetrom-lightbox-control prev" aria-label="Previous">{prev}</button>"#,
            r#"<div class="vetrom-lightbox-content"></div>"#,
            r#"<button class="vetrom-lightbox-control next" aria-label="Next">{next}</button>"#,
        ),
        prev = ICON_PREV,
        next = ICON_NEXT,
    )
}

/// Lightbox media for an image. Videos are cloned from the slide instead.
#[must_use]
pub fn lightbox_image_html(item: &MediaItem) -> Option<String> {
    match item {
        MediaItem::Image { src, .. } => Some(format!(
            r#"<img class="vetrom-lightbox-image" src="{}" alt="{}">"#,
            escape_html(src),
            escape_html(item.lightbox_alt()),
        )),
        MediaItem::Video { .. } => None,
    }
}
