//! End-to-end flows a host page drives through the runtime, without a DOM.

use pretty_assertions::assert_eq;
use vetrom_config::{parse_gallery_classes, parse_media_classes};
use vetrom_runtime::options::Options;
use vetrom_runtime::player::{PlayerCommand, Volume, command_for_key, skip_target};
use vetrom_runtime::{
    Gallery, GalleryRegistry, GallerySummary, KeyValueStore, LightboxState, MediaItem,
    MemoryStore, PlaybackTracker, Playhead, PositionCache, PositionIdentity, plan_code_block,
};
use vetrom_style::{AmbientSnapshot, CssNamedColors, Direction, ThemeMode, resolve_gallery_theme};

const NOW: u64 = 1_700_000_000_000;

fn image(name: &str) -> MediaItem {
    MediaItem::Image {
        src: format!("{name}.jpg"),
        alt: name.to_string(),
    }
}

// --- position persistence across reloads ---

#[test]
fn playback_resumes_after_reload() {
    let options = Options::default();
    let identity = PositionIdentity::new("https://cdn.example.com/talk.mp4")
        .with_instance(parse_media_classes("vetrom-media-3-dark").instance);
    let mut store = MemoryStore::new();

    // First visit: play, pause at 42s.
    {
        let mut cache = PositionCache::new(store.clone(), options.cache.clone());
        let key = cache.key_for(&identity).unwrap();
        assert!(key.ends_with("_inst3"));
        let mut tracker = PlaybackTracker::new(key, identity.src.clone(), &options.player);
        assert_eq!(tracker.on_metadata(&mut cache, 600.0, NOW), None);
        tracker.on_play(NOW);
        tracker.on_pause(&mut cache, Playhead::new(42.0, 600.0), NOW + 42_000);
        store = cache.store().clone();
    }

    // Reload an hour later.
    let mut cache = PositionCache::new(store, options.cache.clone());
    let key = cache.key_for(&identity).unwrap();
    let mut tracker = PlaybackTracker::new(key.clone(), identity.src.clone(), &options.player);
    assert_eq!(tracker.on_metadata(&mut cache, 600.0, NOW + 3_600_000), Some(42.0));

    // Watching to the end forgets the position.
    tracker.on_ended(&mut cache);
    assert_eq!(cache.store().get(&key).unwrap(), None);
}

#[test]
fn swapped_media_at_same_key_is_not_resumed() {
    let options = Options::default();
    let mut cache = PositionCache::new(MemoryStore::new(), options.cache.clone());
    cache.save("vetrom_1", 42.0, 100.0, "a.mp4", NOW).unwrap();

    let mut tracker = PlaybackTracker::new("vetrom_1", "b.mp4", &options.player);
    assert_eq!(tracker.on_metadata(&mut cache, 100.0, NOW), None);
    assert!(cache.store().is_empty());
}

#[test]
fn options_change_retention() {
    let options = Options::from_json(r#"{"cache":{"retention_days":1}}"#).unwrap();
    let mut cache = PositionCache::new(MemoryStore::new(), options.cache);
    cache.save("vetrom_1", 42.0, 100.0, "a.mp4", NOW).unwrap();
    let two_days = 2 * 24 * 60 * 60 * 1000;
    assert_eq!(cache.load("vetrom_1", Some(100.0), "a.mp4", NOW + two_days), None);
}

// --- galleries ---

#[test]
fn rtl_gallery_with_lightbox_round_trip() {
    let config = parse_gallery_classes("card vetrom-gallery-dark-gold").unwrap();
    assert_eq!(config.theme, ThemeMode::Dark);
    let style = resolve_gallery_theme(
        config.theme,
        config.color.as_deref(),
        &AmbientSnapshot::new("#ffffff", Direction::Rtl),
        &CssNamedColors,
    );
    assert_eq!(style.background, "#1a1a1a");

    let mut registry = GalleryRegistry::new();
    registry.register(Gallery::new(vec![image("a")], Direction::Ltr).unwrap());
    let rtl = registry.register(
        Gallery::new(vec![image("a"), image("b"), image("c")], Direction::Rtl).unwrap(),
    );
    assert_eq!(
        registry.get(rtl).unwrap().items().first(),
        Some(&image("c"))
    );

    assert!(registry.open_lightbox(rtl, 0));
    assert_eq!(registry.handle_key("ArrowLeft"), Some(vetrom_runtime::LightboxKey::Prev));
    assert_eq!(registry.lightbox(), LightboxState::Open { gallery: rtl, slide: 2 });
    registry.handle_key("Escape");

    assert_eq!(
        registry.summaries(),
        vec![
            GallerySummary { index: 0, current_slide: 0, total_slides: 1, is_rtl: false },
            GallerySummary { index: 1, current_slide: 2, total_slides: 3, is_rtl: true },
        ]
    );
    assert_eq!(registry.get(rtl).unwrap().transform_css(), "translateX(200%)");
    assert_eq!(
        serde_json::to_string(&registry.summaries()[1]).unwrap(),
        r#"{"index":1,"currentSlide":2,"totalSlides":3,"isRTL":true}"#
    );
}

// --- players ---

#[test]
fn keyboard_session() {
    let options = Options::from_json(r#"{"player":{"seek_step_secs":10}}"#).unwrap();
    let timing = &options.player;
    let mut volume = Volume::new(0.05, false);
    let mut time: f64 = 95.0;
    let duration = 100.0;

    for (key, code) in [("l", "KeyL"), ("ArrowDown", "ArrowDown"), ("m", "KeyM")] {
        match command_for_key(key, code, timing) {
            Some(PlayerCommand::SeekBy(delta)) => {
                time = vetrom_runtime::player::clamp_seek(time + delta, duration);
            }
            Some(PlayerCommand::VolumeBy(delta)) => volume.step(delta),
            Some(PlayerCommand::ToggleMute) => volume.toggle_mute(),
            other => panic!("unexpected command {other:?}"),
        }
    }

    assert_eq!(time, 100.0);
    assert_eq!(volume.level(), 0.6);
    assert!(!volume.is_muted());
    assert_eq!(skip_target(time, false, duration, timing), 90.0);
}

// --- code blocks ---

#[test]
fn code_block_plans() {
    let plan = plan_code_block("copy-_222", &CssNamedColors);
    assert_eq!(plan.base.background, "#222");
    assert!(plan.copy_button().is_some());
    assert!(plan.hover.is_none());

    let plan = plan_code_block("hovercopy-white-hover-_e2e8f0", &CssNamedColors);
    assert_eq!(plan.base.background, "rgba(255, 255, 255, 0.88)");
    assert!(plan.hover.unwrap().softened);
}
