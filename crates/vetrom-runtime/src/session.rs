#![forbid(unsafe_code)]

//! One player instance: every state machine from [`crate::player`] plus
//! position tracking, behind an event-in / effect-out surface.
//!
//! The host reads a [`MediaSnapshot`] from the media element, forwards the
//! user or media event, and applies the returned [`PlayerEffect`] back to the
//! element. Both player generations share this type; [`Generation`] selects
//! the few behaviors that differ.

use std::time::Duration;

use vetrom_config::{ChapterMark, marker_percent};

use crate::options::{Options, PlayerTiming};
use crate::player::{
    Controls, PlayerCommand, QualitySelector, QualitySource, QualitySwitch, SecureBadge,
    SettingsMenu, Submenu, SubtitleChoice, SubtitleSelector, SubtitleTrack, Volume, clamp_seek,
    command_for_key, is_supported_speed, pointer_seek, skip_target,
};
use crate::position::{KeyValueStore, PositionCache, PositionIdentity};
use crate::thumbnail::ThumbnailCache;
use crate::tracker::{PlaybackTracker, Playhead};

/// Delay before controls auto-hide on a player that starts playing.
const AUTOPLAY_HIDE: Duration = Duration::from_millis(1200);
/// How long controls stay up after entering or leaving fullscreen.
const FULLSCREEN_FLASH: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// `video.vetrom-media-selected`: speed-only menu, chapters from `<meta>`.
    V1,
    /// `vetrom-media-*` classes: full menu, chapters from the element `id`.
    V2,
}

/// Media element state read just before an event is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSnapshot {
    pub time: f64,
    /// NaN while unknown.
    pub duration: f64,
    pub paused: bool,
}

impl MediaSnapshot {
    #[must_use]
    pub const fn new(time: f64, duration: f64, paused: bool) -> Self {
        Self {
            time,
            duration,
            paused,
        }
    }

    fn playhead(self) -> Playhead {
        Playhead::new(self.time, self.duration)
    }
}

/// A change the host must apply to the media element or page.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEffect {
    TogglePlay,
    ToggleFullscreen,
    Seek(f64),
    SetVolume { level: f64, muted: bool },
    SetRate(f64),
    SwitchSource(QualitySwitch),
    /// Showing flag per subtitle track.
    SubtitleModes(Vec<bool>),
}

/// Result of a key press the player handles.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    pub effect: PlayerEffect,
    pub prevent_default: bool,
}

/// What a [`PlayerSession::tick`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub controls_hidden: bool,
    pub badge_opened: bool,
    pub saved: bool,
    /// Thumbnail captures that timed out.
    pub expired_thumbnails: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct PlayerSession {
    generation: Generation,
    timing: PlayerTiming,
    key_prefix: String,
    identity: PositionIdentity,
    tracker: Option<PlaybackTracker>,
    controls: Controls,
    menu: SettingsMenu,
    volume: Volume,
    rate: f64,
    quality: Option<QualitySelector>,
    subtitles: SubtitleSelector,
    chapters: Vec<ChapterMark>,
    badge: SecureBadge,
    thumbnails: ThumbnailCache,
}

impl PlayerSession {
    /// Create a session. Position tracking is disabled when the identity
    /// yields no key (no source yet).
    #[must_use]
    pub fn new(generation: Generation, options: &Options, identity: PositionIdentity, secure: bool) -> Self {
        let key_prefix = options.cache.key_prefix.clone();
        let tracker = identity
            .key(&key_prefix)
            .map(|key| PlaybackTracker::new(key, identity.src.clone(), &options.player));
        Self {
            generation,
            timing: options.player.clone(),
            key_prefix,
            identity,
            tracker,
            controls: Controls::default(),
            menu: SettingsMenu::default(),
            volume: Volume::default(),
            rate: 1.0,
            quality: None,
            subtitles: SubtitleSelector::new(Vec::new()),
            chapters: Vec::new(),
            badge: SecureBadge::new(secure),
            thumbnails: ThumbnailCache::new(),
        }
    }

    #[must_use]
    pub fn with_chapters(mut self, chapters: Vec<ChapterMark>) -> Self {
        self.chapters = chapters;
        self
    }

    /// Quality menus exist on v2 only.
    #[must_use]
    pub fn with_quality(mut self, sources: Vec<QualitySource>) -> Self {
        if self.generation == Generation::V2 {
            self.quality = QualitySelector::new(sources);
        }
        self
    }

    /// Subtitle menus exist on v2 only.
    #[must_use]
    pub fn with_subtitles(mut self, tracks: Vec<SubtitleTrack>) -> Self {
        if self.generation == Generation::V2 {
            self.subtitles = SubtitleSelector::new(tracks);
        }
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    // -- accessors --

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn position_key(&self) -> Option<&str> {
        self.tracker.as_ref().map(PlaybackTracker::key)
    }

    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    #[must_use]
    pub fn menu(&self) -> &SettingsMenu {
        &self.menu
    }

    #[must_use]
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub fn quality(&self) -> Option<&QualitySelector> {
        self.quality.as_ref()
    }

    #[must_use]
    pub fn subtitles(&self) -> &SubtitleSelector {
        &self.subtitles
    }

    #[must_use]
    pub fn chapters(&self) -> &[ChapterMark] {
        &self.chapters
    }

    #[must_use]
    pub fn badge(&self) -> &SecureBadge {
        &self.badge
    }

    pub fn thumbnails_mut(&mut self) -> &mut ThumbnailCache {
        &mut self.thumbnails
    }

    /// Chapter markers as `(left %, chapter)`; empty until the duration is known.
    #[must_use]
    pub fn chapter_markers(&self, duration: f64) -> Vec<(f64, &ChapterMark)> {
        self.chapters
            .iter()
            .filter_map(|c| marker_percent(c.offset_seconds, duration).map(|pct| (pct, c)))
            .collect()
    }

    fn flash(&mut self, now: Duration, paused: bool) {
        let flash = Duration::from_millis(self.timing.controls_flash_ms);
        self.controls.show(now, Some(flash), paused);
    }

    fn volume_effect(&self) -> PlayerEffect {
        PlayerEffect::SetVolume {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        }
    }

    // -- user input --

    /// Initial controls: shown while paused, auto-hidden shortly otherwise.
    pub fn start(&mut self, now: Duration, paused: bool) {
        self.controls.show(now, None, paused);
        self.controls.hide_after(now, AUTOPLAY_HIDE, paused);
    }

    pub fn handle_key(&mut self, key: &str, code: &str, now: Duration, media: MediaSnapshot) -> Option<KeyOutcome> {
        let command = command_for_key(key, code, &self.timing)?;
        let effect = match command {
            PlayerCommand::TogglePlay => PlayerEffect::TogglePlay,
            PlayerCommand::ToggleFullscreen => PlayerEffect::ToggleFullscreen,
            PlayerCommand::SeekBy(delta) => {
                self.flash(now, media.paused);
                PlayerEffect::Seek(clamp_seek(media.time + delta, media.duration))
            }
            PlayerCommand::VolumeBy(delta) => {
                self.volume.step(delta);
                self.flash(now, media.paused);
                self.volume_effect()
            }
            PlayerCommand::ToggleMute => {
                self.volume.toggle_mute();
                self.flash(now, media.paused);
                self.volume_effect()
            }
        };
        Some(KeyOutcome {
            effect,
            prevent_default: command.prevents_default(),
        })
    }

    pub fn skip(&mut self, forward: bool, now: Duration, media: MediaSnapshot) -> PlayerEffect {
        self.flash(now, media.paused);
        PlayerEffect::Seek(skip_target(media.time, forward, media.duration, &self.timing))
    }

    /// Click or drag on the progress bar.
    #[must_use]
    pub fn seek_pointer(&self, x: f64, width: f64, media: MediaSnapshot) -> PlayerEffect {
        PlayerEffect::Seek(pointer_seek(x, width, media.duration))
    }

    /// Pointer at `y` pixels from the top of a `height` pixel volume track.
    pub fn volume_pointer(&mut self, y: f64, height: f64) -> PlayerEffect {
        let fraction = if height > 0.0 { 1.0 - y / height } else { 0.0 };
        self.volume.set_from_slider(fraction);
        self.volume_effect()
    }

    pub fn toggle_mute(&mut self) -> PlayerEffect {
        self.volume.toggle_mute();
        self.volume_effect()
    }

    /// Tap on the video surface.
    pub fn surface_click(&mut self, now: Duration, paused: bool) {
        self.controls.toggle(now, &self.timing, paused);
    }

    pub fn pointer_moved(&mut self, now: Duration, paused: bool) {
        self.controls.show(now, None, paused);
        self.controls
            .hide_after(now, Duration::from_millis(self.timing.idle_hide_ms), paused);
    }

    pub fn pointer_left(&mut self, paused: bool) {
        self.controls.hide(paused);
    }

    pub fn fullscreen_changed(&mut self, now: Duration, paused: bool) {
        self.controls.show(now, Some(FULLSCREEN_FLASH), paused);
    }

    // -- settings menu --

    pub fn toggle_settings(&mut self) {
        self.menu.toggle();
    }

    pub fn open_submenu(&mut self, submenu: Submenu) -> bool {
        self.menu.open_submenu(submenu)
    }

    /// v1 chapter list, which has its own button.
    pub fn toggle_chapters(&mut self) {
        self.menu.toggle_submenu(Submenu::Chapters);
    }

    pub fn submenu_back(&mut self) {
        self.menu.back();
    }

    /// Click outside the controls and menu.
    pub fn outside_click(&mut self) {
        self.menu.close();
        self.badge.dismiss();
    }

    /// v1 closes its menu on selection; v2 keeps it open.
    pub fn select_speed(&mut self, rate: f64, now: Duration, paused: bool) -> Option<PlayerEffect> {
        if !is_supported_speed(rate) {
            return None;
        }
        self.rate = rate;
        match self.generation {
            Generation::V1 => self.menu.close(),
            Generation::V2 => self.flash(now, paused),
        }
        Some(PlayerEffect::SetRate(rate))
    }

    /// Switch quality. Position tracking follows the new source's key.
    pub fn select_quality(&mut self, index: usize, media: MediaSnapshot) -> Option<PlayerEffect> {
        let switch = self.quality.as_mut()?.select(index, media.time, !media.paused)?;
        self.identity.src = switch.src.clone();
        if let Some(tracker) = self.tracker.as_mut()
            && let Some(key) = self.identity.key(&self.key_prefix)
        {
            tracker.rebind(key, switch.src.clone());
        }
        Some(PlayerEffect::SwitchSource(switch))
    }

    pub fn select_subtitle(&mut self, choice: SubtitleChoice) -> PlayerEffect {
        self.subtitles.select(choice);
        PlayerEffect::SubtitleModes(self.subtitles.modes())
    }

    /// Jump to a chapter and close the menu.
    pub fn select_chapter(&mut self, index: usize, now: Duration, media: MediaSnapshot) -> Option<PlayerEffect> {
        let offset = self.chapters.get(index)?.offset_seconds;
        self.menu.close();
        self.flash(now, media.paused);
        Some(PlayerEffect::Seek(clamp_seek(offset, media.duration)))
    }

    // -- secure badge --

    /// Returns whether the native context menu must be suppressed.
    pub fn context_menu(&mut self, x: f64, y: f64) -> bool {
        self.badge.context_menu(x, y)
    }

    pub fn touch_start(&mut self, now: Duration, x: f64, y: f64) {
        self.badge.touch_start(now, x, y);
    }

    pub fn touch_cancel(&mut self) {
        self.badge.touch_cancel();
    }

    // -- media lifecycle --

    /// First metadata: returns a resume seek if a usable position is stored.
    pub fn on_metadata<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        duration: f64,
        now_ms: u64,
    ) -> Option<PlayerEffect> {
        self.tracker
            .as_mut()?
            .on_metadata(cache, duration, now_ms)
            .map(PlayerEffect::Seek)
    }

    pub fn on_play(&mut self, now: Duration, now_ms: u64) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_play(now_ms);
        }
        self.controls.show(now, None, false);
        self.controls
            .hide_after(now, Duration::from_millis(self.timing.idle_hide_ms), false);
    }

    pub fn on_pause<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        media: MediaSnapshot,
        now: Duration,
        now_ms: u64,
    ) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_pause(cache, media.playhead(), now_ms);
        }
        self.controls.show(now, None, true);
    }

    pub fn on_time_update<S: KeyValueStore>(&mut self, cache: &mut PositionCache<S>, media: MediaSnapshot, now_ms: u64) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_time_update(cache, media.playhead(), now_ms);
        }
    }

    pub fn on_ended<S: KeyValueStore>(&mut self, cache: &mut PositionCache<S>) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_ended(cache);
        }
    }

    pub fn on_unload<S: KeyValueStore>(&mut self, cache: &mut PositionCache<S>, media: MediaSnapshot, now_ms: u64) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.on_unload(cache, media.playhead(), now_ms);
        }
    }

    /// Advance every timer. Call from the host's interval.
    pub fn tick<S: KeyValueStore>(
        &mut self,
        cache: &mut PositionCache<S>,
        media: MediaSnapshot,
        now: Duration,
        now_ms: u64,
    ) -> TickOutcome {
        let saved = self
            .tracker
            .as_mut()
            .is_some_and(|t| t.on_tick(cache, media.playhead(), now_ms));
        TickOutcome {
            controls_hidden: self.controls.tick(now, media.paused),
            badge_opened: self.badge.tick(now),
            saved,
            expired_thumbnails: self.thumbnails.expire(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MenuState;
    use crate::position::MemoryStore;
    use pretty_assertions::assert_eq;

    const T0: u64 = 1_700_000_000_000;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session(generation: Generation) -> PlayerSession {
        PlayerSession::new(
            generation,
            &Options::default(),
            PositionIdentity::new("a.mp4"),
            false,
        )
    }

    fn playing(time: f64) -> MediaSnapshot {
        MediaSnapshot::new(time, 100.0, false)
    }

    fn cache() -> PositionCache<MemoryStore> {
        PositionCache::new(MemoryStore::new(), Options::default().cache)
    }

    // --- keyboard ---

    #[test]
    fn arrow_seek_is_clamped_and_flashes_controls() {
        let mut s = session(Generation::V2);
        let out = s.handle_key("ArrowRight", "ArrowRight", ms(0), playing(98.0)).unwrap();
        assert_eq!(out.effect, PlayerEffect::Seek(100.0));
        assert!(out.prevent_default);
        assert!(s.controls().is_visible());
        assert!(s.tick(&mut cache(), playing(98.0), ms(900), T0).controls_hidden);
    }

    #[test]
    fn fullscreen_key_keeps_default() {
        let mut s = session(Generation::V1);
        let out = s.handle_key("f", "KeyF", ms(0), playing(0.0)).unwrap();
        assert_eq!(out.effect, PlayerEffect::ToggleFullscreen);
        assert!(!out.prevent_default);
        assert_eq!(s.handle_key("x", "KeyX", ms(0), playing(0.0)), None);
    }

    #[test]
    fn volume_keys_report_new_state() {
        let mut s = session(Generation::V2).with_volume(Volume::new(0.05, false));
        let out = s.handle_key("ArrowDown", "ArrowDown", ms(0), playing(0.0)).unwrap();
        assert_eq!(out.effect, PlayerEffect::SetVolume { level: 0.0, muted: true });
        let out = s.handle_key("m", "KeyM", ms(0), playing(0.0)).unwrap();
        assert_eq!(out.effect, PlayerEffect::SetVolume { level: 0.6, muted: false });
    }

    // --- pointer ---

    #[test]
    fn volume_track_is_inverted() {
        let mut s = session(Generation::V2);
        assert_eq!(
            s.volume_pointer(25.0, 100.0),
            PlayerEffect::SetVolume { level: 0.75, muted: false }
        );
        assert_eq!(s.seek_pointer(50.0, 100.0, playing(0.0)), PlayerEffect::Seek(50.0));
    }

    #[test]
    fn skip_buttons() {
        let mut s = session(Generation::V2);
        assert_eq!(s.skip(false, ms(0), playing(3.0)), PlayerEffect::Seek(0.0));
        assert_eq!(s.skip(true, ms(0), playing(3.0)), PlayerEffect::Seek(13.0));
    }

    #[test]
    fn pointer_idle_hides_while_playing() {
        let mut s = session(Generation::V2);
        s.pointer_moved(ms(0), false);
        assert!(!s.tick(&mut cache(), playing(0.0), ms(1_999), T0).controls_hidden);
        assert!(s.tick(&mut cache(), playing(0.0), ms(2_000), T0).controls_hidden);
    }

    #[test]
    fn start_state_depends_on_autoplay() {
        let mut paused = session(Generation::V2);
        paused.start(ms(0), true);
        assert!(!paused.tick(&mut cache(), MediaSnapshot::new(0.0, 100.0, true), ms(5_000), T0).controls_hidden);

        let mut autoplay = session(Generation::V2);
        autoplay.start(ms(0), false);
        assert!(autoplay.tick(&mut cache(), playing(0.0), ms(1_200), T0).controls_hidden);
    }

    // --- menu ---

    #[test]
    fn speed_selection_per_generation() {
        let mut v1 = session(Generation::V1);
        v1.toggle_settings();
        assert_eq!(v1.select_speed(1.5, ms(0), true), Some(PlayerEffect::SetRate(1.5)));
        assert_eq!(v1.menu().state(), MenuState::Closed);

        let mut v2 = session(Generation::V2);
        v2.toggle_settings();
        v2.open_submenu(Submenu::Speed);
        assert_eq!(v2.select_speed(3.0, ms(0), true), None);
        v2.select_speed(0.5, ms(0), true);
        assert_eq!(v2.rate(), 0.5);
        assert_eq!(v2.menu().state(), MenuState::Open(Submenu::Speed));
    }

    #[test]
    fn chapter_selection_seeks_and_closes() {
        let mut s = session(Generation::V2).with_chapters(vec![
            ChapterMark::new(30.0, "Intro"),
            ChapterMark::new(150.0, "Late"),
        ]);
        s.toggle_settings();
        assert_eq!(s.select_chapter(0, ms(0), playing(0.0)), Some(PlayerEffect::Seek(30.0)));
        assert_eq!(s.menu().state(), MenuState::Closed);
        assert_eq!(s.select_chapter(1, ms(0), playing(0.0)), Some(PlayerEffect::Seek(100.0)));
        assert_eq!(s.select_chapter(2, ms(0), playing(0.0)), None);
        assert_eq!(s.chapter_markers(100.0).len(), 2);
        assert!(s.chapter_markers(f64::NAN).is_empty());
    }

    #[test]
    fn quality_switch_rebinds_tracking() {
        let sources = vec![
            QualitySource { src: "a.mp4".into(), label: "1080p".into(), res: "1080".into() },
            QualitySource { src: "b.mp4".into(), label: "720p".into(), res: "720".into() },
        ];
        let mut s = session(Generation::V2).with_quality(sources);
        let before = s.position_key().map(str::to_string);
        let effect = s.select_quality(1, playing(12.0)).unwrap();
        assert_eq!(
            effect,
            PlayerEffect::SwitchSource(QualitySwitch {
                src: "b.mp4".into(),
                resume_at: 12.0,
                resume_playing: true,
            })
        );
        assert_ne!(s.position_key().map(str::to_string), before);

        let mut c = cache();
        s.on_unload(&mut c, playing(12.0), T0);
        let key = s.position_key().unwrap().to_string();
        assert_eq!(c.load(&key, Some(100.0), "b.mp4", T0), Some(12.0));
    }

    #[test]
    fn v1_ignores_quality_and_subtitles() {
        let s = session(Generation::V1)
            .with_quality(vec![QualitySource { src: "a".into(), label: "x".into(), res: "1".into() }])
            .with_subtitles(vec![SubtitleTrack::new("en", "en", 0, true)]);
        assert!(s.quality().is_none());
        assert!(s.subtitles().tracks().is_empty());
    }

    #[test]
    fn subtitle_selection_returns_modes() {
        let mut s = session(Generation::V2).with_subtitles(vec![
            SubtitleTrack::new("English", "en", 0, true),
            SubtitleTrack::new("Deutsch", "de", 1, false),
        ]);
        assert_eq!(s.subtitles().showing(), Some(0));
        assert_eq!(
            s.select_subtitle(SubtitleChoice::Track(1)),
            PlayerEffect::SubtitleModes(vec![false, true])
        );
    }

    #[test]
    fn outside_click_closes_menu_and_badge() {
        let mut s = PlayerSession::new(Generation::V2, &Options::default(), PositionIdentity::new("a"), true);
        s.toggle_settings();
        assert!(s.context_menu(3.0, 4.0));
        s.outside_click();
        assert!(!s.menu().is_open());
        assert_eq!(s.badge().position(), None);
    }

    #[test]
    fn long_press_through_tick() {
        let mut s = PlayerSession::new(Generation::V2, &Options::default(), PositionIdentity::new("a"), true);
        s.touch_start(ms(0), 1.0, 2.0);
        assert!(s.tick(&mut cache(), playing(0.0), ms(500), T0).badge_opened);
        assert_eq!(s.badge().position(), Some((1.0, 2.0)));
    }

    // --- lifecycle ---

    #[test]
    fn lifecycle_saves_and_resumes() {
        let mut c = cache();
        let mut s = session(Generation::V2);
        assert_eq!(s.on_metadata(&mut c, 100.0, T0), None);
        s.on_play(ms(0), T0);
        let out = s.tick(&mut c, playing(40.0), ms(5_000), T0 + 5_000);
        assert!(out.saved);

        let mut reloaded = session(Generation::V2);
        assert_eq!(reloaded.on_metadata(&mut c, 100.0, T0 + 6_000), Some(PlayerEffect::Seek(40.0)));
        reloaded.on_ended(&mut c);
        assert!(c.store().is_empty());
    }

    #[test]
    fn pause_pins_controls() {
        let mut c = cache();
        let mut s = session(Generation::V2);
        s.on_play(ms(0), T0);
        s.on_pause(&mut c, MediaSnapshot::new(20.0, 100.0, true), ms(100), T0 + 100);
        assert!(!s.tick(&mut c, MediaSnapshot::new(20.0, 100.0, true), ms(10_000), T0 + 10_000).controls_hidden);
        assert!(s.controls().is_visible());
    }

    #[test]
    fn no_source_disables_tracking() {
        let mut c = cache();
        let mut s = PlayerSession::new(Generation::V1, &Options::default(), PositionIdentity::new(""), false);
        assert_eq!(s.position_key(), None);
        s.on_unload(&mut c, playing(30.0), T0);
        assert!(c.store().is_empty());
    }
}
