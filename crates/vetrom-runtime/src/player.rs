#![forbid(unsafe_code)]

//! Player state machines shared by both player generations.
//!
//! Each piece of UI state that the event handlers used to mutate ad hoc is a
//! small machine here with named transitions. Time is host-driven: callers
//! pass a monotonic `now` (from `performance.now()`) and call `tick` from
//! their own timers.

use std::time::Duration;

use crate::options::PlayerTiming;

// ---------------------------------------------------------------------------
// Controls visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsState {
    /// Shown; hides at `hide_at` if set and playback is running.
    Visible { hide_at: Option<Duration> },
    Hidden,
}

/// Control bar visibility. Paused media always keeps its controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    state: ControlsState,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            state: ControlsState::Visible { hide_at: None },
        }
    }
}

impl Controls {
    #[must_use]
    pub fn state(&self) -> ControlsState {
        self.state
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.state, ControlsState::Visible { .. })
    }

    /// Show now. A timeout arms an auto-hide only while playing.
    pub fn show(&mut self, now: Duration, timeout: Option<Duration>, paused: bool) {
        let hide_at = timeout
            .filter(|t| !t.is_zero() && !paused)
            .map(|t| now + t);
        self.state = ControlsState::Visible { hide_at };
    }

    /// Hide immediately. Refused while paused.
    pub fn hide(&mut self, paused: bool) -> bool {
        if paused {
            return false;
        }
        self.state = ControlsState::Hidden;
        true
    }

    /// Hide after `delay`, keeping the controls up until then.
    pub fn hide_after(&mut self, now: Duration, delay: Duration, paused: bool) {
        if paused {
            return;
        }
        if delay.is_zero() {
            self.state = ControlsState::Hidden;
        } else if let ControlsState::Visible { .. } = self.state {
            self.state = ControlsState::Visible {
                hide_at: Some(now + delay),
            };
        }
    }

    /// Toggle on a tap or click of the video surface.
    pub fn toggle(&mut self, now: Duration, timing: &PlayerTiming, paused: bool) {
        if self.is_visible() {
            self.hide(paused);
        } else {
            self.show(now, Some(Duration::from_millis(timing.idle_hide_ms)), paused);
        }
    }

    /// Fire a due deadline. Returns whether the controls were hidden.
    pub fn tick(&mut self, now: Duration, paused: bool) -> bool {
        match self.state {
            ControlsState::Visible { hide_at: Some(at) } if now >= at => {
                if paused {
                    self.state = ControlsState::Visible { hide_at: None };
                    false
                } else {
                    self.state = ControlsState::Hidden;
                    true
                }
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Submenu {
    Speed,
    Quality,
    Subtitles,
    Chapters,
}

impl Submenu {
    /// Map a `data-section` value.
    #[must_use]
    pub fn from_section(section: &str) -> Option<Self> {
        match section {
            "speed" => Some(Self::Speed),
            "quality" => Some(Self::Quality),
            "subtitles" => Some(Self::Subtitles),
            "chapters" => Some(Self::Chapters),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Quality => "quality",
            Self::Subtitles => "subtitles",
            Self::Chapters => "chapters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Main,
    Open(Submenu),
}

/// Settings menu with one level of submenus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsMenu {
    state: MenuState,
}

impl SettingsMenu {
    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state != MenuState::Closed
    }

    /// Gear button. Closing also drops any open submenu.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            MenuState::Closed => MenuState::Main,
            _ => MenuState::Closed,
        };
    }

    pub fn open_submenu(&mut self, submenu: Submenu) -> bool {
        if self.state == MenuState::Closed {
            return false;
        }
        self.state = MenuState::Open(submenu);
        true
    }

    /// Open `submenu` directly from a dedicated button, or close it if it is
    /// already showing.
    pub fn toggle_submenu(&mut self, submenu: Submenu) {
        self.state = if self.state == MenuState::Open(submenu) {
            MenuState::Closed
        } else {
            MenuState::Open(submenu)
        };
    }

    /// Submenu back button.
    pub fn back(&mut self) {
        if let MenuState::Open(_) = self.state {
            self.state = MenuState::Main;
        }
    }

    /// Outside click or a selection that dismisses the menu.
    pub fn close(&mut self) {
        self.state = MenuState::Closed;
    }
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    ToggleFullscreen,
    /// Relative seek in seconds.
    SeekBy(f64),
    /// Relative volume change.
    VolumeBy(f64),
    ToggleMute,
}

impl PlayerCommand {
    /// Whether the browser's default action for the key must be suppressed.
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        !matches!(self, Self::ToggleFullscreen)
    }
}

/// Map a keydown (`KeyboardEvent.key` and `.code`) to a command.
#[must_use]
pub fn command_for_key(key: &str, code: &str, timing: &PlayerTiming) -> Option<PlayerCommand> {
    if code == "Space" {
        return Some(PlayerCommand::TogglePlay);
    }
    match key {
        "f" => Some(PlayerCommand::ToggleFullscreen),
        "ArrowRight" | "l" => Some(PlayerCommand::SeekBy(timing.seek_step_secs)),
        "ArrowLeft" | "j" => Some(PlayerCommand::SeekBy(-timing.seek_step_secs)),
        "ArrowUp" => Some(PlayerCommand::VolumeBy(timing.volume_step)),
        "ArrowDown" => Some(PlayerCommand::VolumeBy(-timing.volume_step)),
        "m" => Some(PlayerCommand::ToggleMute),
        _ => None,
    }
}

/// Clamp a seek target into `[0, duration]`.
///
/// While the duration is unknown only the lower bound applies.
#[must_use]
pub fn clamp_seek(target: f64, duration: f64) -> f64 {
    let target = target.max(0.0);
    if duration.is_finite() && duration > 0.0 {
        target.min(duration)
    } else {
        target
    }
}

/// Seek target for a skip button (`±skip_step_secs`).
#[must_use]
pub fn skip_target(current: f64, forward: bool, duration: f64, timing: &PlayerTiming) -> f64 {
    let step = if forward {
        timing.skip_step_secs
    } else {
        -timing.skip_step_secs
    };
    clamp_seek(current + step, duration)
}

/// Seek target for a pointer at `x` on a bar `width` pixels wide.
#[must_use]
pub fn pointer_seek(x: f64, width: f64, duration: f64) -> f64 {
    if !(width > 0.0) {
        return 0.0;
    }
    let pct = (x / width).clamp(0.0, 1.0);
    let duration = if duration.is_finite() { duration } else { 0.0 };
    duration * pct
}

/// Progress fill in percent; 0 while the duration is unknown.
#[must_use]
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        current / duration * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// Level restored when unmuting at zero volume.
pub const UNMUTE_LEVEL: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: f64,
    muted: bool,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

impl Volume {
    /// Non-finite levels (media not ready) start at full volume.
    #[must_use]
    pub fn new(level: f64, muted: bool) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self { level, muted }
    }

    #[must_use]
    pub fn level(&self) -> f64 {
        self.level
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Keyboard step. Raising above zero unmutes; reaching zero mutes.
    pub fn step(&mut self, delta: f64) {
        // Snap away float dust so repeated steps land exactly on 0 and 1.
        let level = ((self.level + delta) * 1e6).round() / 1e6;
        self.level = level.clamp(0.0, 1.0);
        if delta > 0.0 && self.level > 0.0 {
            self.muted = false;
        }
        if self.level == 0.0 {
            self.muted = true;
        }
    }

    /// Mute button or `m`.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        if !self.muted && self.level == 0.0 {
            self.level = UNMUTE_LEVEL;
        }
    }

    /// Vertical slider: `fraction` of the track from the bottom.
    pub fn set_from_slider(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() { fraction } else { 0.0 };
        self.level = (fraction.clamp(0.0, 1.0) * 100.0).round() / 100.0;
        if self.level > 0.0 {
            self.muted = false;
        }
    }

    /// Percentage shown next to the slider.
    #[must_use]
    pub fn display_percent(&self) -> u8 {
        if self.muted {
            0
        } else {
            (self.level * 100.0).round() as u8
        }
    }
}

// ---------------------------------------------------------------------------
// Speed, quality, subtitles
// ---------------------------------------------------------------------------

pub const PLAYBACK_SPEEDS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

#[must_use]
pub fn is_supported_speed(rate: f64) -> bool {
    PLAYBACK_SPEEDS.contains(&rate)
}

/// A `<source label res>` alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualitySource {
    pub src: String,
    pub label: String,
    pub res: String,
}

/// What the host must do to apply a quality change.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySwitch {
    pub src: String,
    /// Seek here once the new source's metadata arrives.
    pub resume_at: f64,
    pub resume_playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualitySelector {
    sources: Vec<QualitySource>,
    current: usize,
}

impl QualitySelector {
    /// The first source is active initially. `None` without sources.
    #[must_use]
    pub fn new(sources: Vec<QualitySource>) -> Option<Self> {
        (!sources.is_empty()).then_some(Self { sources, current: 0 })
    }

    #[must_use]
    pub fn sources(&self) -> &[QualitySource] {
        &self.sources
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Switch sources, preserving position and play state.
    pub fn select(&mut self, index: usize, current_time: f64, playing: bool) -> Option<QualitySwitch> {
        let source = self.sources.get(index)?;
        self.current = index;
        Some(QualitySwitch {
            src: source.src.clone(),
            resume_at: current_time,
            resume_playing: playing,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub label: String,
    pub default: bool,
}

impl SubtitleTrack {
    /// Label falls back to the language code, then `Track N` (1-based).
    #[must_use]
    pub fn new(label: &str, srclang: &str, index: usize, default: bool) -> Self {
        let label = [label, srclang]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or_else(|| format!("Track {}", index + 1), str::to_string);
        Self { label, default }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleChoice {
    Off,
    Track(usize),
}

impl SubtitleChoice {
    /// Parse a `data-subtitle` value (`off` or an index).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value == "off" {
            Some(Self::Off)
        } else {
            value.parse().ok().map(Self::Track)
        }
    }
}

/// At most one track is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleSelector {
    tracks: Vec<SubtitleTrack>,
    showing: Option<usize>,
}

impl SubtitleSelector {
    /// The first `default` track starts showing.
    #[must_use]
    pub fn new(tracks: Vec<SubtitleTrack>) -> Self {
        let showing = tracks.iter().position(|t| t.default);
        Self { tracks, showing }
    }

    #[must_use]
    pub fn tracks(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn showing(&self) -> Option<usize> {
        self.showing
    }

    /// Apply a choice; an unknown index hides everything.
    pub fn select(&mut self, choice: SubtitleChoice) {
        self.showing = match choice {
            SubtitleChoice::Track(i) if i < self.tracks.len() => Some(i),
            _ => None,
        };
    }

    /// `true` for the track in `showing` mode, `false` for `hidden`.
    #[must_use]
    pub fn modes(&self) -> Vec<bool> {
        (0..self.tracks.len()).map(|i| Some(i) == self.showing).collect()
    }
}

// ---------------------------------------------------------------------------
// Secure badge
// ---------------------------------------------------------------------------

/// Hold duration that counts as a long press.
pub const LONG_PRESS: Duration = Duration::from_millis(500);

/// Ownership badge shown instead of the browser context menu.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SecureBadge {
    enabled: bool,
    shown_at: Option<(f64, f64)>,
    press: Option<(Duration, f64, f64)>,
}

impl SecureBadge {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Where the badge is showing, in client coordinates.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.shown_at
    }

    /// Right click. Returns whether the native menu must be suppressed.
    pub fn context_menu(&mut self, x: f64, y: f64) -> bool {
        if self.enabled {
            self.shown_at = Some((x, y));
        }
        self.enabled
    }

    pub fn touch_start(&mut self, now: Duration, x: f64, y: f64) {
        if self.enabled {
            self.press = Some((now, x, y));
        }
    }

    /// Touch end or move cancels a pending long press.
    pub fn touch_cancel(&mut self) {
        self.press = None;
    }

    /// Returns whether a long press just opened the badge.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.press {
            Some((start, x, y)) if now.saturating_sub(start) >= LONG_PRESS => {
                self.press = None;
                self.shown_at = Some((x, y));
                true
            }
            _ => false,
        }
    }

    pub fn dismiss(&mut self) {
        self.shown_at = None;
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Height of the inner wrap for a given width and intrinsic video size.
///
/// Unknown intrinsic sizes use 16:9. The extra 10px leaves room for the
/// progress bar.
#[must_use]
pub fn inner_height(width: f64, video_width: f64, video_height: f64) -> f64 {
    let ratio = if video_width > 0.0 && video_height > 0.0 {
        video_height / video_width
    } else {
        9.0 / 16.0
    };
    (width * ratio).round().max(20.0) + 10.0
}
