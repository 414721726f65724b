#![forbid(unsafe_code)]

//! Browser-independent runtime for Vetrom widgets.
//!
//! Every widget is modelled as plain state plus named transitions:
//! - [`position`]: playback position persistence over a [`KeyValueStore`]
//! - [`tracker`]: the media-event lifecycle that drives the cache
//! - [`gallery`]: carousels and the page-wide lightbox
//! - [`player`]: controls, menus, volume, quality, subtitles
//! - [`session`]: one player instance, events in and effects out
//! - [`code_block`]: styled code blocks with copy buttons
//!
//! Hosts own the clock and the DOM. They feed events and timestamps in and
//! apply the returned styles and commands; nothing here blocks or spawns.

pub mod code_block;
pub mod gallery;
pub mod logging;
pub mod media;
pub mod options;
pub mod player;
pub mod position;
pub mod session;
pub mod thumbnail;
pub mod tracker;

pub use code_block::{CodeBlockPlan, CopyButton, plan_code_block};
pub use gallery::{Gallery, GalleryRegistry, GallerySummary, LightboxKey, LightboxState};
pub use media::MediaItem;
pub use options::{CacheConfig, GalleryOptions, Options, OptionsError, PlayerTiming};
pub use player::{
    Controls, ControlsState, MenuState, PlayerCommand, QualitySelector, QualitySource,
    QualitySwitch, SecureBadge, SettingsMenu, Submenu, SubtitleChoice, SubtitleSelector,
    SubtitleTrack, Volume, command_for_key,
};
pub use position::{
    KeyValueStore, Lookup, MemoryStore, MissReason, PositionCache, PositionIdentity,
    PositionRecord, PurgeReport, RecordError, StorageError,
};
pub use session::{Generation, KeyOutcome, MediaSnapshot, PlayerEffect, PlayerSession, TickOutcome};
pub use thumbnail::{ThumbnailCache, ThumbnailLookup};
pub use tracker::{PlaybackTracker, Playhead};
