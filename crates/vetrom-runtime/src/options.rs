#![forbid(unsafe_code)]

//! Host-tunable options.
//!
//! Every field has a default matching the shipped widgets, so hosts only
//! spell out what they change:
//!
//! ```json
//! { "cache": { "retention_days": 7 }, "player": { "seek_step_secs": 10 } }
//! ```
//!
//! Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Errors from parsing options JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Malformed JSON or a field of the wrong type.
    Json(String),
}

impl core::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "options JSON error: {msg}"),
        }
    }
}

impl std::error::Error for OptionsError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub cache: CacheConfig,
    pub player: PlayerTiming,
    pub gallery: GalleryOptions,
}

impl Options {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError::Json(e.to_string()))
    }
}

/// Position cache policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace for every stored key.
    pub key_prefix: String,
    pub retention_days: u32,
    /// Allowed drift between stored and current media duration.
    pub duration_tolerance_secs: f64,
}

impl CacheConfig {
    #[must_use]
    pub fn retention_ms(&self) -> u64 {
        u64::from(self.retention_days) * 24 * 60 * 60 * 1000
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "vetrom_".to_string(),
            retention_days: 30,
            duration_tolerance_secs: 1.0,
        }
    }
}

/// Player step sizes and timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTiming {
    /// Arrow keys and `j`/`l`.
    pub seek_step_secs: f64,
    /// On-screen skip buttons.
    pub skip_step_secs: f64,
    pub volume_step: f64,
    /// How long controls stay up after a keyboard action.
    pub controls_flash_ms: u64,
    /// Idle time before controls hide during playback.
    pub idle_hide_ms: u64,
    pub save_interval_ms: u64,
    pub time_update_throttle_ms: u64,
}

impl Default for PlayerTiming {
    fn default() -> Self {
        Self {
            seek_step_secs: 5.0,
            skip_step_secs: 10.0,
            volume_step: 0.05,
            controls_flash_ms: 900,
            idle_hide_ms: 2000,
            save_interval_ms: 5000,
            time_update_throttle_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryOptions {
    /// Ancestors inspected for an auto theme's background.
    pub max_ancestor_depth: usize,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            max_ancestor_depth: vetrom_style::theme::MAX_ANCESTOR_DEPTH,
        }
    }
}
