#![forbid(unsafe_code)]

//! Playback position cache.
//!
//! Records live in a host key-value store (browser `localStorage` in
//! practice) as JSON:
//!
//! ```json
//! {"time":42.0,"duration":100.0,"timestamp":1700000000000,"src":"a.mp4"}
//! ```
//!
//! Keys are derived from stable identity signals by [`PositionIdentity`].
//! The cache is last-write-wins and imposes no rate limit; throttling is the
//! caller's job (see [`crate::tracker`]).
//!
//! Storage failures are reported as [`StorageError`] so callers can log them;
//! they never abort the widget.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logging::LOG_TARGET;
use crate::options::CacheConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of the underlying key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled or missing (private mode, sandboxed iframe).
    Unavailable,
    /// A write was rejected, usually because the quota is exhausted.
    Write { key: String, message: String },
    Read { key: String, message: String },
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Write { key, message } => write!(f, "write to '{key}' failed: {message}"),
            Self::Read { key, message } => write!(f, "read of '{key}' failed: {message}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// A stored value that is not a valid position record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    Json(String),
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "malformed position record: {msg}"),
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Minimal persistent string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Every key currently stored.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory store with an optional byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push keys plus values past `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota
            && self.used_bytes_without(key) + key.len() + value.len() > quota
        {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Last known playback state for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Offset in seconds.
    pub time: f64,
    /// Media duration in seconds; `null` when it was unknown at save time.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Save time, epoch milliseconds.
    pub timestamp: u64,
    /// Source URL; empty for records that predate source tracking.
    #[serde(default)]
    pub src: String,
}

impl PositionRecord {
    #[must_use]
    pub fn new(time: f64, duration: f64, timestamp: u64, src: impl Into<String>) -> Self {
        Self {
            time,
            duration: duration.is_finite().then_some(duration),
            timestamp,
            src: src.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(|e| RecordError::Json(e.to_string()))
    }

    #[must_use]
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// 32-bit rolling string hash (`h = h * 31 + unit`) over UTF-16 code units,
/// wrapping like browser integer arithmetic so keys match existing records.
#[must_use]
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

/// Stable identity signals of a tracked element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionIdentity {
    pub src: String,
    /// Instance number from the player class.
    pub instance: Option<String>,
    /// `(index, count)` among elements sharing this source.
    pub same_source: Option<(usize, usize)>,
    /// Element `id`, which also carries v2 chapter data.
    pub element_id: Option<String>,
    /// `data-instance` of the enclosing player container.
    pub container: Option<String>,
}

impl PositionIdentity {
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_instance(mut self, instance: Option<String>) -> Self {
        self.instance = instance;
        self
    }

    #[must_use]
    pub fn with_same_source(mut self, index: usize, count: usize) -> Self {
        self.same_source = Some((index, count));
        self
    }

    #[must_use]
    pub fn with_element_id(mut self, id: Option<String>) -> Self {
        self.element_id = id;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: Option<String>) -> Self {
        self.container = container;
        self
    }

    /// `<prefix><|srchash|>[_inst<n>][_idx<i>][_ch<|idhash|>][_p<container>]`.
    ///
    /// `_idx` only appears when more than one element shares the source.
    /// Returns `None` without a source, since nothing stable identifies it.
    #[must_use]
    pub fn key(&self, prefix: &str) -> Option<String> {
        if self.src.is_empty() {
            return None;
        }
        let mut key = format!("{prefix}{}", string_hash(&self.src).unsigned_abs());
        if let Some(instance) = self.instance.as_deref().filter(|s| !s.is_empty()) {
            key.push_str("_inst");
            key.push_str(instance);
        }
        if let Some((index, count)) = self.same_source
            && count > 1
        {
            key.push_str(&format!("_idx{index}"));
        }
        if let Some(id) = self.element_id.as_deref().filter(|s| !s.is_empty()) {
            key.push_str(&format!("_ch{}", string_hash(id).unsigned_abs()));
        }
        if let Some(container) = self.container.as_deref().filter(|s| !s.is_empty()) {
            key.push_str("_p");
            key.push_str(container);
        }
        Some(key)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Why a lookup produced no resume position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissReason {
    Absent,
    Corrupt,
    Expired,
    SourceMismatch,
    DurationMismatch,
}

impl MissReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Corrupt => "corrupt",
            Self::Expired => "expired",
            Self::SourceMismatch => "source-mismatch",
            Self::DurationMismatch => "duration-mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(PositionRecord),
    Miss(MissReason),
}

/// Outcome of [`PositionCache::purge_expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeReport {
    /// Namespaced keys inspected.
    pub scanned: usize,
    pub expired: usize,
    pub corrupt: usize,
}

/// TTL-bounded position records over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PositionCache<S> {
    store: S,
    config: CacheConfig,
}

impl<S: KeyValueStore> PositionCache<S> {
    #[must_use]
    pub fn new(store: S, config: CacheConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Key for an identity under this cache's namespace.
    #[must_use]
    pub fn key_for(&self, identity: &PositionIdentity) -> Option<String> {
        identity.key(&self.config.key_prefix)
    }

    /// Overwrite the record under `key`.
    pub fn save(
        &mut self,
        key: &str,
        time: f64,
        duration: f64,
        src: &str,
        now_ms: u64,
    ) -> Result<(), StorageError> {
        let record = PositionRecord::new(time, duration, now_ms, src);
        let json = record.to_json().map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &json)
    }

    /// Validate the record under `key` against the current element.
    ///
    /// Any miss other than [`MissReason::Absent`] deletes the stale record.
    /// An unknown current duration (`None`, zero, NaN) skips the duration
    /// check, as does a record saved without one. A record without a source
    /// matches any source.
    pub fn lookup(
        &mut self,
        key: &str,
        duration: Option<f64>,
        src: &str,
        now_ms: u64,
    ) -> Result<Lookup, StorageError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Lookup::Miss(MissReason::Absent));
        };
        let reason = match PositionRecord::from_json(&raw) {
            Err(_) => MissReason::Corrupt,
            Ok(record) if record.age_ms(now_ms) > self.config.retention_ms() => {
                MissReason::Expired
            }
            Ok(record) if !record.src.is_empty() && record.src != src => {
                MissReason::SourceMismatch
            }
            Ok(record) if self.duration_mismatch(&record, duration) => {
                MissReason::DurationMismatch
            }
            Ok(record) => return Ok(Lookup::Hit(record)),
        };
        self.store.remove(key)?;
        Ok(Lookup::Miss(reason))
    }

    fn duration_mismatch(&self, record: &PositionRecord, current: Option<f64>) -> bool {
        let current = current.filter(|d| d.is_finite() && *d > 0.0);
        match (current, record.duration) {
            (Some(current), Some(stored)) => {
                (current - stored).abs() > self.config.duration_tolerance_secs
            }
            _ => false,
        }
    }

    /// Stored offset for `key`, or `None` on any miss or storage failure.
    pub fn load(&mut self, key: &str, duration: Option<f64>, src: &str, now_ms: u64) -> Option<f64> {
        match self.lookup(key, duration, src, now_ms) {
            Ok(Lookup::Hit(record)) => Some(record.time),
            Ok(Lookup::Miss(reason)) => {
                tracing::debug!(target: LOG_TARGET, key, reason = reason.as_str(), "position cache miss");
                None
            }
            Err(error) => {
                tracing::warn!(target: LOG_TARGET, key, %error, "failed to load position");
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key)
    }

    /// Delete every namespaced record that is expired or unreadable.
    pub fn purge_expired(&mut self, now_ms: u64) -> Result<PurgeReport, StorageError> {
        let mut report = PurgeReport::default();
        let retention = self.config.retention_ms();
        let keys: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.config.key_prefix))
            .collect();
        for key in keys {
            report.scanned += 1;
            let stale = match self.store.get(&key)?.as_deref().map(PositionRecord::from_json) {
                // Removed by someone else since `keys()`.
                None => continue,
                Some(Err(_)) => {
                    report.corrupt += 1;
                    true
                }
                Some(Ok(record)) if record.age_ms(now_ms) > retention => {
                    report.expired += 1;
                    true
                }
                Some(Ok(_)) => false,
            };
            if stale {
                self.store.remove(&key)?;
            }
        }
        tracing::debug!(
            target: LOG_TARGET,
            scanned = report.scanned,
            expired = report.expired,
            corrupt = report.corrupt,
            "position cache purged"
        );
        Ok(report)
    }
}
