#![forbid(unsafe_code)]

//! Configuration grammars for Vetrom widgets.
//!
//! Widgets are configured entirely through markup: a code block's `id`, a
//! gallery's or player's class list, and chapter strings carried in `id`s or
//! `<meta>` tags. This crate turns those strings into typed configuration.
//! Parsing never fails; unrecognized input degrades to "not configured".
//!
//! # Grammars
//!
//! - **Grammar A** ([`parse_code_block_id`]): flat dash-separated tokens,
//!   reserved keywords plus color candidates in encounter order.
//! - **Grammar B** ([`parse_gallery_classes`], [`parse_media_classes`]):
//!   namespaced class names with a theme keyword and an optional color.

pub mod chapters;
pub mod grammar;
pub mod time;

pub use chapters::{ChapterMark, marker_percent, parse_checkpoints, parse_chapter_id};
pub use grammar::{
    CodeBlockConfig, CodeBlockKeyword, CopyMode, GalleryConfig, MediaConfig, PLAYER_V1_CLASS,
    Segment, classify_segment, is_player_v1_class, parse_code_block_id, parse_gallery_class,
    parse_gallery_classes, parse_media_class, parse_media_classes,
};
pub use time::{format_time, parse_time_token};
