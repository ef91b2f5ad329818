//! Core types, configuration, and errors for torbox-browse.
//!
//! This crate provides the foundational types shared by the listing client,
//! the path-tree builder, the navigation session and the terminal frontend:
//!
//! - Domain types ([`TorrentId`], [`TorrentRecord`], [`RawFileEntry`], [`FileChosen`])
//! - Configuration structures ([`Config`] and its sections)
//! - [`ConfigError`] for configuration loading and validation
//! - Type aliases for `FxHashMap`/`FxHashSet`
//! - Human-readable size formatting ([`format_size`])

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{ApiConfig, ColorScheme, Config, PlayerConfig, SegmentCase, TreeConfig, TuiConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_set_with_capacity};
pub use types::{FileChosen, RawFileEntry, TorrentId, TorrentRecord, format_size};
