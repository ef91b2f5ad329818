//! Configuration structures for torbox-browse.
//!
//! This module provides configuration types for every component:
//!
//! - [`ApiConfig`] - Remote API endpoint, paging and staleness policy
//! - [`TreeConfig`] - How flat file paths are turned into a tree
//! - [`TuiConfig`] - Terminal UI settings (tick rate, colors)
//! - [`PlayerConfig`] - External media player invocation
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial JSON file only overrides what it names.

use std::time::Duration;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Color scheme for the TUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorScheme {
    /// Automatically detect based on terminal settings.
    #[default]
    Auto,
    /// Light color scheme (dark text on light background).
    Light,
    /// Dark color scheme (light text on dark background).
    Dark,
}

/// Case policy for matching path segments while building a tree.
///
/// With [`SegmentCase::Insensitive`], `Extras` and `extras` collapse into a
/// single directory whose display name is the first spelling seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentCase {
    /// Segments differing only by case are distinct.
    #[default]
    Sensitive,
    /// Segments are compared after lowercasing.
    Insensitive,
}

/// Configuration for the remote listing API.
///
/// # Examples
///
/// ```
/// use tb_core::ApiConfig;
///
/// let config = ApiConfig::default();
/// assert_eq!(config.page_size, 1000);
/// assert!(config.bypass_cache);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,

    /// Number of torrents requested per page.
    pub page_size: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Ask the server to skip its own listing cache.
    pub bypass_cache: bool,

    /// Upper bound on pages fetched by a single listing call.
    pub max_pages: usize,

    /// Age in seconds after which the local snapshot counts as stale.
    pub max_age_secs: u64,
}

impl ApiConfig {
    /// Returns the per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the snapshot staleness threshold as a [`Duration`].
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.torbox.app/v1/api".to_owned(),
            page_size: 1000,
            timeout_secs: 30,
            bypass_cache: true,
            max_pages: 50,
            max_age_secs: 300,
        }
    }
}

/// Configuration for the path-tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Drop the first path segment (the torrent's own folder) before building.
    ///
    /// Single-segment paths are kept as-is.
    pub strip_root_segment: bool,

    /// Case policy for segment matching.
    pub case: SegmentCase,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            strip_root_segment: true,
            case: SegmentCase::Sensitive,
        }
    }
}

/// Configuration for the terminal user interface.
///
/// # Examples
///
/// ```
/// use tb_core::{TuiConfig, ColorScheme};
///
/// let config = TuiConfig::default();
/// assert_eq!(config.tick_rate_ms, 250);
/// assert_eq!(config.color_scheme, ColorScheme::Auto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds (spinner animation, status expiry).
    pub tick_rate_ms: u64,

    /// Target frames per second.
    pub frame_rate: u32,

    /// Color scheme for the interface.
    pub color_scheme: ColorScheme,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            frame_rate: 30,
            color_scheme: ColorScheme::Auto,
        }
    }
}

/// Configuration for the external media player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable (looked up on `PATH` when not absolute).
    pub command: String,

    /// Arguments placed before the stream URL.
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_owned(),
            args: vec![
                "--save-position-on-quit".to_owned(),
                "--resume-playback".to_owned(),
                "--demuxer-max-bytes=1000M".to_owned(),
                "--demuxer-readahead-secs=60".to_owned(),
                "--cache=yes".to_owned(),
                "--stream-buffer-size=16M".to_owned(),
            ],
        }
    }
}

/// Root configuration for torbox-browse.
///
/// # Examples
///
/// ```
/// use tb_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API configuration.
    pub api: ApiConfig,

    /// Path-tree configuration.
    pub tree: TreeConfig,

    /// Terminal UI configuration.
    pub tui: TuiConfig,

    /// Media player configuration.
    pub player: PlayerConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that would make the client unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::invalid_option("api.base_url", "must not be empty"));
        }
        if self.api.page_size == 0 {
            return Err(ConfigError::invalid_option(
                "api.page_size",
                "must be greater than zero",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::invalid_option(
                "api.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.api.max_pages == 0 {
            return Err(ConfigError::invalid_option(
                "api.max_pages",
                "must be greater than zero",
            ));
        }
        if self.tui.tick_rate_ms == 0 || self.tui.frame_rate == 0 {
            return Err(ConfigError::invalid_option(
                "tui",
                "tick rate and frame rate must be greater than zero",
            ));
        }
        if self.player.command.trim().is_empty() {
            return Err(ConfigError::invalid_option("player.command", "must not be empty"));
        }
        Ok(())
    }
}
