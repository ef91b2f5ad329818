//! Domain types for torbox-browse.
//!
//! # Module Organization
//!
//! - [`torrent`] - Torrent records and their raw file entries
//! - [`event`] - Events handed to the playback boundary
//! - [`size`] - Human-readable byte sizes
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use tb_core::{FileChosen, RawFileEntry, TorrentId, TorrentRecord};
//! ```

pub mod event;
pub mod size;
pub mod torrent;

pub use event::FileChosen;
pub use size::format_size;
pub use torrent::{RawFileEntry, TorrentId, TorrentRecord};
