//! Torrent records as normalized from the remote listing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque torrent identifier assigned by the remote API.
///
/// The API sends numeric ids, but nothing here relies on that; the id is kept
/// as its decimal string form so it can be echoed back verbatim.
///
/// # Examples
///
/// ```
/// use tb_core::TorrentId;
///
/// let id = TorrentId::from(8_010_485_u64);
/// assert_eq!(id.as_str(), "8010485");
/// assert_eq!(id, TorrentId::from("8010485"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorrentId(String);

impl TorrentId {
    /// Creates a torrent id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TorrentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for TorrentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for TorrentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One file of a torrent, exactly as the listing reported it.
///
/// `path` is `/`-delimited and normally starts with the torrent's own folder,
/// e.g. `One Piece/Episode 1/Video.mkv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileEntry {
    /// Owning torrent.
    pub torrent_id: TorrentId,

    /// Remote file id, needed to request a stream link.
    pub file_id: Option<u64>,

    /// Full delimited path.
    pub path: String,

    /// Size in bytes.
    pub size: u64,
}

/// A torrent in the listing snapshot.
///
/// Records are created by a listing fetch and replaced wholesale on refresh;
/// nothing patches them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    /// Remote identifier, unique within a snapshot.
    pub id: TorrentId,

    /// Display name.
    pub name: String,

    /// Number of files reported for this torrent. Informational only.
    pub file_count: usize,

    /// Raw file entries, shared with the tree builder without copying.
    pub files: Arc<[RawFileEntry]>,
}

impl TorrentRecord {
    /// Creates a record from its files; `file_count` is taken from `files`.
    #[must_use]
    pub fn new(id: TorrentId, name: impl Into<String>, files: Vec<RawFileEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            file_count: files.len(),
            files: files.into(),
        }
    }

    /// Returns `true` if the name contains `needle_lower`.
    ///
    /// `needle_lower` must already be lowercased; callers filtering a whole
    /// snapshot lowercase the term once instead of per record.
    #[must_use]
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.name.to_lowercase().contains(needle_lower)
    }

    /// Total size of all files in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
