//! Error types for the tb-tree crate.

use std::fmt;

use tb_core::TorrentId;

/// Why a file path could not be placed in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The path has no segments.
    Empty,

    /// The path ends with a separator, so it names a directory, not a file.
    TrailingSeparator,

    /// A segment is used both as a file and as a directory.
    KindConflict {
        /// The conflicting segment.
        segment: String,
    },

    /// The same file path appears more than once.
    DuplicateFile,

    /// The entry belongs to a different torrent than the tree being built.
    ForeignEntry {
        /// The torrent the entry claims to belong to.
        owner: TorrentId,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("path is empty"),
            Self::TrailingSeparator => f.write_str("path ends with a separator"),
            Self::KindConflict { segment } => {
                write!(f, "'{segment}' is both a file and a directory")
            }
            Self::DuplicateFile => f.write_str("file listed more than once"),
            Self::ForeignEntry { owner } => write!(f, "entry belongs to torrent {owner}"),
        }
    }
}

/// Errors that can occur while building a file tree.
///
/// These are data-integrity faults in what the remote source reported. They
/// carry the offending torrent and path so the caller can surface them and
/// skip that torrent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A file path is malformed or contradicts another path.
    #[error("malformed path '{path}' in torrent {torrent_id}: {reason}")]
    MalformedPath {
        /// Torrent being built.
        torrent_id: TorrentId,
        /// The offending path, as reported.
        path: String,
        /// What is wrong with it.
        reason: MalformedReason,
    },
}

impl TreeError {
    /// Creates a new [`TreeError::MalformedPath`] error.
    #[must_use]
    pub fn malformed(torrent_id: &TorrentId, path: impl Into<String>, reason: MalformedReason) -> Self {
        Self::MalformedPath {
            torrent_id: torrent_id.clone(),
            path: path.into(),
            reason,
        }
    }

    /// Returns the torrent whose tree failed to build.
    #[must_use]
    pub const fn torrent_id(&self) -> &TorrentId {
        match self {
            Self::MalformedPath { torrent_id, .. } => torrent_id,
        }
    }

    /// Returns the offending path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MalformedPath { path, .. } => path,
        }
    }
}
