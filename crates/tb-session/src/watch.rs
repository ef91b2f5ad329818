//! In-memory watch markers for files.

use std::fmt;

use tb_core::{FxHashMap, TorrentId};

/// How far the user got with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchStatus {
    /// Playback was started.
    InProgress,
    /// Marked as watched.
    Completed,
}

impl WatchStatus {
    /// The marker appended to a file row.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::InProgress => "●",
            Self::Completed => "✓",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => f.write_str("in progress"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Watch status per file, keyed by torrent id and the file's full path.
///
/// Lives as long as the session; nothing is written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchLog {
    files: FxHashMap<(TorrentId, String), WatchStatus>,
}

impl WatchLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of one file, if it has any.
    #[must_use]
    pub fn status(&self, torrent_id: &TorrentId, full_path: &str) -> Option<WatchStatus> {
        self.files
            .get(&(torrent_id.clone(), full_path.to_owned()))
            .copied()
    }

    /// Records `status` for a file. A completed file stays completed when
    /// playback starts again.
    pub fn mark(&mut self, torrent_id: &TorrentId, full_path: &str, status: WatchStatus) {
        let slot = self
            .files
            .entry((torrent_id.clone(), full_path.to_owned()))
            .or_insert(status);
        if status == WatchStatus::Completed {
            *slot = status;
        }
    }

    /// Flips a file between completed and unmarked. Returns the new status.
    pub fn toggle_completed(&mut self, torrent_id: &TorrentId, full_path: &str) -> Option<WatchStatus> {
        let key = (torrent_id.clone(), full_path.to_owned());
        if self.files.get(&key) == Some(&WatchStatus::Completed) {
            self.files.remove(&key);
            None
        } else {
            self.files.insert(key, WatchStatus::Completed);
            Some(WatchStatus::Completed)
        }
    }

    /// Forgets every marker.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Number of marked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
