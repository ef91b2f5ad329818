//! Events emitted to the playback boundary.

use serde::{Deserialize, Serialize};

use super::torrent::TorrentId;

/// A file the user picked for playback.
///
/// The navigation session emits this and keeps its state unchanged; turning
/// it into a stream URL and launching a player happens outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChosen {
    /// Torrent the file belongs to.
    pub torrent_id: TorrentId,

    /// Remote file id, when the listing provided one.
    pub file_id: Option<u64>,

    /// Full path as reported by the listing.
    pub full_path: String,

    /// Size in bytes.
    pub size: u64,
}

impl FileChosen {
    /// Returns the last path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.full_path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(&self.full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let chosen = FileChosen {
            torrent_id: TorrentId::from("7"),
            file_id: Some(5),
            full_path: "One Piece/Episode 1/Video.mkv".to_owned(),
            size: 1,
        };
        assert_eq!(chosen.file_name(), "Video.mkv");
    }

    #[test]
    fn test_file_name_without_separator() {
        let chosen = FileChosen {
            torrent_id: TorrentId::from("7"),
            file_id: None,
            full_path: "movie.mkv".to_owned(),
            size: 1,
        };
        assert_eq!(chosen.file_name(), "movie.mkv");
    }
}
