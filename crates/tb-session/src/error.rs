//! Error types for the tb-session crate.

use tb_client::ListingError;
use tb_tree::TreeError;

use crate::state::Mode;

/// Errors returned by navigation operations.
///
/// Whatever the error, the state passed in is still the current state; no
/// operation half-applies a transition.
///
/// # Error Recovery Strategy
///
/// - **Caller bugs** ([`SessionError::SelectionOutOfRange`],
///   [`SessionError::InvalidMode`], [`SessionError::NotAFile`]): ignore and
///   re-render
/// - **Listing** ([`SessionError::Listing`]): show it; the previous snapshot
///   stays in place. Fatal only for [`ListingError::Auth`]
/// - **Tree** ([`SessionError::Tree`]): show it; that torrent cannot be opened
/// - **Join** ([`SessionError::Join`]): a background build panicked or was
///   cancelled
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The selected row does not exist.
    #[error("selection {index} is out of range ({len} selectable rows)")]
    SelectionOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of selectable rows.
        len: usize,
    },

    /// The row is a directory, where a file was expected.
    #[error("'{name}' is a directory")]
    NotAFile {
        /// Directory name.
        name: String,
    },

    /// The operation is not available in the current mode.
    #[error("{operation} is not available while in {mode}")]
    InvalidMode {
        /// Operation name.
        operation: &'static str,
        /// Mode the session was in.
        mode: Mode,
    },

    /// The current path no longer resolves to a directory.
    #[error("path '/{path}' does not name a directory in this torrent")]
    PathNotFound {
        /// The path, `/`-joined.
        path: String,
    },

    /// Fetching the listing failed.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// Building the selected torrent's tree failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The background tree build did not complete.
    #[error("tree build task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SessionError {
    /// Creates a new [`SessionError::InvalidMode`] error.
    #[inline]
    pub const fn invalid_mode(operation: &'static str, mode: Mode) -> Self {
        Self::InvalidMode { operation, mode }
    }

    /// Returns `true` if the error is a caller bug that can be ignored.
    #[must_use]
    pub const fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::SelectionOutOfRange { .. } | Self::InvalidMode { .. } | Self::NotAFile { .. }
        )
    }

    /// Returns `true` if the session cannot continue with its credentials.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Listing(e) if e.is_auth())
    }
}

#[cfg(test)]
mod tests {
    use tb_core::TorrentId;
    use tb_tree::MalformedReason;

    use super::*;

    #[test]
    fn test_out_of_range_is_ignorable() {
        let err = SessionError::SelectionOutOfRange { index: 3, len: 2 };
        assert!(err.is_ignorable());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "selection 3 is out of range (2 selectable rows)");
    }

    #[test]
    fn test_invalid_mode_display() {
        let err = SessionError::invalid_mode("refresh", Mode::BrowsingTree);
        assert!(err.is_ignorable());
        assert_eq!(err.to_string(), "refresh is not available while in browsing tree");
    }

    #[test]
    fn test_auth_is_fatal() {
        let err = SessionError::from(ListingError::Auth {
            status: 403,
            message: String::new(),
        });
        assert!(err.is_fatal());
        assert!(!err.is_ignorable());

        let err = SessionError::from(ListingError::rejected(Some("BAD_TOKEN"), None));
        assert!(err.is_fatal());

        let err = SessionError::from(ListingError::network("reset"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_tree_error_is_transparent() {
        let tree = TreeError::malformed(&TorrentId::from("1"), "A/B/C", MalformedReason::DuplicateFile);
        let err = SessionError::from(tree.clone());
        assert_eq!(err.to_string(), tree.to_string());
    }
}
