//! The navigation state value.

use std::fmt;
use std::sync::Arc;

use tb_core::{TorrentId, TorrentRecord};
use tb_tree::{FileTree, TreeNode};

/// Which list the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The search-filtered torrent listing.
    TopLevel,
    /// A directory inside one torrent's tree.
    BrowsingTree,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel => f.write_str("top level"),
            Self::BrowsingTree => f.write_str("browsing tree"),
        }
    }
}

/// The torrent being browsed and its tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTorrent {
    /// Torrent id.
    pub id: TorrentId,
    /// Display name at the time it was selected.
    pub name: String,
    tree: Arc<FileTree>,
}

impl CurrentTorrent {
    /// Returns the torrent's tree.
    #[must_use]
    pub fn tree(&self) -> &Arc<FileTree> {
        &self.tree
    }
}

/// The listing snapshot a state was rendered from.
///
/// Two states agree on it only when they hold the very same snapshot, so
/// comparing states stays cheap however large the listing is.
#[derive(Debug, Clone, Default)]
struct Listing(Arc<[TorrentRecord]>);

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Listing {}

/// Where the user is.
///
/// A plain value: every session operation takes one and returns the next.
/// The fields are private so that only those operations can produce one,
/// which keeps `current_path` a valid walk of directories in the current
/// tree.
///
/// A state also pins the listing snapshot it was rendered from. Row indices
/// at the top level are resolved against that snapshot, never against one
/// fetched after the user saw the rows.
///
/// # Examples
///
/// ```
/// use tb_session::{Mode, NavigationState};
///
/// let state = NavigationState::new();
/// assert_eq!(state.mode(), Mode::TopLevel);
/// assert!(state.current_path().is_empty());
/// assert_eq!(state.search_term(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current: Option<CurrentTorrent>,
    current_path: Vec<String>,
    search_term: String,
    listing: Listing,
}

impl NavigationState {
    /// The initial state: top level, no search term.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.current.is_some() {
            Mode::BrowsingTree
        } else {
            Mode::TopLevel
        }
    }

    /// Returns the torrent being browsed, if any.
    #[must_use]
    pub const fn current_torrent(&self) -> Option<&CurrentTorrent> {
        self.current.as_ref()
    }

    /// Segments from the tree root to the current directory.
    #[must_use]
    pub fn current_path(&self) -> &[String] {
        &self.current_path
    }

    /// The top-level search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The listing snapshot this state shows at the top level.
    #[must_use]
    pub fn listing(&self) -> &Arc<[TorrentRecord]> {
        &self.listing.0
    }

    /// Returns `true` if both states show the same directory of the same
    /// torrent, or are both at the top level. The search term and the
    /// pinned listing are not compared.
    #[must_use]
    pub fn same_location(&self, other: &Self) -> bool {
        self.current.as_ref().map(|c| &c.id) == other.current.as_ref().map(|c| &c.id)
            && self.current_path == other.current_path
    }

    /// This state's location with `latest`'s search term and listing.
    ///
    /// Used to apply a result computed from an older state without undoing
    /// what changed since.
    #[must_use]
    pub fn rebased_on(&self, latest: &Self) -> Self {
        Self {
            current: self.current.clone(),
            current_path: self.current_path.clone(),
            search_term: latest.search_term.clone(),
            listing: latest.listing.clone(),
        }
    }

    /// This state, showing `other`'s listing.
    #[must_use]
    pub fn with_listing_from(&self, other: &Self) -> Self {
        Self {
            listing: other.listing.clone(),
            ..self.clone()
        }
    }

    /// Returns the current directory node, if browsing.
    #[must_use]
    pub fn current_dir(&self) -> Option<&TreeNode> {
        self.current
            .as_ref()
            .and_then(|current| current.tree.resolve_dir(&self.current_path))
    }

    pub(crate) fn with_listing(&self, listing: Arc<[TorrentRecord]>) -> Self {
        Self {
            listing: Listing(listing),
            ..self.clone()
        }
    }

    pub(crate) fn with_search_term(&self, term: &str) -> Self {
        Self {
            search_term: term.to_owned(),
            ..self.clone()
        }
    }

    /// Enters a torrent at its root, keeping the search term for the way back.
    pub(crate) fn entering(&self, id: TorrentId, name: String, tree: Arc<FileTree>) -> Self {
        Self {
            current: Some(CurrentTorrent { id, name, tree }),
            current_path: Vec::new(),
            search_term: self.search_term.clone(),
            listing: self.listing.clone(),
        }
    }

    /// Descends into `segment`; the caller has checked it is a directory.
    pub(crate) fn descending(&self, segment: &str) -> Self {
        let mut next = self.clone();
        next.current_path.push(segment.to_owned());
        next
    }

    /// One level up, or back to the top level from the tree root.
    pub(crate) fn ascending(&self) -> Self {
        let mut next = self.clone();
        if next.current_path.pop().is_none() {
            next.current = None;
        }
        next
    }
}
