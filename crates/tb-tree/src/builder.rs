//! Per-torrent tree construction and caching.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::Mutex;
use tb_core::{FxHashMap, RawFileEntry, SegmentCase, TorrentId, TreeConfig};
use tracing::{debug, warn};

use crate::error::{MalformedReason, TreeError};
use crate::node::TreeNode;
use crate::path::{segment_key, split_segments};

/// An immutable file tree for one torrent.
#[derive(Debug, PartialEq, Eq)]
pub struct FileTree {
    torrent_id: TorrentId,
    root: TreeNode,
    case: SegmentCase,
}

impl FileTree {
    /// Builds a tree from `entries`.
    ///
    /// Every entry is inserted into a fresh root; the first malformed path
    /// aborts the build and nothing is returned.
    pub fn build(
        torrent_id: &TorrentId,
        entries: &[RawFileEntry],
        config: TreeConfig,
    ) -> Result<Self, TreeError> {
        let mut root = TreeNode::directory("");
        for entry in entries {
            insert_entry(&mut root, torrent_id, entry, config)
                .map_err(|reason| TreeError::malformed(torrent_id, entry.path.clone(), reason))?;
        }
        Ok(Self {
            torrent_id: torrent_id.clone(),
            root,
            case: config.case,
        })
    }

    /// Torrent this tree belongs to.
    #[must_use]
    pub const fn torrent_id(&self) -> &TorrentId {
        &self.torrent_id
    }

    /// The tree root (an unnamed directory).
    #[must_use]
    pub const fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Case policy the tree was built with.
    #[must_use]
    pub const fn case(&self) -> SegmentCase {
        self.case
    }

    /// Walks `path` from the root, returning the node it ends at.
    ///
    /// An empty path resolves to the root. Returns `None` if any segment is
    /// missing or a non-final segment is a file.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.child(segment.as_ref(), self.case))
    }

    /// Resolves `path` and returns it only if it is a directory.
    #[must_use]
    pub fn resolve_dir<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeNode> {
        self.resolve(path).filter(|node| node.is_dir())
    }
}

fn insert_entry(
    root: &mut TreeNode,
    torrent_id: &TorrentId,
    entry: &RawFileEntry,
    config: TreeConfig,
) -> Result<(), MalformedReason> {
    if &entry.torrent_id != torrent_id {
        return Err(MalformedReason::ForeignEntry {
            owner: entry.torrent_id.clone(),
        });
    }

    let segments = split_segments(&entry.path, config.strip_root_segment)?;
    let Some((file_name, dirs)) = segments.split_last() else {
        return Err(MalformedReason::Empty);
    };

    let Some(mut children) = root.children_mut() else {
        return Err(MalformedReason::Empty);
    };
    for dir in dirs {
        let node = children
            .entry(segment_key(dir, config.case))
            .or_insert_with(|| TreeNode::directory(*dir));
        children = node.children_mut().ok_or_else(|| MalformedReason::KindConflict {
            segment: (*dir).to_owned(),
        })?;
    }

    match children.entry(segment_key(file_name, config.case)) {
        Entry::Occupied(existing) if existing.get().is_dir() => Err(MalformedReason::KindConflict {
            segment: (*file_name).to_owned(),
        }),
        Entry::Occupied(_) => Err(MalformedReason::DuplicateFile),
        Entry::Vacant(slot) => {
            slot.insert(TreeNode::file(
                *file_name,
                entry.size,
                entry.file_id,
                entry.path.clone(),
            ));
            Ok(())
        }
    }
}

/// A build slot; locked for the duration of a build so concurrent requests
/// for the same torrent wait for the first instead of building again.
type Slot = Arc<Mutex<Option<Arc<FileTree>>>>;

/// Builds file trees on demand and caches them per torrent.
///
/// Trees are kept for the lifetime of the builder. [`TreeBuilder::drop_tree`]
/// releases one explicitly.
///
/// # Thread Safety
///
/// `TreeBuilder` is `Send + Sync`. Builds for different torrents run in
/// parallel; builds for the same torrent happen at most once at a time.
#[derive(Debug)]
pub struct TreeBuilder {
    config: TreeConfig,
    slots: Mutex<FxHashMap<TorrentId, Slot>>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns the configuration trees are built with.
    #[must_use]
    pub const fn config(&self) -> TreeConfig {
        self.config
    }

    /// Returns the cached tree for `torrent_id`, building it from `entries`
    /// if there is none yet.
    ///
    /// Once a tree exists, `entries` is ignored and the same `Arc` is returned.
    /// A failed build caches nothing; the next call tries again.
    pub fn build_or_get(
        &self,
        torrent_id: &TorrentId,
        entries: &[RawFileEntry],
    ) -> Result<Arc<FileTree>, TreeError> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(torrent_id.clone()).or_default())
        };

        let mut guard = slot.lock();
        if let Some(tree) = guard.as_ref() {
            return Ok(Arc::clone(tree));
        }

        match FileTree::build(torrent_id, entries, self.config) {
            Ok(tree) => {
                debug!(
                    torrent_id = %torrent_id,
                    files = entries.len(),
                    top_level = tree.root().child_count(),
                    "Built file tree"
                );
                let tree = Arc::new(tree);
                *guard = Some(Arc::clone(&tree));
                Ok(tree)
            }
            Err(e) => {
                warn!(torrent_id = %torrent_id, error = %e, "Skipping torrent with malformed paths");
                Err(e)
            }
        }
    }

    /// Returns the cached tree for `torrent_id` without building.
    ///
    /// Also returns `None` while a build for that torrent is in progress.
    #[must_use]
    pub fn get(&self, torrent_id: &TorrentId) -> Option<Arc<FileTree>> {
        let slot = self.slots.lock().get(torrent_id).map(Arc::clone)?;
        let guard = slot.try_lock()?;
        guard.as_ref().map(Arc::clone)
    }

    /// Removes the cached tree for `torrent_id`.
    ///
    /// Returns `true` if a slot existed. Holders of the tree's `Arc` keep
    /// their copy.
    pub fn drop_tree(&self, torrent_id: &TorrentId) -> bool {
        let removed = self.slots.lock().remove(torrent_id).is_some();
        if removed {
            debug!(torrent_id = %torrent_id, "Dropped file tree");
        }
        removed
    }

    /// Number of torrents with a cached tree.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().values().map(Arc::clone).collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    /// Returns `true` if no tree is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}
