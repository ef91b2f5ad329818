//! Tree nodes and their display ordering.

use std::cmp::Ordering;

use tb_core::{FxHashMap, SegmentCase};

use crate::path::segment_key;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A directory with children.
    Directory,
    /// A file with a size.
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Directory {
        /// Keyed by segment key (see [`segment_key`]).
        children: FxHashMap<String, TreeNode>,
    },
    File {
        size: u64,
        file_id: Option<u64>,
        full_path: String,
    },
}

/// A directory or file in a torrent's tree.
///
/// Directories store no size of their own; [`TreeNode::aggregate_size`]
/// sums the files underneath on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    data: NodeData,
}

impl TreeNode {
    pub(crate) fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: NodeData::Directory {
                children: FxHashMap::default(),
            },
        }
    }

    pub(crate) fn file(name: impl Into<String>, size: u64, file_id: Option<u64>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: NodeData::File {
                size,
                file_id,
                full_path: full_path.into(),
            },
        }
    }

    /// Returns the segment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Directory { .. } => NodeKind::Directory,
            NodeData::File { .. } => NodeKind::File,
        }
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.data, NodeData::Directory { .. })
    }

    /// File size in bytes; `None` for directories.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        match self.data {
            NodeData::File { size, .. } => Some(size),
            NodeData::Directory { .. } => None,
        }
    }

    /// Remote file id; `None` for directories and unnumbered files.
    #[must_use]
    pub const fn file_id(&self) -> Option<u64> {
        match self.data {
            NodeData::File { file_id, .. } => file_id,
            NodeData::Directory { .. } => None,
        }
    }

    /// The listing path this file came from; `None` for directories.
    #[must_use]
    pub fn full_path(&self) -> Option<&str> {
        match &self.data {
            NodeData::File { full_path, .. } => Some(full_path),
            NodeData::Directory { .. } => None,
        }
    }

    /// Number of direct children (zero for files).
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.data {
            NodeData::Directory { children } => children.len(),
            NodeData::File { .. } => 0,
        }
    }

    /// Looks up a direct child by segment name under `case`.
    #[must_use]
    pub fn child(&self, name: &str, case: SegmentCase) -> Option<&Self> {
        match &self.data {
            NodeData::Directory { children } => children.get(&segment_key(name, case)),
            NodeData::File { .. } => None,
        }
    }

    /// Returns the direct children in display order.
    ///
    /// Directories come before files; within each group names compare
    /// case-insensitively, with the exact name breaking ties so the order is
    /// total. Files have no children and yield an empty list.
    #[must_use]
    pub fn list_children(&self) -> Vec<&Self> {
        let NodeData::Directory { children } = &self.data else {
            return Vec::new();
        };
        let mut sorted: Vec<(String, &Self)> = children
            .values()
            .map(|child| (child.name.to_lowercase(), child))
            .collect();
        sorted.sort_by(|(a_key, a), (b_key, b)| display_order(a, a_key, b, b_key));
        sorted.into_iter().map(|(_, child)| child).collect()
    }

    /// Sum of all file sizes at or below this node.
    #[must_use]
    pub fn aggregate_size(&self) -> u64 {
        match &self.data {
            NodeData::File { size, .. } => *size,
            NodeData::Directory { children } => children.values().map(Self::aggregate_size).sum(),
        }
    }

    /// Number of files at or below this node.
    #[must_use]
    pub fn file_count(&self) -> usize {
        match &self.data {
            NodeData::File { .. } => 1,
            NodeData::Directory { children } => children.values().map(Self::file_count).sum(),
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut FxHashMap<String, Self>> {
        match &mut self.data {
            NodeData::Directory { children } => Some(children),
            NodeData::File { .. } => None,
        }
    }
}

fn display_order(a: &TreeNode, a_key: &str, b: &TreeNode, b_key: &str) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a_key.cmp(b_key).then_with(|| a.name.cmp(&b.name)),
    }
}
