//! Hierarchical file trees recovered from flat torrent file paths.
//!
//! The listing API reports every file of a torrent as one delimited path
//! (`One Piece/Episode 1/Video.mkv`). This crate turns those paths into a
//! directory tree that the navigation session can walk one level at a time.
//!
//! # Overview
//!
//! - [`TreeBuilder`]: per-torrent cache; builds a tree on first request and
//!   hands back the same [`Arc`](std::sync::Arc) afterwards
//! - [`FileTree`]: an immutable tree for one torrent, with path resolution
//! - [`TreeNode`]: a directory or file node; [`TreeNode::list_children`]
//!   gives the deterministic display order
//! - [`TreeError`]: malformed paths reported by the remote source
//!
//! # Example
//!
//! ```
//! use tb_core::{RawFileEntry, TorrentId, TreeConfig};
//! use tb_tree::{NodeKind, TreeBuilder};
//!
//! let id = TorrentId::from("1");
//! let entries = vec![RawFileEntry {
//!     torrent_id: id.clone(),
//!     file_id: Some(0),
//!     path: "Show/Season 1/E01.mkv".to_owned(),
//!     size: 100,
//! }];
//!
//! let builder = TreeBuilder::new(TreeConfig::default());
//! let tree = builder.build_or_get(&id, &entries)?;
//! let top = tree.root().list_children();
//! assert_eq!(top[0].name(), "Season 1");
//! assert_eq!(top[0].kind(), NodeKind::Directory);
//! # Ok::<(), tb_tree::TreeError>(())
//! ```
//!
//! # Construction
//!
//! ```text
//! RawFileEntry.path ──split──► segments ──strip root?──► insert
//!                                                          │
//!            find-or-create Directory for all but the last ┤
//!                       create File for the last segment   ┘
//! ```
//!
//! A path that would turn an existing file into a directory (or the reverse),
//! or that names the same file twice, fails the whole torrent with
//! [`TreeError::MalformedPath`]. Nothing is cached for that torrent, so a
//! partially built tree is never observable.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod builder;
mod error;
mod node;
mod path;

pub use builder::{FileTree, TreeBuilder};
pub use error::{MalformedReason, TreeError};
pub use node::{NodeKind, TreeNode};
