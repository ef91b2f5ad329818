//! What the terminal boundary renders.

use std::fmt;

use tb_core::{TorrentRecord, format_size};
use tb_tree::TreeNode;

use crate::watch::WatchStatus;

/// What a row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A torrent in the top-level list.
    Torrent,
    /// A directory in a tree.
    Directory,
    /// A file in a tree.
    File,
    /// An informational line (empty list, no matches).
    Placeholder,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Text to display.
    pub label: String,
    /// Whether `Select(index)` accepts this row.
    pub selectable: bool,
    /// What the row stands for, for styling.
    pub kind: RowKind,
    /// Watch marker of a file row.
    pub watch: Option<WatchStatus>,
}

impl Row {
    fn torrent(record: &TorrentRecord) -> Self {
        let noun = if record.file_count == 1 { "file" } else { "files" };
        Self {
            label: format!("{} ({} {noun})", record.name, record.file_count),
            selectable: true,
            kind: RowKind::Torrent,
            watch: None,
        }
    }

    fn node(node: &TreeNode, watch: Option<WatchStatus>) -> Self {
        match node.size() {
            Some(size) => {
                let mut label = format!("{} ({})", node.name(), format_size(size));
                if let Some(status) = watch {
                    label.push(' ');
                    label.push_str(status.marker());
                }
                Self {
                    label,
                    selectable: true,
                    kind: RowKind::File,
                    watch,
                }
            }
            None => Self {
                label: format!("{}/", node.name()),
                selectable: true,
                kind: RowKind::Directory,
                watch: None,
            },
        }
    }

    fn placeholder(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selectable: false,
            kind: RowKind::Placeholder,
            watch: None,
        }
    }
}

/// The mode indicator shown above the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    /// The torrent listing.
    TopLevel {
        /// Active search term.
        search_term: String,
        /// Torrents matching it.
        matches: usize,
        /// Torrents in the snapshot.
        total: usize,
    },
    /// Inside a torrent.
    BrowsingTree {
        /// Torrent display name.
        torrent_name: String,
        /// Path from the tree root.
        breadcrumb: Vec<String>,
    },
}

impl Indicator {
    /// The breadcrumb as `/a/b`, or `/` at the root and top level.
    #[must_use]
    pub fn breadcrumb_text(&self) -> String {
        match self {
            Self::BrowsingTree { breadcrumb, .. } if !breadcrumb.is_empty() => {
                format!("/{}", breadcrumb.join("/"))
            }
            _ => "/".to_owned(),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel {
                search_term,
                matches,
                total,
            } if search_term.is_empty() => write!(f, "Torrents ({matches}/{total})"),
            Self::TopLevel {
                search_term,
                matches,
                total,
            } => write!(f, "Torrents matching '{search_term}' ({matches}/{total})"),
            Self::BrowsingTree { torrent_name, .. } => {
                write!(f, "{torrent_name} {}", self.breadcrumb_text())
            }
        }
    }
}

/// A complete render: indicator plus rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Mode indicator and breadcrumb.
    pub indicator: Indicator,
    /// Rows in display order; selectable rows come first and their positions
    /// are the indices `Select` accepts.
    pub rows: Vec<Row>,
}

impl View {
    pub(crate) fn top_level(search_term: &str, matches: &[&TorrentRecord], total: usize) -> Self {
        let mut rows: Vec<Row> = matches.iter().copied().map(Row::torrent).collect();
        if rows.is_empty() {
            rows.push(Row::placeholder(if total == 0 {
                "No torrents in this account".to_owned()
            } else {
                format!("No torrents match '{search_term}'")
            }));
        }
        Self {
            indicator: Indicator::TopLevel {
                search_term: search_term.to_owned(),
                matches: matches.len(),
                total,
            },
            rows,
        }
    }

    pub(crate) fn directory(
        torrent_name: &str,
        breadcrumb: &[String],
        dir: &TreeNode,
        watch: impl Fn(&TreeNode) -> Option<WatchStatus>,
    ) -> Self {
        let mut rows: Vec<Row> = dir
            .list_children()
            .into_iter()
            .map(|node| Row::node(node, watch(node)))
            .collect();
        if rows.is_empty() {
            rows.push(Row::placeholder("(empty)"));
        }
        Self {
            indicator: Indicator::BrowsingTree {
                torrent_name: torrent_name.to_owned(),
                breadcrumb: breadcrumb.to_vec(),
            },
            rows,
        }
    }

    /// Number of selectable rows.
    #[must_use]
    pub fn selectable_len(&self) -> usize {
        self.rows.iter().filter(|row| row.selectable).count()
    }

    /// Labels only, one per line.
    #[must_use]
    pub fn labels(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.label.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_text() {
        let root = Indicator::BrowsingTree {
            torrent_name: "Show".to_owned(),
            breadcrumb: Vec::new(),
        };
        assert_eq!(root.breadcrumb_text(), "/");
        assert_eq!(root.to_string(), "Show /");

        let nested = Indicator::BrowsingTree {
            torrent_name: "Show".to_owned(),
            breadcrumb: vec!["Season 1".to_owned(), "Extras".to_owned()],
        };
        assert_eq!(nested.to_string(), "Show /Season 1/Extras");
    }

    #[test]
    fn test_top_level_indicator() {
        let all = Indicator::TopLevel {
            search_term: String::new(),
            matches: 4,
            total: 4,
        };
        assert_eq!(all.to_string(), "Torrents (4/4)");

        let some = Indicator::TopLevel {
            search_term: "one".to_owned(),
            matches: 1,
            total: 4,
        };
        assert_eq!(some.to_string(), "Torrents matching 'one' (1/4)");
    }

    #[test]
    fn test_empty_top_level_has_placeholder() {
        let view = View::top_level("zzz", &[], 3);
        assert_eq!(view.selectable_len(), 0);
        assert_eq!(view.labels(), "No torrents match 'zzz'");

        let view = View::top_level("", &[], 0);
        assert_eq!(view.labels(), "No torrents in this account");
    }
}
