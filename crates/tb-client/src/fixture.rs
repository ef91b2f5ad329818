//! A page source backed by a saved listing response.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::ListingError;
use crate::source::{ListingPage, PageRequest, PageSource};

/// Serves a fixed listing, paginated like the real API.
///
/// Used for offline browsing of a saved `mylist` response and for tests.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tb_client::FixtureSource;
///
/// let source = FixtureSource::from_body(json!({
///     "success": true,
///     "data": [{"id": 1, "name": "Show", "files": []}],
/// }))?;
/// assert_eq!(source.len(), 1);
/// # Ok::<(), tb_client::ListingError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    torrents: Vec<Value>,
    reported_total: Option<usize>,
}

impl FixtureSource {
    /// Creates a source serving `torrents`.
    #[must_use]
    pub fn new(torrents: Vec<Value>) -> Self {
        Self {
            torrents,
            reported_total: None,
        }
    }

    /// Creates a source from a listing response body.
    pub fn from_body(body: Value) -> Result<Self, ListingError> {
        let page = ListingPage::from_body(body)?;
        Ok(Self {
            torrents: page.torrents,
            reported_total: page.total,
        })
    }

    /// Reads a saved listing response from `path`.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let body: Value = serde_json::from_str(&text).map_err(io::Error::from)?;
        Self::from_body(body).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Makes every page report `total` as the listing size.
    #[must_use]
    pub const fn with_reported_total(mut self, total: usize) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Number of torrents served.
    #[must_use]
    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    /// Returns `true` if no torrents are served.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }
}

impl PageSource for FixtureSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<ListingPage, ListingError> {
        let start = request.offset.min(self.torrents.len());
        let end = start.saturating_add(request.limit).min(self.torrents.len());
        Ok(ListingPage {
            torrents: self.torrents[start..end].to_vec(),
            total: self.reported_total,
        })
    }
}
