//! The listing snapshot and the fetch that replaces it.
//!
//! # Architecture
//!
//! ```text
//!   fetch_all() ──► in-flight? ──yes──► await the shared fetch
//!                        │
//!                        no
//!                        ▼
//!              spawn fetch task ──► page loop ──► normalize ──► swap snapshot
//!                                                                clear marker
//! ```
//!
//! The fetch runs on its own task, which swaps the snapshot and clears the
//! in-flight marker. Callers only await its result, so the outcome is
//! recorded even if every caller stops waiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tb_core::{ApiConfig, TorrentRecord, fx_hash_set_with_capacity};
use tracing::{debug, info, warn};

use crate::error::ListingError;
use crate::normalize::normalize_torrent;
use crate::source::{ListingPage, PageRequest, PageSource};

/// Outcome of a successful [`ListingClient::fetch_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// The new snapshot, in server order.
    pub records: Arc<[TorrentRecord]>,
    /// Torrents left out because of schema errors.
    pub skipped: Arc<[ListingError]>,
}

type SharedFetch = Shared<BoxFuture<'static, Result<FetchReport, ListingError>>>;

#[derive(Default)]
struct State {
    snapshot: Arc<[TorrentRecord]>,
    fetched_at: Option<Instant>,
    in_flight: Option<SharedFetch>,
}

struct Inner<S> {
    source: S,
    config: ApiConfig,
    state: Mutex<State>,
}

/// Client for the complete torrent listing.
///
/// Holds the last successful snapshot. Fetching is pull-based: nothing is
/// polled in the background.
///
/// # Concurrency
///
/// At most one fetch runs at a time. A call to [`ListingClient::fetch_all`]
/// while another is pending attaches to the pending one and receives the same
/// result. Cloning the client shares the snapshot and the marker.
pub struct ListingClient<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for ListingClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for ListingClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ListingClient")
            .field("records", &state.snapshot.len())
            .field("fetched_at", &state.fetched_at)
            .field("in_flight", &state.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: PageSource> ListingClient<S> {
    /// Creates a client with an empty snapshot.
    pub fn new(source: S, config: ApiConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Returns the page source.
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Returns the API configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Fetches the complete listing and replaces the snapshot.
    ///
    /// On failure the previous snapshot is kept. Torrents with schema errors
    /// are skipped and listed in [`FetchReport::skipped`].
    pub async fn fetch_all(&self) -> Result<FetchReport, ListingError> {
        let fetch = {
            let mut state = self.inner.state.lock();
            if let Some(pending) = &state.in_flight {
                debug!("Attaching to in-flight listing fetch");
                pending.clone()
            } else {
                let task = tokio::spawn(Arc::clone(&self.inner).run_fetch());
                let inner = Arc::clone(&self.inner);
                let fetch = async move {
                    task.await.unwrap_or_else(|e| {
                        inner.state.lock().in_flight = None;
                        Err(ListingError::network(format!("listing fetch task failed: {e}")))
                    })
                }
                .boxed()
                .shared();
                state.in_flight = Some(fetch.clone());
                fetch
            }
        };
        fetch.await
    }

    /// Returns the last successful snapshot (empty before the first fetch).
    pub fn snapshot(&self) -> Arc<[TorrentRecord]> {
        Arc::clone(&self.inner.state.lock().snapshot)
    }

    /// Returns when the snapshot was last replaced.
    pub fn fetched_at(&self) -> Option<Instant> {
        self.inner.state.lock().fetched_at
    }

    /// Returns `true` once a fetch has succeeded.
    pub fn has_fetched(&self) -> bool {
        self.fetched_at().is_some()
    }

    /// Returns `true` if a fetch is pending.
    pub fn is_fetching(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }

    /// Returns `true` if the snapshot is at least `max_age` old, or was
    /// never fetched.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        is_stale_at(self.fetched_at(), Instant::now(), max_age)
    }
}

impl<S: PageSource> Inner<S> {
    async fn run_fetch(self: Arc<Self>) -> Result<FetchReport, ListingError> {
        let started = Instant::now();
        let result = self.fetch_pages().await.map(|torrents| normalize_listing(&torrents));

        let mut state = self.state.lock();
        state.in_flight = None;
        match &result {
            Ok(report) => {
                state.snapshot = Arc::clone(&report.records);
                state.fetched_at = Some(Instant::now());
                info!(
                    torrents = report.records.len(),
                    skipped = report.skipped.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Listing fetched"
                );
            }
            Err(e) => {
                warn!(error = %e, kept = state.snapshot.len(), "Listing fetch failed");
            }
        }
        result
    }

    /// Requests pages until one comes back short.
    async fn fetch_pages(&self) -> Result<Vec<serde_json::Value>, ListingError> {
        let limit = self.config.page_size.max(1);
        let mut torrents = Vec::new();
        let mut reported = None;

        for page_no in 0..self.config.max_pages {
            let request = PageRequest {
                limit,
                offset: torrents.len(),
                bypass_cache: self.config.bypass_cache,
            };
            let page = self.fetch_page(request).await?;
            let received = page.torrents.len();
            debug!(page = page_no, offset = request.offset, received, "Received listing page");

            reported = page.total.or(reported);
            torrents.extend(page.torrents);

            if received < limit {
                return match reported {
                    Some(reported) if reported > torrents.len() => Err(ListingError::IncompleteListing {
                        reported,
                        delivered: torrents.len(),
                    }),
                    _ => Ok(torrents),
                };
            }
        }

        Err(ListingError::PageLimit {
            pages: self.config.max_pages,
        })
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<ListingPage, ListingError> {
        let timeout = self.config.timeout();
        tokio::time::timeout(timeout, self.source.fetch_page(request))
            .await
            .map_err(|_| ListingError::network(format!("request timed out after {}s", timeout.as_secs())))?
    }
}

/// Normalizes raw torrents, skipping schema errors and duplicate ids.
fn normalize_listing(torrents: &[serde_json::Value]) -> FetchReport {
    let mut seen = fx_hash_set_with_capacity(torrents.len());
    let mut records = Vec::with_capacity(torrents.len());
    let mut skipped = Vec::new();

    for (index, raw) in torrents.iter().enumerate() {
        match normalize_torrent(index, raw) {
            Ok(record) if !seen.insert(record.id.clone()) => {
                warn!(torrent_id = %record.id, "Duplicate torrent id in listing, keeping the first");
            }
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed torrent");
                skipped.push(e);
            }
        }
    }

    FetchReport {
        records: records.into(),
        skipped: skipped.into(),
    }
}

/// Staleness as a pure function of the last fetch time.
#[must_use]
pub fn is_stale_at(fetched_at: Option<Instant>, now: Instant, max_age: Duration) -> bool {
    fetched_at.is_none_or(|at| now.saturating_duration_since(at) >= max_age)
}
