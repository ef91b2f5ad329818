//! Remote listing client for the TorBox torrent API.
//!
//! Fetches the complete flat torrent listing, normalizes it into
//! [`TorrentRecord`](tb_core::TorrentRecord)s and keeps the last successful
//! result as an in-memory snapshot.
//!
//! # Overview
//!
//! - [`ListingClient`]: snapshot, staleness and de-duplicated `fetch_all`
//! - [`PageSource`]: one page request; implemented by [`TorBoxApi`] (HTTP)
//!   and [`FixtureSource`] (a saved response)
//! - [`ListingError`]: network, auth, rate-limit, schema and pagination
//!   failures
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tb_client::{FixtureSource, ListingClient};
//! use tb_core::ApiConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = FixtureSource::new(vec![json!({
//!     "id": 1509,
//!     "name": "One Piece",
//!     "files": [{"id": 0, "name": "One Piece/Episode 1/Video.mkv", "size": 700}],
//! })]);
//! let client = ListingClient::new(source, ApiConfig::default());
//!
//! let report = client.fetch_all().await.unwrap();
//! assert_eq!(report.records[0].name, "One Piece");
//! assert_eq!(client.snapshot().len(), 1);
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod api;
mod client;
mod error;
mod fixture;
mod normalize;
mod source;

pub use api::TorBoxApi;
pub use client::{FetchReport, ListingClient, is_stale_at};
pub use error::ListingError;
pub use fixture::FixtureSource;
pub use source::{ListingPage, PageRequest, PageSource};
