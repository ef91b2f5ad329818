//! Navigation session over the torrent listing and per-torrent file trees.
//!
//! The session is a small state machine. [`NavigationState`] is a value;
//! [`Navigator`] turns a state and a [`Command`] into the next state plus an
//! optional [`SessionEvent`], and renders any state into a [`View`] of
//! labeled rows. Nothing here touches the terminal, so navigation can be
//! tested without one. A [`WatchLog`] keeps per-file watch markers for the
//! length of the session.
//!
//! # Data Flow
//!
//! ```text
//! ListingClient ──snapshot──► TopLevel (search-filtered)
//!                                │ select
//!                                ▼
//!                 TreeBuilder::build_or_get (blocking pool)
//!                                │
//!                                ▼
//!                     BrowsingTree ──select(file)──► FileChosen
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod command;
mod error;
mod filter;
mod navigator;
mod state;
mod view;
mod watch;

pub use command::{Command, SessionEvent, Step};
pub use error::SessionError;
pub use filter::filter_records;
pub use navigator::Navigator;
pub use state::{CurrentTorrent, Mode, NavigationState};
pub use view::{Indicator, Row, RowKind, View};
pub use watch::{WatchLog, WatchStatus};
