//! Commands consumed from, and results handed back to, the terminal boundary.

use std::sync::Arc;

use tb_client::ListingError;
use tb_core::FileChosen;

use crate::state::NavigationState;

/// A user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Activate the row at this index.
    Select(usize),
    /// Go up one level, or back to the listing from a tree root.
    Back,
    /// Replace the search term.
    SearchInput(String),
    /// Re-fetch the listing.
    Refresh,
}

/// Something the boundary should act on, besides re-rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A file was picked for playback.
    FileChosen(FileChosen),
    /// A new listing snapshot is in place.
    ListingRefreshed {
        /// Torrents in the new snapshot.
        torrents: usize,
        /// Torrents skipped because of schema errors.
        skipped: Arc<[ListingError]>,
    },
}

/// The result of one operation: the next state and an optional event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// State after the operation.
    pub state: NavigationState,
    /// Event for the boundary, if any.
    pub event: Option<SessionEvent>,
}

impl Step {
    /// A step with no event.
    #[must_use]
    pub const fn to(state: NavigationState) -> Self {
        Self { state, event: None }
    }

    /// A step with an event.
    #[must_use]
    pub const fn with_event(state: NavigationState, event: SessionEvent) -> Self {
        Self {
            state,
            event: Some(event),
        }
    }

    /// Returns the chosen file, if this step chose one.
    #[must_use]
    pub fn chosen(&self) -> Option<&FileChosen> {
        match &self.event {
            Some(SessionEvent::FileChosen(chosen)) => Some(chosen),
            _ => None,
        }
    }
}
