//! User actions for the TUI.
//!
//! ```text
//! Key/Paste Event → App::handle_key → Action → App::update → Option<Job>
//! ```

/// User-initiated actions in the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Action {
    // =========================================================================
    // Cursor
    // =========================================================================
    /// Move the cursor to the next row.
    NextItem,

    /// Move the cursor to the previous row.
    PreviousItem,

    /// Move the cursor to the first row.
    FirstItem,

    /// Move the cursor to the last row.
    LastItem,

    /// Move the cursor down by one page.
    PageDown,

    /// Move the cursor up by one page.
    PageUp,

    // =========================================================================
    // Navigation
    // =========================================================================
    /// Activate the row under the cursor.
    Activate,

    /// Go up one level.
    Back,

    /// Re-fetch the listing.
    Refresh,

    // =========================================================================
    // Watch markers
    // =========================================================================
    /// Mark the file under the cursor as watched, or unmark it.
    ToggleWatched,

    /// Forget every watch marker.
    ClearWatched,

    // =========================================================================
    // Search
    // =========================================================================
    /// Start editing the search term.
    EnterSearchMode,

    /// Stop editing and keep the term.
    ConfirmSearch,

    /// Replace the search term.
    SetSearch(String),

    /// Clear the search term and stop editing.
    ClearSearch,

    // =========================================================================
    // UI State
    // =========================================================================
    /// Toggle the help panel.
    ToggleHelp,

    /// Hide the help panel.
    HideHelp,

    // =========================================================================
    // Application Control
    // =========================================================================
    /// Quit without choosing a file.
    Quit,

    /// Render the UI.
    Render,

    /// Tick (periodic update).
    Tick,

    /// No operation.
    #[default]
    None,
}

impl Action {
    /// Returns `true` if this action requires a re-render.
    #[must_use]
    pub const fn needs_render(&self) -> bool {
        !matches!(self, Self::None | Self::Tick)
    }

    /// Returns `true` if this action only moves the cursor.
    #[must_use]
    pub const fn is_cursor(&self) -> bool {
        matches!(
            self,
            Self::NextItem
                | Self::PreviousItem
                | Self::FirstItem
                | Self::LastItem
                | Self::PageDown
                | Self::PageUp
        )
    }

    /// Returns `true` if this action changes the search term.
    #[must_use]
    pub const fn modifies_search(&self) -> bool {
        matches!(self, Self::SetSearch(_) | Self::ClearSearch)
    }
}
