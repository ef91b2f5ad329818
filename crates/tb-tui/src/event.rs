//! Event types for the TUI event loop.
//!
//! # Event Sources
//!
//! - **Terminal**: key presses, pasted text, mouse events, window resizing
//! - **Session**: results of navigation operations running in the background
//! - **Timer**: periodic tick and render signals

use crossterm::event::{KeyEvent, MouseEvent};
use tb_session::{Command, NavigationState, SessionError, Step};

/// A navigation operation to run off the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Enter the top level, fetching the listing if needed.
    Enter,
    /// Apply a session command.
    Command(Command),
}

/// A request together with the state it was issued from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// State when the request was made.
    pub origin: NavigationState,
    /// What to run.
    pub request: Request,
}

/// The result of a [`Job`].
///
/// `origin` travels with the result so the app can drop it if the user has
/// moved on in the meantime.
#[derive(Debug)]
pub struct SessionOutcome {
    /// State the job was issued from.
    pub origin: NavigationState,
    /// What the session returned.
    pub result: Result<Step, SessionError>,
}

/// Events that can be processed by the TUI.
#[derive(Debug)]
#[non_exhaustive]
pub enum Event {
    /// A key press event from the terminal.
    Key(KeyEvent),

    /// Text pasted into the terminal.
    Paste(String),

    /// A mouse event from the terminal.
    Mouse(MouseEvent),

    /// Terminal window was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// A background navigation operation finished.
    Session(SessionOutcome),

    /// Periodic tick for the spinner and status expiry.
    Tick,

    /// Signal to render a new frame.
    Render,

    /// Focus gained by the terminal window.
    FocusGained,

    /// Focus lost by the terminal window.
    FocusLost,
}

impl Event {
    /// Returns `true` for the periodic [`Tick`](Self::Tick) and
    /// [`Render`](Self::Render) events.
    #[inline]
    #[must_use]
    pub const fn is_timer(&self) -> bool {
        matches!(self, Self::Tick | Self::Render)
    }
}
