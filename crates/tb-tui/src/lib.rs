//! Terminal frontend for browsing TorBox torrents.
//!
//! Thin layer over [`tb_session`]: keys become [`Action`]s, actions that need
//! the network or a tree build become [`Job`]s run on background tasks, and
//! every frame renders the session's [`View`](tb_session::View) for the
//! current state.
//!
//! # Architecture
//!
//! ```text
//! crates/tb-tui/src/
//!   lib.rs           # run() and the event loop
//!   app.rs           # App, ListState, StatusMessage, perform()
//!   event.rs         # Event, Job, Request, SessionOutcome
//!   tui.rs           # Terminal wrapper with async event streaming
//!   action.rs        # User actions (from key bindings)
//!   ui.rs            # Layout
//!   theme.rs         # Colors and row icons
//!   text.rs          # Width-aware truncation
//!   error.rs         # TuiError
//!   components/
//!     header.rs      # Title, counter or breadcrumb
//!     browser.rs     # Row list with cursor
//!     status_bar.rs  # Mode, spinner, status message
//!     search_input.rs# Search prompt overlay
//!     help.rs        # Key binding overlay
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod action;
pub mod app;
pub mod components;
pub mod error;
pub mod event;
pub mod theme;
pub mod tui;
pub mod ui;

mod text;

use std::sync::Arc;

use tb_client::PageSource;
use tb_core::{FileChosen, TuiConfig};
use tb_session::{NavigationState, Navigator};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use action::Action;
pub use app::{App, AppMode, ListState, StatusMessage, perform};
pub use error::TuiError;
pub use event::{Event, Job, Request, SessionOutcome};
pub use theme::Theme;
pub use tui::Tui;

/// How a [`run`] ended.
#[derive(Debug)]
pub struct Exit {
    /// Where the user was; pass it to the next [`run`] to come back there.
    pub state: NavigationState,
    /// The chosen file, or `None` if the user quit without choosing.
    pub chosen: Option<FileChosen>,
}

/// Runs the browser from `state` until the user quits or picks a file.
///
/// The terminal is restored before returning, also on error.
pub async fn run<S: PageSource>(
    config: TuiConfig,
    navigator: Arc<Navigator<S>>,
    state: NavigationState,
) -> Result<Exit, TuiError> {
    // Small UI timing values; precision loss is irrelevant.
    #[allow(clippy::cast_precision_loss)]
    let tick_rate = 1000.0 / config.tick_rate_ms.max(1) as f64;
    let frame_rate = f64::from(config.frame_rate);

    let mut tui = Tui::new(tick_rate)?.with_frame_rate(frame_rate);
    let theme = Theme::from_scheme(config.color_scheme);
    let mut app = App::resume(Arc::clone(&navigator), state);

    tui.enter()?;

    info!(mode = %app.state().mode(), "Entering main event loop");
    if let Some(job) = app.start() {
        spawn_job(&navigator, job, tui.event_sender());
    }
    let result = run_event_loop(&mut tui, &mut app, &navigator, &theme).await;

    tui.exit()?;
    result?;
    let (state, chosen) = app.finish();
    Ok(Exit { state, chosen })
}

async fn run_event_loop<S: PageSource>(
    tui: &mut Tui,
    app: &mut App<S>,
    navigator: &Arc<Navigator<S>>,
    theme: &Theme,
) -> Result<(), TuiError> {
    tui.draw(|frame| ui::render(app, frame, theme))?;

    loop {
        let event = tui.next_event().await.ok_or(TuiError::ChannelClosed)?;

        let action = match event {
            Event::Key(key) => app.handle_key(key),
            Event::Paste(text) => app.handle_paste(&text),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Resize { .. } => Action::Render,
            Event::Session(outcome) => {
                app.apply_outcome(outcome);
                Action::Render
            }
            Event::Tick => Action::Tick,
            Event::Render => Action::Render,
            Event::FocusGained | Event::FocusLost => Action::None,
        };

        let redraw = action.needs_render();
        if let Some(job) = app.update(action) {
            spawn_job(navigator, job, tui.event_sender());
        }

        if app.should_quit {
            info!("Quit requested");
            break;
        }
        if redraw {
            tui.draw(|frame| ui::render(app, frame, theme))?;
        }
    }

    Ok(())
}

/// Runs `job` on a background task and posts the outcome back to the loop.
fn spawn_job<S: PageSource>(navigator: &Arc<Navigator<S>>, job: Job, events: mpsc::Sender<Event>) {
    let navigator = Arc::clone(navigator);
    debug!(request = ?job.request, "Spawning session job");
    tokio::spawn(async move {
        let outcome = perform(&navigator, job).await;
        if events.send(Event::Session(outcome)).await.is_err() {
            debug!("Event loop gone; dropping session result");
        }
    });
}
