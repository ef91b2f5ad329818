//! Terminal wrapper with async event streaming.
//!
//! [`Tui`] owns the Ratatui terminal and a background task that merges
//! crossterm input with tick and render timers into one channel. Background
//! navigation jobs push their outcomes into the same channel through
//! [`Tui::event_sender`], so the event loop has a single place to wait on.
//!
//! ```text
//!  EventStream ──┐
//!  tick timer  ──┼──► mpsc::Sender<Event> ──► Tui::next_event() ──► event loop
//!  render timer──┘            ▲
//!                             └── session jobs (event_sender)
//! ```

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::error::TuiError;
use crate::event::Event;

/// Room for a burst of key repeats plus a few job outcomes.
const EVENT_BUFFER: usize = 128;

/// Frames per second used until [`Tui::with_frame_rate`] says otherwise.
const DEFAULT_FRAME_RATE: f64 = 30.0;

/// How often the input task emits [`Event::Tick`] and [`Event::Render`].
#[derive(Debug, Clone, Copy)]
struct Cadence {
    tick: Duration,
    render: Duration,
}

impl Cadence {
    fn new(ticks_per_sec: f64, frames_per_sec: f64) -> Self {
        Self {
            tick: Duration::from_secs_f64(ticks_per_sec.recip()),
            render: Duration::from_secs_f64(frames_per_sec.max(1.0).recip()),
        }
    }
}

/// The terminal plus the task feeding it events.
///
/// Raw mode and the alternate screen are active between [`enter`](Self::enter)
/// and [`exit`](Self::exit); dropping a `Tui` also restores the terminal.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: mpsc::Receiver<Event>,
    sender: mpsc::Sender<Event>,
    input_task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    ticks_per_sec: f64,
    frames_per_sec: f64,
    active: bool,
}

impl Tui {
    /// Creates a TUI emitting `tick_rate` ticks per second.
    ///
    /// Nothing changes on screen until [`enter`](Self::enter).
    pub fn new(tick_rate: f64) -> Result<Self, TuiError> {
        if !(tick_rate.is_finite() && tick_rate > 0.0) {
            return Err(TuiError::config(format!("invalid tick rate: {tick_rate}")));
        }
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let (sender, events) = mpsc::channel(EVENT_BUFFER);

        debug!(tick_rate, "Created TUI");
        Ok(Self {
            terminal,
            events,
            sender,
            input_task: None,
            shutdown: CancellationToken::new(),
            ticks_per_sec: tick_rate,
            frames_per_sec: DEFAULT_FRAME_RATE,
            active: false,
        })
    }

    /// Sets the render rate in frames per second.
    #[must_use]
    pub const fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frames_per_sec = fps;
        self
    }

    /// A sender for posting events into the loop from other tasks.
    #[must_use]
    pub fn event_sender(&self) -> mpsc::Sender<Event> {
        self.sender.clone()
    }

    /// Switches to raw mode and the alternate screen and starts reading input.
    pub fn enter(&mut self) -> Result<(), TuiError> {
        debug!("Entering terminal");
        enable_raw_mode()?;
        self.active = true;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;

        let cadence = Cadence::new(self.ticks_per_sec, self.frames_per_sec);
        self.input_task = Some(tokio::spawn(pump_events(
            cadence,
            self.sender.clone(),
            self.shutdown.clone(),
        )));
        Ok(())
    }

    /// Stops the input task and restores the terminal. Safe to call more
    /// than once.
    pub fn exit(&mut self) -> Result<(), TuiError> {
        self.shutdown.cancel();
        if let Some(task) = self.input_task.take() {
            task.abort();
        }
        if !std::mem::replace(&mut self.active, false) {
            return Ok(());
        }

        debug!("Restoring terminal");
        self.terminal.show_cursor()?;
        execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        disable_raw_mode()?;
        Ok(())
    }

    /// Draws one frame.
    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<(), TuiError> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits for the next event. `None` once every sender is gone.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!(error = %e, "Failed to restore terminal on drop");
        }
    }
}

fn interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Forwards input and timer events to `sender` until `shutdown` fires or the
/// receiver is dropped.
async fn pump_events(cadence: Cadence, sender: mpsc::Sender<Event>, shutdown: CancellationToken) {
    debug!(
        tick_ms = cadence.tick.as_millis(),
        render_ms = cadence.render.as_millis(),
        "Input task started"
    );
    let mut input = EventStream::new();
    let mut ticks = interval(cadence.tick);
    let mut frames = interval(cadence.render);

    loop {
        let event = tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            event = next_input(&mut input) => match event {
                Some(event) => event,
                None => continue,
            },
        };

        if !event.is_timer() {
            trace!(?event, "Input event");
        }
        if sender.send(event).await.is_err() {
            debug!("Event receiver dropped");
            break;
        }
    }
    debug!("Input task stopped");
}

/// Reads the next terminal event worth forwarding.
async fn next_input(input: &mut EventStream) -> Option<Event> {
    match input.next().await {
        Some(Ok(event)) => translate(event),
        Some(Err(e)) => {
            warn!(error = %e, "Error reading terminal event");
            None
        }
        // Stdin closed. Park here so the timers keep the loop alive.
        None => std::future::pending().await,
    }
}

/// Maps a crossterm event onto ours. Key releases and repeats reported as
/// separate kinds are dropped so each press acts once.
fn translate(event: crossterm::event::Event) -> Option<Event> {
    use crossterm::event::Event as Input;

    Some(match event {
        Input::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
        Input::Key(_) => return None,
        Input::Paste(text) => Event::Paste(text),
        Input::Mouse(mouse) => Event::Mouse(mouse),
        Input::Resize(width, height) => Event::Resize { width, height },
        Input::FocusGained => Event::FocusGained,
        Input::FocusLost => Event::FocusLost,
    })
}
