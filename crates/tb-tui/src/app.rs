//! Application state for the terminal frontend.
//!
//! [`App`] wraps a [`NavigationState`] and the [`View`] rendered from it,
//! plus what only the terminal cares about: the cursor, the search prompt,
//! the status line and the spinner.
//!
//! Operations that may touch the network or build a tree do not run here.
//! [`App::update`] hands them back as a [`Job`]; the event loop runs the job
//! with [`perform`] on a background task and feeds the [`SessionOutcome`]
//! back through [`App::apply_outcome`]. Failures are always shown. A
//! navigation result is dropped once the user has left the directory it was
//! issued from, so a slow build cannot yank them out of wherever they went
//! in the meantime.
//!
//! ```text
//! App
//!  ├── navigator: Arc<Navigator<S>>
//!  ├── state: NavigationState       # where the user is
//!  ├── view: View                   # rows rendered from `state`
//!  ├── mode: AppMode                # normal / searching / help
//!  ├── list_state: ListState        # cursor and scroll
//!  ├── cursor_stack                 # cursor per enclosing level
//!  ├── status: Option<StatusMessage>
//!  └── pending                      # jobs in flight (spinner)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tb_client::PageSource;
use tb_core::FileChosen;
use tb_session::{
    Command, Indicator, Mode, NavigationState, Navigator, Row, SessionError, SessionEvent, Step,
    View,
};
use tracing::{debug, warn};

use crate::action::Action;
use crate::event::{Job, Request, SessionOutcome};

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Braille spinner frames shown while a job is running.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The current input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Browsing with the cursor keys.
    #[default]
    Normal,

    /// Typing a search term.
    Searching,

    /// Help panel is displayed.
    Help,
}

/// Cursor and scroll position over the current rows.
///
/// Only selectable rows can hold the cursor; `len` arguments are the number
/// of selectable rows.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Index of the row under the cursor.
    pub selected: Option<usize>,

    /// First visible row.
    pub scroll_offset: usize,

    /// Rows that fit on screen (for page navigation).
    pub visible_height: usize,
}

impl ListState {
    /// Creates an empty list state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor down, wrapping to the top.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < len => i + 1,
            Some(_) | None => 0,
        });
        self.ensure_visible();
    }

    /// Moves the cursor up, wrapping to the bottom.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
        self.ensure_visible();
    }

    /// Moves the cursor to the first row.
    pub fn select_first(&mut self, len: usize) {
        self.selected = (len > 0).then_some(0);
        self.scroll_offset = 0;
    }

    /// Moves the cursor to the last row.
    pub fn select_last(&mut self, len: usize) {
        self.selected = len.checked_sub(1);
        self.ensure_visible();
    }

    /// Moves the cursor down by one page.
    pub fn page_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let page = self.visible_height.max(1);
        self.selected = Some(self.selected.map_or(page, |i| i + page).min(len - 1));
        self.ensure_visible();
    }

    /// Moves the cursor up by one page.
    pub fn page_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let page = self.visible_height.max(1);
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(page)));
        self.ensure_visible();
    }

    /// Keeps the cursor within `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.selected = match (self.selected, len) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        if self.selected.is_none() {
            self.scroll_offset = 0;
        }
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let Some(selected) = self.selected else {
            return;
        };
        let height = self.visible_height.max(1);
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + height {
            self.scroll_offset = selected + 1 - height;
        }
    }
}

/// Status message to display in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    /// The message text.
    pub text: String,

    /// When the message was created.
    pub timestamp: Instant,

    /// Whether this is an error message.
    pub is_error: bool,
}

impl StatusMessage {
    /// Creates a new info message.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Instant::now(),
            is_error: false,
        }
    }

    /// Creates a new error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Instant::now(),
            is_error: true,
        }
    }

    /// Returns `true` once the message has been visible long enough.
    #[must_use]
    pub fn should_hide(&self) -> bool {
        self.timestamp.elapsed() > STATUS_TTL
    }
}

/// Runs a job against the navigator.
pub async fn perform<S: PageSource>(navigator: &Navigator<S>, job: Job) -> SessionOutcome {
    let result = match job.request {
        Request::Enter => navigator.enter(&job.origin).await,
        Request::Command(command) => navigator.dispatch(&job.origin, command).await,
    };
    SessionOutcome {
        origin: job.origin,
        result,
    }
}

/// The main application state.
pub struct App<S> {
    navigator: Arc<Navigator<S>>,
    state: NavigationState,
    view: View,

    /// Current input mode.
    pub mode: AppMode,

    /// Cursor over the current rows.
    pub list_state: ListState,

    /// Cursor positions of the enclosing levels, restored on the way back.
    cursor_stack: Vec<Option<usize>>,

    /// Search prompt contents while in [`AppMode::Searching`].
    search_input: String,

    /// Status message to display.
    pub status: Option<StatusMessage>,

    pending: usize,
    spinner_frame: usize,
    chosen: Option<FileChosen>,

    /// Whether the application should quit.
    pub should_quit: bool,
}

impl<S: PageSource> App<S> {
    /// Creates an app at the top level.
    pub fn new(navigator: Arc<Navigator<S>>) -> Self {
        Self::resume(navigator, NavigationState::new())
    }

    /// Creates an app showing `state`, e.g. the directory a file was played
    /// from.
    pub fn resume(navigator: Arc<Navigator<S>>, state: NavigationState) -> Self {
        let view = navigator.view(&state).unwrap_or_else(|_| View {
            indicator: Indicator::TopLevel {
                search_term: String::new(),
                matches: 0,
                total: 0,
            },
            rows: Vec::new(),
        });
        let mut list_state = ListState::new();
        list_state.clamp(view.selectable_len());
        Self {
            navigator,
            state,
            view,
            mode: AppMode::Normal,
            list_state,
            cursor_stack: Vec::new(),
            search_input: String::new(),
            status: None,
            pending: 0,
            spinner_frame: 0,
            chosen: None,
            should_quit: false,
        }
    }

    /// The first job: enter the top level, loading the listing if needed.
    ///
    /// `None` when resuming inside a torrent, whose tree is already at hand.
    pub fn start(&mut self) -> Option<Job> {
        if self.state.mode() != Mode::TopLevel {
            return None;
        }
        self.status = Some(StatusMessage::info("Loading torrents..."));
        Some(self.job(Request::Enter))
    }

    /// Returns the navigator.
    pub const fn navigator(&self) -> &Arc<Navigator<S>> {
        &self.navigator
    }

    /// Returns the current navigation state.
    pub const fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Returns the rows for the current state.
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// Returns the search prompt contents.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Returns the row under the cursor.
    pub fn selected_row(&self) -> Option<&Row> {
        self.list_state
            .selected
            .and_then(|index| self.view.rows.get(index))
            .filter(|row| row.selectable)
    }

    /// Returns `true` while a job is running.
    pub const fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// The spinner frame to draw, if a job is running.
    pub fn spinner(&self) -> Option<&'static str> {
        self.is_busy()
            .then(|| SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()])
    }

    /// Returns the chosen file, once one has been picked.
    pub const fn chosen(&self) -> Option<&FileChosen> {
        self.chosen.as_ref()
    }

    /// Takes the chosen file out of the app.
    pub fn take_chosen(&mut self) -> Option<FileChosen> {
        self.chosen.take()
    }

    /// Consumes the app, returning where the user was and the chosen file.
    pub fn finish(mut self) -> (NavigationState, Option<FileChosen>) {
        let chosen = self.chosen.take();
        (self.state, chosen)
    }

    /// Records how many rows fit on screen.
    pub fn set_visible_height(&mut self, height: usize) {
        self.list_state.visible_height = height;
        self.list_state.clamp(self.view.selectable_len());
    }

    /// Maps a key press to an action.
    #[must_use]
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Searching => self.handle_search_key(key),
            AppMode::Help => Self::handle_help_key(key),
        }
    }

    fn handle_normal_key(&self, key: KeyEvent) -> Action {
        let top_level = self.state.mode() == Mode::TopLevel;
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char('j') | KeyCode::Down => Action::NextItem,
            KeyCode::Char('k') | KeyCode::Up => Action::PreviousItem,
            KeyCode::Char('g') | KeyCode::Home => Action::FirstItem,
            KeyCode::Char('G') | KeyCode::End => Action::LastItem,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Action::Activate,
            KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Action::Back,
            KeyCode::Char('/') if top_level => Action::EnterSearchMode,
            KeyCode::Char('r') if top_level => Action::Refresh,
            KeyCode::Char('m') if !top_level => Action::ToggleWatched,
            KeyCode::Char('C') => Action::ClearWatched,
            KeyCode::Esc if !top_level => Action::Back,
            KeyCode::Esc if !self.state.search_term().is_empty() => Action::ClearSearch,
            _ => Action::None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearSearch,
            KeyCode::Enter => Action::ConfirmSearch,
            KeyCode::Down => Action::NextItem,
            KeyCode::Up => Action::PreviousItem,
            KeyCode::Backspace => {
                self.search_input.pop();
                Action::SetSearch(self.search_input.clone())
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                Action::SetSearch(self.search_input.clone())
            }
            _ => Action::None,
        }
    }

    fn handle_help_key(key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q' | '?') => Action::HideHelp,
            _ => Action::None,
        }
    }

    /// Maps pasted text to an action. Only the search prompt takes pastes.
    #[must_use]
    pub fn handle_paste(&mut self, text: &str) -> Action {
        if self.mode != AppMode::Searching {
            return Action::None;
        }
        self.search_input
            .extend(text.chars().filter(|c| !c.is_control()));
        Action::SetSearch(self.search_input.clone())
    }

    /// Maps a mouse event to an action: the wheel moves the cursor.
    #[must_use]
    pub fn handle_mouse(&self, event: MouseEvent) -> Action {
        match (self.mode, event.kind) {
            (AppMode::Help, _) => Action::None,
            (_, MouseEventKind::ScrollDown) => Action::NextItem,
            (_, MouseEventKind::ScrollUp) => Action::PreviousItem,
            _ => Action::None,
        }
    }

    /// Applies an action. Returns a job when the action needs the session to
    /// do background work.
    #[allow(clippy::match_same_arms)] // Separate arms per action for readability
    pub fn update(&mut self, action: Action) -> Option<Job> {
        let len = self.view.selectable_len();
        match action {
            Action::Quit => self.should_quit = true,

            Action::NextItem => self.list_state.select_next(len),
            Action::PreviousItem => self.list_state.select_previous(len),
            Action::FirstItem => self.list_state.select_first(len),
            Action::LastItem => self.list_state.select_last(len),
            Action::PageDown => self.list_state.page_down(len),
            Action::PageUp => self.list_state.page_up(len),

            Action::Activate => return self.activate(),
            Action::Back => {
                let next = self.navigator.back(&self.state);
                self.set_state(next);
            }
            Action::Refresh => {
                self.status = Some(StatusMessage::info("Refreshing..."));
                return Some(self.job(Request::Command(Command::Refresh)));
            }

            Action::ToggleWatched => self.toggle_watched(),
            Action::ClearWatched => {
                self.navigator.clear_watched();
                self.status = Some(StatusMessage::info("Cleared watch history"));
                self.refresh_view();
            }

            Action::EnterSearchMode => {
                self.search_input = self.state.search_term().to_owned();
                self.mode = AppMode::Searching;
            }
            Action::ConfirmSearch => self.mode = AppMode::Normal,
            Action::SetSearch(term) => self.apply_search(&term),
            Action::ClearSearch => {
                self.mode = AppMode::Normal;
                self.search_input.clear();
                if !self.state.search_term().is_empty() {
                    self.apply_search("");
                }
            }

            Action::ToggleHelp => {
                self.mode = if self.mode == AppMode::Help {
                    AppMode::Normal
                } else {
                    AppMode::Help
                };
            }
            Action::HideHelp => self.mode = AppMode::Normal,

            Action::Tick => self.tick(),
            Action::Render | Action::None => {}
        }
        None
    }

    /// Applies the result of a background job.
    ///
    /// - An error is shown, unless it is a caller bug from an earlier state.
    /// - A new listing is taken into the current state, wherever the user is.
    /// - Anything else applies only while the user is still in the directory
    ///   the job was issued from; a search typed meanwhile is kept.
    pub fn apply_outcome(&mut self, outcome: SessionOutcome) {
        self.pending = self.pending.saturating_sub(1);
        let current = outcome.origin == self.state;

        let step = match outcome.result {
            Ok(step) => step,
            Err(e) if !current && e.is_ignorable() => {
                debug!(error = %e, "Ignoring error from an earlier state");
                return;
            }
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        let Step { state, event } = step;
        match event {
            Some(event @ SessionEvent::ListingRefreshed { .. }) => {
                let next = self.state.with_listing_from(&state);
                self.set_state(next);
                self.handle_session_event(event);
            }
            _ if !outcome.origin.same_location(&self.state) => {
                debug!("Discarding result issued from another directory");
            }
            event => {
                let next = state.rebased_on(&self.state);
                self.set_state(next);
                if let Some(event) = event {
                    self.handle_session_event(event);
                }
            }
        }
    }

    /// Periodic update: expire the status message, advance the spinner.
    pub fn tick(&mut self) {
        if self.status.as_ref().is_some_and(StatusMessage::should_hide) {
            self.status = None;
        }
        if self.is_busy() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn job(&mut self, request: Request) -> Job {
        self.pending += 1;
        Job {
            origin: self.state.clone(),
            request,
        }
    }

    fn activate(&mut self) -> Option<Job> {
        let index = self.list_state.selected?;
        let row = self.selected_row()?;
        debug!(index, label = %row.label, "Activating row");
        Some(self.job(Request::Command(Command::Select(index))))
    }

    fn toggle_watched(&mut self) {
        let Some(index) = self.list_state.selected else {
            return;
        };
        match self.navigator.toggle_completed(&self.state, index) {
            Ok(status) => {
                debug!(index, ?status, "Toggled watched");
                self.refresh_view();
                let text = if status.is_some() { "Marked as watched" } else { "Unmarked" };
                self.status = Some(StatusMessage::info(text));
            }
            Err(e) if e.is_ignorable() => debug!(error = %e, "Nothing to mark"),
            Err(e) => self.report_error(&e),
        }
    }

    fn apply_search(&mut self, term: &str) {
        match self.navigator.set_search_term(&self.state, term) {
            Ok(next) => self.set_state(next),
            Err(e) => self.report_error(&e),
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FileChosen(chosen) => {
                debug!(path = %chosen.full_path, "Leaving with chosen file");
                self.chosen = Some(chosen);
                self.should_quit = true;
            }
            SessionEvent::ListingRefreshed { torrents, skipped } => {
                for error in skipped.iter() {
                    warn!(error = %error, "Skipped torrent");
                }
                let text = if skipped.is_empty() {
                    format!("Loaded {torrents} torrents")
                } else {
                    format!(
                        "Loaded {torrents} torrents, skipped {} with unreadable data",
                        skipped.len()
                    )
                };
                self.status = Some(StatusMessage::info(text));
            }
        }
    }

    fn report_error(&mut self, error: &SessionError) {
        warn!(error = %error, "Navigation failed");
        let text = if error.is_fatal() {
            format!("{error} (check your API key)")
        } else {
            error.to_string()
        };
        self.status = Some(StatusMessage::error(text));
    }

    fn set_state(&mut self, next: NavigationState) {
        let before = depth(&self.state);
        let after = depth(&next);
        let reset = after == before
            && (next.search_term() != self.state.search_term()
                || next.current_torrent().map(|t| &t.id)
                    != self.state.current_torrent().map(|t| &t.id));

        if after > before {
            self.cursor_stack.push(self.list_state.selected);
            self.list_state.selected = Some(0);
            self.list_state.scroll_offset = 0;
        } else if after < before {
            self.list_state.selected = self.cursor_stack.pop().flatten();
        } else if reset {
            self.list_state.selected = Some(0);
            self.list_state.scroll_offset = 0;
        }

        self.state = next;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        match self.navigator.view(&self.state) {
            Ok(view) => self.view = view,
            Err(e) => self.report_error(&e),
        }
        self.list_state.clamp(self.view.selectable_len());
    }
}

/// How far below the top level `state` is.
fn depth(state: &NavigationState) -> usize {
    state
        .current_torrent()
        .map_or(0, |_| 1 + state.current_path().len())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};
    use tb_client::{FixtureSource, ListingClient, ListingError, ListingPage, PageRequest};
    use tb_core::ApiConfig;
    use tb_session::WatchStatus;
    use tb_tree::TreeBuilder;

    use super::*;

    fn listing() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "One Piece", "files": [
                {"id": 0, "name": "One Piece/Episode 1/Video.mkv", "size": 734_003_200},
                {"id": 1, "name": "One Piece/Episode 1/Subs.srt", "size": 20480},
            ]}),
            json!({"id": 2, "name": "Naruto", "files": [
                {"id": 0, "name": "Naruto/N01.mkv", "size": 100},
            ]}),
            json!({"id": 3, "name": "Broken", "files": [
                {"id": 0, "name": "Broken/extras/", "size": 1},
            ]}),
        ]
    }

    fn new_app() -> App<FixtureSource> {
        let navigator = Navigator::new(
            ListingClient::new(FixtureSource::new(listing()), ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        );
        let mut app = App::new(Arc::new(navigator));
        app.set_visible_height(10);
        app
    }

    async fn run_job<S: PageSource>(app: &mut App<S>, job: Job) {
        let navigator = Arc::clone(app.navigator());
        let outcome = perform(&navigator, job).await;
        app.apply_outcome(outcome);
    }

    async fn started_app() -> App<FixtureSource> {
        let mut app = new_app();
        let job = app.start().unwrap();
        run_job(&mut app, job).await;
        app
    }

    async fn press<S: PageSource>(app: &mut App<S>, code: KeyCode) {
        let action = app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        if let Some(job) = app.update(action) {
            run_job(app, job).await;
        }
    }

    #[tokio::test]
    async fn test_start_loads_listing() {
        let app = started_app().await;
        assert_eq!(app.view().indicator.to_string(), "Torrents (3/3)");
        assert_eq!(app.list_state.selected, Some(0));
        assert!(!app.is_busy());
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "Loaded 3 torrents");
        assert!(!status.is_error);
    }

    #[tokio::test]
    async fn test_descend_and_back_restores_cursor() {
        let mut app = started_app().await;

        press(&mut app, KeyCode::Down).await;
        assert_eq!(app.selected_row().unwrap().label, "Naruto (1 file)");
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.state().mode(), Mode::BrowsingTree);
        assert_eq!(app.view().labels(), "N01.mkv (100.0 B)");

        press(&mut app, KeyCode::Backspace).await;
        assert_eq!(app.state().mode(), Mode::TopLevel);
        assert_eq!(app.list_state.selected, Some(1));
    }

    #[tokio::test]
    async fn test_browse_into_directories() {
        let mut app = started_app().await;

        press(&mut app, KeyCode::Enter).await;
        insta::assert_snapshot!(app.view().labels(), @"Episode 1/");
        press(&mut app, KeyCode::Enter).await;
        insta::assert_snapshot!(app.view().labels(), @r"
        Subs.srt (20.0 KB)
        Video.mkv (700.0 MB)
        ");
        assert_eq!(app.view().indicator.to_string(), "One Piece /Episode 1");

        press(&mut app, KeyCode::Esc).await;
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state().mode(), Mode::TopLevel);
    }

    #[tokio::test]
    async fn test_choosing_a_file_quits_with_it() {
        let mut app = started_app().await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Enter).await;

        assert!(app.should_quit);
        let chosen = app.take_chosen().unwrap();
        assert_eq!(chosen.file_name(), "Video.mkv");
        assert_eq!(chosen.file_id, Some(0));
        assert_eq!(chosen.size, 734_003_200);
    }

    #[tokio::test]
    async fn test_search_filters_as_you_type() {
        let mut app = started_app().await;

        press(&mut app, KeyCode::Char('/')).await;
        assert_eq!(app.mode, AppMode::Searching);
        for c in "one".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        assert_eq!(app.state().search_term(), "one");
        assert_eq!(
            app.view().indicator.to_string(),
            "Torrents matching 'one' (1/3)"
        );

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.state().search_term(), "one");

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state().search_term(), "");
        assert_eq!(app.view().selectable_len(), 3);
    }

    #[tokio::test]
    async fn test_search_term_survives_a_visit() {
        let mut app = started_app().await;
        press(&mut app, KeyCode::Char('/')).await;
        press(&mut app, KeyCode::Char('n')).await;
        press(&mut app, KeyCode::Enter).await;

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.state().mode(), Mode::BrowsingTree);
        press(&mut app, KeyCode::Left).await;
        assert_eq!(app.state().search_term(), "n");
    }

    #[tokio::test]
    async fn test_paste_goes_to_search_prompt() {
        let mut app = started_app().await;
        assert_eq!(app.handle_paste("naruto"), Action::None);

        let _ = app.update(Action::EnterSearchMode);
        let action = app.handle_paste("Naru\nto");
        assert_eq!(action, Action::SetSearch("Naruto".to_owned()));
        let _ = app.update(action);
        assert_eq!(app.view().selectable_len(), 1);
    }

    #[tokio::test]
    async fn test_open_survives_search_typed_meanwhile() {
        let mut app = started_app().await;

        let job = app.update(Action::Activate).unwrap();
        let _ = app.update(Action::SetSearch("naruto".to_owned()));
        run_job(&mut app, job).await;

        assert_eq!(app.state().current_torrent().unwrap().name, "One Piece");
        assert!(!app.is_busy());
        press(&mut app, KeyCode::Left).await;
        assert_eq!(app.state().search_term(), "naruto");
    }

    #[tokio::test]
    async fn test_file_choice_dropped_after_leaving_directory() {
        let mut app = started_app().await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Enter).await;

        let job = app.update(Action::Activate).unwrap();
        let _ = app.update(Action::Back);
        run_job(&mut app, job).await;

        assert!(!app.should_quit);
        assert!(app.chosen().is_none());
        assert_eq!(app.view().labels(), "Episode 1/");
    }

    #[tokio::test]
    async fn test_refresh_applies_while_typing() {
        let mut app = started_app().await;

        let job = app.update(Action::Refresh).unwrap();
        let _ = app.update(Action::SetSearch("n".to_owned()));
        run_job(&mut app, job).await;

        assert_eq!(app.state().search_term(), "n");
        assert!(Arc::ptr_eq(app.state().listing(), &app.navigator().client().snapshot()));
        assert_eq!(app.status.as_ref().unwrap().text, "Loaded 3 torrents");
    }

    /// Fails every request after the first.
    struct FailAfterFirst {
        inner: FixtureSource,
        calls: AtomicUsize,
    }

    impl PageSource for FailAfterFirst {
        async fn fetch_page(&self, request: PageRequest) -> Result<ListingPage, ListingError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(ListingError::network("connection reset"));
            }
            self.inner.fetch_page(request).await
        }
    }

    #[tokio::test]
    async fn test_refresh_error_shown_after_typing() {
        let source = FailAfterFirst {
            inner: FixtureSource::new(listing()),
            calls: AtomicUsize::new(0),
        };
        let navigator = Navigator::new(
            ListingClient::new(source, ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        );
        let mut app = App::new(Arc::new(navigator));
        let job = app.start().unwrap();
        run_job(&mut app, job).await;

        let job = app.update(Action::Refresh).unwrap();
        let _ = app.update(Action::SetSearch("n".to_owned()));
        run_job(&mut app, job).await;

        let status = app.status.as_ref().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("connection reset"));
        assert_eq!(app.state().search_term(), "n");
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_resume_inside_torrent() {
        let mut app = started_app().await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Enter).await;

        let navigator = Arc::clone(app.navigator());
        let (state, chosen) = app.finish();
        assert_eq!(chosen.unwrap().file_name(), "Video.mkv");

        let mut app = App::resume(navigator, state);
        assert!(app.start().is_none());
        assert_eq!(app.view().indicator.to_string(), "One Piece /Episode 1");
        press(&mut app, KeyCode::Left).await;
        press(&mut app, KeyCode::Left).await;
        assert_eq!(app.view().indicator.to_string(), "Torrents (3/3)");
    }

    #[tokio::test]
    async fn test_toggle_and_clear_watched() {
        let mut app = started_app().await;
        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Char('m')).await;
        assert!(app.status.is_none() || !app.status.as_ref().unwrap().is_error);

        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Char('m')).await;
        insta::assert_snapshot!(app.view().labels(), @r"
        Subs.srt (20.0 KB)
        Video.mkv (700.0 MB) ✓
        ");
        assert_eq!(app.status.as_ref().unwrap().text, "Marked as watched");
        assert_eq!(app.view().rows[1].watch, Some(WatchStatus::Completed));

        press(&mut app, KeyCode::Char('C')).await;
        assert_eq!(app.view().rows[1].watch, None);
        assert_eq!(app.status.as_ref().unwrap().text, "Cleared watch history");
    }

    #[tokio::test]
    async fn test_malformed_torrent_reports_error() {
        let mut app = started_app().await;
        let _ = app.update(Action::LastItem);
        assert_eq!(app.selected_row().unwrap().label, "Broken (1 file)");

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.state().mode(), Mode::TopLevel);
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_placeholder_cannot_be_activated() {
        let mut app = started_app().await;
        let _ = app.update(Action::SetSearch("zzz".to_owned()));
        assert_eq!(app.view().labels(), "No torrents match 'zzz'");
        assert_eq!(app.list_state.selected, None);
        assert!(app.update(Action::Activate).is_none());
    }

    #[tokio::test]
    async fn test_spinner_runs_while_busy() {
        let mut app = new_app();
        assert!(app.spinner().is_none());

        let job = app.start().unwrap();
        let first = app.spinner().unwrap();
        app.tick();
        assert_ne!(app.spinner().unwrap(), first);

        run_job(&mut app, job).await;
        assert!(app.spinner().is_none());
    }

    #[tokio::test]
    async fn test_key_mapping() {
        let mut app = started_app().await;
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::None);

        let _ = app.update(Action::ToggleHelp);
        assert_eq!(app.handle_key(key(KeyCode::Char('j'))), Action::None);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::HideHelp);
        let _ = app.update(Action::HideHelp);

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.handle_key(key(KeyCode::Char('/'))), Action::None);
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::None);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Back);
    }

    #[test]
    fn test_list_state_navigation() {
        let mut state = ListState::new();
        state.visible_height = 3;

        state.select_next(0);
        assert!(state.selected.is_none());

        state.select_next(5);
        assert_eq!(state.selected, Some(0));
        state.select_last(5);
        assert_eq!(state.selected, Some(4));
        assert_eq!(state.scroll_offset, 2);
        state.select_next(5);
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.scroll_offset, 0);
        state.select_previous(5);
        assert_eq!(state.selected, Some(4));

        state.page_up(5);
        assert_eq!(state.selected, Some(1));
        state.page_down(5);
        assert_eq!(state.selected, Some(4));

        state.clamp(2);
        assert_eq!(state.selected, Some(1));
        state.clamp(0);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_status_message() {
        let msg = StatusMessage::info("Loaded 3 torrents");
        assert!(!msg.is_error);
        assert!(!msg.should_hide());
        assert!(StatusMessage::error("boom").is_error);
    }
}
