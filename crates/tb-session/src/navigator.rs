//! Navigation operations.
//!
//! # State Machine
//!
//! ```text
//!                 select(torrent)
//!   ┌──────────┐ ───────────────────► ┌──────────────┐ ──┐ select(dir): push
//!   │ TopLevel │                      │ BrowsingTree │ ◄─┘ back(): pop
//!   └──────────┘ ◄─────────────────── └──────────────┘
//!     search, refresh   back() at root      select(file): FileChosen
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tb_client::{FetchReport, ListingClient, PageSource};
use tb_core::{FileChosen, FxHashMap, TorrentId, TorrentRecord};
use tb_tree::{TreeBuilder, TreeNode};
use tracing::{debug, info};

use crate::command::{Command, SessionEvent, Step};
use crate::error::SessionError;
use crate::filter::filter_records;
use crate::state::{Mode, NavigationState};
use crate::view::View;
use crate::watch::{WatchLog, WatchStatus};

/// Applies commands to [`NavigationState`] values.
///
/// The navigator owns no navigation state of its own; it holds the listing
/// client and the tree cache that the states refer to, plus the session's
/// watch markers. Every operation takes the current state and returns the
/// next one, leaving the input untouched, so a failed operation simply means
/// "keep the state you had".
///
/// A successful fetch drops every cached tree whose torrent changed or
/// disappeared, so opening a torrent always shows the files of the listing
/// the user is looking at.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use serde_json::json;
/// use tb_client::{FixtureSource, ListingClient};
/// use tb_core::ApiConfig;
/// use tb_session::{Mode, NavigationState, Navigator};
/// use tb_tree::TreeBuilder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tb_session::SessionError> {
/// let source = FixtureSource::new(vec![json!({
///     "id": 1, "name": "Show",
///     "files": [{"id": 0, "name": "Show/Season 1/E01.mkv", "size": 10}],
/// })]);
/// let navigator = Navigator::new(
///     ListingClient::new(source, ApiConfig::default()),
///     Arc::new(TreeBuilder::default()),
/// );
///
/// let state = navigator.enter(&NavigationState::new()).await?.state;
/// let state = navigator.select(&state, 0).await?.state;
/// assert_eq!(state.mode(), Mode::BrowsingTree);
/// assert_eq!(navigator.view(&state)?.labels(), "Season 1/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Navigator<S> {
    client: ListingClient<S>,
    trees: Arc<TreeBuilder>,
    watched: Mutex<WatchLog>,
    max_age: Duration,
}

impl<S: PageSource> Navigator<S> {
    /// Creates a navigator; the staleness threshold comes from the client's
    /// configuration.
    pub fn new(client: ListingClient<S>, trees: Arc<TreeBuilder>) -> Self {
        let max_age = client.config().max_age();
        Self {
            client,
            trees,
            watched: Mutex::new(WatchLog::new()),
            max_age,
        }
    }

    /// Returns the listing client.
    pub const fn client(&self) -> &ListingClient<S> {
        &self.client
    }

    /// Returns the tree cache.
    pub const fn trees(&self) -> &Arc<TreeBuilder> {
        &self.trees
    }

    /// Enters the top level, fetching the listing if it was never fetched or
    /// is stale. Otherwise the state picks up the current snapshot.
    pub async fn enter(&self, state: &NavigationState) -> Result<Step, SessionError> {
        require_top_level(state, "enter")?;
        if self.client.is_stale(self.max_age) {
            debug!(fetched = self.client.has_fetched(), "Listing missing or stale, fetching");
            return self.fetch(state).await;
        }
        Ok(Step::to(state.with_listing(self.client.snapshot())))
    }

    /// Re-fetches the listing. Top level only.
    ///
    /// On failure the previous snapshot stays and `state` is unchanged.
    pub async fn refresh(&self, state: &NavigationState) -> Result<Step, SessionError> {
        require_top_level(state, "refresh")?;
        self.fetch(state).await
    }

    /// Replaces the search term. Top level only.
    #[allow(clippy::unused_self)] // Kept on the navigator alongside the other operations
    pub fn set_search_term(&self, state: &NavigationState, term: &str) -> Result<NavigationState, SessionError> {
        require_top_level(state, "set_search_term")?;
        Ok(state.with_search_term(term))
    }

    /// Activates the selectable row at `index`.
    ///
    /// - On a torrent: builds (or reuses) its tree and enters it at the root.
    /// - On a directory: descends into it.
    /// - On a file: emits [`SessionEvent::FileChosen`]; the state is unchanged.
    pub async fn select(&self, state: &NavigationState, index: usize) -> Result<Step, SessionError> {
        match state.mode() {
            Mode::TopLevel => self.open_torrent(state, index).await,
            Mode::BrowsingTree => self.select_in_tree(state, index),
        }
    }

    /// Goes up one level; from a tree root, back to the top level.
    ///
    /// A no-op at the top level.
    #[must_use]
    #[allow(clippy::unused_self)] // Kept on the navigator alongside the other operations
    pub fn back(&self, state: &NavigationState) -> NavigationState {
        match state.mode() {
            Mode::TopLevel => state.clone(),
            Mode::BrowsingTree => {
                let next = state.ascending();
                if next.mode() == Mode::TopLevel {
                    debug!("Returned to top level");
                }
                next
            }
        }
    }

    /// Applies one command.
    pub async fn dispatch(&self, state: &NavigationState, command: Command) -> Result<Step, SessionError> {
        match command {
            Command::Select(index) => self.select(state, index).await,
            Command::Back => Ok(Step::to(self.back(state))),
            Command::SearchInput(term) => self.set_search_term(state, &term).map(Step::to),
            Command::Refresh => self.refresh(state).await,
        }
    }

    /// Renders `state`. The top level lists the state's own snapshot.
    pub fn view(&self, state: &NavigationState) -> Result<View, SessionError> {
        match state.current_torrent() {
            None => {
                let listing = state.listing();
                let matches = filter_records(listing, state.search_term());
                Ok(View::top_level(state.search_term(), &matches, listing.len()))
            }
            Some(current) => {
                let dir = state.current_dir().ok_or_else(|| path_not_found(state))?;
                let watched = self.watched.lock();
                Ok(View::directory(&current.name, state.current_path(), dir, |node| {
                    node.full_path()
                        .and_then(|path| watched.status(&current.id, path))
                }))
            }
        }
    }

    /// Records of the state's snapshot matching its search term.
    #[allow(clippy::unused_self)] // Kept on the navigator alongside the other operations
    pub fn matches(&self, state: &NavigationState) -> Vec<TorrentRecord> {
        filter_records(state.listing(), state.search_term())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Records that playback of `chosen` started (or finished).
    pub fn mark_watched(&self, chosen: &FileChosen, status: WatchStatus) {
        debug!(torrent_id = %chosen.torrent_id, path = %chosen.full_path, %status, "Marked file");
        self.watched.lock().mark(&chosen.torrent_id, &chosen.full_path, status);
    }

    /// Flips the file at `index` between completed and unmarked. Returns the
    /// new status.
    pub fn toggle_completed(
        &self,
        state: &NavigationState,
        index: usize,
    ) -> Result<Option<WatchStatus>, SessionError> {
        let (current, child) = self.child_at(state, index, "toggle_completed")?;
        let Some(path) = child.full_path() else {
            return Err(SessionError::NotAFile {
                name: child.name().to_owned(),
            });
        };
        let status = self.watched.lock().toggle_completed(&current, path);
        debug!(torrent_id = %current, path, ?status, "Toggled completed");
        Ok(status)
    }

    /// Forgets every watch marker.
    pub fn clear_watched(&self) {
        let mut watched = self.watched.lock();
        info!(files = watched.len(), "Cleared watch history");
        watched.clear();
    }

    /// A copy of the watch markers.
    pub fn watch_log(&self) -> WatchLog {
        self.watched.lock().clone()
    }

    async fn fetch(&self, state: &NavigationState) -> Result<Step, SessionError> {
        let before = self.client.snapshot();
        let report = self.client.fetch_all().await?;
        self.drop_outdated_trees(&before, &report.records);
        Ok(refreshed(state, &report))
    }

    /// Drops cached trees of torrents that changed or vanished between two
    /// snapshots.
    fn drop_outdated_trees(&self, before: &[TorrentRecord], after: &[TorrentRecord]) {
        let latest: FxHashMap<&TorrentId, &TorrentRecord> = after.iter().map(|r| (&r.id, r)).collect();
        for old in before {
            let unchanged = latest.get(&old.id).is_some_and(|new| new.files == old.files);
            if !unchanged && self.trees.drop_tree(&old.id) {
                debug!(torrent_id = %old.id, "Dropped tree built from an older listing");
            }
        }
    }

    async fn open_torrent(&self, state: &NavigationState, index: usize) -> Result<Step, SessionError> {
        let matches = filter_records(state.listing(), state.search_term());
        let record = matches.get(index).ok_or(SessionError::SelectionOutOfRange {
            index,
            len: matches.len(),
        })?;

        let id = record.id.clone();
        let name = record.name.clone();
        let files = Arc::clone(&record.files);
        let trees = Arc::clone(&self.trees);
        let tree = {
            let id = id.clone();
            tokio::task::spawn_blocking(move || trees.build_or_get(&id, &files)).await??
        };

        // Opened from an older listing: keep the tree for this state only.
        let latest = self.client.snapshot();
        if latest.iter().any(|r| r.id == id && r.files != record.files) && self.trees.drop_tree(&id) {
            debug!(torrent_id = %id, "Torrent changed since these rows were shown");
        }

        info!(torrent_id = %id, name = %name, "Opened torrent");
        Ok(Step::to(state.entering(id, name, tree)))
    }

    /// The torrent being browsed and the child at `index` of the current
    /// directory.
    #[allow(clippy::unused_self)] // Kept on the navigator alongside the other operations
    fn child_at<'s>(
        &self,
        state: &'s NavigationState,
        index: usize,
        operation: &'static str,
    ) -> Result<(TorrentId, &'s TreeNode), SessionError> {
        let Some(current) = state.current_torrent() else {
            return Err(SessionError::invalid_mode(operation, state.mode()));
        };
        let dir = state.current_dir().ok_or_else(|| path_not_found(state))?;
        let children = dir.list_children();
        let child = children.get(index).copied().ok_or(SessionError::SelectionOutOfRange {
            index,
            len: children.len(),
        })?;
        Ok((current.id.clone(), child))
    }

    fn select_in_tree(&self, state: &NavigationState, index: usize) -> Result<Step, SessionError> {
        let (torrent_id, child) = self.child_at(state, index, "select")?;

        if child.is_dir() {
            debug!(segment = child.name(), depth = state.current_path().len() + 1, "Entered directory");
            return Ok(Step::to(state.descending(child.name())));
        }

        let chosen = FileChosen {
            torrent_id,
            file_id: child.file_id(),
            full_path: child.full_path().unwrap_or_else(|| child.name()).to_owned(),
            size: child.size().unwrap_or_default(),
        };
        info!(torrent_id = %chosen.torrent_id, path = %chosen.full_path, "File chosen");
        Ok(Step::with_event(state.clone(), SessionEvent::FileChosen(chosen)))
    }
}

fn require_top_level(state: &NavigationState, operation: &'static str) -> Result<(), SessionError> {
    match state.mode() {
        Mode::TopLevel => Ok(()),
        mode => Err(SessionError::invalid_mode(operation, mode)),
    }
}

fn refreshed(state: &NavigationState, report: &FetchReport) -> Step {
    Step::with_event(
        state.with_listing(Arc::clone(&report.records)),
        SessionEvent::ListingRefreshed {
            torrents: report.records.len(),
            skipped: Arc::clone(&report.skipped),
        },
    )
}

fn path_not_found(state: &NavigationState) -> SessionError {
    SessionError::PathNotFound {
        path: state.current_path().join("/"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tb_client::{FixtureSource, ListingError};
    use tb_core::{ApiConfig, TorrentId};

    use super::*;
    use crate::view::RowKind;

    fn torrent(id: u64, name: &str, files: &[(&str, u64)]) -> Value {
        let files: Vec<Value> = files
            .iter()
            .enumerate()
            .map(|(i, (path, size))| json!({"id": i, "name": path, "size": size}))
            .collect();
        json!({"id": id, "name": name, "files": files})
    }

    fn navigator(torrents: Vec<Value>) -> Navigator<FixtureSource> {
        Navigator::new(
            ListingClient::new(FixtureSource::new(torrents), ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        )
    }

    fn one_piece() -> Value {
        torrent(
            1509,
            "One Piece",
            &[
                ("One Piece/Episode 1/Video.mkv", 734_003_200),
                ("One Piece/Episode 1/Subs.srt", 20_480),
            ],
        )
    }

    async fn entered(nav: &Navigator<FixtureSource>) -> NavigationState {
        nav.enter(&NavigationState::new()).await.unwrap().state
    }

    #[tokio::test]
    async fn test_one_piece_scenario() {
        let nav = navigator(vec![
            one_piece(),
            torrent(2, "Naruto", &[("Naruto/ep1.mkv", 1)]),
        ]);
        let state = entered(&nav).await;

        let state = nav.set_search_term(&state, "one").unwrap();
        let hits = nav.matches(&state);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "One Piece");

        let state = nav.select(&state, 0).await.unwrap().state;
        assert_eq!(state.mode(), Mode::BrowsingTree);
        assert!(state.current_path().is_empty());
        insta::assert_snapshot!(nav.view(&state).unwrap().labels(), @"Episode 1/");

        let state = nav.select(&state, 0).await.unwrap().state;
        assert_eq!(state.current_path(), ["Episode 1"]);
        let view = nav.view(&state).unwrap();
        assert!(view.rows.iter().all(|row| row.kind == RowKind::File));
        insta::assert_snapshot!(view.labels(), @r"
        Subs.srt (20.0 KB)
        Video.mkv (700.0 MB)
        ");
    }

    #[tokio::test]
    async fn test_enter_fetches_once_while_fresh() {
        let nav = navigator(vec![one_piece()]);
        let step = nav.enter(&NavigationState::new()).await.unwrap();
        assert!(matches!(
            step.event,
            Some(SessionEvent::ListingRefreshed { torrents: 1, .. })
        ));

        let step = nav.enter(&step.state).await.unwrap();
        assert_eq!(step.event, None);
    }

    #[tokio::test]
    async fn test_top_level_view_and_counter() {
        let nav = navigator(vec![
            one_piece(),
            torrent(2, "Naruto", &[("Naruto/ep1.mkv", 1)]),
        ]);
        let state = entered(&nav).await;

        let view = nav.view(&state).unwrap();
        insta::assert_snapshot!(view.labels(), @r"
        One Piece (2 files)
        Naruto (1 file)
        ");
        assert_eq!(view.indicator.to_string(), "Torrents (2/2)");

        let state = nav.set_search_term(&state, "NAR").unwrap();
        assert_eq!(nav.view(&state).unwrap().indicator.to_string(), "Torrents matching 'NAR' (1/2)");
    }

    #[tokio::test]
    async fn test_empty_search_returns_full_snapshot() {
        let nav = navigator(vec![one_piece(), torrent(2, "Naruto", &[])]);
        let state = entered(&nav).await;

        let state = nav.set_search_term(&state, "zzz").unwrap();
        assert!(nav.matches(&state).is_empty());

        let state = nav.set_search_term(&state, "").unwrap();
        let names: Vec<String> = nav.matches(&state).into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["One Piece", "Naruto"]);
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let nav = navigator(vec![one_piece()]);
        let state = entered(&nav).await;

        let err = nav.select(&state, 5).await.unwrap_err();
        assert!(matches!(err, SessionError::SelectionOutOfRange { index: 5, len: 1 }));

        let state = nav.select(&state, 0).await.unwrap().state;
        let err = nav.select(&state, 1).await.unwrap_err();
        assert!(matches!(err, SessionError::SelectionOutOfRange { index: 1, len: 1 }));
        assert!(err.is_ignorable());
    }

    #[tokio::test]
    async fn test_select_file_emits_event_without_moving() {
        let nav = navigator(vec![one_piece()]);
        let state = entered(&nav).await;
        let state = nav.select(&state, 0).await.unwrap().state;
        let state = nav.select(&state, 0).await.unwrap().state;

        let step = nav.select(&state, 1).await.unwrap();
        assert_eq!(step.state, state);
        assert_eq!(
            step.chosen(),
            Some(&FileChosen {
                torrent_id: TorrentId::from("1509"),
                file_id: Some(0),
                full_path: "One Piece/Episode 1/Video.mkv".to_owned(),
                size: 734_003_200,
            })
        );
    }

    #[tokio::test]
    async fn test_back_is_noop_at_top_level() {
        let nav = navigator(vec![one_piece()]);
        let state = nav.set_search_term(&entered(&nav).await, "one").unwrap();
        assert_eq!(nav.back(&state), state);
    }

    #[tokio::test]
    async fn test_repeated_back_reaches_top_level() {
        let nav = navigator(vec![torrent(
            1,
            "Deep",
            &[("Deep/a/b/c/d/file.mkv", 1)],
        )]);
        let top = nav.set_search_term(&entered(&nav).await, "dee").unwrap();

        let mut state = nav.select(&top, 0).await.unwrap().state;
        for _ in 0..4 {
            state = nav.select(&state, 0).await.unwrap().state;
        }
        assert_eq!(state.current_path(), ["a", "b", "c", "d"]);

        let mut backs = 0;
        while state.mode() == Mode::BrowsingTree {
            state = nav.back(&state);
            backs += 1;
        }
        assert_eq!(backs, 5);
        assert!(state.current_torrent().is_none());
        assert!(state.current_path().is_empty());
        assert_eq!(state.search_term(), "dee");
        assert_eq!(nav.back(&state), state);
    }

    #[tokio::test]
    async fn test_top_level_only_operations() {
        let nav = navigator(vec![one_piece()]);
        let state = nav.select(&entered(&nav).await, 0).await.unwrap().state;

        let err = nav.set_search_term(&state, "x").unwrap_err();
        assert!(matches!(err, SessionError::InvalidMode { mode: Mode::BrowsingTree, .. }));

        let err = nav.refresh(&state).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidMode { operation: "refresh", .. }));
    }

    #[tokio::test]
    async fn test_malformed_torrent_cannot_be_opened() {
        let nav = navigator(vec![torrent(1, "Bad", &[("Bad/A/B", 1), ("Bad/A/B/C", 1)])]);
        let state = entered(&nav).await;

        let err = nav.select(&state, 0).await.unwrap_err();
        assert!(matches!(err, SessionError::Tree(_)));
        assert!(nav.trees().get(&TorrentId::from("1")).is_none());
        assert_eq!(state.mode(), Mode::TopLevel);
    }

    #[tokio::test]
    async fn test_reopening_reuses_tree() {
        let nav = navigator(vec![one_piece()]);
        let top = entered(&nav).await;

        let first = nav.select(&top, 0).await.unwrap().state;
        let again = nav.select(&nav.back(&first), 0).await.unwrap().state;

        let a = first.current_torrent().unwrap();
        let b = again.current_torrent().unwrap();
        assert!(Arc::ptr_eq(a.tree(), b.tree()));
    }

    #[tokio::test]
    async fn test_dispatch_commands() {
        let nav = navigator(vec![one_piece()]);
        let state = entered(&nav).await;

        let step = nav.dispatch(&state, Command::SearchInput("piece".to_owned())).await.unwrap();
        assert_eq!(step.state.search_term(), "piece");

        let step = nav.dispatch(&step.state, Command::Select(0)).await.unwrap();
        assert_eq!(step.state.mode(), Mode::BrowsingTree);

        let step = nav.dispatch(&step.state, Command::Back).await.unwrap();
        assert_eq!(step.state.mode(), Mode::TopLevel);

        let step = nav.dispatch(&step.state, Command::Refresh).await.unwrap();
        assert!(matches!(step.event, Some(SessionEvent::ListingRefreshed { .. })));
    }

    /// Fails every request after the first.
    struct FlakySource {
        inner: FixtureSource,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl PageSource for FlakySource {
        async fn fetch_page(
            &self,
            request: tb_client::PageRequest,
        ) -> Result<tb_client::ListingPage, ListingError> {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) > 0 {
                return Err(ListingError::network("connection reset"));
            }
            self.inner.fetch_page(request).await
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot_and_search() {
        let source = FlakySource {
            inner: FixtureSource::new(vec![one_piece()]),
            calls: std::sync::atomic::AtomicUsize::new(0),
        };
        let nav = Navigator::new(
            ListingClient::new(source, ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        );
        let state = nav.enter(&NavigationState::new()).await.unwrap().state;
        let state = nav.set_search_term(&state, "one").unwrap();

        let err = nav.refresh(&state).await.unwrap_err();
        assert!(matches!(err, SessionError::Listing(ListingError::Network { .. })));
        assert_eq!(state.search_term(), "one");
        assert_eq!(nav.matches(&state).len(), 1);
    }

    /// Serves `first` on the first request and `then` afterwards.
    struct ChangingSource {
        first: FixtureSource,
        then: FixtureSource,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl ChangingSource {
        fn new(first: Vec<Value>, then: Vec<Value>) -> Self {
            Self {
                first: FixtureSource::new(first),
                then: FixtureSource::new(then),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for ChangingSource {
        async fn fetch_page(
            &self,
            request: tb_client::PageRequest,
        ) -> Result<tb_client::ListingPage, ListingError> {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                self.first.fetch_page(request).await
            } else {
                self.then.fetch_page(request).await
            }
        }
    }

    fn changing(first: Vec<Value>, then: Vec<Value>) -> Navigator<ChangingSource> {
        Navigator::new(
            ListingClient::new(ChangingSource::new(first, then), ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        )
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_changed_torrents() {
        let naruto = torrent(2, "Naruto", &[("Naruto/ep1.mkv", 1)]);
        let nav = changing(
            vec![torrent(1, "Show", &[]), naruto.clone(), torrent(3, "Gone", &[("Gone/a.mkv", 1)])],
            vec![torrent(1, "Show", &[("Show/E01.mkv", 10)]), naruto],
        );
        let top = nav.enter(&NavigationState::new()).await.unwrap().state;

        let show = nav.select(&top, 0).await.unwrap().state;
        assert_eq!(nav.view(&show).unwrap().labels(), "(empty)");
        let kept = nav.select(&top, 1).await.unwrap().state;
        nav.select(&top, 2).await.unwrap();

        let top = nav.refresh(&nav.back(&show)).await.unwrap().state;

        let show = nav.select(&top, 0).await.unwrap().state;
        assert_eq!(nav.view(&show).unwrap().labels(), "E01.mkv (10.0 B)");

        let again = nav.select(&top, 1).await.unwrap().state;
        assert!(Arc::ptr_eq(
            kept.current_torrent().unwrap().tree(),
            again.current_torrent().unwrap().tree()
        ));
        assert!(nav.trees().get(&TorrentId::from("3")).is_none());
    }

    #[tokio::test]
    async fn test_select_resolves_against_rows_shown() {
        let alpha = torrent(1, "Alpha", &[("Alpha/a.mkv", 1)]);
        let beta = torrent(2, "Beta", &[("Beta/b.mkv", 1)]);
        let nav = changing(vec![alpha.clone(), beta.clone()], vec![beta, alpha]);
        let top = nav.enter(&NavigationState::new()).await.unwrap().state;

        // A fetch lands after the rows were rendered from `top`.
        nav.client().fetch_all().await.unwrap();
        assert_eq!(nav.client().snapshot()[0].name, "Beta");

        let opened = nav.select(&top, 0).await.unwrap().state;
        assert_eq!(opened.current_torrent().unwrap().name, "Alpha");
        assert_eq!(nav.view(&top).unwrap().rows[0].label, "Alpha (1 file)");

        // A state that has seen the new snapshot resolves against it.
        let latest = nav.enter(&nav.set_search_term(&top, "").unwrap()).await.unwrap().state;
        let opened = nav.select(&latest, 0).await.unwrap().state;
        assert_eq!(opened.current_torrent().unwrap().name, "Beta");
    }

    #[tokio::test]
    async fn test_watch_markers_on_file_rows() {
        let nav = navigator(vec![one_piece()]);
        let root = nav.select(&entered(&nav).await, 0).await.unwrap().state;
        let episode = nav.select(&root, 0).await.unwrap().state;

        let subs = nav.select(&episode, 0).await.unwrap();
        nav.mark_watched(subs.chosen().unwrap(), WatchStatus::InProgress);
        assert_eq!(nav.toggle_completed(&episode, 1).unwrap(), Some(WatchStatus::Completed));

        let view = nav.view(&episode).unwrap();
        insta::assert_snapshot!(view.labels(), @r"
        Subs.srt (20.0 KB) ●
        Video.mkv (700.0 MB) ✓
        ");
        assert_eq!(view.rows[1].watch, Some(WatchStatus::Completed));

        let err = nav.toggle_completed(&root, 0).unwrap_err();
        assert!(matches!(err, SessionError::NotAFile { ref name } if name == "Episode 1"));
        let err = nav.toggle_completed(&nav.back(&root), 0).unwrap_err();
        assert!(err.is_ignorable());

        assert_eq!(nav.toggle_completed(&episode, 1).unwrap(), None);
        nav.clear_watched();
        assert!(nav.watch_log().is_empty());
        insta::assert_snapshot!(nav.view(&episode).unwrap().labels(), @r"
        Subs.srt (20.0 KB)
        Video.mkv (700.0 MB)
        ");
    }
}
