//! CLI entry point for torbox-browse.
//!
//! Browse the torrents in a TorBox account as folders, pick a file and
//! stream it in a media player.
//!
//! # Usage
//!
//! ```bash
//! torbox-browse [OPTIONS] [COMMAND]
//!
//! # Interactive browser (the default)
//! TORBOX_API_KEY=... torbox-browse
//!
//! # Print the listing, filtered by name
//! torbox-browse list --search "one piece"
//!
//! # Print one directory of a torrent
//! torbox-browse tree 12345 --path "Season 1"
//!
//! # Work from a saved listing response, without the network
//! torbox-browse --listing-file mylist.json tree 12345
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod player;

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use serde::Serialize;
use tb_client::{FixtureSource, ListingClient, PageSource, TorBoxApi};
use tb_core::{Config, ConfigError, SegmentCase, TorrentId, TorrentRecord, format_size};
use tb_session::{NavigationState, Navigator, SessionEvent, Step, WatchStatus};
use tb_tree::TreeBuilder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Browse TorBox torrents as folders and stream files in a media player.
#[derive(Parser)]
#[command(name = "torbox-browse", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute (defaults to `browse`).
    #[command(subcommand)]
    command: Option<Commands>,

    /// TorBox API key.
    #[arg(long, global = true, env = "TORBOX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "TORBOX_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// API base URL (overrides the configuration file).
    #[arg(long, global = true, env = "TORBOX_BASE_URL")]
    base_url: Option<String>,

    /// Read the listing from a saved `mylist` response instead of the API.
    #[arg(long, global = true)]
    listing_file: Option<Utf8PathBuf>,

    /// Keep each torrent's top-level folder instead of stripping it.
    #[arg(long, global = true)]
    keep_root: bool,

    /// Merge folders whose names differ only by case.
    #[arg(long, global = true)]
    case_insensitive: bool,

    /// Write logs to this file (the browser never logs to the terminal).
    #[arg(long, global = true)]
    log_file: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Clone)]
enum Commands {
    /// Open the interactive browser.
    Browse {
        /// Print the chosen file instead of starting the player.
        #[arg(long)]
        no_play: bool,
    },

    /// Print the torrents in the account.
    List {
        /// Only torrents whose name contains this (case-insensitive).
        #[arg(short, long)]
        search: Option<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print one directory level of a torrent.
    Tree {
        /// Torrent id.
        id: String,

        /// Directory inside the torrent, `/`-separated.
        #[arg(short, long)]
        path: Option<String>,
    },
}

/// Output format for `list`.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One torrent per line.
    Text,
    /// A JSON array.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Where log lines go.
enum LogSink {
    Stderr,
    File(std::fs::File),
    Off,
}

/// Initializes the tracing subscriber.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose`, or
/// `info`. HTTP and I/O plumbing crates are held at `warn`.
fn init_tracing(verbose: bool, no_color: bool, sink: LogSink) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!(
            "{level},hyper=warn,hyper_util=warn,reqwest=warn,mio=warn"
        ))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    match sink {
        LogSink::Stderr => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(use_ansi)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init(),
        LogSink::File(file) => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .with(filter)
            .init(),
        LogSink::Off => {}
    }
}

/// Picks the log sink: a file when asked for one, nothing while the browser
/// owns the terminal, stderr otherwise.
fn log_sink(cli: &Cli, interactive: bool) -> color_eyre::Result<LogSink> {
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("cannot open log file {path}"))?;
            Ok(LogSink::File(file))
        }
        None if interactive => Ok(LogSink::Off),
        None => Ok(LogSink::Stderr),
    }
}

/// Builds the [`Config`]: defaults, then the config file, then flags and
/// environment.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if cli.keep_root {
        config.tree.strip_root_segment = false;
    }
    if cli.case_insensitive {
        config.tree.case = SegmentCase::Insensitive;
    }

    config.validate()?;
    Ok(config)
}

/// Creates the API client when a key is available.
fn build_api(cli: &Cli, config: &Config) -> color_eyre::Result<Option<TorBoxApi>> {
    match cli.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Some(TorBoxApi::new(&config.api, key)?)),
        _ => Ok(None),
    }
}

fn load_listing_file(path: &Utf8Path) -> color_eyre::Result<FixtureSource> {
    let source = FixtureSource::load(path)
        .wrap_err_with(|| format!("failed to read listing file {path}"))?;
    info!(path = %path, torrents = source.len(), "Loaded listing file");
    Ok(source)
}

fn navigator<S: PageSource>(source: S, config: &Config) -> Arc<Navigator<S>> {
    Arc::new(Navigator::new(
        ListingClient::new(source, config.api.clone()),
        Arc::new(TreeBuilder::new(config.tree)),
    ))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn run_command<S: PageSource>(
    command: Commands,
    config: &Config,
    navigator: Arc<Navigator<S>>,
    api: Option<&TorBoxApi>,
) -> color_eyre::Result<()> {
    match command {
        Commands::Browse { no_play } => run_browse(config, navigator, api, no_play).await,
        Commands::List { search, format } => {
            run_list(&navigator, search.as_deref().unwrap_or_default(), format).await
        }
        Commands::Tree { id, path } => {
            run_tree(&navigator, &TorrentId::from(id), path.as_deref().unwrap_or_default()).await
        }
    }
}

/// Runs the interactive browser; each chosen file is played and the browser
/// comes back, in the same folder, when the player exits.
async fn run_browse<S: PageSource>(
    config: &Config,
    navigator: Arc<Navigator<S>>,
    api: Option<&TorBoxApi>,
    no_play: bool,
) -> color_eyre::Result<()> {
    info!("Starting browser");
    let mut state = NavigationState::new();
    loop {
        let Some(exit) = run_tui_until_signal(config, Arc::clone(&navigator), state).await? else {
            return Ok(());
        };
        state = exit.state;
        let Some(chosen) = exit.chosen else {
            return Ok(());
        };

        let mut stdout = std::io::stdout().lock();
        if no_play {
            writeln!(
                stdout,
                "{}\t{}\t{}",
                chosen.torrent_id,
                chosen.file_id.map_or_else(|| "-".to_owned(), |id| id.to_string()),
                chosen.full_path
            )?;
            return Ok(());
        }

        let Some(api) = api else {
            return Err(ConfigError::MissingToken).wrap_err("playback needs an API key");
        };
        writeln!(stdout, "Starting {} for {}", config.player.command, chosen.file_name())?;
        drop(stdout);

        match player::play(api, &config.player, &chosen).await {
            Ok(()) => navigator.mark_watched(&chosen, WatchStatus::InProgress),
            Err(e) => {
                warn!(error = %e, "Playback failed");
                writeln!(std::io::stderr().lock(), "Playback failed: {e:#}")?;
            }
        }
    }
}

/// Runs the TUI, stopping early on SIGTERM.
async fn run_tui_until_signal<S: PageSource>(
    config: &Config,
    navigator: Arc<Navigator<S>>,
    state: NavigationState,
) -> color_eyre::Result<Option<tb_tui::Exit>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tb_tui::run(config.tui, navigator, state) => {
                result.map(Some).map_err(|e| eyre!("TUI error: {e}"))
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                Ok(None)
            }
        }
    }

    #[cfg(not(unix))]
    {
        tb_tui::run(config.tui, navigator, state)
            .await
            .map(Some)
            .map_err(|e| eyre!("TUI error: {e}"))
    }
}

/// One line of `list` output.
#[derive(Debug, Serialize)]
struct ListingEntry<'a> {
    id: &'a str,
    name: &'a str,
    file_count: usize,
    total_size: u64,
}

impl<'a> From<&'a TorrentRecord> for ListingEntry<'a> {
    fn from(record: &'a TorrentRecord) -> Self {
        Self {
            id: record.id.as_str(),
            name: &record.name,
            file_count: record.file_count,
            total_size: record.total_size(),
        }
    }
}

async fn run_list<S: PageSource>(
    navigator: &Navigator<S>,
    search: &str,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    let state = enter(navigator).await?;
    let state = navigator.set_search_term(&state, search)?;
    let matches = navigator.matches(&state);
    info!(matches = matches.len(), "Listing torrents");

    let content = match format {
        OutputFormat::Text => format_listing(&matches),
        OutputFormat::Json => {
            let entries: Vec<ListingEntry<'_>> = matches.iter().map(ListingEntry::from).collect();
            let mut json = serde_json::to_string_pretty(&entries)?;
            json.push('\n');
            json
        }
    };

    write!(std::io::stdout().lock(), "{content}")?;
    Ok(())
}

fn format_listing(records: &[TorrentRecord]) -> String {
    let id_width = records.iter().map(|r| r.id.as_str().len()).max().unwrap_or(0);
    records
        .iter()
        .map(|r| {
            let noun = if r.file_count == 1 { "file" } else { "files" };
            format!(
                "{:>id_width$}  {}  ({} {noun}, {})\n",
                r.id.as_str(),
                r.name,
                r.file_count,
                format_size(r.total_size())
            )
        })
        .collect()
}

async fn run_tree<S: PageSource>(
    navigator: &Navigator<S>,
    id: &TorrentId,
    path: &str,
) -> color_eyre::Result<()> {
    let state = open_path(navigator, id, path).await?;
    let view = navigator.view(&state)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", view.indicator)?;
    writeln!(stdout, "{}", view.labels())?;
    Ok(())
}

/// Opens torrent `id` and walks `path`, matching folder names the way the
/// tree was built (case-insensitively if so configured).
async fn open_path<S: PageSource>(
    navigator: &Navigator<S>,
    id: &TorrentId,
    path: &str,
) -> color_eyre::Result<NavigationState> {
    let state = enter(navigator).await?;
    let index = navigator
        .matches(&state)
        .iter()
        .position(|record| &record.id == id)
        .ok_or_else(|| eyre!("no torrent with id {id}"))?;
    let mut state = navigator.select(&state, index).await?.state;

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let index = folder_index(&state, segment)
            .ok_or_else(|| eyre!("no folder named '{segment}' in {}", describe(navigator, &state)))?;
        state = navigator.select(&state, index).await?.state;
    }
    Ok(state)
}

/// Row index of folder `segment` in the current directory.
fn folder_index(state: &NavigationState, segment: &str) -> Option<usize> {
    let case = state.current_torrent()?.tree().case();
    let dir = state.current_dir()?;
    let target = dir.child(segment, case).filter(|node| node.is_dir())?;
    dir.list_children()
        .iter()
        .position(|child| std::ptr::eq(*child, target))
}

fn describe<S: PageSource>(navigator: &Navigator<S>, state: &NavigationState) -> String {
    navigator
        .view(state)
        .map_or_else(|_| "this torrent".to_owned(), |view| view.indicator.to_string())
}

/// Enters the top level and reports torrents skipped for bad data.
async fn enter<S: PageSource>(navigator: &Navigator<S>) -> color_eyre::Result<NavigationState> {
    let Step { state, event } = navigator.enter(&NavigationState::new()).await?;
    if let Some(SessionEvent::ListingRefreshed { skipped, .. }) = event {
        for error in skipped.iter() {
            warn!(error = %error, "Skipped torrent");
        }
    }
    Ok(state)
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let command = cli
        .command
        .clone()
        .unwrap_or(Commands::Browse { no_play: false });

    let interactive = matches!(command, Commands::Browse { .. });
    init_tracing(cli.verbose, cli.no_color, log_sink(&cli, interactive)?);

    let config = build_config(&cli)?;
    let api = build_api(&cli, &config)?;

    match &cli.listing_file {
        Some(path) => {
            let navigator = navigator(load_listing_file(path)?, &config);
            run_command(command, &config, navigator, api.as_ref()).await
        }
        None => {
            let Some(api) = api else {
                return Err(ConfigError::MissingToken.into());
            };
            info!(base_url = api.base_url(), "Using TorBox API");
            let navigator = navigator(api.clone(), &config);
            run_command(command, &config, navigator, Some(&api)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tb_core::RawFileEntry;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("torbox-browse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_browse() {
        let cli = parse(&["--listing-file", "mylist.json"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.listing_file.as_deref(), Some(Utf8Path::new("mylist.json")));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api": {{"base_url": "https://file.example/api", "page_size": 50}}}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let cli = parse(&["--config", path, "list"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.api.base_url, "https://file.example/api");
        assert_eq!(config.api.page_size, 50);
        assert!(config.tree.strip_root_segment);

        let cli = parse(&[
            "--config",
            path,
            "--base-url",
            "https://flag.example/api",
            "--keep-root",
            "--case-insensitive",
            "list",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.api.base_url, "https://flag.example/api");
        assert_eq!(config.api.page_size, 50);
        assert!(!config.tree.strip_root_segment);
        assert_eq!(config.tree.case, SegmentCase::Insensitive);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api": {{"page_size": 0}}}}"#).unwrap();
        let cli = parse(&["--config", file.path().to_str().unwrap(), "list"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_blank_api_key_means_none() {
        let cli = parse(&["--api-key", "  ", "list"]);
        assert!(build_api(&cli, &Config::default()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tree_path_follows_case_setting() {
        let listing = || {
            FixtureSource::new(vec![serde_json::json!({
                "id": 5, "name": "Show",
                "files": [{"id": 0, "name": "Show/Season 1/E01.mkv", "size": 10}],
            })])
        };
        let id = TorrentId::from(5_u64);

        let config = build_config(&parse(&["--case-insensitive", "tree", "5"])).unwrap();
        let nav = navigator(listing(), &config);
        let state = open_path(&nav, &id, "season 1").await.unwrap();
        assert_eq!(state.current_path(), ["Season 1"]);
        assert_eq!(nav.view(&state).unwrap().labels(), "E01.mkv (10.0 B)");

        let config = build_config(&parse(&["tree", "5"])).unwrap();
        let nav = navigator(listing(), &config);
        let err = open_path(&nav, &id, "season 1").await.unwrap_err();
        assert!(err.to_string().contains("no folder named 'season 1'"));
        assert_eq!(open_path(&nav, &id, "/Season 1/").await.unwrap().current_path(), ["Season 1"]);
    }

    #[test]
    fn test_format_listing() {
        let id = TorrentId::from(7_u64);
        let entry = |path: &str, size| RawFileEntry {
            torrent_id: id.clone(),
            file_id: Some(0),
            path: path.to_owned(),
            size,
        };
        let show = vec![entry("Show/a.mkv", 1024), entry("Show/b.mkv", 1024)];
        let records = vec![
            TorrentRecord::new(id.clone(), "Show", show),
            TorrentRecord::new(TorrentId::from(1234_u64), "Film", vec![entry("Film.mkv", 10)]),
        ];
        assert_eq!(
            format_listing(&records),
            "   7  Show  (2 files, 2.0 KB)\n1234  Film  (1 file, 10.0 B)\n"
        );
    }
}
