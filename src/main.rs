mod app;
mod browser;
mod carousel;
mod catalog;
mod config;
mod constants;
mod display;
mod favorites;
mod filter;
mod input;
mod preview;
mod remote;
mod search;
mod theme;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use app::App;
use config::Config;
use constants::constants;
use display::{CliDisplayMode, DisplayMode};
use favorites::{Favorites, FavoritesStore, FileStore, NullStore};
use remote::CatalogSource;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Browse, search and bookmark a catalog of links", long_about = None)]
struct Args {
  /// Catalog JSON: an http(s) URL or a local file path
  #[arg(short, long)]
  source: Option<String>,

  /// Image display mode: 'auto', 'direct' (half-block) or 'ascii'
  #[arg(short, long)]
  display_mode: Option<CliDisplayMode>,

  /// Directory for the favorites slot (defaults to the platform data directory)
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Logging ---

/// File logging under `<data dir>/logs`; the terminal belongs to the UI.
fn init_logging(data_dir: Option<&std::path::Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
  use tracing_subscriber::{EnvFilter, fmt, prelude::*};

  let logs_dir = data_dir?.join("logs");
  std::fs::create_dir_all(&logs_dir).ok()?;

  let file_appender = tracing_appender::rolling::daily(&logs_dir, &constants().log_file_prefix);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&constants().default_log_filter));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(true))
    .init();

  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), &constants().app_name, &mut std::io::stdout());
    return Ok(());
  }

  let data_dir = args
    .data_dir
    .clone()
    .or_else(|| ProjectDirs::from("", "", &constants().app_name).map(|d| d.data_dir().to_path_buf()));
  let _log_guard = init_logging(data_dir.as_deref());
  info!(version = env!("CARGO_PKG_VERSION"), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args, data_dir).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args, data_dir: Option<PathBuf>) -> Result<()> {
  let config = Config::load();

  let cli_mode = args
    .display_mode
    .or_else(|| config.display_mode.as_deref().and_then(DisplayMode::from_config))
    .unwrap_or(CliDisplayMode::Auto);
  let display_mode = display::resolve_display_mode(cli_mode);
  let source = CatalogSource::parse(&config.catalog_source(args.source.as_deref()));

  let file_store = match data_dir {
    Some(dir) => Some(FileStore::new(&dir, &constants().favorites_slot)),
    None => FileStore::default_location(),
  };
  let store: Box<dyn FavoritesStore> = match file_store {
    Some(store) => {
      info!(path = %store.path().display(), "favorites: file store");
      Box::new(store)
    }
    None => {
      warn!("favorites: no data directory, favorites will not persist");
      Box::new(NullStore)
    }
  };
  let favorites = Favorites::load(store);

  let mut app = App::new(favorites, source, display_mode, theme::theme_index(config.theme_name.as_deref()));
  app.trigger_catalog_load();

  let poll = Duration::from_millis(constants().poll_interval_ms);
  loop {
    app.check_pending();
    app.expire_error();

    for url in app.take_pending_urls() {
      if let Err(e) = input::open_in_browser(&url) {
        warn!(url = %url, err = %format!("{:#}", e), "failed to open link");
        app.set_error(format!("Failed to open browser: {:#}", e));
      }
    }

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(poll).context("Failed to poll terminal events")? {
      match event::read().context("Failed to read terminal event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!(favorites = app.browser.favorites().count(), "exiting");
  Ok(())
}
