use anyhow::Result;
use image::DynamicImage;
use ratatui::widgets::ListState;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::browser::{Action, Browser, Effect};
use crate::catalog::Entry;
use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::favorites::Favorites;
use crate::remote::{CatalogSource, fetch_catalog, fetch_image};
use crate::search::Suggestion;
use crate::theme::{THEMES, Theme};

// --- Types ---

pub type CatalogResult = Result<Vec<Entry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Navigating the visible list.
  Browse,
  /// Typing in the search box; the dropdown follows the query.
  Search,
  /// Detail view of one entry with its carousel.
  Detail,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) catalog_rx: Option<oneshot::Receiver<CatalogResult>>,
  pub(crate) image_rx: Option<(String, oneshot::Receiver<Result<DynamicImage>>)>,
}

/// Carousel images of the open entry by URL, plus the last resized copy handed
/// to the renderer. Failed URLs are remembered for the session.
#[derive(Default)]
pub struct ImageCache {
  pub loaded: HashMap<String, DynamicImage>,
  pub failed: HashSet<String>,
  pub resized: Option<(String, u16, u16, DynamicImage)>,
}

pub struct App {
  pub browser: Browser,
  pub mode: AppMode,
  pub list_state: ListState,
  /// Focused tag chip of the selected card (Browse) or open entry (Detail).
  pub chip: Option<usize>,
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub suggestion_state: ListState,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub source: CatalogSource,
  pub loading: bool,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  pub images: ImageCache,
  pub(crate) tasks: AsyncTasks,
  pub(crate) pending_urls: Vec<String>,
  http_client: Client,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(favorites: Favorites, source: CatalogSource, display_mode: DisplayMode, theme_index: usize) -> Self {
    Self {
      browser: Browser::new(favorites),
      mode: AppMode::Browse,
      list_state: ListState::default(),
      chip: None,
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      suggestion_state: ListState::default(),
      theme_index: theme_index.min(THEMES.len() - 1),
      display_mode,
      source,
      loading: false,
      last_error: None,
      status_message: None,
      should_quit: false,
      images: ImageCache::default(),
      tasks: AsyncTasks::default(),
      pending_urls: Vec::new(),
      http_client: Client::new(),
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is clamped on construction and advanced modulo THEMES.len().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.clear_error();
    }
  }

  /// URLs queued for the external browser since the last call.
  pub fn take_pending_urls(&mut self) -> Vec<String> {
    std::mem::take(&mut self.pending_urls)
  }

  // --- State changes ---

  /// Apply an action and bring every UI-only field back in line with the new state.
  pub fn dispatch(&mut self, action: Action) {
    let resets_chip = matches!(
      action,
      Action::SetTab(_) | Action::SetTag(_) | Action::OpenDetail(_) | Action::CloseDetail | Action::CatalogLoaded(_)
    );

    if let Some(Effect::OpenUrl(url)) = self.browser.dispatch(action) {
      info!(url = %url, "opening link");
      self.pending_urls.push(url);
    }

    if let Some(msg) = self.browser.take_write_error() {
      self.set_error(format!("Favorites not saved: {}", msg));
    }

    if resets_chip {
      self.chip = None;
    }
    self.sync_input();
    self.sync_mode();
    self.clamp_selection();
    self.clamp_suggestion();
    self.prune_images();
    self.sync_image();
  }

  /// A tag selection clears the query; mirror that in the input buffer.
  fn sync_input(&mut self) {
    if self.browser.filter().query().is_empty() && !self.input.trim().is_empty() {
      self.input.clear();
      self.cursor_position = 0;
      self.input_scroll = 0;
      if self.mode == AppMode::Search {
        self.mode = AppMode::Browse;
      }
    }
  }

  fn sync_mode(&mut self) {
    match (self.mode, self.browser.detail().is_some()) {
      (AppMode::Detail, false) => self.mode = AppMode::Browse,
      (AppMode::Browse | AppMode::Search, true) => self.mode = AppMode::Detail,
      _ => {}
    }
  }

  fn clamp_selection(&mut self) {
    let len = self.browser.visible_len();
    if len == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(len - 1)));
    }
  }

  fn clamp_suggestion(&mut self) {
    let len = self.browser.suggestions().len();
    if len == 0 {
      self.suggestion_state.select(None);
    } else {
      let sel = self.suggestion_state.selected().unwrap_or(0);
      self.suggestion_state.select(Some(sel.min(len - 1)));
    }
  }

  pub fn selected_entry(&self) -> Option<&Entry> {
    self.list_state.selected().and_then(|i| self.browser.visible_at(i))
  }

  pub fn selected_suggestion(&self) -> Option<Suggestion> {
    let i = self.suggestion_state.selected()?;
    self.browser.suggestions().items().into_iter().nth(i)
  }

  /// Tags the chip cursor moves over in the current mode.
  pub fn chip_tags(&self) -> Vec<String> {
    match self.mode {
      AppMode::Detail => self.browser.detail_entry().map(|(e, _)| e.tags.clone()).unwrap_or_default(),
      _ => self.selected_entry().map(|e| e.tags.clone()).unwrap_or_default(),
    }
  }

  pub fn focused_chip(&self) -> Option<String> {
    self.chip.and_then(|i| self.chip_tags().into_iter().nth(i))
  }

  /// Step the chip cursor, wrapping. `None` is the slot before the first chip.
  pub fn move_chip(&mut self, forward: bool) {
    let count = self.chip_tags().len();
    if count == 0 {
      self.chip = None;
      return;
    }
    self.chip = match (self.chip, forward) {
      (None, true) => Some(0),
      (None, false) => Some(count - 1),
      (Some(i), true) if i + 1 >= count => None,
      (Some(i), true) => Some(i + 1),
      (Some(0), false) => None,
      (Some(i), false) => Some(i - 1),
    };
  }

  pub fn select_next(&mut self) {
    let count = self.browser.visible_len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
      self.chip = None;
    }
  }

  pub fn select_prev(&mut self) {
    let count = self.browser.visible_len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
      self.chip = None;
    }
  }

  pub fn suggestion_next(&mut self) {
    let count = self.browser.suggestions().len();
    if count > 0 {
      let i = self.suggestion_state.selected().map_or(0, |i| (i + 1) % count);
      self.suggestion_state.select(Some(i));
    }
  }

  pub fn suggestion_prev(&mut self) {
    let count = self.browser.suggestions().len();
    if count > 0 {
      let i = self.suggestion_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.suggestion_state.select(Some(i));
    }
  }

  // --- Async work ---

  /// Start (or restart) the catalog fetch. The current catalog stays until the new one arrives.
  pub fn trigger_catalog_load(&mut self) {
    self.clear_error();
    self.loading = true;
    self.status_message = Some(format!("Loading catalog from {}…", self.source.label()));

    let client = self.http_client.clone();
    let source = self.source.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_catalog(&client, &source).await);
    });
    self.tasks.catalog_rx = Some(rx);
  }

  /// Drop decoded images that do not belong to the open entry.
  fn prune_images(&mut self) {
    let keep: HashSet<&str> = self
      .browser
      .detail_entry()
      .map(|(e, _)| e.images.iter().map(String::as_str).collect())
      .unwrap_or_default();
    self.images.loaded.retain(|url, _| keep.contains(url.as_str()));
    if self.images.resized.as_ref().is_some_and(|(url, ..)| !keep.contains(url.as_str())) {
      self.images.resized = None;
    }
  }

  /// Fetch the image under the carousel cursor if it is neither cached nor known bad.
  fn sync_image(&mut self) {
    let Some(url) = self.browser.detail_entry().and_then(|(e, c)| c.current(e)).map(str::to_string) else {
      return;
    };
    if self.images.loaded.contains_key(&url) || self.images.failed.contains(&url) {
      return;
    }
    if self.tasks.image_rx.as_ref().is_some_and(|(pending, _)| *pending == url) {
      return;
    }
    let client = self.http_client.clone();
    let fetch_url = self.source.resolve_image(&url);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(fetch_image(&client, &fetch_url).await);
    });
    self.tasks.image_rx = Some((url, rx));
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.catalog_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.loading = false;
          self.status_message = None;
          match result {
            Ok(entries) => self.dispatch(Action::CatalogLoaded(entries)),
            Err(e) => {
              error!(err = %format!("{:#}", e), source = %self.source.label(), "catalog: load failed");
              self.set_error(format!("Catalog unavailable: {:#}", e));
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.catalog_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.loading = false;
          self.status_message = None;
          self.set_error("Catalog task failed.".to_string());
        }
      }
    }

    if let Some((url, mut rx)) = self.tasks.image_rx.take() {
      match rx.try_recv() {
        Ok(Ok(image)) => {
          self.images.loaded.insert(url, image);
        }
        Ok(Err(e)) => {
          warn!(url = %url, err = %format!("{:#}", e), "carousel: image fetch failed");
          self.images.failed.insert(url);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.image_rx = Some((url, rx));
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.images.failed.insert(url);
        }
      }
      // The cursor may have moved while this one was in flight.
      if self.tasks.image_rx.is_none() {
        self.sync_image();
      }
    }
  }
}

#[cfg(test)]
pub(crate) fn test_app(entries: Vec<Entry>) -> App {
  let mut app = App::new(
    crate::favorites::testing::empty_favorites(),
    CatalogSource::File("catalog.json".into()),
    DisplayMode::Ascii,
    0,
  );
  app.dispatch(Action::CatalogLoaded(entries));
  app
}
