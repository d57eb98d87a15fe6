use anyhow::{Context, Result};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};
use crate::browser::Action;
use crate::filter::Tab;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Hand a URL to the platform opener.
pub fn open_in_browser(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to launch {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return;
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return;
      }
      KeyCode::Char('r') => {
        app.trigger_catalog_load();
        return;
      }
      _ => {}
    }
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key),
    AppMode::Search => handle_search_key(app, key),
    AppMode::Detail => handle_detail_key(app, key),
  }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
  let selected_id = app.selected_entry().map(|e| e.id.clone());
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
    KeyCode::Right | KeyCode::Char('l') => app.move_chip(true),
    KeyCode::Left | KeyCode::Char('h') => app.move_chip(false),
    KeyCode::Enter => {
      if let Some(tag) = app.focused_chip() {
        app.dispatch(Action::SetTag(Some(tag)));
      } else if let Some(id) = selected_id {
        app.dispatch(Action::OpenDetail(id));
      }
    }
    KeyCode::Char('f') | KeyCode::Char(' ') => {
      if let Some(id) = selected_id {
        app.dispatch(Action::ToggleFavorite(id));
      }
    }
    KeyCode::Char('o') => {
      if let Some(id) = selected_id {
        app.dispatch(Action::OpenLink(id));
      }
    }
    KeyCode::Tab => {
      let tab = app.browser.filter().tab().other();
      app.dispatch(Action::SetTab(tab));
    }
    KeyCode::Char('1') => app.dispatch(Action::SetTab(Tab::All)),
    KeyCode::Char('2') => app.dispatch(Action::SetTab(Tab::Favorites)),
    KeyCode::Char('x') => app.dispatch(Action::SetTag(None)),
    KeyCode::Char('/') => {
      app.clear_error();
      app.mode = AppMode::Search;
    }
    KeyCode::Esc => {
      if app.browser.filter().active_tag().is_some() {
        app.dispatch(Action::SetTag(None));
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
  let edited = match key.code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      true
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        true
      } else {
        false
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        true
      } else {
        false
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
      false
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
      false
    }
    KeyCode::Home => {
      app.cursor_position = 0;
      false
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
      false
    }
    KeyCode::Down => {
      app.suggestion_next();
      false
    }
    KeyCode::Up => {
      app.suggestion_prev();
      false
    }
    KeyCode::Enter => {
      match app.selected_suggestion() {
        Some(suggestion) => app.dispatch(Action::PickSuggestion(suggestion)),
        None => app.mode = AppMode::Browse,
      }
      false
    }
    KeyCode::Esc => {
      app.mode = AppMode::Browse;
      false
    }
    _ => false,
  };

  if edited {
    app.dispatch(Action::SetQuery(app.input.clone()));
  }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
  let open_id = app.browser.detail().map(|d| d.entry_id.clone());
  match key.code {
    KeyCode::Right | KeyCode::Char('l') => app.dispatch(Action::NextImage),
    KeyCode::Left | KeyCode::Char('h') => app.dispatch(Action::PrevImage),
    KeyCode::Tab => app.move_chip(true),
    KeyCode::BackTab => app.move_chip(false),
    KeyCode::Enter => {
      if let Some(tag) = app.focused_chip() {
        app.dispatch(Action::SetTag(Some(tag)));
      }
    }
    KeyCode::Char('f') => {
      if let Some(id) = open_id {
        app.dispatch(Action::ToggleFavorite(id));
      }
    }
    KeyCode::Char('o') => {
      if let Some(id) = open_id {
        app.dispatch(Action::OpenLink(id));
      }
    }
    KeyCode::Esc | KeyCode::Char('q') => app.dispatch(Action::CloseDetail),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::test_app;
  use crate::catalog::entry;

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  fn sample() -> App {
    test_app(vec![
      entry("maps", "Google Maps", &["navigation"]),
      entry("waze", "Waze", &["navigation", "traffic"]),
      entry("docs", "Google Docs", &["office"]),
    ])
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日";
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
    assert_eq!(char_to_byte_index("", 5), 0);
  }

  // --- Browse ---

  #[test]
  fn favorite_then_favorites_tab() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Tab);
    let ids: Vec<&str> = app.browser.visible().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["waze"]);
    assert_eq!(app.browser.favorites().count(), 1);
    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.browser.visible_len(), 3);
  }

  #[test]
  fn chip_enter_applies_tag_and_esc_clears_it() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('l'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.browser.filter().active_tag(), Some("navigation"));
    assert_eq!(app.browser.visible_len(), 2);
    assert_eq!(app.mode, AppMode::Browse);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.browser.filter().active_tag(), None);
    assert!(!app.should_quit);
    press(&mut app, KeyCode::Esc);
    assert!(app.should_quit);
  }

  #[test]
  fn enter_without_chip_opens_detail() {
    let mut app = sample();
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode, AppMode::Detail);
    assert_eq!(app.browser.detail().map(|d| d.entry_id.as_str()), Some("maps"));
  }

  // --- Search ---

  #[test]
  fn typing_updates_query_and_suggestions() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.mode, AppMode::Search);
    type_str(&mut app, "nav");
    assert_eq!(app.browser.filter().query(), "nav");
    assert_eq!(app.browser.suggestions().len(), 1);
    assert_eq!(app.browser.visible_len(), 3);

    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Backspace);
    assert!(app.browser.suggestions().is_hidden());
  }

  #[test]
  fn picking_tag_suggestion_filters_list() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "traf");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.browser.filter().active_tag(), Some("traffic"));
    assert_eq!(app.input, "");
    assert_eq!(app.mode, AppMode::Browse);
    let ids: Vec<&str> = app.browser.visible().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["waze"]);
  }

  #[test]
  fn picking_card_suggestion_queues_url() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "google");
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.take_pending_urls(), vec!["https://example.com/docs".to_string()]);
    assert_eq!(app.browser.detail(), None);
  }

  #[test]
  fn search_keys_do_not_trigger_browse_bindings() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "fq");
    assert!(!app.should_quit);
    assert_eq!(app.browser.favorites().count(), 0);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, AppMode::Browse);
    assert_eq!(app.input, "fq");
  }

  // --- Detail ---

  #[test]
  fn detail_chip_selects_tag_and_closes() {
    let mut app = sample();
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.browser.filter().active_tag(), Some("traffic"));
    assert_eq!(app.mode, AppMode::Browse);
    assert!(app.browser.detail().is_none());
  }

  #[test]
  fn detail_favorite_and_close() {
    let mut app = sample();
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('f'));
    assert!(app.browser.favorites().contains("maps"));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, AppMode::Browse);
    assert!(app.browser.detail().is_none());
  }
}
