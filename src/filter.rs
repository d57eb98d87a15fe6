//! The three filter dimensions and the rules that couple them.
//!
//! Tab, tag and query are set independently, with one coupling: choosing a
//! tag resets the tab to [`Tab::All`], clears the query and closes the detail
//! view. Every rule lives in [`FilterState::apply`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
  #[default]
  All,
  Favorites,
}

impl Tab {
  pub fn label(self) -> &'static str {
    match self {
      Tab::All => "All",
      Tab::Favorites => "Favorites",
    }
  }

  pub fn other(self) -> Self {
    match self {
      Tab::All => Tab::Favorites,
      Tab::Favorites => Tab::All,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
  SetTab(Tab),
  SetTag(String),
  ClearTag,
  SetQuery(String),
}

/// Side effects the caller must carry out after a filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
  pub close_detail: bool,
  pub query_cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
  tab: Tab,
  active_tag: Option<String>,
  /// Always stored trimmed; empty means no query.
  query: String,
}

impl FilterState {
  pub fn tab(&self) -> Tab {
    self.tab
  }

  pub fn active_tag(&self) -> Option<&str> {
    self.active_tag.as_deref()
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  /// Transition table:
  ///
  /// | action       | tab  | tag  | query   | detail |
  /// |--------------|------|------|---------|--------|
  /// | SetTab(t)    | t    | -    | -       | -      |
  /// | SetTag(x)    | All  | x    | cleared | closed |
  /// | ClearTag     | -    | none | -       | -      |
  /// | SetQuery(q)  | -    | -    | trim(q) | -      |
  pub fn apply(&mut self, action: FilterAction) -> Transition {
    match action {
      FilterAction::SetTab(tab) => {
        self.tab = tab;
        Transition::default()
      }
      FilterAction::SetTag(tag) => {
        self.active_tag = Some(tag);
        self.tab = Tab::All;
        self.query.clear();
        Transition { close_detail: true, query_cleared: true }
      }
      FilterAction::ClearTag => {
        self.active_tag = None;
        Transition::default()
      }
      FilterAction::SetQuery(text) => {
        self.query = text.trim().to_string();
        Transition::default()
      }
    }
  }

  pub fn set_tab(&mut self, tab: Tab) -> Transition {
    self.apply(FilterAction::SetTab(tab))
  }

  pub fn set_tag(&mut self, tag: Option<String>) -> Transition {
    match tag {
      Some(tag) => self.apply(FilterAction::SetTag(tag)),
      None => self.apply(FilterAction::ClearTag),
    }
  }

  pub fn set_query(&mut self, text: &str) -> Transition {
    self.apply(FilterAction::SetQuery(text.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_state() {
    let f = FilterState::default();
    assert_eq!(f.tab(), Tab::All);
    assert_eq!(f.active_tag(), None);
    assert_eq!(f.query(), "");
  }

  #[test]
  fn set_tab_touches_nothing_else() {
    let mut f = FilterState::default();
    f.set_query("abc");
    let t = f.set_tab(Tab::Favorites);
    assert_eq!(t, Transition::default());
    assert_eq!(f.tab(), Tab::Favorites);
    assert_eq!(f.query(), "abc");
  }

  #[test]
  fn set_tag_resets_tab_and_query() {
    let mut f = FilterState::default();
    f.set_tab(Tab::Favorites);
    f.set_query("maps");
    let t = f.set_tag(Some("Navigation".to_string()));
    assert!(t.close_detail);
    assert!(t.query_cleared);
    assert_eq!(f.tab(), Tab::All);
    assert_eq!(f.query(), "");
    assert_eq!(f.active_tag(), Some("Navigation"));
  }

  #[test]
  fn clearing_tag_keeps_tab_and_query() {
    let mut f = FilterState::default();
    f.set_tag(Some("x".to_string()));
    f.set_tab(Tab::Favorites);
    f.set_query("q");
    let t = f.set_tag(None);
    assert_eq!(t, Transition::default());
    assert_eq!(f.active_tag(), None);
    assert_eq!(f.tab(), Tab::Favorites);
    assert_eq!(f.query(), "q");
  }

  #[test]
  fn query_is_trimmed() {
    let mut f = FilterState::default();
    f.set_query("  google maps \t");
    assert_eq!(f.query(), "google maps");
    f.set_query("   ");
    assert_eq!(f.query(), "");
  }

  #[test]
  fn fresh_tag_wins_over_stale_query() {
    let mut f = FilterState::default();
    f.set_query("stale");
    f.set_tag(Some("a".to_string()));
    f.set_tag(Some("b".to_string()));
    assert_eq!(f.active_tag(), Some("b"));
    assert_eq!(f.query(), "");
  }

  #[test]
  fn tab_other_flips() {
    assert_eq!(Tab::All.other(), Tab::Favorites);
    assert_eq!(Tab::Favorites.other(), Tab::All);
  }
}
