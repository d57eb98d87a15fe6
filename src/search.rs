use std::collections::HashSet;

use crate::catalog::Catalog;

/// A title hit, carrying what the dropdown needs to open the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMatch {
  pub id: String,
  pub title: String,
  pub url: String,
}

/// One selectable row in the suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
  Tag(String),
  Card(CardMatch),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Suggestions {
  /// No query; the dropdown is hidden.
  #[default]
  Hidden,
  /// A query was given. Both lists empty means "no results", which is still shown.
  Matches { tags: Vec<String>, cards: Vec<CardMatch> },
}

impl Suggestions {
  pub fn is_hidden(&self) -> bool {
    matches!(self, Suggestions::Hidden)
  }

  pub fn is_no_results(&self) -> bool {
    matches!(self, Suggestions::Matches { tags, cards } if tags.is_empty() && cards.is_empty())
  }

  /// Dropdown rows: tags first, then cards.
  pub fn items(&self) -> Vec<Suggestion> {
    match self {
      Suggestions::Hidden => Vec::new(),
      Suggestions::Matches { tags, cards } => {
        tags.iter().cloned().map(Suggestion::Tag).chain(cards.iter().cloned().map(Suggestion::Card)).collect()
      }
    }
  }

  pub fn len(&self) -> usize {
    match self {
      Suggestions::Hidden => 0,
      Suggestions::Matches { tags, cards } => tags.len() + cards.len(),
    }
  }
}

/// Case-insensitive substring match of `query` against titles and tags.
pub fn search(catalog: &Catalog, query: &str) -> Suggestions {
  let query = query.trim();
  if query.is_empty() {
    return Suggestions::Hidden;
  }
  let needle = query.to_lowercase();

  let cards = catalog
    .entries()
    .iter()
    .filter(|e| e.title.to_lowercase().contains(&needle))
    .map(|e| CardMatch { id: e.id.clone(), title: e.title.clone(), url: e.url.clone() })
    .collect();

  let mut seen: HashSet<&str> = HashSet::new();
  let mut tags = Vec::new();
  for tag in catalog.entries().iter().flat_map(|e| e.tags.iter()) {
    if tag.to_lowercase().contains(&needle) && seen.insert(tag.as_str()) {
      tags.push(tag.clone());
    }
  }

  Suggestions::Matches { tags, cards }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::entry;

  fn sample() -> Catalog {
    Catalog::from_entries(vec![
      entry("maps", "Google Maps", &["navigation"]),
      entry("waze", "Waze", &["navigation", "Traffic"]),
      entry("docs", "Google Docs", &["office", "Navigation"]),
    ])
  }

  fn tags_and_cards(s: &Suggestions) -> (Vec<String>, Vec<String>) {
    match s {
      Suggestions::Matches { tags, cards } => (tags.clone(), cards.iter().map(|c| c.id.clone()).collect()),
      Suggestions::Hidden => panic!("expected matches"),
    }
  }

  #[test]
  fn title_match_without_tag_match() {
    let s = search(&sample(), "maps");
    let (tags, cards) = tags_and_cards(&s);
    assert!(tags.is_empty());
    assert_eq!(cards, vec!["maps"]);
  }

  #[test]
  fn tag_match_without_card_match() {
    let s = search(&sample(), "nav");
    let (tags, cards) = tags_and_cards(&s);
    assert_eq!(tags, vec!["navigation", "Navigation"]);
    assert!(cards.is_empty());
  }

  #[test]
  fn tags_dedupe_by_exact_string() {
    let catalog = Catalog::from_entries(vec![entry("a", "A", &["rust", "Rust"]), entry("b", "B", &["rust"])]);
    let (tags, _) = tags_and_cards(&search(&catalog, "RUST"));
    assert_eq!(tags, vec!["rust", "Rust"]);
  }

  #[test]
  fn cards_keep_catalog_order() {
    let s = search(&sample(), "google");
    let (_, cards) = tags_and_cards(&s);
    assert_eq!(cards, vec!["maps", "docs"]);
  }

  #[test]
  fn card_match_carries_url() {
    let s = search(&sample(), "waze");
    let Suggestions::Matches { cards, .. } = s else { panic!("expected matches") };
    assert_eq!(cards[0].url, "https://example.com/waze");
    assert_eq!(cards[0].title, "Waze");
  }

  #[test]
  fn blank_query_is_hidden_not_empty() {
    assert!(search(&sample(), "").is_hidden());
    assert!(search(&sample(), "   ").is_hidden());
  }

  #[test]
  fn zero_matches_is_no_results() {
    let s = search(&sample(), "zzz");
    assert!(!s.is_hidden());
    assert!(s.is_no_results());
    assert_eq!(s.len(), 0);
  }

  #[test]
  fn items_put_tags_before_cards() {
    let catalog = Catalog::from_entries(vec![entry("t", "Traffic Cams", &["traffic"])]);
    let items = search(&catalog, "traf").items();
    assert_eq!(items.len(), 2);
    assert!(matches!(&items[0], Suggestion::Tag(t) if t == "traffic"));
    assert!(matches!(&items[1], Suggestion::Card(c) if c.id == "t"));
  }
}
