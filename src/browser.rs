//! Application state and the single entry point for changing it.
//!
//! Every user action is an [`Action`]; [`Browser::dispatch`] applies it,
//! refreshes the suggestions, and hands back any [`Effect`] the shell has to
//! carry out. The visible list is re-resolved from current state on every read.

use tracing::{debug, info};

use crate::carousel::Carousel;
use crate::catalog::{Catalog, Entry};
use crate::favorites::Favorites;
use crate::filter::{FilterState, Tab};
use crate::search::{Suggestion, Suggestions, search};
use crate::view::resolve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  SetTab(Tab),
  SetTag(Option<String>),
  SetQuery(String),
  ToggleFavorite(String),
  OpenDetail(String),
  CloseDetail,
  NextImage,
  PrevImage,
  PickSuggestion(Suggestion),
  OpenLink(String),
  CatalogLoaded(Vec<Entry>),
}

/// Work the shell performs on behalf of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  OpenUrl(String),
}

/// The open detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
  pub entry_id: String,
  pub carousel: Carousel,
}

pub struct Browser {
  catalog: Catalog,
  favorites: Favorites,
  filter: FilterState,
  suggestions: Suggestions,
  detail: Option<Detail>,
}

impl Browser {
  pub fn new(favorites: Favorites) -> Self {
    Self {
      catalog: Catalog::default(),
      favorites,
      filter: FilterState::default(),
      suggestions: Suggestions::Hidden,
      detail: None,
    }
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  pub fn favorites(&self) -> &Favorites {
    &self.favorites
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  pub fn suggestions(&self) -> &Suggestions {
    &self.suggestions
  }

  pub fn detail(&self) -> Option<&Detail> {
    self.detail.as_ref()
  }

  /// The open entry together with its carousel.
  pub fn detail_entry(&self) -> Option<(&Entry, &Carousel)> {
    let detail = self.detail.as_ref()?;
    self.catalog.get(&detail.entry_id).map(|e| (e, &detail.carousel))
  }

  /// Visible entries, in catalog order.
  pub fn visible(&self) -> Vec<&Entry> {
    resolve(&self.catalog, &self.favorites, &self.filter)
  }

  pub fn visible_len(&self) -> usize {
    self.visible().len()
  }

  pub fn visible_at(&self, position: usize) -> Option<&Entry> {
    self.visible().get(position).copied()
  }

  pub fn take_write_error(&mut self) -> Option<String> {
    self.favorites.take_write_error()
  }

  pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
    debug!(?action, "dispatch");
    match action {
      Action::SetTab(tab) => {
        self.filter.set_tab(tab);
        None
      }
      Action::SetTag(tag) => {
        self.apply_tag(tag);
        None
      }
      Action::SetQuery(text) => {
        self.filter.set_query(&text);
        self.suggestions = search(&self.catalog, self.filter.query());
        None
      }
      Action::ToggleFavorite(id) => {
        let member = self.favorites.toggle(&id);
        info!(id = %id, member, count = self.favorites.count(), "favorites: toggled");
        None
      }
      Action::OpenDetail(id) => {
        self.detail = self.catalog.get(&id).map(|e| Detail { entry_id: e.id.clone(), carousel: Carousel::for_entry(e) });
        None
      }
      Action::CloseDetail => {
        self.detail = None;
        None
      }
      Action::NextImage => {
        if let Some(d) = self.detail.as_mut() {
          d.carousel.next();
        }
        None
      }
      Action::PrevImage => {
        if let Some(d) = self.detail.as_mut() {
          d.carousel.prev();
        }
        None
      }
      Action::PickSuggestion(Suggestion::Tag(tag)) => {
        self.apply_tag(Some(tag));
        None
      }
      Action::PickSuggestion(Suggestion::Card(card)) => {
        debug!(id = %card.id, "search: card picked");
        Some(Effect::OpenUrl(card.url))
      }
      Action::OpenLink(id) => self.catalog.get(&id).map(|e| Effect::OpenUrl(e.url.clone())),
      Action::CatalogLoaded(entries) => {
        self.catalog = Catalog::from_entries(entries);
        self.detail = None;
        self.suggestions = search(&self.catalog, self.filter.query());
        info!(entries = self.catalog.len(), "catalog: loaded");
        None
      }
    }
  }

  fn apply_tag(&mut self, tag: Option<String>) {
    let transition = self.filter.set_tag(tag);
    if transition.close_detail {
      self.detail = None;
    }
    if transition.query_cleared {
      self.suggestions = Suggestions::Hidden;
    }
  }
}
