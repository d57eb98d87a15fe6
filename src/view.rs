use crate::catalog::{Catalog, Entry};
use crate::favorites::Favorites;
use crate::filter::{FilterState, Tab};

/// The visible entries, in load order.
///
/// Tab first, then tag; the query never narrows the main list.
pub fn resolve<'a>(catalog: &'a Catalog, favorites: &Favorites, filter: &FilterState) -> Vec<&'a Entry> {
  let tag = filter.active_tag();
  catalog
    .entries()
    .iter()
    .filter(|e| filter.tab() == Tab::All || favorites.contains(&e.id))
    .filter(|e| tag.is_none_or(|t| e.has_tag(t)))
    .collect()
}
