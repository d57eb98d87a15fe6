use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::constants;

// --- Persistence provider ---

/// A single named slot holding the favorite ids as a JSON array.
pub trait FavoritesStore {
  /// Raw slot contents, `None` when the slot has never been written.
  fn read(&self) -> Result<Option<String>>;
  fn write(&self, contents: &str) -> Result<()>;
}

/// Slot stored as `<dir>/<slot>.json`.
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  pub fn new(dir: &Path, slot: &str) -> Self {
    Self { path: dir.join(format!("{}.json", slot)) }
  }

  /// Slot in the platform data directory, if one can be determined.
  pub fn default_location() -> Option<Self> {
    let dirs = ProjectDirs::from("", "", &constants().app_name)?;
    Some(Self::new(dirs.data_dir(), &constants().favorites_slot))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl FavoritesStore for FileStore {
  fn read(&self) -> Result<Option<String>> {
    match std::fs::read_to_string(&self.path) {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
    }
  }

  fn write(&self, contents: &str) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&self.path, contents).with_context(|| format!("Failed to write {}", self.path.display()))
  }
}

/// Store that keeps nothing. Used when no data directory is available.
pub struct NullStore;

impl FavoritesStore for NullStore {
  fn read(&self) -> Result<Option<String>> {
    Ok(None)
  }

  fn write(&self, _contents: &str) -> Result<()> {
    Ok(())
  }
}

/// Decode slot contents. Anything that is not a JSON array is treated as empty.
fn decode_ids(raw: &str) -> BTreeSet<String> {
  let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(raw) else {
    return BTreeSet::new();
  };
  items
    .into_iter()
    .filter_map(|v| match v {
      serde_json::Value::String(s) => Some(s),
      serde_json::Value::Number(n) => Some(n.to_string()),
      _ => None,
    })
    .collect()
}

// --- Favorites Set ---

/// Favorite entry ids with synchronous write-through persistence.
///
/// Ids that no longer match a catalog entry stay in the set; the view layer
/// ignores them.
pub struct Favorites {
  ids: BTreeSet<String>,
  store: Box<dyn FavoritesStore>,
  write_error: Option<String>,
}

impl Favorites {
  /// Load from the store. Missing or unreadable data yields an empty set.
  pub fn load(store: Box<dyn FavoritesStore>) -> Self {
    let ids = match store.read() {
      Ok(Some(raw)) => decode_ids(&raw),
      Ok(None) => BTreeSet::new(),
      Err(e) => {
        warn!(err = %format!("{:#}", e), "favorites: load failed, starting empty");
        BTreeSet::new()
      }
    };
    debug!(count = ids.len(), "favorites: loaded");
    Self { ids, store, write_error: None }
  }

  pub fn contains(&self, id: &str) -> bool {
    self.ids.contains(id)
  }

  pub fn count(&self) -> usize {
    self.ids.len()
  }

  /// Flip membership and persist the whole set. Returns the new membership.
  ///
  /// The in-memory change stands even if the write fails; the failure is kept
  /// for [`Favorites::take_write_error`].
  pub fn toggle(&mut self, id: &str) -> bool {
    let member = if self.ids.remove(id) {
      false
    } else {
      self.ids.insert(id.to_string());
      true
    };
    if let Err(e) = self.persist() {
      let msg = format!("{:#}", e);
      warn!(err = %msg, "favorites: write failed");
      self.write_error = Some(msg);
    }
    member
  }

  /// Most recent unreported write failure, if any.
  pub fn take_write_error(&mut self) -> Option<String> {
    self.write_error.take()
  }

  fn persist(&self) -> Result<()> {
    let ids: Vec<&String> = self.ids.iter().collect();
    let json = serde_json::to_string(&ids).context("Failed to encode favorites")?;
    self.store.write(&json)
  }
}


#[cfg(test)]
mod tests {
  use super::testing::MemoryStore;
  use super::*;

  struct BrokenStore;

  impl FavoritesStore for BrokenStore {
    fn read(&self) -> Result<Option<String>> {
      anyhow::bail!("permission denied")
    }

    fn write(&self, _contents: &str) -> Result<()> {
      anyhow::bail!("permission denied")
    }
  }

  // --- load ---

  #[test]
  fn load_missing_slot_is_empty() {
    let favs = Favorites::load(Box::new(MemoryStore::default()));
    assert_eq!(favs.count(), 0);
  }

  #[test]
  fn load_corrupt_slot_is_empty() {
    for raw in ["{not json", "{\"a\": 1}", "\"a\"", "null"] {
      let favs = Favorites::load(Box::new(MemoryStore::with(raw)));
      assert_eq!(favs.count(), 0, "input: {}", raw);
    }
  }

  #[test]
  fn load_read_error_is_empty() {
    let favs = Favorites::load(Box::new(BrokenStore));
    assert_eq!(favs.count(), 0);
  }

  #[test]
  fn load_keeps_strings_and_numbers() {
    let favs = Favorites::load(Box::new(MemoryStore::with(r#"["a", 7, null, {"x": 1}, "b"]"#)));
    assert_eq!(favs.count(), 3);
    assert!(favs.contains("a"));
    assert!(favs.contains("7"));
    assert!(favs.contains("b"));
  }

  // --- toggle ---

  #[test]
  fn toggle_adds_then_removes() {
    let mut favs = Favorites::load(Box::new(MemoryStore::default()));
    assert!(favs.toggle("a"));
    assert!(favs.contains("a"));
    assert_eq!(favs.count(), 1);
    assert!(!favs.toggle("a"));
    assert!(!favs.contains("a"));
    assert_eq!(favs.count(), 0);
  }

  #[test]
  fn toggle_twice_restores_prior_state() {
    let mut favs = Favorites::load(Box::new(MemoryStore::with(r#"["x", "y"]"#)));
    for id in ["x", "z"] {
      let before = (favs.contains(id), favs.count());
      favs.toggle(id);
      favs.toggle(id);
      assert_eq!((favs.contains(id), favs.count()), before);
    }
  }

  #[test]
  fn toggle_writes_through() {
    let store = MemoryStore::default();
    let slot = store.slot.clone();
    let mut favs = Favorites::load(Box::new(store));
    favs.toggle("b");
    favs.toggle("a");
    assert_eq!(slot.borrow().as_deref(), Some(r#"["a","b"]"#));

    let reloaded = Favorites::load(Box::new(MemoryStore { slot, fail_writes: false }));
    assert!(reloaded.contains("a"));
    assert!(reloaded.contains("b"));
  }

  #[test]
  fn toggle_write_failure_keeps_change_and_reports() {
    let store = MemoryStore { fail_writes: true, ..Default::default() };
    let mut favs = Favorites::load(Box::new(store));
    assert!(favs.toggle("a"));
    assert!(favs.contains("a"));
    let err = favs.take_write_error().unwrap();
    assert!(err.contains("disk full"));
    assert!(favs.take_write_error().is_none());
  }

  #[test]
  fn stale_ids_are_counted_and_kept() {
    let store = MemoryStore::with(r#"["gone", "a"]"#);
    let slot = store.slot.clone();
    let mut favs = Favorites::load(Box::new(store));
    assert_eq!(favs.count(), 2);
    favs.toggle("b");
    assert!(slot.borrow().as_deref().unwrap().contains("gone"));
  }

  // --- FileStore ---

  #[test]
  fn file_store_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileStore::new(&dir.path().join("nested"), "lt_favs");
    assert!(store.read().unwrap().is_none());
    store.write(r#"["a"]"#).unwrap();
    assert!(store.path().ends_with("nested/lt_favs.json"));
    assert_eq!(store.read().unwrap().as_deref(), Some(r#"["a"]"#));
  }

  #[test]
  fn file_store_backs_favorites() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut favs = Favorites::load(Box::new(FileStore::new(dir.path(), "lt_favs")));
    favs.toggle("svc-1");
    let reloaded = Favorites::load(Box::new(FileStore::new(dir.path(), "lt_favs")));
    assert!(reloaded.contains("svc-1"));
  }
}
