use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// One catalog item. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  pub id: String,
  pub title: String,
  pub description: String,
  pub url: String,
  pub tags: Vec<String>,
  /// Long-form text, may be empty. Use [`Entry::details_or_description`] for display.
  pub details: String,
  pub images: Vec<String>,
}

impl Entry {
  pub fn details_or_description(&self) -> &str {
    if self.details.is_empty() { &self.description } else { &self.details }
  }

  /// Case-insensitive tag membership.
  pub fn has_tag(&self, tag: &str) -> bool {
    let needle = tag.to_lowercase();
    self.tags.iter().any(|t| t.to_lowercase() == needle)
  }
}

// --- Source records ---

/// A record as it appears in the remote JSON array.
///
/// Fields stay untyped so a badly-typed optional value only loses that value,
/// never the whole record.
#[derive(Debug, Deserialize)]
pub struct RawEntry {
  #[serde(default)]
  id: Value,
  #[serde(default, rename = "nome")]
  title: Value,
  #[serde(default, rename = "descricao")]
  description: Value,
  #[serde(default, rename = "link")]
  url: Value,
  #[serde(default)]
  tags: Value,
  #[serde(default, rename = "detalhes")]
  details: Value,
  #[serde(default, rename = "imagem")]
  images: Value,
}

/// String value, or empty for anything else.
fn text(value: Value) -> String {
  match value {
    Value::String(s) => s,
    _ => String::new(),
  }
}

/// String members of an array; other members are skipped.
fn strings(value: Value) -> Vec<String> {
  match value {
    Value::Array(items) => items.into_iter().filter_map(|v| if let Value::String(s) = v { Some(s) } else { None }).collect(),
    _ => Vec::new(),
  }
}

impl RawEntry {
  /// Default every optional field. Returns `None` only when the record has no usable id.
  pub fn normalize(self) -> Option<Entry> {
    let id = match self.id {
      Value::String(s) => s,
      Value::Number(n) => n.to_string(),
      _ => return None,
    };
    if id.trim().is_empty() {
      return None;
    }
    let images = match self.images {
      Value::String(url) if !url.is_empty() => vec![url],
      other => strings(other),
    };
    Some(Entry {
      id,
      title: text(self.title),
      description: text(self.description),
      url: text(self.url),
      tags: strings(self.tags),
      details: text(self.details),
      images,
    })
  }
}

/// Parse a JSON array of source records into normalized entries.
///
/// Elements that are not objects, or that have no id, are skipped rather than
/// failing the whole load.
pub fn parse_entries(json: &str) -> serde_json::Result<Vec<Entry>> {
  let values: Vec<Value> = serde_json::from_str(json)?;
  let mut entries = Vec::with_capacity(values.len());
  for (position, value) in values.into_iter().enumerate() {
    match serde_json::from_value::<RawEntry>(value) {
      Ok(raw) => match raw.normalize() {
        Some(entry) => entries.push(entry),
        None => warn!(position, "catalog: dropping record without id"),
      },
      Err(e) => warn!(position, err = %e, "catalog: dropping malformed record"),
    }
  }
  Ok(entries)
}

// --- Store ---

/// The loaded entry list, in source order. Ids are unique.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
  entries: Vec<Entry>,
}

impl Catalog {
  /// Build a store from entries, keeping the first record for each id.
  pub fn from_entries(entries: Vec<Entry>) -> Self {
    let mut seen = HashSet::new();
    let entries = entries
      .into_iter()
      .filter(|e| {
        let fresh = seen.insert(e.id.clone());
        if !fresh {
          warn!(id = %e.id, "catalog: dropping duplicate id");
        }
        fresh
      })
      .collect();
    Self { entries }
  }

  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  pub fn get(&self, id: &str) -> Option<&Entry> {
    self.entries.iter().find(|e| e.id == id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
pub(crate) fn entry(id: &str, title: &str, tags: &[&str]) -> Entry {
  Entry {
    id: id.to_string(),
    title: title.to_string(),
    description: format!("{} description", title),
    url: format!("https://example.com/{}", id),
    tags: tags.iter().map(|t| t.to_string()).collect(),
    details: String::new(),
    images: Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- parse_entries ---

  #[test]
  fn parse_maps_source_field_names() {
    let json = r#"[{
      "id": "maps",
      "nome": "Google Maps",
      "descricao": "Mapas",
      "link": "https://maps.google.com",
      "tags": ["Navigation", "google"],
      "detalhes": "Longer text",
      "imagem": ["a.png", "b.png"]
    }]"#;
    let entries = parse_entries(json).unwrap();
    assert_eq!(entries.len(), 1);
    let e = &entries[0];
    assert_eq!(e.id, "maps");
    assert_eq!(e.title, "Google Maps");
    assert_eq!(e.description, "Mapas");
    assert_eq!(e.url, "https://maps.google.com");
    assert_eq!(e.tags, vec!["Navigation", "google"]);
    assert_eq!(e.details, "Longer text");
    assert_eq!(e.images, vec!["a.png", "b.png"]);
  }

  #[test]
  fn parse_defaults_missing_optional_fields() {
    let entries = parse_entries(r#"[{"id": "x", "nome": "X"}]"#).unwrap();
    let e = &entries[0];
    assert!(e.tags.is_empty());
    assert!(e.images.is_empty());
    assert_eq!(e.details, "");
    assert_eq!(e.description, "");
  }

  #[test]
  fn parse_single_image_string() {
    let entries = parse_entries(r#"[{"id": "x", "imagem": "one.png"}]"#).unwrap();
    assert_eq!(entries[0].images, vec!["one.png"]);
  }

  #[test]
  fn parse_empty_image_string_yields_no_images() {
    let entries = parse_entries(r#"[{"id": "x", "imagem": ""}, {"id": "y", "imagem": null}]"#).unwrap();
    assert!(entries[0].images.is_empty());
    assert!(entries[1].images.is_empty());
  }

  #[test]
  fn parse_numeric_id_becomes_string() {
    let entries = parse_entries(r#"[{"id": 42, "nome": "Answer"}]"#).unwrap();
    assert_eq!(entries[0].id, "42");
  }

  #[test]
  fn parse_skips_records_without_id() {
    let entries = parse_entries(r#"[{"nome": "No id"}, {"id": ""}, "junk", {"id": "ok"}]"#).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "ok");
  }

  #[test]
  fn parse_defaults_wrong_typed_optional_fields() {
    let json = r#"[
      {"id": "t", "nome": "Tags", "tags": ["x", 1]},
      {"id": "i", "nome": "Images", "imagem": ["p.png", null]},
      {"id": "d", "nome": "Details", "detalhes": 5, "descricao": ["no"], "link": false},
      {"id": "n", "nome": 7, "tags": "solo", "imagem": 3}
    ]"#;
    let entries = parse_entries(json).unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["t", "i", "d", "n"]);
    assert_eq!(entries[0].tags, vec!["x"]);
    assert_eq!(entries[1].images, vec!["p.png"]);
    assert_eq!(entries[2].details, "");
    assert_eq!(entries[2].description, "");
    assert_eq!(entries[2].url, "");
    assert_eq!(entries[3].title, "");
    assert!(entries[3].tags.is_empty());
    assert!(entries[3].images.is_empty());
  }

  #[test]
  fn parse_keeps_ids_verbatim_and_drops_blank_ones() {
    let entries = parse_entries(r#"[{"id": " spaced "}, {"id": "   "}, {"id": null}, {"id": true}]"#).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, " spaced ");
  }

  #[test]
  fn parse_rejects_non_array() {
    assert!(parse_entries(r#"{"id": "x"}"#).is_err());
    assert!(parse_entries("not json").is_err());
  }

  // --- Entry ---

  #[test]
  fn details_fall_back_to_description() {
    let mut e = entry("a", "A", &[]);
    assert_eq!(e.details_or_description(), "A description");
    e.details = "Full".to_string();
    assert_eq!(e.details_or_description(), "Full");
  }

  #[test]
  fn has_tag_ignores_case() {
    let e = entry("a", "A", &["Navigation"]);
    assert!(e.has_tag("navigation"));
    assert!(e.has_tag("NAVIGATION"));
    assert!(!e.has_tag("nav"));
  }

  // --- Catalog ---

  #[test]
  fn duplicate_ids_keep_first() {
    let catalog = Catalog::from_entries(vec![entry("a", "First", &[]), entry("b", "B", &[]), entry("a", "Second", &[])]);
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get("a").unwrap().title, "First");
    let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
  }

  #[test]
  fn empty_catalog() {
    let catalog = Catalog::default();
    assert!(catalog.is_empty());
    assert!(catalog.get("a").is_none());
  }
}
