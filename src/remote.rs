use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{Entry, parse_entries};

/// Where the catalog JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
  Remote(String),
  File(PathBuf),
}

impl CatalogSource {
  /// `http://` and `https://` are fetched; anything else is read as a local path.
  pub fn parse(input: &str) -> Self {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
      CatalogSource::Remote(trimmed.to_string())
    } else {
      CatalogSource::File(PathBuf::from(trimmed.strip_prefix("file://").unwrap_or(trimmed)))
    }
  }

  /// Resolve an image reference from the catalog against the catalog's own location.
  ///
  /// Absolute URLs and absolute paths pass through. Relative references join
  /// the catalog URL, or the catalog file's directory.
  pub fn resolve_image(&self, reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
      return reference.to_string();
    }
    match self {
      CatalogSource::Remote(base) => match Url::parse(base).and_then(|url| url.join(reference)) {
        Ok(url) => url.to_string(),
        Err(e) => {
          debug!(base = %base, reference, err = %e, "carousel: cannot resolve image reference");
          reference.to_string()
        }
      },
      CatalogSource::File(path) => {
        let local = Path::new(reference.strip_prefix("file://").unwrap_or(reference));
        if local.is_absolute() {
          return local.display().to_string();
        }
        let dir = path.parent().unwrap_or(Path::new(""));
        dir.join(local).display().to_string()
      }
    }
  }

  pub fn label(&self) -> String {
    match self {
      CatalogSource::Remote(url) => url.clone(),
      CatalogSource::File(path) => path.display().to_string(),
    }
  }
}

pub async fn fetch_catalog(client: &Client, source: &CatalogSource) -> Result<Vec<Entry>> {
  let body = match source {
    CatalogSource::Remote(url) => {
      info!(url = %url, "catalog: fetching");
      let response = client.get(url).send().await.with_context(|| format!("Failed to reach {}", url))?;
      let status = response.status();
      if !status.is_success() {
        return Err(anyhow!("Catalog request failed: HTTP {}", status));
      }
      response.text().await.context("Failed to read catalog body")?
    }
    CatalogSource::File(path) => {
      info!(path = %path.display(), "catalog: reading file");
      tokio::fs::read_to_string(path).await.with_context(|| format!("Failed to read {}", path.display()))?
    }
  };
  let entries = parse_entries(&body).context("Catalog is not a JSON array of records")?;
  debug!(entries = entries.len(), "catalog: parsed");
  Ok(entries)
}

/// Fetch and decode one carousel image. Local paths are read from disk.
pub async fn fetch_image(client: &Client, url: &str) -> Result<DynamicImage> {
  let bytes = match CatalogSource::parse(url) {
    CatalogSource::Remote(url) => {
      let response = client.get(&url).send().await.with_context(|| format!("Failed to reach {}", url))?;
      if !response.status().is_success() {
        return Err(anyhow!("Image request failed: HTTP {} ({})", response.status(), url));
      }
      response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?.to_vec()
    }
    CatalogSource::File(path) => {
      tokio::fs::read(&path).await.with_context(|| format!("Failed to read {}", path.display()))?
    }
  };
  image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image from memory (URL: {})", url))
}
