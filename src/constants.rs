//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, parsed once on first access.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Name used for the config/data directories.
  pub app_name: String,

  // Catalog
  pub catalog_url: String,
  /// Name of the persistence slot holding favorite ids.
  pub favorites_slot: String,

  // Logging
  pub log_file_prefix: String,
  pub default_log_filter: String,

  // Event loop
  pub poll_interval_ms: u64,
  pub error_dismiss_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the first test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

pub fn constants() -> &'static Constants {
  &CONSTANTS
}
