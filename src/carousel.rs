use crate::catalog::Entry;

/// Circular image index for the open detail view.
///
/// `total` is at least 1: an entry without images still has one (empty) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
  index: usize,
  total: usize,
}

impl Carousel {
  pub fn for_entry(entry: &Entry) -> Self {
    Self::with_total(entry.images.len())
  }

  pub fn with_total(images: usize) -> Self {
    Self { index: 0, total: images.max(1) }
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn next(&mut self) {
    if self.total < 2 {
      return;
    }
    self.index = (self.index + 1) % self.total;
  }

  pub fn prev(&mut self) {
    if self.total < 2 {
      return;
    }
    self.index = (self.index + self.total - 1) % self.total;
  }

  /// Image URL under the cursor; `None` for an image-less entry.
  pub fn current<'a>(&self, entry: &'a Entry) -> Option<&'a str> {
    entry.images.get(self.index).map(String::as_str)
  }
}
