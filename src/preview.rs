use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Carousel Image Widget ---

/// Draws an already-resized image centered in its area.
pub struct ImageWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_RAMP: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for ImageWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_half_blocks(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
    }
  }
}

/// Resize `image` to fit a cell area, preserving aspect ratio.
///
/// Half-block mode packs two pixel rows per cell; ASCII uses one pixel per
/// cell and halves the height to compensate for tall glyphs.
pub fn fit_to_area(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let max_w = u32::from(area.width).max(1);
  let max_h = match mode {
    DisplayMode::Direct => u32::from(area.height) * 2,
    DisplayMode::Ascii => u32::from(area.height),
  }
  .max(1);
  let (w, h) = (image.width().max(1) as f32, image.height().max(1) as f32);
  let aspect = match mode {
    DisplayMode::Direct => 1.0,
    DisplayMode::Ascii => 0.5,
  };
  let scale = (max_w as f32 / w).min(max_h as f32 / (h * aspect));
  let target_w = ((w * scale) as u32).clamp(1, max_w);
  let target_h = ((h * aspect * scale) as u32).clamp(1, max_h);
  image.resize_exact(target_w, target_h, FilterType::Triangle)
}

fn cell(area: Rect, offset: (u32, u32), pos: (u32, u32)) -> (u16, u16) {
  let x = (offset.0 + pos.0).min(u32::from(u16::MAX)) as u16;
  let y = (offset.1 + pos.1).min(u32::from(u16::MAX)) as u16;
  (area.x.saturating_add(x), area.y.saturating_add(y))
}

fn render_half_blocks(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(u32::from(area.width));
  let img_h = rgb.height();
  let cell_h = img_h.div_ceil(2).min(u32::from(area.height));
  let offset = ((u32::from(area.width) - img_w) / 2, (u32::from(area.height) - cell_h) / 2);

  for y in 0..cell_h {
    for x in 0..img_w {
      let upper = rgb.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let bg = if lower_y < img_h {
        let lower = rgb.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      let (cx, cy) = cell(area, offset, (x, y));
      buf.set_string(cx, cy, "▀", Style::default().fg(Color::Rgb(upper[0], upper[1], upper[2])).bg(bg));
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let img_w = luma.width().min(u32::from(area.width));
  let img_h = luma.height().min(u32::from(area.height));
  let offset = ((u32::from(area.width) - img_w) / 2, (u32::from(area.height) - img_h) / 2);

  for y in 0..img_h {
    for x in 0..img_w {
      let (cx, cy) = cell(area, offset, (x, y));
      buf.set_string(cx, cy, ascii_glyph(luma.get_pixel(x, y)[0]), Style::default());
    }
  }
}

fn ascii_glyph(level: u8) -> &'static str {
  let idx = ((f32::from(level) / 255.0) * (ASCII_RAMP.len() - 1) as f32).round() as usize;
  ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]
}
