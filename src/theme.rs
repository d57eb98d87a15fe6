use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub favorite: Color,
  pub tag_fg: Color,
  pub tag_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Night",
    bg: Color::Rgb(24, 26, 33),
    fg: Color::Rgb(220, 223, 228),
    muted: Color::Rgb(120, 126, 140),
    accent: Color::Rgb(122, 162, 247),
    border: Color::Rgb(59, 66, 82),
    highlight_fg: Color::Rgb(24, 26, 33),
    highlight_bg: Color::Rgb(122, 162, 247),
    stripe_bg: Color::Rgb(30, 33, 41),
    favorite: Color::Rgb(247, 118, 142),
    tag_fg: Color::Rgb(24, 26, 33),
    tag_bg: Color::Rgb(158, 206, 106),
    status: Color::Rgb(224, 175, 104),
    error: Color::Rgb(247, 118, 142),
    key_fg: Color::Rgb(24, 26, 33),
    key_bg: Color::Rgb(120, 126, 140),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 248, 242),
    fg: Color::Rgb(40, 40, 40),
    muted: Color::Rgb(130, 130, 125),
    accent: Color::Rgb(38, 110, 180),
    border: Color::Rgb(205, 200, 190),
    highlight_fg: Color::Rgb(250, 248, 242),
    highlight_bg: Color::Rgb(38, 110, 180),
    stripe_bg: Color::Rgb(242, 239, 231),
    favorite: Color::Rgb(200, 40, 70),
    tag_fg: Color::Rgb(250, 248, 242),
    tag_bg: Color::Rgb(90, 140, 70),
    status: Color::Rgb(170, 110, 20),
    error: Color::Rgb(200, 40, 70),
    key_fg: Color::Rgb(250, 248, 242),
    key_bg: Color::Rgb(130, 130, 125),
  },
  Theme {
    name: "Dusk",
    bg: Color::Rgb(35, 28, 44),
    fg: Color::Rgb(234, 222, 240),
    muted: Color::Rgb(145, 128, 160),
    accent: Color::Rgb(255, 170, 120),
    border: Color::Rgb(80, 64, 98),
    highlight_fg: Color::Rgb(35, 28, 44),
    highlight_bg: Color::Rgb(255, 170, 120),
    stripe_bg: Color::Rgb(42, 34, 53),
    favorite: Color::Rgb(255, 110, 150),
    tag_fg: Color::Rgb(35, 28, 44),
    tag_bg: Color::Rgb(190, 150, 255),
    status: Color::Rgb(255, 210, 120),
    error: Color::Rgb(255, 110, 150),
    key_fg: Color::Rgb(35, 28, 44),
    key_bg: Color::Rgb(145, 128, 160),
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_index_lookup() {
    assert_eq!(theme_index(None), 0);
    assert_eq!(theme_index(Some("paper")), 1);
    assert_eq!(theme_index(Some("missing")), 0);
  }
}
