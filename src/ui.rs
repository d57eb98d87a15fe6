use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode};
use crate::catalog::Entry;
use crate::filter::Tab;
use crate::preview::{ImageWidget, fit_to_area};
use crate::search::Suggestion;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

/// Tag chips; `focused` is highlighted.
fn chip_spans(tags: &[String], focused: Option<usize>, theme: &Theme) -> Vec<Span<'static>> {
  let mut spans = Vec::with_capacity(tags.len() * 2);
  for (i, tag) in tags.iter().enumerate() {
    let style = if Some(i) == focused {
      Style::default().fg(theme.highlight_fg).bg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.tag_fg).bg(theme.tag_bg)
    };
    spans.push(Span::styled(format!(" {} ", tag), style));
    spans.push(Span::raw(" "));
  }
  spans
}

fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
  let [area] = Layout::horizontal([Constraint::Percentage(width_pct)]).flex(Flex::Center).areas(area);
  let [area] = Layout::vertical([Constraint::Percentage(height_pct)]).flex(Flex::Center).areas(area);
  area
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, banner_area, input_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_banner(frame, app, banner_area);
  render_input(frame, app, input_area);
  render_list(frame, app, main_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if app.mode == AppMode::Search && !app.browser.suggestions().is_hidden() {
    render_dropdown(frame, app, main_area);
  }
  if app.mode == AppMode::Detail {
    render_detail(frame, app, main_area);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let active = app.browser.filter().tab();
  let tab_style = |tab: Tab| {
    if tab == active {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    }
  };

  let left = Line::from(vec![
    Span::styled(" ◆ linkdeck ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::raw(" "),
    Span::styled(format!(" {} ", Tab::All.label()), tab_style(Tab::All)),
    Span::raw(" "),
    Span::styled(format!(" {} ", Tab::Favorites.label()), tab_style(Tab::Favorites)),
    Span::styled(format!(" ♥ {}", app.browser.favorites().count()), Style::default().fg(theme.favorite)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let line = match app.browser.filter().active_tag() {
    Some(tag) => Line::from(vec![
      Span::styled(" Filtering by tag ", Style::default().fg(theme.muted)),
      Span::styled(format!(" {} ", tag), Style::default().fg(theme.tag_fg).bg(theme.tag_bg).add_modifier(Modifier::BOLD)),
      Span::styled("  x to clear", Style::default().fg(theme.muted)),
    ]),
    None => Line::from(Span::styled(" All tags", Style::default().fg(theme.muted))),
  };
  frame.render_widget(line, area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Search;
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search titles and tags ")
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  // At least one column so the scroll window always contains the cursor.
  let inner_w = (area.width.saturating_sub(4) as usize).max(1);
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = if visible.is_empty() && !focused {
    Paragraph::new(Span::styled("press / to search", Style::default().fg(theme.muted)))
  } else {
    Paragraph::new(visible).style(Style::default().fg(theme.fg))
  };
  frame.render_widget(paragraph.block(input_block), area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn entry_item(entry: &Entry, favorite: bool, chip: Option<usize>, inner_w: usize, theme: &Theme) -> ListItem<'static> {
  let heart = if favorite { "♥" } else { "♡" };
  let title_w = inner_w.saturating_sub(3);
  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{} ", heart), Style::default().fg(theme.favorite)),
      Span::styled(truncate_str(&entry.title, title_w), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ]),
    Line::from(Span::styled(format!("  {}", truncate_str(&entry.description, title_w)), Style::default().fg(theme.muted))),
  ];
  if !entry.tags.is_empty() {
    let mut chips = vec![Span::raw("  ")];
    chips.extend(chip_spans(&entry.tags, chip, theme));
    lines.push(Line::from(chips));
  }
  ListItem::new(lines)
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let total = app.browser.catalog().len();
  let shown = app.browser.visible_len();
  let title = format!(" {} · {} of {} ", app.browser.filter().tab().label(), shown, total);
  let block = rounded(theme)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if shown == 0 {
    let message = if app.loading && app.browser.catalog().is_empty() {
      "Loading catalog…"
    } else if app.browser.catalog().is_empty() {
      "The catalog is empty."
    } else if app.browser.filter().tab() == Tab::Favorites {
      "No favorites here yet. Press f on an entry to add one."
    } else {
      "Nothing matches this filter."
    };
    let text = vec![Line::from(""), Line::from(Span::styled(message, Style::default().fg(theme.muted)))];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();
  let favorites = app.browser.favorites();
  let items: Vec<ListItem> = app
    .browser
    .visible()
    .into_iter()
    .enumerate()
    .map(|(i, entry)| {
      let is_selected = Some(i) == selected;
      let chip = if is_selected && app.mode == AppMode::Browse { app.chip } else { None };
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      entry_item(entry, favorites.contains(&entry.id), chip, inner_w, theme).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().bg(theme.border).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_dropdown(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let rows = app.browser.suggestions().len().max(1) as u16;
  let height = (rows + 2).min(area.height);
  let dropdown = Rect { x: area.x + 2, width: area.width.saturating_sub(4), height, ..area };
  frame.render_widget(Clear, dropdown);

  let block = rounded(theme).style(Style::default().bg(theme.bg));
  if app.browser.suggestions().is_no_results() {
    let line = Line::from(vec![
      Span::styled("Nothing  ", Style::default().fg(theme.muted)),
      Span::styled("No results", Style::default().fg(theme.fg)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), dropdown);
    return;
  }

  let items: Vec<ListItem> = app
    .browser
    .suggestions()
    .items()
    .into_iter()
    .map(|s| {
      let (label, text) = match s {
        Suggestion::Tag(tag) => ("Tag:  ", tag),
        Suggestion::Card(card) => ("Card: ", card.title),
      };
      ListItem::new(Line::from(vec![
        Span::styled(label, Style::default().fg(theme.muted)),
        Span::styled(text, Style::default().fg(theme.fg)),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, dropdown, &mut app.suggestion_state);
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let Some((entry, carousel)) = app.browser.detail_entry() else { return };
  let modal = centered(area, 90, 95);
  frame.render_widget(Clear, modal);

  let favorite = app.browser.favorites().contains(&entry.id);
  let title = Line::from(vec![
    Span::styled(format!(" {} ", entry.title), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(if favorite { "♥ " } else { "♡ " }, Style::default().fg(theme.favorite)),
  ]);
  let block = rounded(theme).title(title).style(Style::default().bg(theme.bg)).padding(Padding::horizontal(1));
  let inner = block.inner(modal);
  frame.render_widget(block, modal);

  let [image_area, text_area] = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(inner);
  let [picture_area, counter_area] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(image_area);

  let url = carousel.current(entry).map(str::to_string);
  let counter = if entry.images.is_empty() {
    "no images".to_string()
  } else {
    format!("◀ {}/{} ▶", carousel.index() + 1, carousel.total())
  };

  let mut lines = vec![Line::from(""), Line::from(entry.details_or_description().to_string())];
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    entry.url.clone(),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));
  lines.push(Line::from(""));
  if !entry.tags.is_empty() {
    lines.push(Line::from(chip_spans(&entry.tags, app.chip, theme)));
  }
  let text = Paragraph::new(lines).style(Style::default().fg(theme.fg)).wrap(Wrap { trim: true });
  frame.render_widget(text, text_area);
  frame.render_widget(
    Paragraph::new(Span::styled(counter, Style::default().fg(theme.muted))).alignment(Alignment::Center),
    counter_area,
  );

  let Some(url) = url else {
    render_placeholder(frame, theme, picture_area, "No image");
    return;
  };
  if app.images.failed.contains(&url) {
    render_placeholder(frame, theme, picture_area, "Image unavailable");
    return;
  }
  let Some(image) = app.images.loaded.get(&url) else {
    render_placeholder(frame, theme, picture_area, "Loading image…");
    return;
  };

  let needs_resize = match &app.images.resized {
    Some((cached, w, h, _)) => *cached != url || *w != picture_area.width || *h != picture_area.height,
    None => true,
  };
  if needs_resize {
    let resized = fit_to_area(image, picture_area, app.display_mode);
    app.images.resized = Some((url, picture_area.width, picture_area.height, resized));
  }
  if let Some((_, _, _, ref resized)) = app.images.resized {
    frame.render_widget(ImageWidget { image: resized, display_mode: app.display_mode }, picture_area);
  }
}

fn render_placeholder(frame: &mut Frame, theme: &Theme, area: Rect, message: &str) {
  let [middle] = Layout::vertical([Constraint::Length(1)]).flex(Flex::Center).areas(area);
  frame.render_widget(
    Paragraph::new(Span::styled(message.to_string(), Style::default().fg(theme.muted))).alignment(Alignment::Center),
    middle,
  );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else {
    (format!(" {} entries · {}", app.browser.catalog().len(), app.source.label()), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_tag = app.browser.filter().active_tag().is_some();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Browse => {
      let mut k = vec![("Enter", "Open"), ("f", "Favorite"), ("o", "Link"), ("←/→", "Tags"), ("Tab", "Tab"), ("/", "Search")];
      if has_tag {
        k.push(("x", "Clear tag"));
      }
      k.push(("^r", "Reload"));
      k.push(("q", "Quit"));
      k
    }
    AppMode::Search => vec![("↑/↓", "Select"), ("Enter", "Pick"), ("Esc", "Back")],
    AppMode::Detail => vec![("←/→", "Image"), ("Tab", "Tags"), ("Enter", "Filter"), ("f", "Favorite"), ("o", "Link"), ("Esc", "Close")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let right_label = format!("{} · {} ", theme.name, app.display_mode.label());
  let right = Line::from(Span::styled(&right_label, Style::default().fg(theme.muted)));
  let width = right_label.chars().count() as u16;
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width, ..area };
  frame.render_widget(right, right_area);
}
