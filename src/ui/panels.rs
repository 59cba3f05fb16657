use std::time::SystemTime;

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Focus, PanelState};
use crate::session::files::PendingFile;

// Column widths (in characters)
const COL_SIZE: u16 = 9;   // e.g. "   1.2 KB"
const COL_DATE: u16 = 16;  // e.g. "2024-03-15 14:22"
const COL_PADDING: u16 = 2;

/// Render the local file browser inside the given area.
pub fn render_browser(frame: &mut Frame, panel: &PanelState, area: Rect, is_active: bool) {
    let block = Block::default()
        .title(format!(" Files — {} ", panel.path.display()))
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Fixed columns: 1 (mark "✓") + 2 (icon) + COL_PADDING*2 (two separators)
    // + COL_SIZE + COL_DATE + 2 (highlight_symbol "► ")
    let fixed_cols = 1 + 2 + COL_PADDING * 2 + COL_SIZE + COL_DATE + 2;
    let name_width = inner.width.saturating_sub(fixed_cols) as usize;

    let items: Vec<ListItem> = panel
        .entries
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            let is_marked = panel.marked.contains(&idx);

            let (icon, base_style) = if e.is_dir {
                ("▶ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(Color::White))
            };

            let name_style = if is_marked {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                base_style
            };

            let mark_str = if is_marked { "✓" } else { " " };

            let name = truncate_name(&e.name, name_width);
            let size_str = match e.size {
                Some(s) => format_size(s),
                None => format!("{:>width$}", "", width = COL_SIZE as usize),
            };
            let date_str = match e.modified {
                Some(t) => format_time(t),
                None => format!("{:>width$}", "", width = COL_DATE as usize),
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    mark_str,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(icon, base_style),
                Span::styled(
                    format!("{:<width$}", name, width = name_width),
                    name_style,
                ),
                Span::raw("  "),
                Span::styled(size_str, Style::default().fg(Color::Gray)),
                Span::raw("  "),
                Span::styled(date_str, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(panel.selected));

    frame.render_stateful_widget(highlighted_list(items, is_active), inner, &mut list_state);
}

/// Files waiting for the next upload, with the batch total in the title.
pub fn render_pending(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Pending;
    let snapshot = app.session.snapshot();
    let files = snapshot.files;

    let title = if files.is_empty() {
        " Pending ".to_string()
    } else {
        format!(
            " Pending — {} file(s), {} ",
            files.len(),
            format_size(snapshot.pending_bytes).trim_start()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if files.is_empty() {
        let hint = Line::from(Span::styled(
            " Drop PDFs here, or add them from the file list (a)",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    }

    // 2 (highlight) + COL_PADDING + COL_SIZE
    let name_width = inner.width.saturating_sub(2 + COL_PADDING + COL_SIZE) as usize;
    let items: Vec<ListItem> = files.iter().map(|f| pending_item(f, name_width)).collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.pending_selected.min(files.len() - 1)));

    frame.render_stateful_widget(highlighted_list(items, is_active), inner, &mut list_state);
}

fn pending_item(file: &PendingFile, name_width: usize) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<width$}", truncate_name(&file.name, name_width), width = name_width),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(format_size(file.size), Style::default().fg(Color::Gray)),
    ]))
}

fn highlighted_list(items: Vec<ListItem<'_>>, is_active: bool) -> List<'_> {
    let list = List::new(items);
    if !is_active {
        return list;
    }
    list.highlight_style(
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("► ")
}

fn border_style(is_active: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn truncate_name(name: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        // Show as many chars as fit, replace last 3 with "..."
        let cut = max_len.saturating_sub(3);
        let truncated: String = chars[..cut].iter().collect();
        format!("{}...", truncated)
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit_idx = 0;
    while value >= 1024.0 && unit_idx + 1 < UNITS.len() {
        value /= 1024.0;
        unit_idx += 1;
    }
    if unit_idx == 0 {
        format!("{:>7} B", bytes)
    } else {
        format!("{:>6.1} {}", value, UNITS[unit_idx])
    }
}

/// "YYYY-MM-DD HH:MM" in local time.
fn format_time(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_right_aligned_with_units() {
        assert_eq!(format_size(512), "    512 B");
        assert_eq!(format_size(1536), "   1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "   5.0 MB");
    }

    #[test]
    fn long_names_are_cut_with_dots() {
        assert_eq!(truncate_name("paper.pdf", 20), "paper.pdf");
        assert_eq!(truncate_name("a-very-long-name.pdf", 10), "a-very-...");
        assert_eq!(truncate_name("x", 0), "");
    }

    #[test]
    fn times_fit_the_date_column() {
        assert_eq!(format_time(SystemTime::now()).chars().count(), COL_DATE as usize);
    }
}
