use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::DetailDialog;
use crate::session::Snapshot;
use super::results::detail_paragraph;
use super::view::detail_lines;

/// Rows of content the detail overlay shows at once.
pub const DETAIL_VISIBLE_LINES: usize = 18;

// ---------------------------------------------------------------------------
// Result detail (Enter on a result)
// ---------------------------------------------------------------------------

pub fn render_detail_dialog(frame: &mut Frame, dlg: &DetailDialog) {
    // borders + hint row
    let height = DETAIL_VISIBLE_LINES as u16 + 3;
    let area = fixed_height_rect(70, height, frame.area());
    frame.render_widget(Clear, area);

    let border_color = if dlg.record.is_success() {
        Color::Green
    } else {
        Color::Red
    };
    let title = format!(" {} ", dlg.record.source_file_name());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let lines = detail_lines(&dlg.record);
    frame.render_widget(detail_paragraph(&lines, dlg.scroll), chunks[0]);

    let more = lines.len() > dlg.scroll + DETAIL_VISIBLE_LINES;
    let mut hints = vec![
        hint_key("↑/↓"), hint_label(" Scroll  "),
        hint_key("Esc"), hint_label(" Close"),
    ];
    if more {
        hints.push(Span::styled("  …", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(hints)), chunks[1]);
}

// ---------------------------------------------------------------------------
// Reset confirmation (F9)
// ---------------------------------------------------------------------------

pub fn render_reset_dialog(frame: &mut Frame, snapshot: &Snapshot<'_>) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Start over? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let body = vec![
        Line::from(vec![
            Span::raw(" Drops "),
            Span::styled(format!("{} pending file(s)", snapshot.files.len()), bold),
            Span::raw(" and "),
            Span::styled(format!("{} result(s)", snapshot.results.total_records), bold),
            Span::raw("."),
        ]),
        Line::from(Span::styled(
            " Export first (F6) to keep the results.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(body), chunks[0]);

    let hints = Line::from(vec![
        hint_key("Y/Enter"), hint_label(" Reset  "),
        hint_key("N/Esc"), hint_label(" Cancel"),
    ]);
    frame.render_widget(Paragraph::new(hints), chunks[1]);
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn hint_key(k: &str) -> Span<'static> {
    Span::styled(
        format!(" {} ", k),
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
}

fn hint_label(l: &str) -> Span<'static> {
    Span::styled(l.to_string(), Style::default().fg(Color::Gray))
}

// ---------------------------------------------------------------------------
// Help / keyboard shortcut overlay (F1)
// ---------------------------------------------------------------------------

/// All shortcuts shown in the help overlay.
/// Each entry is (key_label, description).
const SHORTCUTS: &[(&str, &str)] = &[
    // Navigation
    ("↑ / ↓",            "Move cursor"),
    ("Tab",              "Switch pane (files → pending → results)"),
    ("Enter",            "Open directory / add file / show result"),
    ("Backspace",        "Parent directory"),
    // Selection
    ("Space",            "Mark file or directory"),
    ("*",                "Mark all / unmark all"),
    ("a  /  Ins",        "Add marked entries (directories recursively)"),
    ("Paste / drop",     "Add dropped files"),
    // Pending files
    ("x  /  Del",        "Remove pending file"),
    ("c",                "Clear pending files"),
    ("F5  /  u",         "Upload all pending files"),
    // Results
    ("PgUp / PgDn",      "Previous / next page"),
    ("← / →",            "Previous / next page"),
    ("Home / End",       "First / last page"),
    ("1 … 9",            "Go to page (results pane)"),
    ("F6  /  e",         "Export results as text"),
    ("F9  /  r",         "Reset (with confirmation)"),
    // App
    ("F1",               "Show / close this help"),
    ("F10  /  q",        "Quit"),
];

pub fn render_help_dialog(frame: &mut Frame) {
    let area = centered_rect(60, 85, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keyboard shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let key_col_w = 16usize;

    let items: Vec<ListItem> = SHORTCUTS
        .iter()
        .map(|(key, desc)| {
            let line = Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", key, width = key_col_w),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {}", desc),
                    Style::default().fg(Color::White),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items), chunks[0]);

    let close_hint = Line::from(vec![
        hint_key("F1"), hint_label(" / "),
        hint_key("Esc"), hint_label(" Close"),
    ]);
    frame.render_widget(Paragraph::new(close_hint), chunks[1]);
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    horizontal_center(percent_x, popup_layout[1])
}

/// Like `centered_rect`, but `height` rows tall (clamped to the screen).
fn fixed_height_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let row = Rect {
        x: r.x,
        y: r.y + (r.height - height) / 2,
        width: r.width,
        height,
    };
    horizontal_center(percent_x, row)
}

fn horizontal_center(percent_x: u16, r: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(r)[1]
}
