use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::session::{SessionStatus, Snapshot, UploadSession};
use super::panels::format_size;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the key hint bar, or upload progress while a batch is in flight.
pub fn render_statusbar(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, message: Option<&str>) {
    match (snapshot.status, snapshot.upload) {
        (SessionStatus::Uploading, Some(upload)) => render_transfer_bar(frame, area, upload),
        (SessionStatus::Processing, Some(upload)) => render_processing(frame, area, upload),
        _ => render_hint_bar(frame, area, snapshot, message),
    }
}

// ---------------------------------------------------------------------------
// Hint bar (normal mode)
// ---------------------------------------------------------------------------

fn render_hint_bar(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, message: Option<&str>) {
    // Split into 2 rows; hints on row 0, status message on row 1.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // --- Row 0: key hints ---
    let mut hints: Vec<(&str, &str)> = vec![("F1", "Help"), ("Tab", "Pane"), ("a", "Add")];
    let can_upload = !snapshot.files.is_empty();
    if can_upload {
        hints.push(("F5", "Upload"));
    }
    if !snapshot.results.is_empty() {
        hints.push(("PgUp/PgDn", "Page"));
        hints.push(("F6", "Export"));
    }
    hints.push(("F9", "Reset"));
    hints.push(("F10", "Quit"));

    let mut spans: Vec<Span> = Vec::new();
    for (key, label) in &hints {
        let key_style = if *key == "F5" {
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(
            format!("{} ", label),
            Style::default().fg(Color::White),
        ));
    }

    let hint_para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(hint_para, rows[0]);

    // --- Row 1: Status message, red after a failed or rejected upload ---
    let failed = snapshot.upload.is_some_and(|u| u.failure.is_some());
    let color = if failed {
        Color::Red
    } else {
        Color::Yellow
    };
    let msg_line = Line::from(vec![Span::styled(
        format!(" {}", message.unwrap_or("")),
        Style::default().fg(color),
    )]);
    let msg_para = Paragraph::new(msg_line).style(Style::default().bg(Color::Black));
    frame.render_widget(msg_para, rows[1]);
}

// ---------------------------------------------------------------------------
// Upload progress bar
// ---------------------------------------------------------------------------

/// "Upload ~2/5 files, 62%". The file number is estimated from bytes.
fn progress_label(upload: &UploadSession) -> String {
    let p = upload.progress;
    format!(
        " Upload ~{}/{} files, {}% ",
        (p.estimated_file_index + 1).min(upload.file_count.max(1)),
        upload.file_count,
        p.percent
    )
}

fn render_transfer_bar(frame: &mut Frame, area: Rect, upload: &UploadSession) {
    let fraction = upload.progress.fraction();
    let bar_color = Color::Green;

    // Split the 2-row status area: row 0 = progress bar, row 1 = byte counts.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // --- Row 0: Custom block-character progress bar ---
    // Built from styled spans so the bar background and the label share a baseline.
    let width = rows[0].width as usize;
    let label = progress_label(upload);

    // Number of filled columns (█) vs empty columns (░).
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    let label_len = label.chars().count().min(width);
    let pad_left = width.saturating_sub(label_len) / 2;

    let mut bar_chars: Vec<char> = std::iter::repeat('█')
        .take(filled)
        .chain(std::iter::repeat('░').take(empty))
        .collect();

    // Overlay the label text onto bar_chars (centred).
    for (i, c) in label.chars().enumerate() {
        let pos = pad_left + i;
        if pos < bar_chars.len() {
            bar_chars[pos] = c;
        }
    }

    let filled_str: String = bar_chars[..filled].iter().collect();
    let empty_str: String = bar_chars[filled..].iter().collect();

    let bar_line = Line::from(vec![
        Span::styled(
            filled_str,
            Style::default()
                .fg(Color::Black)
                .bg(bar_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            empty_str,
            Style::default().fg(bar_color).bg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(bar_line).block(Block::default()),
        rows[0],
    );

    // --- Row 1: bytes sent and elapsed time ---
    let detail = format!(
        " → {} of {} sent, {}s",
        format_size(upload.transferred_bytes).trim_start(),
        format_size(upload.total_bytes).trim_start(),
        elapsed_secs(upload)
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            detail,
            Style::default().fg(Color::White),
        )))
        .style(Style::default().bg(Color::Black)),
        rows[1],
    );
}

// ---------------------------------------------------------------------------
// Waiting for the server
// ---------------------------------------------------------------------------

fn render_processing(frame: &mut Frame, area: Rect, upload: &UploadSession) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let elapsed_ms = (Local::now() - upload.started_at).num_milliseconds().max(0) as usize;
    let spinner = SPINNER[(elapsed_ms / 100) % SPINNER.len()];

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", spinner),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Rating {} file(s) on the server…", upload.file_count),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Black)),
        rows[0],
    );

    let detail = format!(
        " → {} uploaded, waiting {}s",
        format_size(upload.total_bytes).trim_start(),
        elapsed_secs(upload)
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))))
            .style(Style::default().bg(Color::Black)),
        rows[1],
    );
}

fn elapsed_secs(upload: &UploadSession) -> i64 {
    (Local::now() - upload.started_at).num_seconds().max(0)
}
