use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use super::view::{RenderLine, format_score, results_lines};

/// Map one render line onto styled spans.
pub fn to_line(line: &RenderLine) -> Line<'static> {
    match line {
        RenderLine::Summary { succeeded, failed } => Line::from(vec![
            Span::styled(
                format!(" {} succeeded", succeeded),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} failed", failed),
                if *failed > 0 {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                },
            ),
        ]),
        RenderLine::Item {
            number,
            name,
            success,
            selected,
        } => {
            let (icon, color) = if *success {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            let name_style = if *selected {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(if *selected { "► " } else { "  " }, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:>3}. ", number), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} ", icon), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(name.clone(), name_style),
            ])
        }
        RenderLine::Headline(text) => Line::from(Span::styled(
            format!("         {}", text),
            Style::default().fg(Color::Cyan),
        )),
        RenderLine::Error(msg) => Line::from(vec![
            Span::styled("         Error: ", Style::default().fg(Color::Red)),
            Span::styled(msg.clone(), Style::default().fg(Color::Gray)),
        ]),
        RenderLine::Field { label, value } => Line::from(vec![
            Span::styled(
                format!(" {:<12}", label),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(value.clone(), Style::default().fg(Color::White)),
        ]),
        RenderLine::Score { category, score } => Line::from(vec![
            Span::styled(
                format!(" {:<24}", category),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format_score(*score), Style::default().fg(Color::White)),
        ]),
        RenderLine::Text(text) => Line::from(Span::styled(
            format!("   {}", text),
            Style::default().fg(Color::Gray),
        )),
        RenderLine::Blank => Line::default(),
        RenderLine::Pager {
            page,
            total_pages,
            has_previous,
            has_next,
        } => {
            let arrow = |on: bool, s: &'static str| {
                Span::styled(
                    s,
                    if on {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                )
            };
            Line::from(vec![
                Span::raw(" "),
                arrow(*has_previous, "◀ "),
                Span::styled(
                    format!("Page {}/{}", page, total_pages),
                    Style::default().fg(Color::White),
                ),
                arrow(*has_next, " ▶"),
            ])
        }
        RenderLine::Empty(text) => Line::from(Span::styled(
            format!(" {}", text),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

/// Results pane: counts, the current page and the pager.
pub fn render_results(frame: &mut Frame, app: &App, area: Rect, is_active: bool) {
    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let snapshot = app.session.snapshot();
    let title = if snapshot.status.is_terminal() {
        format!(" Results [{}] ", snapshot.status.label())
    } else {
        " Results ".to_string()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let selected = is_active.then_some(app.result_selected);
    let lines = results_lines(
        app.session.records(),
        &snapshot.results,
        app.settings.results.rich,
        selected,
    );

    // Keep the highlighted item in view when pagination is off.
    let inner_height = block.inner(area).height as usize;
    let selected_row = lines
        .iter()
        .position(|l| matches!(l, RenderLine::Item { selected: true, .. }))
        .unwrap_or(0);
    let scroll = (selected_row + 2).saturating_sub(inner_height) as u16;

    let text: Vec<Line> = lines.iter().map(to_line).collect();
    frame.render_widget(Paragraph::new(text).block(block).scroll((scroll, 0)), area);
}

/// Paragraph for the detail overlay, scrolled by `scroll` lines.
pub fn detail_paragraph(lines: &[RenderLine], scroll: usize) -> Paragraph<'static> {
    let text: Vec<Line> = lines.iter().map(to_line).collect();
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0))
}
