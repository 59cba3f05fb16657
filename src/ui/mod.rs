pub mod dialogs;
pub mod panels;
pub mod results;
pub mod statusbar;
pub mod view;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, Focus};
use dialogs::{render_detail_dialog, render_help_dialog, render_reset_dialog};
use panels::{render_browser, render_pending};
use results::render_results;
use statusbar::render_statusbar;

/// Top-level render function called each frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // panes take remaining space
            Constraint::Length(2), // status bar (hints + message, or progress + bytes)
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    // Right column: pending files above results
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(columns[1]);

    render_browser(frame, &app.browser, columns[0], app.focus == Focus::Browser);
    render_pending(frame, app, right[0]);
    render_results(frame, app, right[1], app.focus == Focus::Results);

    let snapshot = app.session.snapshot();
    render_statusbar(frame, chunks[1], &snapshot, app.status_message.as_deref());

    // Overlays, rendered last so they appear on top
    if let Some(ref dlg) = app.detail {
        render_detail_dialog(frame, dlg);
    }
    if app.confirm_reset {
        render_reset_dialog(frame, &snapshot);
    }
    if app.help_visible {
        render_help_dialog(frame);
    }
}
