mod app;
mod config;
mod connection;
mod logging;
mod session;
mod transfer;
mod ui;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use app::{App, AppError, Focus};
use config::settings::{config_path, Settings};

/// Upload papers to a rating service and browse the scores.
#[derive(Debug, Parser)]
#[command(name = "paperate", version)]
struct Cli {
    /// Config file (default: <config dir>/paperate/config.toml)
    #[arg(long, env = "PAPERATE_CONFIG")]
    config: Option<PathBuf>,
    /// Base URL of the rating service
    #[arg(long, env = "PAPERATE_SERVER")]
    server: Option<String>,
    /// Seconds to wait for the rating response
    #[arg(long)]
    timeout: Option<u64>,
    /// Results per page
    #[arg(long)]
    page_size: Option<usize>,
    /// Ask the server to skip retrieval augmentation
    #[arg(long)]
    skip_rag: bool,
    /// Ask the server not to store the ratings
    #[arg(long)]
    skip_db: bool,
    /// Save the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,
    /// Files or directories to add to the pending list on start
    paths: Vec<PathBuf>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.server {
            settings.server.url = url.clone();
        }
        if let Some(secs) = self.timeout {
            settings.server.timeout_secs = secs;
        }
        if let Some(size) = self.page_size {
            settings.results.page_size = size;
        }
        settings.server.skip_rag |= self.skip_rag;
        settings.server.skip_db |= self.skip_db;
    }
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut settings = Settings::load_from(&path)?;
    cli.apply(&mut settings);
    settings.validate()?;

    if cli.write_config {
        settings.save_to(&path)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    let _guard = logging::init(&settings.log.level, &settings.log.file_path())?;
    info!(config = %path.display(), server = %settings.server.url, "starting");

    let mut app = App::new(settings)?;
    if !cli.paths.is_empty() {
        app.add_paths(cli.paths);
    }

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    info!("exiting");
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<(), AppError> {
    while app.running {
        // Drain transfer events before rendering so the frame shows the latest state
        app.poll_transfer();
        terminal.draw(|frame| ui::render(frame, app))?;
        handle_events(app)?;
    }
    Ok(())
}

fn handle_events(app: &mut App) -> Result<(), AppError> {
    if !event::poll(std::time::Duration::from_millis(50))? {
        return Ok(());
    }

    match event::read()? {
        Event::Paste(text) => {
            if !app.help_visible && !app.confirm_reset && app.detail.is_none() {
                app.handle_paste(&text);
            }
        }
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            // F1 toggles the help overlay from any context.
            if key.code == KeyCode::F(1) {
                app.help_visible = !app.help_visible;
                return Ok(());
            }
            if app.help_visible {
                if key.code == KeyCode::Esc {
                    app.help_visible = false;
                }
                return Ok(());
            }

            // Priority (highest first): reset confirm > detail > main
            if app.confirm_reset {
                handle_reset_key(app, key.code);
            } else if app.detail.is_some() {
                handle_detail_key(app, key.code);
            } else {
                handle_main_key(app, key.code);
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main key handling
// ---------------------------------------------------------------------------

fn handle_main_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::F(10) | KeyCode::Char('q') => app.quit(),
        KeyCode::Tab => app.toggle_focus(),

        KeyCode::Up => match app.focus {
            Focus::Browser => app.browser.move_up(),
            Focus::Pending => app.pending_move_up(),
            Focus::Results => app.result_move_up(),
        },
        KeyCode::Down => match app.focus {
            Focus::Browser => app.browser.move_down(),
            Focus::Pending => app.pending_move_down(),
            Focus::Results => app.result_move_down(),
        },

        // Space = toggle mark on current entry; move down after marking
        KeyCode::Char(' ') if app.focus == Focus::Browser => {
            app.browser.toggle_mark();
            app.browser.move_down();
        }
        KeyCode::Char('*') if app.focus == Focus::Browser => app.browser.mark_all(),

        KeyCode::Enter => match app.focus {
            Focus::Browser => app.browser_enter(),
            Focus::Pending => {}
            Focus::Results => app.open_detail(),
        },
        KeyCode::Backspace if app.focus == Focus::Browser => app.browser_go_up(),

        KeyCode::Char('a') | KeyCode::Insert if app.focus == Focus::Browser => {
            app.add_browser_selection()
        }
        KeyCode::Char('x') | KeyCode::Delete if app.focus == Focus::Pending => app.remove_pending(),
        KeyCode::Char('c') => app.clear_pending(),

        KeyCode::F(5) | KeyCode::Char('u') => app.start_upload(),

        KeyCode::PageDown | KeyCode::Right => app.next_page(),
        KeyCode::PageUp | KeyCode::Left => app.previous_page(),
        KeyCode::Home => app.first_page(),
        KeyCode::End => app.last_page(),
        // 1-9 = jump to page (clamped to the last page)
        KeyCode::Char(d @ '1'..='9') if app.focus == Focus::Results => {
            app.go_to_page(d as usize - '0' as usize)
        }

        KeyCode::F(6) | KeyCode::Char('e') => app.export_results(),
        KeyCode::F(9) | KeyCode::Char('r') => app.request_reset(),

        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Overlay key handling
// ---------------------------------------------------------------------------

fn handle_reset_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_reset(),
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.confirm_reset = false,
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.detail = None,
        KeyCode::Up => {
            if let Some(d) = app.detail.as_mut() {
                d.scroll_up();
            }
        }
        KeyCode::Down => {
            let total = app
                .detail
                .as_ref()
                .map(|d| ui::view::detail_lines(&d.record).len())
                .unwrap_or(0);
            if let Some(d) = app.detail.as_mut() {
                d.scroll_down(total, ui::dialogs::DETAIL_VISIBLE_LINES);
            }
        }
        _ => {}
    }
}
