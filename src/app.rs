use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::SystemTime;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::settings::{ConfigError, Settings};
use crate::connection::http::{spawn_upload, RatingClient, TransferError, TransferEvent};
use crate::session::export::write_report;
use crate::session::files::PendingFile;
use crate::session::results::ResultRecord;
use crate::session::{Failure, FailureKind, Session, SessionError, SessionStatus};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Logging setup failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// Which pane currently receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Browser,
    Pending,
    Results,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Browser => Self::Pending,
            Self::Pending => Self::Results,
            Self::Results => Self::Browser,
        }
    }
}

/// A single entry in the local file browser
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
}

/// State of the local file browser
#[derive(Debug)]
pub struct PanelState {
    pub path: PathBuf,
    pub entries: Vec<FileEntry>,
    pub selected: usize,
    /// Indices of entries that have been marked with Space.
    pub marked: HashSet<usize>,
}

impl PanelState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
            selected: 0,
            marked: HashSet::new(),
        }
    }

    /// Toggle the mark on the highlighted entry. ".." cannot be marked.
    pub fn toggle_mark(&mut self) {
        match self.entries.get(self.selected) {
            Some(e) if e.name != ".." => {}
            _ => return,
        }
        if !self.marked.remove(&self.selected) {
            self.marked.insert(self.selected);
        }
    }

    /// Mark all non-".." entries. If all are already marked, unmark all.
    pub fn mark_all(&mut self) {
        let eligible: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name != "..")
            .map(|(i, _)| i)
            .collect();

        if eligible.iter().all(|i| self.marked.contains(i)) {
            self.marked.clear();
        } else {
            self.marked.extend(eligible);
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    pub fn load_local(&mut self) -> Result<(), AppError> {
        self.entries.clear();
        self.marked.clear();
        if self.path.parent().is_some() {
            self.entries.push(FileEntry {
                name: "..".to_string(),
                size: None,
                modified: None,
                is_dir: true,
            });
        }
        let read_dir = std::fs::read_dir(&self.path)?;
        let mut entries: Vec<FileEntry> = read_dir
            .filter_map(|e| e.ok())
            .map(|e| {
                let meta = e.metadata().ok();
                FileEntry {
                    name: e.file_name().to_string_lossy().to_string(),
                    size: meta.as_ref().filter(|m| m.is_file()).map(|m| m.len()),
                    modified: meta.as_ref().and_then(|m| m.modified().ok()),
                    is_dir: meta.map(|m| m.is_dir()).unwrap_or(false),
                }
            })
            .collect();
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));
        self.entries.extend(entries);
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        Ok(())
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    /// Enter the highlighted directory. Returns the path of the highlighted
    /// file instead when it is not a directory.
    pub fn enter_selected(&mut self) -> Result<Option<PathBuf>, AppError> {
        let Some(entry) = self.entries.get(self.selected) else {
            return Ok(None);
        };
        if !entry.is_dir {
            return Ok(Some(self.path.join(&entry.name)));
        }
        let new_path = if entry.name == ".." {
            self.path.parent().unwrap_or(&self.path).to_path_buf()
        } else {
            self.path.join(&entry.name)
        };
        self.path = new_path;
        self.selected = 0;
        self.load_local()?;
        Ok(None)
    }

    /// Navigate to the parent directory (Backspace key).
    pub fn go_up(&mut self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().map(|p| p.to_path_buf()) {
            self.path = parent;
            self.selected = 0;
            self.load_local()?;
        }
        Ok(())
    }

    /// Marked entries in listing order, or the highlighted one when nothing
    /// is marked.
    pub fn selection(&self) -> Vec<PathBuf> {
        if self.marked.is_empty() {
            return match self.entries.get(self.selected) {
                Some(e) if e.name != ".." => vec![self.path.join(&e.name)],
                _ => Vec::new(),
            };
        }
        let mut indices: Vec<usize> = self.marked.iter().copied().collect();
        indices.sort_unstable();
        indices
            .iter()
            .filter_map(|&i| self.entries.get(i))
            .filter(|e| e.name != "..")
            .map(|e| self.path.join(&e.name))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Result detail overlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DetailDialog {
    pub record: ResultRecord,
    pub scroll: usize,
}

impl DetailDialog {
    pub fn new(record: ResultRecord) -> Self {
        Self { record, scroll: 0 }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, total_lines: usize, visible: usize) {
        if self.scroll + visible < total_lines {
            self.scroll += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Overall application state
// ---------------------------------------------------------------------------

pub struct App {
    pub browser: PanelState,
    pub focus: Focus,
    pub running: bool,
    pub status_message: Option<String>,
    pub settings: Settings,
    pub session: Session,
    client: RatingClient,
    /// Events from the running upload worker (None when idle)
    transfer: Option<Receiver<TransferEvent>>,
    /// Highlighted row in the pending list
    pub pending_selected: usize,
    /// Highlighted row on the current results page
    pub result_selected: usize,
    /// Result detail overlay (Enter on a result)
    pub detail: Option<DetailDialog>,
    /// Reset confirmation overlay (F9)
    pub confirm_reset: bool,
    /// Keyboard shortcut help overlay (F1)
    pub help_visible: bool,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let mut browser = PanelState::new(dirs_or_cwd());
        browser.load_local()?;
        let client = RatingClient::new(&settings.server)?;
        let session = Session::new(settings.session_options());
        info!(url = client.url(), "client ready");
        Ok(Self {
            browser,
            focus: Focus::Browser,
            running: true,
            status_message: None,
            settings,
            session,
            client,
            transfer: None,
            pending_selected: 0,
            result_selected: 0,
            detail: None,
            confirm_reset: false,
            help_visible: false,
        })
    }

    pub fn quit(&mut self) {
        if self.is_transferring() {
            warn!("quitting with an upload in flight");
        }
        self.running = false;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn is_transferring(&self) -> bool {
        self.transfer.is_some()
    }

    // -----------------------------------------------------------------------
    // Adding files: browser, drag-and-drop, command line
    // -----------------------------------------------------------------------

    /// Expand directories, filter by extension and add what is left to the
    /// pending set. Reports the outcome in the status line.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let collected = collect_candidates(&paths, |p| self.settings.files.accepts(p));
        let attempted = collected.files.len();

        match self.session.add_files(collected.files) {
            Ok(outcome) => {
                let mut msg = format!("Added {} file(s)", outcome.added.len());
                if outcome.duplicates > 0 {
                    msg.push_str(&format!(", {} duplicate(s) ignored", outcome.duplicates));
                }
                if collected.skipped > 0 {
                    msg.push_str(&format!(", {} unsupported skipped", collected.skipped));
                }
                if collected.unreadable > 0 {
                    msg.push_str(&format!(", {} unreadable", collected.unreadable));
                }
                debug!(attempted, added = outcome.added.len(), "add_paths");
                self.status_message = Some(msg);
            }
            Err(e) => self.status_message = Some(format!("Cannot add files: {}", e)),
        }
    }

    /// Enter on the browser: open a directory or add a file.
    pub fn browser_enter(&mut self) {
        match self.browser.enter_selected() {
            Ok(Some(file)) => self.add_paths(vec![file]),
            Ok(None) => {}
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn browser_go_up(&mut self) {
        if let Err(e) = self.browser.go_up() {
            self.status_message = Some(e.to_string());
        }
    }

    /// Add marked entries (or the highlighted one), directories included.
    pub fn add_browser_selection(&mut self) {
        let paths = self.browser.selection();
        if paths.is_empty() {
            return;
        }
        self.add_paths(paths);
        self.browser.clear_marks();
    }

    /// Terminals deliver a file drop as a bracketed paste of its path(s).
    pub fn handle_paste(&mut self, text: &str) {
        let paths = parse_dropped_paths(text);
        if paths.is_empty() {
            return;
        }
        info!(count = paths.len(), "paths dropped");
        self.add_paths(paths);
    }

    pub fn pending_move_up(&mut self) {
        self.pending_selected = self.pending_selected.saturating_sub(1);
    }

    pub fn pending_move_down(&mut self) {
        if self.pending_selected + 1 < self.session.files().len() {
            self.pending_selected += 1;
        }
    }

    pub fn remove_pending(&mut self) {
        match self.session.remove_file(self.pending_selected) {
            Ok(file) => {
                self.status_message = Some(format!("Removed '{}'", file.name));
                let len = self.session.files().len();
                self.pending_selected = self.pending_selected.min(len.saturating_sub(1));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn clear_pending(&mut self) {
        match self.session.clear_files() {
            Ok(0) => {}
            Ok(n) => {
                self.pending_selected = 0;
                self.status_message = Some(format!("Cleared {} pending file(s)", n));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Send all pending files as one batch on a worker thread.
    pub fn start_upload(&mut self) {
        let batch = match self.session.begin_upload() {
            Ok(batch) => batch,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };
        let label = if batch.len() == 1 {
            format!("'{}'", batch[0].name)
        } else {
            format!("{} files", batch.len())
        };
        self.transfer = Some(spawn_upload(self.client.clone(), batch));
        self.result_selected = 0;
        self.detail = None;
        self.status_message = Some(format!("Uploading {}…", label));
    }

    /// Feed every queued transfer event into the session, in order.
    /// Called once per frame before rendering.
    pub fn poll_transfer(&mut self) {
        let Some(rx) = self.transfer.take() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(TransferEvent::Progress { sent, total }) => {
                    self.session.on_progress(sent, total);
                }
                Ok(TransferEvent::Response(body)) => {
                    self.session.on_response(&body);
                    self.finish_transfer();
                    return;
                }
                Ok(TransferEvent::Failed(err)) => {
                    self.session.on_transport_error(err.into_failure());
                    self.finish_transfer();
                    return;
                }
                Err(TryRecvError::Empty) => {
                    self.transfer = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    self.session.on_transport_error(Failure::new(
                        FailureKind::Network,
                        "upload worker stopped without a result",
                    ));
                    self.finish_transfer();
                    return;
                }
            }
        }
    }

    fn finish_transfer(&mut self) {
        self.result_selected = 0;
        self.pending_selected = 0;
        let snapshot = self.session.snapshot();
        let failure = snapshot.upload.and_then(|u| u.failure.as_ref());
        self.status_message = Some(match (snapshot.status, failure) {
            (_, Some(f)) if f.kind == FailureKind::Payload => {
                format!("Rating failed: {}", f.message)
            }
            (SessionStatus::Failed, Some(f)) => format!("Upload failed: {}", f.message),
            _ => match snapshot.server_message {
                Some(msg) => msg.to_string(),
                None => format!(
                    "Upload {}: {} result(s)",
                    snapshot.status.label().to_lowercase(),
                    snapshot.results.total_records
                ),
            },
        });
        if snapshot.status == SessionStatus::Complete || !snapshot.results.is_empty() {
            self.focus = Focus::Results;
        }
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    pub fn go_to_page(&mut self, page: usize) {
        self.session.go_to_page(page);
        self.result_selected = 0;
    }

    pub fn next_page(&mut self) {
        self.session.next_page();
        self.result_selected = 0;
    }

    pub fn previous_page(&mut self) {
        self.session.previous_page();
        self.result_selected = 0;
    }

    pub fn first_page(&mut self) {
        self.session.first_page();
        self.result_selected = 0;
    }

    pub fn last_page(&mut self) {
        self.session.last_page();
        self.result_selected = 0;
    }

    pub fn result_move_up(&mut self) {
        if self.result_selected > 0 {
            self.result_selected -= 1;
        } else if self.session.snapshot().results.has_previous() {
            self.session.previous_page();
            self.result_selected = self.session.snapshot().results.records.len().saturating_sub(1);
        }
    }

    pub fn result_move_down(&mut self) {
        let view = self.session.snapshot().results;
        if self.result_selected + 1 < view.records.len() {
            self.result_selected += 1;
        } else if view.has_next() {
            self.next_page();
        }
    }

    pub fn open_detail(&mut self) {
        let view = self.session.snapshot().results;
        if let Some(record) = view.records.get(self.result_selected) {
            self.detail = Some(DetailDialog::new(record.clone()));
        }
    }

    /// Write the plain-text report into the browser's current directory.
    pub fn export_results(&mut self) {
        let records = self.session.records();
        if records.is_empty() {
            self.status_message = Some("No results to export".to_string());
            return;
        }
        match write_report(&self.browser.path, records, Local::now()) {
            Ok(path) => {
                info!(path = %path.display(), "results exported");
                let refreshed = self.browser.load_local();
                self.status_message = Some(export_message(&path, refreshed));
            }
            Err(e) => self.status_message = Some(format!("Export failed: {}", e)),
        }
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    pub fn request_reset(&mut self) {
        if self.session.status().is_busy() {
            self.status_message = Some("Upload in progress, reset is available afterwards".to_string());
            return;
        }
        self.confirm_reset = true;
    }

    pub fn confirm_reset(&mut self) {
        self.confirm_reset = false;
        match self.session.reset() {
            Ok(()) => {
                self.pending_selected = 0;
                self.result_selected = 0;
                self.detail = None;
                self.focus = Focus::Browser;
                self.status_message = Some("Ready for a new upload".to_string());
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }
}

/// Status line after a successful export. A failed listing refresh is
/// reported alongside the written path.
fn export_message(path: &Path, refreshed: Result<(), AppError>) -> String {
    match refreshed {
        Ok(()) => format!("Exported to {}", path.display()),
        Err(e) => format!("Exported to {}, file list not refreshed: {}", path.display(), e),
    }
}

// ---------------------------------------------------------------------------
// Candidate collection
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Collected {
    files: Vec<PendingFile>,
    skipped: usize,
    unreadable: usize,
}

/// Turn user-chosen paths into pending files. Directories are walked
/// recursively in name order; files failing `accept` are counted as skipped.
fn collect_candidates(paths: &[PathBuf], accept: impl Fn(&Path) -> bool) -> Collected {
    let mut out = Collected::default();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(e) if e.file_type().is_file() => push_file(&mut out, e.path(), &accept),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable entry");
                        out.unreadable += 1;
                    }
                }
            }
        } else {
            push_file(&mut out, path, &accept);
        }
    }
    out
}

fn push_file(out: &mut Collected, path: &Path, accept: &impl Fn(&Path) -> bool) {
    if !accept(path) {
        out.skipped += 1;
        return;
    }
    match PendingFile::from_path(path) {
        Ok(file) => out.files.push(file),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot stat file");
            out.unreadable += 1;
        }
    }
}

/// Split pasted text into paths. Handles one path per line, shell-escaped
/// paths separated by spaces, quoted paths and `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .filter_map(|token| {
            if token.starts_with("file://") {
                reqwest::Url::parse(&token).ok()?.to_file_path().ok()
            } else {
                Some(PathBuf::from(token))
            }
        })
        .collect()
}

fn dirs_or_cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dropped_paths_one_per_line() {
        let paths = parse_dropped_paths("/tmp/a.pdf\n/tmp/b.pdf\n");
        assert_eq!(paths, [PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.pdf")]);
    }

    #[test]
    fn dropped_paths_escaped_and_quoted() {
        let paths = parse_dropped_paths(r#"/tmp/my\ paper.pdf '/tmp/other one.pdf' "/tmp/x.pdf""#);
        assert_eq!(
            paths,
            [
                PathBuf::from("/tmp/my paper.pdf"),
                PathBuf::from("/tmp/other one.pdf"),
                PathBuf::from("/tmp/x.pdf"),
            ]
        );
    }

    #[test]
    fn dropped_file_uris_are_decoded() {
        let paths = parse_dropped_paths("file:///tmp/with%20space.pdf");
        assert_eq!(paths, [PathBuf::from("/tmp/with space.pdf")]);
    }

    #[test]
    fn blank_paste_yields_nothing() {
        assert!(parse_dropped_paths("  \n\t ").is_empty());
    }

    #[test]
    fn candidates_walk_directories_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batch");
        fs::create_dir_all(nested.join("deeper")).unwrap();
        fs::write(nested.join("b.pdf"), b"bb").unwrap();
        fs::write(nested.join("deeper").join("a.pdf"), b"a").unwrap();
        fs::write(nested.join("notes.txt"), b"n").unwrap();
        let loose = dir.path().join("loose.PDF");
        fs::write(&loose, b"loose").unwrap();

        let accept = |p: &Path| {
            p.extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        };
        let out = collect_candidates(&[nested, loose, dir.path().join("gone.pdf")], accept);

        let names: Vec<&str> = out.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b.pdf", "a.pdf", "loose.PDF"]);
        assert_eq!(out.files[0].size, 2);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.unreadable, 1);
    }

    /// App with one pending file and a hand-fed event channel in place of
    /// the worker thread.
    fn uploading_app() -> (App, std::sync::mpsc::Sender<TransferEvent>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        fs::write(&file, b"0123456789").unwrap();

        let mut app = App::new(Settings::default()).unwrap();
        app.add_paths(vec![file]);
        assert_eq!(app.session.files().len(), 1);

        app.session.begin_upload().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        app.transfer = Some(rx);
        (app, tx, dir)
    }

    #[test]
    fn transfer_events_drive_the_session_to_complete() {
        let (mut app, tx, _dir) = uploading_app();

        tx.send(TransferEvent::Progress { sent: 4, total: 10 }).unwrap();
        app.poll_transfer();
        assert!(app.is_transferring());
        assert_eq!(app.session.status(), SessionStatus::Uploading);

        tx.send(TransferEvent::Progress { sent: 10, total: 10 }).unwrap();
        tx.send(TransferEvent::Response(serde_json::json!({
            "success": true,
            "message": "Processed 1 file(s) successfully, 0 failed",
            "data": {"results": {"successful": [{"file_path": "/tmp/x/a.pdf", "result": {}}], "failed": []}}
        })))
        .unwrap();
        app.poll_transfer();

        assert!(!app.is_transferring());
        assert_eq!(app.session.status(), SessionStatus::Complete);
        assert_eq!(app.focus, Focus::Results);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Processed 1 file(s) successfully, 0 failed")
        );
        assert!(app.session.files().is_empty());
    }

    #[test]
    fn vanished_worker_fails_the_upload() {
        let (mut app, tx, _dir) = uploading_app();
        drop(tx);
        app.poll_transfer();

        assert!(!app.is_transferring());
        assert_eq!(app.session.status(), SessionStatus::Failed);
        let failure = app.session.upload().and_then(|u| u.failure.clone()).unwrap();
        assert_eq!(failure.kind, FailureKind::Network);
        // Kept for a retry.
        assert_eq!(app.session.files().len(), 1);
    }

    #[test]
    fn rejected_batch_completes_and_keeps_files() {
        let (mut app, tx, _dir) = uploading_app();
        tx.send(TransferEvent::Response(serde_json::json!({
            "success": false,
            "error": "Failed to process all files"
        })))
        .unwrap();
        app.poll_transfer();

        assert_eq!(app.session.status(), SessionStatus::Complete);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Rating failed: Failed to process all files")
        );
        assert_eq!(app.session.files().len(), 1);
        assert_eq!(app.focus, Focus::Results);
    }

    #[test]
    fn export_reports_refresh_failure() {
        let path = Path::new("/tmp/out/rating-results.txt");
        assert_eq!(
            export_message(path, Ok(())),
            "Exported to /tmp/out/rating-results.txt"
        );

        let gone = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let msg = export_message(path, Err(AppError::Io(gone)));
        assert_eq!(
            msg,
            "Exported to /tmp/out/rating-results.txt, file list not refreshed: IO error: gone"
        );
    }

    #[test]
    fn export_writes_into_browsed_directory() {
        let (mut app, tx, dir) = uploading_app();
        tx.send(TransferEvent::Response(serde_json::json!({"success": false, "error": "boom"})))
            .unwrap();
        app.poll_transfer();

        app.browser.path = dir.path().to_path_buf();
        app.export_results();

        let msg = app.status_message.clone().unwrap();
        assert!(msg.starts_with("Exported to "), "{msg}");
        assert!(!msg.contains("not refreshed"));
        assert!(app
            .browser
            .entries
            .iter()
            .any(|e| e.name.starts_with("rating-results-")));
    }

    #[test]
    fn reset_waits_for_confirmation() {
        let (mut app, tx, _dir) = uploading_app();
        app.request_reset();
        assert!(!app.confirm_reset);

        tx.send(TransferEvent::Failed(TransferError::Network("refused".to_string())))
            .unwrap();
        app.poll_transfer();
        app.request_reset();
        assert!(app.confirm_reset);

        app.confirm_reset();
        assert_eq!(app.session.status(), SessionStatus::Idle);
        assert!(app.session.files().is_empty());
        assert_eq!(app.focus, Focus::Browser);
    }

    #[test]
    fn browser_lists_dirs_first_and_selects() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("z.pdf"), b"z").unwrap();
        fs::write(dir.path().join("a.pdf"), b"a").unwrap();

        let mut panel = PanelState::new(dir.path().to_path_buf());
        panel.load_local().unwrap();
        let names: Vec<&str> = panel.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["..", "sub", "a.pdf", "z.pdf"]);

        // Nothing marked: the highlighted entry, ".." excluded.
        assert!(panel.selection().is_empty());
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.selection(), [dir.path().join("a.pdf")]);

        panel.mark_all();
        assert_eq!(panel.selection().len(), 3);
        panel.mark_all();
        assert!(panel.marked.is_empty());
    }

    #[test]
    fn browser_enter_returns_files_and_opens_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("p.pdf"), b"p").unwrap();

        let mut panel = PanelState::new(dir.path().to_path_buf());
        panel.load_local().unwrap();
        panel.move_down();
        assert_eq!(panel.enter_selected().unwrap(), None);
        assert_eq!(panel.path, dir.path().join("sub"));

        panel.move_down();
        assert_eq!(
            panel.enter_selected().unwrap(),
            Some(dir.path().join("sub").join("p.pdf"))
        );
    }
}
