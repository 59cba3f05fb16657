//! Upload session state: pending files, the running upload, and its results.
//!
//! Everything here is driven one event at a time from the UI thread. The
//! transfer worker never touches a [`Session`]; it only sends events that the
//! UI loop feeds into [`Session::on_progress`], [`Session::on_response`] and
//! [`Session::on_transport_error`].

pub mod export;
pub mod files;
pub mod pages;
pub mod results;

use chrono::{DateTime, Local};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transfer::progress::{ProgressSnapshot, ProgressTracker};
use files::{AddOutcome, FileSetError, FileSetManager, PendingFile};
use pages::{ResultPaginator, ResultsView};
use results::{interpret, OverallStatus, ResultRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an upload is already in progress")]
    Busy,
    #[error("no files selected for upload")]
    NoFiles,
    #[error(transparent)]
    FileSet(#[from] FileSetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Uploading,
    Processing,
    Complete,
    Failed,
}

impl SessionStatus {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Uploading => "Uploading",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    /// Non-2xx HTTP status.
    ServerStatus,
    /// The server answered `success: false`.
    Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One batch upload, from the first byte to its terminal state.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub total_bytes: u64,
    pub transferred_bytes: u64,
    pub file_count: usize,
    pub status: SessionStatus,
    pub progress: ProgressSnapshot,
    pub failure: Option<Failure>,
    tracker: ProgressTracker,
}

impl UploadSession {
    fn start(files: &[PendingFile]) -> Self {
        let total_bytes = files.iter().map(|f| f.size).sum();
        Self {
            started_at: Local::now(),
            finished_at: None,
            total_bytes,
            transferred_bytes: 0,
            file_count: files.len(),
            status: SessionStatus::Uploading,
            progress: ProgressSnapshot {
                total_bytes,
                ..ProgressSnapshot::default()
            },
            failure: None,
            tracker: ProgressTracker::new(files.len()),
        }
    }

    fn finish(&mut self, status: SessionStatus, failure: Option<Failure>) {
        self.status = status;
        self.failure = failure;
        self.finished_at = Some(Local::now());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub dedupe: bool,
    pub paginate: bool,
    pub page_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dedupe: true,
            paginate: true,
            page_size: 5,
        }
    }
}

impl SessionOptions {
    fn effective_page_size(&self) -> usize {
        if self.paginate {
            self.page_size.max(1)
        } else {
            usize::MAX
        }
    }
}

/// Read-only view of the whole session for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub status: SessionStatus,
    pub files: &'a [PendingFile],
    pub pending_bytes: u64,
    pub upload: Option<&'a UploadSession>,
    pub results: ResultsView<'a>,
    pub server_message: Option<&'a str>,
}

/// The explicit state object behind the UI.
#[derive(Debug)]
pub struct Session {
    files: FileSetManager,
    upload: Option<UploadSession>,
    results: ResultPaginator,
    server_message: Option<String>,
    options: SessionOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            files: FileSetManager::new(options.dedupe),
            upload: None,
            results: ResultPaginator::new(options.effective_page_size()),
            server_message: None,
            options,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.upload
            .as_ref()
            .map(|u| u.status)
            .unwrap_or(SessionStatus::Idle)
    }

    pub fn can_start_upload(&self) -> bool {
        !self.status().is_busy()
    }

    pub fn files(&self) -> &[PendingFile] {
        self.files.list()
    }

    pub fn records(&self) -> &[ResultRecord] {
        self.results.records()
    }

    pub fn upload(&self) -> Option<&UploadSession> {
        self.upload.as_ref()
    }

    // -----------------------------------------------------------------------
    // File set commands
    // -----------------------------------------------------------------------

    pub fn add_files<I>(&mut self, candidates: I) -> Result<AddOutcome, SessionError>
    where
        I: IntoIterator<Item = PendingFile>,
    {
        self.ensure_idle_files()?;
        let outcome = self.files.add(candidates);
        debug!(
            added = outcome.added.len(),
            duplicates = outcome.duplicates,
            pending = self.files.len(),
            "files added"
        );
        Ok(outcome)
    }

    pub fn remove_file(&mut self, index: usize) -> Result<PendingFile, SessionError> {
        self.ensure_idle_files()?;
        Ok(self.files.remove(index)?)
    }

    pub fn clear_files(&mut self) -> Result<usize, SessionError> {
        self.ensure_idle_files()?;
        Ok(self.files.clear())
    }

    fn ensure_idle_files(&self) -> Result<(), SessionError> {
        if self.status().is_busy() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Upload lifecycle
    // -----------------------------------------------------------------------

    /// Start a new upload session and return the batch to send.
    /// Allowed from Idle, Complete and Failed; previous results are dropped.
    pub fn begin_upload(&mut self) -> Result<Vec<PendingFile>, SessionError> {
        if !self.can_start_upload() {
            return Err(SessionError::Busy);
        }
        if self.files.is_empty() {
            return Err(SessionError::NoFiles);
        }
        self.results.clear();
        self.server_message = None;

        let batch = self.files.list().to_vec();
        let upload = UploadSession::start(&batch);
        info!(
            files = upload.file_count,
            bytes = upload.total_bytes,
            "upload started"
        );
        self.upload = Some(upload);
        Ok(batch)
    }

    /// Byte-level progress from the transport. Ignored unless uploading.
    /// Reaching 100 % moves the session to Processing: the bytes are out,
    /// the server is still rating.
    pub fn on_progress(&mut self, transferred: u64, total: u64) -> Option<ProgressSnapshot> {
        let upload = self.upload.as_mut()?;
        if upload.status != SessionStatus::Uploading {
            debug!(status = upload.status.label(), "progress event ignored");
            return None;
        }
        let snapshot = upload.tracker.on_progress(transferred, total);
        upload.transferred_bytes = transferred;
        upload.total_bytes = total;
        upload.progress = snapshot;
        if snapshot.is_complete() {
            upload.status = SessionStatus::Processing;
            info!("all bytes sent, waiting for server");
        }
        Some(snapshot)
    }

    /// The server answered with a 2xx body. A response means every byte was
    /// sent, so an upload still in Uploading passes through Processing first.
    /// The session always ends Complete here. A `success: false` payload shows
    /// up in the returned status and in `UploadSession::failure`.
    pub fn on_response(&mut self, payload: &Value) -> Option<OverallStatus> {
        let upload = match self.upload.as_mut() {
            Some(u) if u.status.is_busy() => u,
            other => {
                let status = other.map(|u| u.status);
                warn!(?status, "response outside of an active upload ignored");
                return None;
            }
        };
        if upload.status == SessionStatus::Uploading {
            upload.transferred_bytes = upload.total_bytes;
            upload.status = SessionStatus::Processing;
            debug!("response before full progress, treating all bytes as sent");
        }

        let interpretation = interpret(payload);
        let succeeded = interpretation.succeeded();
        let failed = interpretation.failed();
        let overall = interpretation.overall_status;

        let failure = match overall {
            OverallStatus::Complete => None,
            OverallStatus::Failed => interpretation
                .records
                .first()
                .and_then(ResultRecord::error_message)
                .map(|msg| Failure::new(FailureKind::Payload, msg)),
        };

        self.server_message = interpretation.message;
        self.results
            .configure(interpretation.records, self.options.effective_page_size());

        // Submitted files are done with; a rejected batch keeps them for retry.
        if overall == OverallStatus::Complete {
            self.files.clear();
        }
        if let Some(upload) = self.upload.as_mut() {
            upload.finish(SessionStatus::Complete, failure);
        }
        info!(succeeded, failed, overall = ?overall, "upload finished");
        Some(overall)
    }

    /// Network error, timeout or bad HTTP status.
    pub fn on_transport_error(&mut self, failure: Failure) -> bool {
        let Some(upload) = self.upload.as_mut() else {
            warn!(?failure, "transport error without an upload ignored");
            return false;
        };
        if !upload.status.is_busy() {
            warn!(?failure, status = upload.status.label(), "transport error ignored");
            return false;
        }
        warn!(kind = ?failure.kind, message = %failure.message, "upload failed");
        upload.finish(SessionStatus::Failed, Some(failure));
        true
    }

    /// Back to Idle with no pending files and no results.
    /// Rejected while an upload is running; there is no mid-transfer cancel.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.status().is_busy() {
            return Err(SessionError::Busy);
        }
        let dropped = self.files.clear();
        self.results.clear();
        self.upload = None;
        self.server_message = None;
        info!(dropped, "session reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Results navigation
    // -----------------------------------------------------------------------

    pub fn go_to_page(&mut self, page: usize) -> ResultsView<'_> {
        self.results.go_to(page)
    }

    pub fn next_page(&mut self) -> ResultsView<'_> {
        self.results.next()
    }

    pub fn previous_page(&mut self) -> ResultsView<'_> {
        self.results.previous()
    }

    pub fn first_page(&mut self) -> ResultsView<'_> {
        self.results.first()
    }

    pub fn last_page(&mut self) -> ResultsView<'_> {
        self.results.last()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            status: self.status(),
            files: self.files.list(),
            pending_bytes: self.files.total_bytes(),
            upload: self.upload.as_ref(),
            results: self.results.view(),
            server_message: self.server_message.as_deref(),
        }
    }
}
