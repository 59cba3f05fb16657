use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::settings::ServerSettings;
use crate::session::files::PendingFile;
use crate::session::{Failure, FailureKind};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),
    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("server returned HTTP {status}: {detail}")]
    ServerStatus { status: u16, detail: String },
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl TransferError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::Io { .. } => FailureKind::Network,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::ServerStatus { .. } | Self::Decode(_) => FailureKind::ServerStatus,
        }
    }

    pub fn into_failure(self) -> Failure {
        Failure::new(self.kind(), self.to_string())
    }
}

/// Messages from the transfer worker to the UI loop.
#[derive(Debug)]
pub enum TransferEvent {
    /// File bytes handed to the socket so far, out of the batch total.
    Progress { sent: u64, total: u64 },
    /// 2xx response with a JSON body.
    Response(Value),
    Failed(TransferError),
}

/// Blocking HTTP client for the rating service's upload endpoint.
#[derive(Debug, Clone)]
pub struct RatingClient {
    client: Client,
    url: String,
    timeout: Duration,
    skip_rag: bool,
    skip_db: bool,
}

impl RatingClient {
    pub fn new(settings: &ServerSettings) -> Result<Self, TransferError> {
        let timeout = settings.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paperate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransferError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.upload_url(),
            timeout,
            skip_rag: settings.skip_rag,
            skip_db: settings.skip_db,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send every file as a repeated `files` part of one multipart request.
    /// Progress is reported through `tx` as the body is streamed.
    pub fn upload(
        &self,
        files: &[PendingFile],
        tx: &Sender<TransferEvent>,
    ) -> Result<Value, TransferError> {
        let total: u64 = files.iter().map(|f| f.size).sum();
        let sent = Arc::new(AtomicU64::new(0));

        let mut form = Form::new();
        for file in files {
            let handle = File::open(&file.path).map_err(|source| TransferError::Io {
                path: file.path.clone(),
                source,
            })?;
            let reader = ProgressReader {
                inner: handle,
                sent: Arc::clone(&sent),
                total,
                tx: tx.clone(),
            };
            let part = Part::reader_with_length(reader, file.size)
                .file_name(file.name.clone())
                .mime_str(&file.mime_hint)
                .map_err(|e| TransferError::Network(e.to_string()))?;
            form = form.part("files", part);
        }

        info!(url = %self.url, files = files.len(), bytes = total, "sending batch");
        let _ = tx.send(TransferEvent::Progress { sent: 0, total });

        let response = self
            .client
            .post(&self.url)
            .query(&[("skip_rag", self.skip_rag), ("skip_db", self.skip_db)])
            .multipart(form)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(%status, "response headers received");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransferError::ServerStatus {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        response.json::<Value>().map_err(|e| {
            if e.is_timeout() {
                TransferError::Timeout(self.timeout)
            } else {
                TransferError::Decode(e.to_string())
            }
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransferError {
        if err.is_timeout() {
            TransferError::Timeout(self.timeout)
        } else {
            TransferError::Network(err.to_string())
        }
    }
}

/// Run the upload on its own thread. The receiver yields progress events
/// and then exactly one `Response` or `Failed`.
pub fn spawn_upload(client: RatingClient, files: Vec<PendingFile>) -> Receiver<TransferEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let event = match client.upload(&files, &tx) {
            Ok(body) => TransferEvent::Response(body),
            Err(e) => {
                warn!(error = %e, "upload request failed");
                TransferEvent::Failed(e)
            }
        };
        // The UI may already be gone.
        let _ = tx.send(event);
    });
    rx
}

/// Pull the human readable part out of an error body. FastAPI wraps it in
/// `{"detail": ...}`; anything else is shown as-is, shortened.
fn error_detail(body: &str) -> String {
    const MAX: usize = 200;
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail").or_else(|| value.get("error")) {
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no details".to_string();
    }
    if trimmed.chars().count() > MAX {
        let short: String = trimmed.chars().take(MAX).collect();
        format!("{}…", short)
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Progress-reporting reader
// ---------------------------------------------------------------------------

/// Wraps one file of the batch. All readers of a batch share `sent`, so the
/// reported count is cumulative across parts.
struct ProgressReader<R> {
    inner: R,
    sent: Arc<AtomicU64>,
    total: u64,
    tx: Sender<TransferEvent>,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            let sent = self.sent.fetch_add(n as u64, Ordering::Relaxed) + n as u64;
            let _ = self.tx.send(TransferEvent::Progress {
                sent: sent.min(self.total),
                total: self.total,
            });
        }
        Ok(n)
    }
}
