use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileSetError {
    #[error("no pending file at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A file chosen by the user that has not been submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub size: u64,
    /// MIME type guessed from the extension, sent as the multipart content type.
    pub mime_hint: String,
    pub path: PathBuf,
}

impl PendingFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let mime_hint = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            size,
            mime_hint,
            path,
        }
    }

    /// Stat a file on disk. Directories are rejected by the caller.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self::new(path.to_path_buf(), meta.len()))
    }

    fn identity(&self) -> (String, u64) {
        (self.name.clone(), self.size)
    }
}

/// What an `add` call did with its candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: Vec<PendingFile>,
    pub duplicates: usize,
}

/// The ordered set of pending files. Two files with the same name and size
/// are considered the same file.
#[derive(Debug)]
pub struct FileSetManager {
    files: Vec<PendingFile>,
    seen: HashSet<(String, u64)>,
    dedupe: bool,
}

impl Default for FileSetManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FileSetManager {
    pub fn new(dedupe: bool) -> Self {
        Self {
            files: Vec::new(),
            seen: HashSet::new(),
            dedupe,
        }
    }

    /// Append candidates in order. Duplicates (against the set and against
    /// earlier candidates of the same call) are dropped and counted.
    pub fn add<I>(&mut self, candidates: I) -> AddOutcome
    where
        I: IntoIterator<Item = PendingFile>,
    {
        let mut outcome = AddOutcome::default();
        for file in candidates {
            if self.dedupe && !self.seen.insert(file.identity()) {
                outcome.duplicates += 1;
                continue;
            }
            self.files.push(file.clone());
            outcome.added.push(file);
        }
        outcome
    }

    pub fn remove(&mut self, index: usize) -> Result<PendingFile, FileSetError> {
        if index >= self.files.len() {
            return Err(FileSetError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        let removed = self.files.remove(index);
        // Without dedupe the same identity may still be present further on.
        let identity = removed.identity();
        if !self.files.iter().any(|f| f.identity() == identity) {
            self.seen.remove(&identity);
        }
        Ok(removed)
    }

    /// Drop everything, returning how many files were pending.
    pub fn clear(&mut self) -> usize {
        let previous = self.files.len();
        self.files.clear();
        self.seen.clear();
        previous
    }

    pub fn list(&self) -> &[PendingFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
