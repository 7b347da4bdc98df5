//! Delivery of finished documents.
//!
//! The library only produces bytes. Where they end up is up to the host
//! application, which plugs in through the one-method [`DocumentSink`] trait.

use crate::error::FlashcardError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Receives a finished document together with a suggested file name.
pub trait DocumentSink: Send + Sync {
    /// Hand over `bytes`. Returns a human-readable location of the delivered
    /// document (a path, a URL, a key), useful for log lines.
    fn deliver(&self, bytes: &[u8], suggested_name: &str) -> Result<String, FlashcardError>;
}

/// Writes documents into a directory.
///
/// Writes are atomic: bytes go to a temp file in the target directory which
/// is then renamed over the destination, so readers never observe a
/// half-written PDF.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for a suggested name. Only the final path component
    /// of the name is used, so a sink never writes outside its directory.
    pub fn target_path(&self, suggested_name: &str) -> PathBuf {
        let name = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| crate::config::DEFAULT_FILE_NAME.into());
        self.dir.join(name)
    }
}

impl DocumentSink for FileSink {
    fn deliver(&self, bytes: &[u8], suggested_name: &str) -> Result<String, FlashcardError> {
        let path = self.target_path(suggested_name);
        write_atomic(&path, bytes)?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Write `bytes` to `path` via a sibling temp file and rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FlashcardError> {
    let write_err = |source: std::io::Error| FlashcardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Persisted {}", path.display());
    Ok(())
}

/// Keeps delivered documents in memory. Handy for tests and for hosts that
/// stream the bytes somewhere themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn take(&self) -> Vec<(String, Vec<u8>)> {
        match self.delivered.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DocumentSink for MemorySink {
    fn deliver(&self, bytes: &[u8], suggested_name: &str) -> Result<String, FlashcardError> {
        let mut guard = self
            .delivered
            .lock()
            .map_err(|_| FlashcardError::Internal("memory sink lock poisoned".into()))?;
        guard.push((suggested_name.to_string(), bytes.to_vec()));
        Ok(format!("memory:{suggested_name}"))
    }
}
