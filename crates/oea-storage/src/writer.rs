//! Append-only writer with one cached handle per destination file.

use crate::{Result, StorageError};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default buffer size for each open handle.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Appends text to files under a root directory.
///
/// The first write to a path creates its parent directories and opens the
/// file in append mode; later writes reuse that handle. At most one handle
/// is open per path. Handles are flushed and closed by [`FileWriter::finish`]
/// or, failing that, when the writer is dropped.
pub struct FileWriter {
    root: PathBuf,
    writers: HashMap<PathBuf, BufWriter<File>>,
    bytes_written: u64,
}

impl FileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writers: HashMap::new(),
            bytes_written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of distinct destinations opened so far.
    pub fn open_handles(&self) -> usize {
        self.writers.len()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append `data` to `relative_path` under the root.
    pub fn write(&mut self, relative_path: impl AsRef<Path>, data: &str) -> Result<()> {
        let path = self.root.join(relative_path.as_ref());
        let shown = path.display().to_string();

        if !self.writers.contains_key(&path) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| StorageError::from_io(&shown, e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| StorageError::from_io(&shown, e))?;
            debug!("Opened {} for append", shown);
            self.writers
                .insert(path.clone(), BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));
        }

        if let Some(writer) = self.writers.get_mut(&path) {
            writer
                .write_all(data.as_bytes())
                .map_err(|e| StorageError::from_io(&shown, e))?;
        }
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush and close every handle, reporting the first failure.
    pub fn finish(&mut self) -> Result<()> {
        let mut first_error = None;
        for (path, mut writer) in self.writers.drain() {
            if let Err(e) = writer.flush() {
                let err = StorageError::from_io(path.display().to_string(), e);
                warn!("{err}");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        if !self.writers.is_empty() {
            if let Err(e) = self.finish() {
                warn!("Failed to flush output on drop: {e}");
            }
        }
    }
}
