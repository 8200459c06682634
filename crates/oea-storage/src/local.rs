//! Local filesystem implementation of [`Filesystem`].

use crate::location::StorageLocation;
use crate::{FileInfo, Filesystem, Result, StorageError};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem rooted at a local directory.
///
/// `<scheme>://<container>@<account>/<path>` resolves to
/// `<root>/<container>/<path>`; the account is ignored so one root can
/// stand in for any storage account. Paths without a scheme are used as
/// given.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for a storage URI or plain path.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        if !StorageLocation::is_uri(path) {
            return Ok(PathBuf::from(path));
        }
        let location = StorageLocation::parse(path)?;
        let mut resolved = self.root.join(&location.container);
        for segment in location.path.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." {
                return Err(StorageError::MalformedPath(path.to_string()));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

fn ensure_parent(path: &Path, display: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(display, e))?;
        }
    }
    Ok(())
}

fn copy_tree(from: &Path, to: &Path, display: &str) -> Result<()> {
    fs::create_dir_all(to).map_err(|e| StorageError::from_io(display, e))?;
    let entries = fs::read_dir(from).map_err(|e| StorageError::from_io(display, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::from_io(display, e))?;
        let target = to.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| StorageError::from_io(display, e))?;
        if file_type.is_dir() {
            copy_tree(&entry.path(), &target, display)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StorageError::from_io(display, e))?;
        }
    }
    Ok(())
}

impl Filesystem for LocalFilesystem {
    fn ls(&self, path: &str) -> Result<Vec<FileInfo>> {
        let dir = self.resolve(path)?;
        let entries = fs::read_dir(&dir).map_err(|e| StorageError::from_io(path, e))?;

        let mut results = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::from_io(path, e))?;
            let metadata = entry
                .metadata()
                .map_err(|e| StorageError::from_io(path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            results.push(FileInfo {
                path: crate::join_path(path, &name),
                name,
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
            });
        }

        // Sort for consistent ordering
        results.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Listed {} entries in {}", results.len(), path);
        Ok(results)
    }

    fn remove(&self, path: &str, recursive: bool) -> Result<()> {
        let target = self.resolve(path)?;
        let metadata = fs::metadata(&target).map_err(|e| StorageError::from_io(path, e))?;
        let result = if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(&target)
            } else {
                fs::remove_dir(&target)
            }
        } else {
            fs::remove_file(&target)
        };
        result.map_err(|e| StorageError::from_io(path, e))?;
        debug!("Removed {}", path);
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        target
            .try_exists()
            .map_err(|e| StorageError::from_io(path, e))
    }

    fn read_to_string(&self, path: &str) -> Result<String> {
        let target = self.resolve(path)?;
        fs::read_to_string(&target).map_err(|e| StorageError::from_io(path, e))
    }

    fn head(&self, path: &str, max_bytes: usize) -> Result<String> {
        let target = self.resolve(path)?;
        let file = fs::File::open(&target).map_err(|e| StorageError::from_io(path, e))?;
        let mut buffer = Vec::with_capacity(max_bytes.min(64 * 1024));
        file.take(max_bytes as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| StorageError::from_io(path, e))?;

        match String::from_utf8(buffer) {
            Ok(text) => Ok(text),
            Err(e) => {
                // The cut may land inside a multi-byte character
                let valid = e.utf8_error().valid_up_to();
                let mut bytes = e.into_bytes();
                bytes.truncate(valid);
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    fn put(&self, path: &str, contents: &str, overwrite: bool) -> Result<()> {
        let target = self.resolve(path)?;
        ensure_parent(&target, path)?;
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options
            .open(&target)
            .map_err(|e| StorageError::from_io(path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| StorageError::from_io(path, e))
    }

    fn append(&self, path: &str, contents: &str) -> Result<()> {
        let target = self.resolve(path)?;
        ensure_parent(&target, path)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)
            .map_err(|e| StorageError::from_io(path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| StorageError::from_io(path, e))
    }

    fn copy(&self, from: &str, to: &str, recursive: bool) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        let metadata = fs::metadata(&source).map_err(|e| StorageError::from_io(from, e))?;
        if metadata.is_dir() {
            if !recursive {
                return Err(StorageError::Unavailable {
                    path: from.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "source is a directory and recursive copy was not requested",
                    ),
                });
            }
            copy_tree(&source, &target, to)?;
        } else {
            ensure_parent(&target, to)?;
            fs::copy(&source, &target).map_err(|e| StorageError::from_io(to, e))?;
        }
        debug!("Copied {} to {}", from, to);
        Ok(())
    }

    fn mkdirs(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        fs::create_dir_all(&target).map_err(|e| StorageError::from_io(path, e))
    }
}
