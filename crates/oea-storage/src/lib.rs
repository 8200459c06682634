//! Storage abstraction for the OEA stages.
//!
//! This crate provides a filesystem capability over data-lake style URIs,
//! a local implementation of it, the stage path conventions, and an
//! append-only writer used by the test-data generators.
//!
//! # Locations
//!
//! A storage URI has the form `<scheme>://<container>@<account>/<path>`:
//! - `abfss://stage1np@stoeaxyz.dfs.core.windows.net/contoso_sis` - stage 1
//!   non-pseudonymized data of the `contoso_sis` source
//! - `abfss://oea-framework@stoeaxyz.dfs.core.windows.net/modules` - framework
//!   files
//!
//! [`LocalFilesystem`] maps such a URI to `<root>/<container>/<path>`; plain
//! paths without a scheme are used as-is.
//!
//! # Example
//!
//! ```ignore
//! use oea_storage::{Filesystem, LocalFilesystem, StageRoots};
//!
//! let fs = LocalFilesystem::new("/tmp/lake");
//! let stages = StageRoots::for_account("stoeaxyz");
//! fs.put(&format!("{}/contoso_sis/students.csv", stages.stage1np), "id\n1\n", true)?;
//! let entries = fs.ls(&stages.stage1np)?;
//! ```

mod local;
mod location;
mod stage;
mod writer;

pub use local::LocalFilesystem;
pub use location::{join_path, StorageLocation};
pub use stage::{parse_source_path, pop_from_path, SourcePathInfo, StageRoots, Zone};
pub use writer::{FileWriter, DEFAULT_BUFFER_SIZE};

/// Default number of bytes returned by [`Filesystem::head`] (100 KiB).
pub const DEFAULT_HEAD_BYTES: usize = 100 * 1024;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A path that does not follow the expected storage convention
    #[error("Malformed storage path: {0}")]
    MalformedPath(String),

    /// The path does not exist
    #[error("Path not found: {0}")]
    NotFound(String),

    /// Any other failure talking to storage
    #[error("Storage unavailable for {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error for `path`: a missing file becomes
    /// [`StorageError::NotFound`], anything else [`StorageError::Unavailable`].
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Unavailable { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Last path segment
    pub name: String,
    /// Full path or URI of the entry
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

impl FileInfo {
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// Filesystem capability over storage URIs.
///
/// Every operation that targets a missing path fails with
/// [`StorageError::NotFound`] so callers can tell "absent" from "broken".
pub trait Filesystem {
    /// Immediate children of a directory, sorted by name.
    fn ls(&self, path: &str) -> Result<Vec<FileInfo>>;

    /// Remove a file, or a directory (recursively when `recursive`).
    fn remove(&self, path: &str, recursive: bool) -> Result<()>;

    fn exists(&self, path: &str) -> Result<bool>;

    fn read_to_string(&self, path: &str) -> Result<String>;

    /// Up to `max_bytes` bytes from the start of a file, cut back to a
    /// character boundary.
    fn head(&self, path: &str, max_bytes: usize) -> Result<String>;

    /// Write a whole file, creating parent directories. Fails with
    /// `Unavailable` if the file exists and `overwrite` is false.
    fn put(&self, path: &str, contents: &str, overwrite: bool) -> Result<()>;

    /// Append to a file, creating it and its parent directories if needed.
    fn append(&self, path: &str, contents: &str) -> Result<()>;

    /// Copy a file, or a directory tree when `recursive`.
    fn copy(&self, from: &str, to: &str, recursive: bool) -> Result<()>;

    /// Create a directory and its parents.
    fn mkdirs(&self, path: &str) -> Result<()>;
}
