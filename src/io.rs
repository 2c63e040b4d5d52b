//! Byte-loading backend contract and the filesystem implementation.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Deferred byte fetch: path resolution happens when the closure is built,
/// the IO itself runs when it is invoked on the worker thread.
pub type ByteFetch = Box<dyn FnOnce() -> Result<Vec<u8>, AssetIoError> + Send>;

/// Errors surfaced by the byte-loading backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetIoError {
    /// The path does not exist
    NotFound,
    /// Any other IO failure
    Io(String),
}

impl fmt::Display for AssetIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetIoError::NotFound => write!(f, "Asset path not found"),
            AssetIoError::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AssetIoError {}

impl From<io::Error> for AssetIoError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            AssetIoError::NotFound
        } else {
            AssetIoError::Io(err.to_string())
        }
    }
}

/// Byte-loading backend.
///
/// All paths handed to this trait are relative to [`root_path`]; directory
/// listings likewise come back root-relative so they can be fed straight
/// into further `load_path` / `read_directory` calls.
///
/// [`root_path`]: AssetIo::root_path
pub trait AssetIo: Send + Sync {
    /// Build a deferred read of `path`'s bytes
    fn load_path(&self, path: &Path) -> ByteFetch;

    /// Root all relative paths resolve against
    fn root_path(&self) -> PathBuf;

    /// Whether `path` names a directory
    fn is_directory(&self, path: &Path) -> bool {
        fs::metadata(self.root_path().join(path))
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// List a directory's entries, root-relative
    fn read_directory(&self, path: &Path) -> Result<Vec<PathBuf>, AssetIoError> {
        let root = self.root_path();
        let mut entries = Vec::new();
        for entry in fs::read_dir(root.join(path))? {
            let entry_path = entry?.path();
            let relative = entry_path.strip_prefix(&root).unwrap_or(&entry_path);
            entries.push(relative.to_path_buf());
        }
        Ok(entries)
    }
}

/// Filesystem-backed [`AssetIo`] reading whole files under a root folder
pub struct FileAssetIo {
    root_path: PathBuf,
}

impl FileAssetIo {
    /// Create a backend rooted at `root_path`
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }
}

impl AssetIo for FileAssetIo {
    fn load_path(&self, path: &Path) -> ByteFetch {
        let full_path = self.root_path.join(path);
        Box::new(move || Ok(fs::read(&full_path)?))
    }

    fn root_path(&self) -> PathBuf {
        self.root_path.clone()
    }
}

/// Configuration for the default filesystem backend
#[derive(Clone, Debug)]
pub struct AssetServerSettings {
    /// Folder all asset paths resolve against
    pub asset_folder: String,
}

impl Default for AssetServerSettings {
    fn default() -> Self {
        Self {
            asset_folder: "assets".to_string(),
        }
    }
}
