//! Collaborators that list and read project files.
//!
//! The service never touches the file system itself. It is handed a
//! [`FileIndex`] that enumerates candidate stylesheets and a [`FileReader`]
//! that stats and reads them. [`DiskFiles`] implements both over a directory
//! tree; tests use [`crate::testing::MemoryFiles`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::error::{FsError, IndexError};

/// A candidate stylesheet reported by the file index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileEntry {
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lower-cased extension without the dot, if any.
    pub fn language(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

#[async_trait]
pub trait FileIndex: Send + Sync {
    /// Lists project files whose language is one of `languages`.
    async fn files(&self, languages: &[String]) -> Result<Vec<FileEntry>, IndexError>;
}

#[async_trait]
pub trait FileReader: Send + Sync {
    async fn modification_time(&self, entry: &FileEntry) -> Result<SystemTime, FsError>;

    async fn read_text(&self, entry: &FileEntry) -> Result<String, FsError>;
}

#[async_trait]
impl<T: FileIndex + ?Sized> FileIndex for Arc<T> {
    async fn files(&self, languages: &[String]) -> Result<Vec<FileEntry>, IndexError> {
        (**self).files(languages).await
    }
}

#[async_trait]
impl<T: FileReader + ?Sized> FileReader for Arc<T> {
    async fn modification_time(&self, entry: &FileEntry) -> Result<SystemTime, FsError> {
        (**self).modification_time(entry).await
    }

    async fn read_text(&self, entry: &FileEntry) -> Result<String, FsError> {
        (**self).read_text(entry).await
    }
}

/// Files under a root directory. The tree is listed with `walkdir` on a
/// blocking thread; stats and reads go through `tokio::fs`.
#[derive(Clone, Debug)]
pub struct DiskFiles {
    root: PathBuf,
}

impl DiskFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileIndex for DiskFiles {
    async fn files(&self, languages: &[String]) -> Result<Vec<FileEntry>, IndexError> {
        let root = self.root.clone();
        let languages = languages.to_vec();
        tokio::task::spawn_blocking(move || walk_stylesheets(&root, &languages))
            .await
            .map_err(|e| IndexError::Unavailable(format!("directory walk failed: {e}")))?
    }
}

/// Walks `root` on a blocking thread. An unreadable root fails the listing;
/// unreadable entries below it are skipped.
fn walk_stylesheets(root: &Path, languages: &[String]) -> Result<Vec<FileEntry>, IndexError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let path = e.path().unwrap_or(root).to_path_buf();
                return Err(FsError::from_io(path, e.into()).into());
            }
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = FileEntry::new(entry.into_path());
        if candidate
            .language()
            .is_some_and(|lang| languages.iter().any(|l| l.eq_ignore_ascii_case(&lang)))
        {
            found.push(candidate);
        }
    }

    found.sort();
    Ok(found)
}

#[async_trait]
impl FileReader for DiskFiles {
    async fn modification_time(&self, entry: &FileEntry) -> Result<SystemTime, FsError> {
        let metadata = tokio::fs::metadata(&entry.path)
            .await
            .map_err(|e| FsError::from_io(&entry.path, e))?;
        metadata
            .modified()
            .map_err(|e| FsError::from_io(&entry.path, e))
    }

    async fn read_text(&self, entry: &FileEntry) -> Result<String, FsError> {
        tokio::fs::read_to_string(&entry.path)
            .await
            .map_err(|e| FsError::from_io(&entry.path, e))
    }
}
