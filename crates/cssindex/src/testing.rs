//! In-memory collaborators for exercising the rule service.
//!
//! [`MemoryFiles`] acts as both the file index and the file reader. It counts
//! every call, can inject failures per path, and can delay every operation to
//! make concurrency observable under a paused tokio clock.
//!
//! ```rust
//! use std::sync::Arc;
//! use cssindex::CssRuleService;
//! use cssindex::testing::MemoryFiles;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let files = Arc::new(MemoryFiles::new());
//! files.set("main.css", ".a { } .b { }");
//!
//! let mut service = CssRuleService::new(files.clone(), files.clone());
//! let matches = service.find_matching_rules(".b").await.unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(files.reads(), 1);
//! # });
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::error::{FsError, IndexError};
use crate::source::{FileEntry, FileIndex, FileReader};

#[derive(Clone, Debug)]
struct MemoryFile {
    text: String,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct Failures {
    metadata: HashSet<PathBuf>,
    reads: HashSet<PathBuf>,
}

/// A fake project held in memory.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: Mutex<BTreeMap<PathBuf, MemoryFile>>,
    failures: Mutex<Failures>,
    index_down: AtomicBool,
    clock: AtomicU64,
    latency: Option<Duration>,
    listings: AtomicUsize,
    stats: AtomicUsize,
    reads: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn tick(&self) -> SystemTime {
        let secs = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Creates or overwrites a file, giving it a fresh modification time.
    pub fn set(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let modified = self.tick();
        lock(&self.files).insert(
            path.into(),
            MemoryFile {
                text: text.into(),
                modified,
            },
        );
    }

    /// Overwrites the text but keeps the old modification time.
    pub fn set_silently(&self, path: impl AsRef<Path>, text: impl Into<String>) {
        if let Some(file) = lock(&self.files).get_mut(path.as_ref()) {
            file.text = text.into();
        }
    }

    /// Bumps the modification time without changing the text.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let modified = self.tick();
        if let Some(file) = lock(&self.files).get_mut(path.as_ref()) {
            file.modified = modified;
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        lock(&self.files).remove(path.as_ref());
    }

    /// Metadata lookups for `path` fail with an error other than "not found".
    pub fn fail_metadata(&self, path: impl Into<PathBuf>) {
        lock(&self.failures).metadata.insert(path.into());
    }

    pub fn fail_reads(&self, path: impl Into<PathBuf>) {
        lock(&self.failures).reads.insert(path.into());
    }

    /// Makes the file index itself fail.
    pub fn set_index_down(&self, down: bool) {
        self.index_down.store(down, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        let mut failures = lock(&self.failures);
        failures.metadata.clear();
        failures.reads.clear();
        self.index_down.store(false, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<FileEntry> {
        lock(&self.files).keys().cloned().map(FileEntry::new).collect()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.listings.store(0, Ordering::SeqCst);
        self.stats.store(0, Ordering::SeqCst);
        self.reads.store(0, Ordering::SeqCst);
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl FileIndex for MemoryFiles {
    async fn files(&self, languages: &[String]) -> Result<Vec<FileEntry>, IndexError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.index_down.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("memory index is down".to_string()));
        }
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| {
                entry
                    .language()
                    .is_some_and(|lang| languages.iter().any(|l| l.eq_ignore_ascii_case(&lang)))
            })
            .collect())
    }
}

#[async_trait]
impl FileReader for MemoryFiles {
    async fn modification_time(&self, entry: &FileEntry) -> Result<SystemTime, FsError> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if lock(&self.failures).metadata.contains(&entry.path) {
            return Err(FsError::Other(format!("stat failed for {}", entry.path.display())));
        }
        lock(&self.files)
            .get(&entry.path)
            .map(|file| file.modified)
            .ok_or_else(|| FsError::NotFound(entry.path.clone()))
    }

    async fn read_text(&self, entry: &FileEntry) -> Result<String, FsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if lock(&self.failures).reads.contains(&entry.path) {
            return Err(FsError::Io {
                path: entry.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        lock(&self.files)
            .get(&entry.path)
            .map(|file| file.text.clone())
            .ok_or_else(|| FsError::NotFound(entry.path.clone()))
    }
}
