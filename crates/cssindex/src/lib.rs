//! # cssindex - selector cache synchronized with project stylesheets
//!
//! Keeps the selectors of every stylesheet in a project extracted and
//! current, re-reading only files whose modification time changed.
//!
//! - [`CssRuleService`]: owns the cache and answers rule queries
//! - [`FileIndex`] / [`FileReader`]: injected collaborators that list, stat
//!   and read files ([`DiskFiles`] for a real directory tree)
//! - [`RuleCache`]: records per [`SourceId`] plus modification times
//! - [`testing::MemoryFiles`]: in-memory collaborators for tests
//!
//! ## Example
//!
//! ```rust
//! use cssindex::CssRuleService;
//! use cssindex::testing::MemoryFiles;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let files = MemoryFiles::new();
//! files.set("site.css", "nav a { }\n.menu a:hover { }");
//! let entries = files.entries();
//!
//! let mut service = CssRuleService::new(MemoryFiles::new(), files);
//! let stats = service.sync_files(&entries).await;
//! assert_eq!(stats.reparsed, 1);
//! assert_eq!(service.find_matching_rules_cached("a").unwrap().len(), 2);
//! # });
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod log_init;
pub mod service;
pub mod source;
pub mod testing;

pub use cache::{RuleCache, SourceId};
pub use config::IndexConfig;
pub use error::{FsError, IndexError, Result, SyncError};
pub use log_init::{init_logger, init_logger_with_level};
pub use service::{CssRuleService, SyncStats};
pub use source::{DiskFiles, FileEntry, FileIndex, FileReader};

// Re-export the log crate so users can use cssindex::log::info!, etc.
pub use log;
