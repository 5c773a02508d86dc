//! The rule service: a cache of extracted selectors kept in step with the
//! project's stylesheets.
//!
//! ## Sync protocol
//!
//! 1. Every cached path starts out marked for removal.
//! 2. All candidate files are stat'ed concurrently. A new or changed
//!    timestamp queues the file for parsing; any answer other than
//!    "not found" unmarks it. Errors other than "not found" also queue it.
//! 3. Once every stat has settled, marked paths are evicted.
//! 4. Queued files are read and parsed concurrently.
//!
//! A read that fails in step 4 keeps the previous records and forgets the
//! timestamp, so the next sync tries again.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use cssutils::parser::split_lines;
use cssutils::{
    CssError, RuleMatch, SelectorQuery, extract_all_selectors,
    extract_all_selectors_with_dialect,
};
use futures::future::join_all;

use crate::cache::{RuleCache, SourceId};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::source::{FileEntry, FileIndex, FileReader};

/// What one call to [`CssRuleService::sync_files`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub checked: usize,
    pub reparsed: usize,
    pub evicted: usize,
    pub failed: usize,
}

/// Owns the rule cache for one project session.
///
/// Every mutating operation takes `&mut self`, so two syncs on the same
/// service can never interleave.
pub struct CssRuleService<I, R> {
    index: I,
    reader: R,
    config: IndexConfig,
    cache: RuleCache,
}

impl<I: FileIndex, R: FileReader> CssRuleService<I, R> {
    pub fn new(index: I, reader: R) -> Self {
        Self::with_config(index, reader, IndexConfig::default())
    }

    pub fn with_config(index: I, reader: R, config: IndexConfig) -> Self {
        Self {
            index,
            reader,
            config,
            cache: RuleCache::new(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// Brings the cache in line with `files`.
    pub async fn sync_files(&mut self, files: &[FileEntry]) -> SyncStats {
        let mut stats = SyncStats {
            checked: files.len(),
            ..SyncStats::default()
        };
        let mut to_remove = self.cache.cached_paths();

        let reader = &self.reader;
        let checks = join_all(files.iter().map(|entry| async move {
            (entry, reader.modification_time(entry).await)
        }))
        .await;

        let mut queued: Vec<&FileEntry> = Vec::new();
        let mut seen: HashSet<&PathBuf> = HashSet::new();
        for (entry, result) in checks {
            match result {
                Ok(time) => {
                    to_remove.remove(&entry.path);
                    if self.cache.modification_time(&entry.path) != Some(time)
                        && seen.insert(&entry.path)
                    {
                        queued.push(entry);
                    }
                    self.cache.set_modification_time(entry.path.clone(), time);
                }
                Err(err) if err.is_not_found() => {
                    log::debug!("{} is gone: {err}", entry.path.display());
                }
                Err(err) => {
                    log::warn!("cannot stat {}, reparsing: {err}", entry.path.display());
                    to_remove.remove(&entry.path);
                    if seen.insert(&entry.path) {
                        queued.push(entry);
                    }
                }
            }
        }

        for path in &to_remove {
            if self.cache.remove_path(path) {
                stats.evicted += 1;
            }
        }

        let reads = join_all(queued.into_iter().map(|entry| async move {
            (entry, reader.read_text(entry).await)
        }))
        .await;

        for (entry, result) in reads {
            match result {
                Ok(text) => {
                    let dialect = self.config.dialect_for(&entry.path);
                    let records = extract_all_selectors_with_dialect(&text, dialect);
                    log::trace!(
                        "{}: {} selectors",
                        entry.path.display(),
                        records.len()
                    );
                    self.cache.insert_path(entry.path.clone(), records);
                    stats.reparsed += 1;
                }
                Err(err) => {
                    log::warn!("cannot read {}: {err}", entry.path.display());
                    self.cache.forget_modification_time(&entry.path);
                    stats.failed += 1;
                }
            }
        }

        log::debug!(
            "synced {} files: {} reparsed, {} evicted, {} failed",
            stats.checked,
            stats.reparsed,
            stats.evicted,
            stats.failed
        );
        stats
    }

    /// Enumerates the project, syncs, then matches against every cached source.
    ///
    /// Fails only if the query is invalid or the file index cannot be read;
    /// problems with individual files are logged and skipped.
    pub async fn find_matching_rules(&mut self, query: &str) -> Result<Vec<RuleMatch<SourceId>>> {
        SelectorQuery::parse(query)?;
        let files = self.index.files(&self.config.languages).await?;
        self.sync_files(&files).await;
        Ok(self.find_matching_rules_cached(query)?)
    }

    /// Matches against the cache as it is, without any I/O.
    pub fn find_matching_rules_cached(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<RuleMatch<SourceId>>, CssError> {
        let query = SelectorQuery::parse(query)?;
        let mut matches = Vec::new();
        for (source, records) in self.cache.iter() {
            matches.extend(
                records
                    .iter()
                    .filter(|record| query.matches(record))
                    .map(|record| RuleMatch::from_record(source.clone(), record, 0)),
            );
        }
        Ok(matches)
    }

    /// Replaces the inline source with `text`. Returns the number of selectors found.
    pub fn load_string(&mut self, text: &str) -> usize {
        let records = extract_all_selectors(text);
        let count = records.len();
        self.cache.set_inline(text.to_string(), records);
        count
    }

    /// Forgets everything, e.g. when the project is closed.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Source text of every matching rule, from its first to its last line.
    ///
    /// Each file is read once. Rules from a file that cannot be read are left
    /// out with a warning instead of failing the whole query.
    pub async fn matching_rule_text(&mut self, query: &str) -> Result<Vec<String>> {
        let matches = self.find_matching_rules(query).await?;
        let mut texts: HashMap<PathBuf, Option<String>> = HashMap::new();
        let mut out = Vec::with_capacity(matches.len());
        for rule in matches {
            let text = match &rule.source {
                SourceId::Path(path) => {
                    if !texts.contains_key(path) {
                        let text = match self.reader.read_text(&FileEntry::new(path.clone())).await
                        {
                            Ok(text) => Some(text),
                            Err(e) => {
                                log::warn!("skipping rules from {}: {e}", path.display());
                                None
                            }
                        };
                        texts.insert(path.clone(), text);
                    }
                    match texts.get(path).and_then(Option::as_deref) {
                        Some(text) => text.to_string(),
                        None => continue,
                    }
                }
                SourceId::Inline => self.cache.inline_text().unwrap_or_default().to_string(),
            };
            let lines = split_lines(&text);
            let end = rule.line_end.min(lines.len().saturating_sub(1));
            let start = rule.line_start.min(end);
            out.push(lines[start..=end].join("\n"));
        }
        Ok(out)
    }
}
