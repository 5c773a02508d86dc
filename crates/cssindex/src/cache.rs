use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use cssutils::SelectorRecord;

/// Where a set of records came from.
///
/// `Inline` holds text handed over through
/// [`crate::CssRuleService::load_string`]; it has no file behind it and is
/// never evicted by a sync.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Path(PathBuf),
    Inline,
}

impl SourceId {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceId::Path(path) => Some(path),
            SourceId::Inline => None,
        }
    }
}

/// Extracted records per source plus the modification time they were read at.
#[derive(Debug, Default)]
pub struct RuleCache {
    rules: BTreeMap<SourceId, Vec<SelectorRecord>>,
    modified: HashMap<PathBuf, SystemTime>,
    inline_text: Option<String>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, source: &SourceId) -> Option<&[SelectorRecord]> {
        self.rules.get(source).map(Vec::as_slice)
    }

    /// Sources in a stable order: paths sorted, then inline text.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &[SelectorRecord])> {
        self.rules.iter().map(|(id, records)| (id, records.as_slice()))
    }

    pub fn insert_path(&mut self, path: PathBuf, records: Vec<SelectorRecord>) {
        self.rules.insert(SourceId::Path(path), records);
    }

    pub fn set_inline(&mut self, text: String, records: Vec<SelectorRecord>) {
        self.rules.insert(SourceId::Inline, records);
        self.inline_text = Some(text);
    }

    pub fn inline_text(&self) -> Option<&str> {
        self.inline_text.as_deref()
    }

    /// Drops the records and the timestamp of `path`.
    pub fn remove_path(&mut self, path: &Path) -> bool {
        self.modified.remove(path);
        self.rules.remove(&SourceId::Path(path.to_path_buf())).is_some()
    }

    /// Every path that has records or a timestamp.
    pub fn cached_paths(&self) -> HashSet<PathBuf> {
        self.rules
            .keys()
            .filter_map(|id| id.path().map(Path::to_path_buf))
            .chain(self.modified.keys().cloned())
            .collect()
    }

    pub fn modification_time(&self, path: &Path) -> Option<SystemTime> {
        self.modified.get(path).copied()
    }

    pub fn set_modification_time(&mut self, path: PathBuf, time: SystemTime) {
        self.modified.insert(path, time);
    }

    pub fn forget_modification_time(&mut self, path: &Path) {
        self.modified.remove(path);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.modified.clear();
        self.inline_text = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssutils::extract_all_selectors;
    use std::time::Duration;

    #[test]
    fn test_inline_sorts_after_paths() {
        let mut cache = RuleCache::new();
        cache.set_inline(".z { }".into(), extract_all_selectors(".z { }"));
        cache.insert_path("b.css".into(), extract_all_selectors(".b { }"));
        cache.insert_path("a.css".into(), extract_all_selectors(".a { } .c { }"));

        let order: Vec<_> = cache.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(
            order,
            vec![
                SourceId::Path("a.css".into()),
                SourceId::Path("b.css".into()),
                SourceId::Inline,
            ]
        );
        assert_eq!(cache.record_count(), 4);
        assert_eq!(cache.inline_text(), Some(".z { }"));
    }

    #[test]
    fn test_remove_path_drops_timestamp() {
        let mut cache = RuleCache::new();
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(5);
        cache.insert_path("a.css".into(), Vec::new());
        cache.set_modification_time("a.css".into(), time);
        assert_eq!(cache.modification_time(Path::new("a.css")), Some(time));

        assert!(cache.remove_path(Path::new("a.css")));
        assert_eq!(cache.modification_time(Path::new("a.css")), None);
        assert!(cache.is_empty());
        assert!(!cache.remove_path(Path::new("a.css")));
    }

    #[test]
    fn test_cached_paths_excludes_inline() {
        let mut cache = RuleCache::new();
        cache.set_inline(String::new(), Vec::new());
        cache.set_modification_time("only-stat.css".into(), SystemTime::UNIX_EPOCH);
        let paths = cache.cached_paths();
        assert_eq!(paths.len(), 1);
        assert!(paths.contains(Path::new("only-stat.css")));
    }
}
