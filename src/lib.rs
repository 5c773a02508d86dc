//! # brackets-css
//!
//! CSS selector extraction, rule matching and a project-wide rule cache for
//! editor features such as "go to matching rule" and CSS code hints.
//!
//! This crate re-exports the two workspace crates:
//!
//! - [`cssutils`]: tokenizer, selector extractor, matcher and text helpers
//! - [`cssindex`]: rule service that keeps extracted selectors in step with
//!   the stylesheets of a project
//!
//! ## Example
//!
//! ```rust
//! use brackets_css::{CssRuleService, MemoryFiles, extract_all_selectors, find_matching_rules};
//!
//! let records = extract_all_selectors("ul > li.item, .item:hover { }");
//! assert_eq!(find_matching_rules(".item", &records).unwrap().len(), 2);
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let files = MemoryFiles::new();
//! files.set("menu.css", "nav li { }");
//! let mut service = CssRuleService::new(MemoryFiles::new(), files);
//! service.load_string("li.inline { }");
//! assert_eq!(service.find_matching_rules_cached("li").unwrap().len(), 1);
//! # });
//! ```

pub use cssindex;
pub use cssutils;

pub use cssindex::testing::MemoryFiles;
pub use cssindex::{
    CssRuleService, DiskFiles, FileEntry, FileIndex, FileReader, FsError, IndexConfig,
    IndexError, RuleCache, SourceId, SyncError, SyncStats, init_logger,
};
pub use cssutils::text::{
    Indent, InsertedRule, add_rule_to_text, consolidate_rules, extract_all_named_flows,
    get_range_selectors, reduce_stylesheet_for_regex_parsing,
};
pub use cssutils::{
    Combinator, CssError, Dialect, ElementKind, Position, RuleMatch, SelectorElement,
    SelectorQuery, SelectorRecord, extract_all_selectors, extract_all_selectors_with_dialect,
    find_matching_rules,
};
