use std::path::Path;

use cssutils::Dialect;

/// Settings for a [`crate::CssRuleService`].
///
/// ```rust
/// use cssindex::IndexConfig;
/// use cssutils::Dialect;
///
/// let config = IndexConfig::default().with_languages(["css", "less"]);
/// assert_eq!(config.languages, vec!["css", "less"]);
/// assert_eq!(config.dialect_for("a/b.less".as_ref()), Dialect::Less);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// File languages requested from the file index, matched against extensions.
    pub languages: Vec<String>,
    /// Dialect for files whose extension does not name one.
    pub default_dialect: Dialect,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            languages: vec!["css".to_string(), "less".to_string(), "scss".to_string()],
            default_dialect: Dialect::Css,
        }
    }
}

impl IndexConfig {
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_dialect(mut self, dialect: Dialect) -> Self {
        self.default_dialect = dialect;
        self
    }

    pub fn dialect_for(&self, path: &Path) -> Dialect {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Dialect::from_extension)
            .unwrap_or(self.default_dialect)
    }
}
