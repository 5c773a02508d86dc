use smallvec::SmallVec;

/// A zero-based line and char column in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// What precedes a selector element.
///
/// `PseudoElement` is lexically a combinator (`::`) but does not end the
/// compound selector it appears in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    None,
    Descendant,
    Child,
    AdjacentSibling, // +
    GeneralSibling,  // ~
    PseudoElement,   // ::
}

impl Combinator {
    /// True if a backward scan may continue past an element with this combinator.
    pub fn continues_compound(self) -> bool {
        matches!(self, Combinator::None | Combinator::PseudoElement)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Type,
    Universal,
    Class,
    Id,
    Attribute,
    PseudoClass,
    PseudoElement,
    Other,
}

/// One simple selector inside a complex selector, e.g. `div`, `.foo`, `[href]`.
///
/// `value` keeps its prefix (`.foo`, `#bar`, `::after`) so it can be compared
/// directly against a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorElement {
    pub kind: ElementKind,
    pub value: String,
    pub combinator: Combinator,
}

impl SelectorElement {
    pub fn new(kind: ElementKind, value: impl Into<String>, combinator: Combinator) -> Self {
        Self {
            kind,
            value: value.into(),
            combinator,
        }
    }
}

pub type SelectorElements = SmallVec<[SelectorElement; 4]>;

/// One selector extracted from a stylesheet, with the ranges around it.
///
/// Every selector of a comma-separated group gets its own record; they share
/// `selector_group_start` and the declaration-list range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorRecord {
    /// Trimmed selector text, line breaks collapsed to single spaces.
    pub selector: String,
    pub elements: SelectorElements,
    /// Start of the rule, including a comment directly above it.
    pub rule_start: Position,
    pub selector_start: Position,
    pub selector_end: Position,
    pub selector_group_start: Position,
    /// Source text of the whole selector group, e.g. `.a, .b`.
    pub selector_group: Option<String>,
    /// Position of the `{`. `None` until the block opens.
    pub decl_list_start: Option<Position>,
    /// Position just after the `}`. `None` until the block closes.
    pub decl_list_end: Option<Position>,
    /// Selector groups of the enclosing rules, outermost first. Only LESS
    /// and SCSS rules nest, so this is empty for plain CSS.
    pub parents: Vec<String>,
}

impl SelectorRecord {
    /// The rule ends where its declaration list ends.
    pub fn rule_end(&self) -> Option<Position> {
        self.decl_list_end
    }

    /// True once the declaration list of this selector has been closed.
    pub fn is_closed(&self) -> bool {
        self.decl_list_end.is_some()
    }

    /// How many rule blocks enclose this one.
    pub fn level(&self) -> usize {
        self.parents.len()
    }

    /// The enclosing groups joined with ` / `, e.g. `.nav / > li`.
    pub fn parent_selectors(&self) -> Option<String> {
        if self.parents.is_empty() {
            None
        } else {
            Some(self.parents.join(" / "))
        }
    }

    /// The group text when known, otherwise the selector itself.
    pub fn group_or_selector(&self) -> &str {
        self.selector_group.as_deref().unwrap_or(&self.selector)
    }

    /// Inclusive `(first, last)` line range covering the whole rule.
    pub fn line_range(&self) -> (usize, usize) {
        let end = self.decl_list_end.unwrap_or(self.selector_end);
        (self.rule_start.line, end.line)
    }
}
