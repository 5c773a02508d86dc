//! Selector extraction driven by the token stream.
//!
//! The [`Extractor`] sees every token together with the context the
//! tokenizer reports after it. Tokens seen at the top level accumulate into
//! the pending selector; the first token in any other context finalizes it.
//! Opening and closing a declaration block back-fills the ranges of the
//! records still waiting for them.
//!
//! ## Nested rules
//!
//! LESS and SCSS rules may contain rules. Inside a block, the text since the
//! last `{`, `}` or `;` is a candidate selector group. It only becomes a
//! record when a child block opens right after it; `;` or `}` mark it as a
//! declaration and drop it. Each record carries the groups of its enclosing
//! rules. Blocks of at-rules other than `@mixin` (`@keyframes`,
//! `@include`, detached rulesets) never yield nested records.

use crate::parser::records::{Position, SelectorRecord};
use crate::parser::selectors::{decode_escapes, parse_selector_elements};
use crate::parser::tokenizer::{Dialect, ParseContext, Token, TokenStyle};
use crate::parser::{byte_offset, char_column};

/// At-rules that end with `;` and never carry selectors.
const STATEMENT_AT_RULES: [&str; 3] = ["@charset", "@import", "@namespace"];

pub struct Extractor<'t> {
    lines: &'t [&'t str],
    records: Vec<SelectorRecord>,
    current: String,
    rule_start: Option<Position>,
    selector_start: Option<Position>,
    selector_end: Option<Position>,
    group_start: Option<Position>,
    in_at_rule: bool,
    paren_depth: usize,
    nested_rules: bool,
    depth: usize,
    /// One entry per open block; `None` for blocks whose rules are not extracted.
    parents: Vec<Option<String>>,
    /// Nested selectors waiting for their block to open.
    pending: Vec<SelectorRecord>,
}

impl<'t> Extractor<'t> {
    pub fn new(lines: &'t [&'t str], dialect: Dialect) -> Self {
        Self {
            lines,
            records: Vec::new(),
            current: String::new(),
            rule_start: None,
            selector_start: None,
            selector_end: None,
            group_start: None,
            in_at_rule: false,
            paren_depth: 0,
            nested_rules: dialect != Dialect::Css,
            depth: 0,
            parents: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// A line break inside a selector reads as a single space.
    pub fn begin_line(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    pub fn step(&mut self, line_no: usize, token: &Token<'_>, context: ParseContext) {
        let line = self.lines.get(line_no).copied().unwrap_or_default();
        let pos = |byte: usize| Position::new(line_no, char_column(line, byte));
        let depth = context.block_depth();
        let previous = std::mem::replace(&mut self.depth, depth);
        let opened = token.is_punct('{') && depth > previous;
        let closed = token.is_punct('}') && depth < previous;
        let in_block = depth > 0;

        if self.in_at_rule {
            if token.is_punct(';') && !in_block {
                self.in_at_rule = false;
                self.rule_start = None;
                self.group_start = None;
            }
            if opened {
                self.parents.push(None);
            } else if closed {
                self.parents.truncate(depth);
            }
            return;
        }

        if token.style == Some(TokenStyle::Meta) && !in_block {
            if STATEMENT_AT_RULES
                .iter()
                .any(|kw| token.text.eq_ignore_ascii_case(kw))
            {
                log::trace!("skipping {} at line {}", token.text, line_no);
                self.in_at_rule = true;
                self.reset_pending();
                return;
            }
            if context == ParseContext::AtRulePrelude {
                self.rule_start = None;
            }
        }

        if previous > 0 {
            if self.nested_rules && self.parents.iter().all(Option::is_some) {
                self.step_nested(line, token, pos, opened);
            }
        } else {
            let selector_token = context == ParseContext::TopLevel
                && !token.is_punct('{')
                && !token.is_punct('}')
                && (!token.is_punct(',') || self.paren_depth > 0);

            if selector_token {
                if token.is_punct(';') && self.paren_depth == 0 {
                    self.reset_pending();
                } else if token.is_comment() {
                    if self.rule_start.is_none() && !line[..token.start].contains('}') {
                        self.rule_start = Some(pos(token.start));
                    }
                } else if token.is_whitespace() {
                    self.push_space();
                } else {
                    self.push_selector_token(token, pos(token.start), pos(token.end));
                }
            } else if !token.is_whitespace() && !token.is_comment() {
                self.finalize_selector();
            }
        }

        if opened {
            self.open_declaration_list(pos(token.start));
        } else if closed {
            self.close_declaration_list(depth, pos(token.start), pos(token.end));
        }
    }

    pub fn finish(mut self) -> Vec<SelectorRecord> {
        if !self.current.trim().is_empty() {
            log::debug!("discarding unterminated selector {:?}", self.current.trim());
        }
        self.current.clear();
        self.records
    }

    /// A token inside a rule block whose nested rules are extracted.
    fn step_nested(
        &mut self,
        line: &str,
        token: &Token<'_>,
        pos: impl Fn(usize) -> Position,
        opened: bool,
    ) {
        if token.is_whitespace() {
            self.push_space();
        } else if token.is_comment() {
            if self.current.is_empty()
                && self.rule_start.is_none()
                && !line[..token.start].contains('}')
            {
                self.rule_start = Some(pos(token.start));
            }
        } else if token.is_punct('{') {
            if opened {
                self.finalize_selector();
            } else {
                // The body of a conditional at-rule such as a nested `@media`.
                self.reset_pending();
            }
        } else if token.is_punct('}') || (token.is_punct(';') && self.paren_depth == 0) {
            self.reset_pending();
        } else if token.is_punct(',') && self.paren_depth == 0 {
            self.finalize_selector();
        } else {
            self.push_selector_token(token, pos(token.start), pos(token.end));
        }
    }

    fn push_space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn push_selector_token(&mut self, token: &Token<'_>, start: Position, end: Position) {
        if self.rule_start.is_none() {
            self.rule_start = Some(start);
        }
        if self.current.is_empty() {
            self.selector_start = Some(start);
        }
        if self.group_start.is_none() {
            self.group_start = Some(start);
        }
        if token.is_punct('(') {
            self.paren_depth += 1;
        } else if token.is_punct(')') {
            self.paren_depth = self.paren_depth.saturating_sub(1);
        }
        self.current.push_str(token.text);
        self.selector_end = Some(end);
    }

    fn reset_pending(&mut self) {
        self.current.clear();
        self.pending.clear();
        self.rule_start = None;
        self.selector_start = None;
        self.selector_end = None;
        self.group_start = None;
        self.paren_depth = 0;
    }

    fn finalize_selector(&mut self) {
        let raw = std::mem::take(&mut self.current);
        let raw = raw.trim();
        let selector = decode_escapes(raw).into_owned();
        let unbalanced = self.paren_depth > 0;
        self.paren_depth = 0;
        if selector.is_empty() {
            return;
        }
        if selector.starts_with('@') {
            log::trace!("dropping at-rule prelude {selector:?}");
            return;
        }
        if unbalanced || selector.ends_with(':') {
            log::trace!("dropping {selector:?}, not a selector");
            return;
        }
        let (Some(selector_start), Some(selector_end)) = (self.selector_start, self.selector_end)
        else {
            return;
        };

        // Escapes are decoded per element so `.a\:b` stays one class.
        let elements = parse_selector_elements(raw);
        let record = SelectorRecord {
            selector,
            elements,
            rule_start: self.rule_start.unwrap_or(selector_start),
            selector_start,
            selector_end,
            selector_group_start: self.group_start.unwrap_or(selector_start),
            selector_group: None,
            decl_list_start: None,
            decl_list_end: None,
            parents: self.parents.iter().flatten().cloned().collect(),
        };
        if self.parents.is_empty() {
            self.records.push(record);
        } else {
            self.pending.push(record);
        }
        self.selector_start = None;
        self.selector_end = None;
    }

    fn open_declaration_list(&mut self, at: Position) {
        let group = self
            .group_start
            .map(|start| self.source_between(start, at))
            .filter(|text| !text.is_empty());

        self.records.append(&mut self.pending);
        for record in self.records.iter_mut().rev() {
            if record.decl_list_end.is_some() || record.decl_list_start.is_some() {
                break;
            }
            record.decl_list_start = Some(at);
            if record.selector_group.is_none() {
                record.selector_group = group.clone();
            }
        }

        let parent = group.filter(|g| !g.starts_with('@') || is_mixin(g));
        self.parents.resize(self.depth.saturating_sub(1), None);
        self.parents.push(parent);

        self.group_start = None;
        self.rule_start = None;
        self.selector_start = None;
        self.selector_end = None;
    }

    /// Closes the block of the rules at `level`, and any deeper ones left open.
    fn close_declaration_list(&mut self, level: usize, start: Position, end: Position) {
        self.parents.truncate(level);
        for record in self.records.iter_mut().rev() {
            if record.level() < level {
                break;
            }
            if record.decl_list_end.is_some() {
                if record.level() == level {
                    break;
                }
                continue;
            }
            record.decl_list_end = Some(end);
            if record.decl_list_start.is_none() {
                record.decl_list_start = Some(start);
            }
        }
    }

    /// Source text from `start` up to `end`, each line trimmed and joined by spaces.
    fn source_between(&self, start: Position, end: Position) -> String {
        let mut parts = Vec::new();
        for line_no in start.line..=end.line {
            let Some(line) = self.lines.get(line_no) else {
                break;
            };
            let from = if line_no == start.line {
                byte_offset(line, start.ch)
            } else {
                0
            };
            let to = if line_no == end.line {
                byte_offset(line, end.ch)
            } else {
                line.len()
            };
            if from < to {
                let part = line[from..to].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
            }
        }
        parts.join(" ")
    }
}

fn is_mixin(group: &str) -> bool {
    group
        .get(..6)
        .is_some_and(|kw| kw.eq_ignore_ascii_case("@mixin"))
}
