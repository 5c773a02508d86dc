//! Line-oriented CSS tokenizer.
//!
//! The tokenizer is fed one physical line at a time. Everything that must
//! survive a line break (an open block comment, a string continued with a
//! trailing backslash, the nesting of blocks and at-rules) lives in
//! [`TokenizerState`], which the caller threads from line to line.
//!
//! ## Token styles
//!
//! Each token has an optional [`TokenStyle`]. `None` marks whitespace and
//! structural characters (`{`, `}`, `,`, `;`, `:`, `.`, `>` ...). Words are
//! styled by where they appear: a word at the top level is a `tag`, directly
//! inside a block a `property`, after a property name a `value`.
//!
//! ## Context stack
//!
//! | Token                         | Effect                                       |
//! |-------------------------------|----------------------------------------------|
//! | `@media`, `@supports`         | push an at-rule prelude                      |
//! | `{` after a prelude           | prelude becomes a conditional body           |
//! | `{` otherwise                 | push a declaration block                     |
//! | `}`                           | pop one frame                                |
//! | any token directly in a block | push a property                              |
//! | `{`, `}`, `;` in a property   | pop the property first                       |
//!
//! The stack is summarised by [`TokenizerState::context`].

use std::path::Path;

/// The stylesheet language being read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Css,
    Less,
    Scss,
}

impl Dialect {
    /// Maps a file extension (without the dot) to a dialect.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "css" => Some(Dialect::Css),
            "less" => Some(Dialect::Less),
            "scss" => Some(Dialect::Scss),
            _ => None,
        }
    }

    /// Picks the dialect from a path's extension, defaulting to plain CSS.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// Whether `//` starts a comment running to the end of the line.
    pub fn has_line_comments(self) -> bool {
        !matches!(self, Dialect::Css)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStyle {
    Comment,
    String,
    Meta,
    Atom,
    Keyword,
    Number,
    Tag,
    Property,
    Value,
    Variable,
}

impl TokenStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenStyle::Comment => "comment",
            TokenStyle::String => "string",
            TokenStyle::Meta => "meta",
            TokenStyle::Atom => "atom",
            TokenStyle::Keyword => "keyword",
            TokenStyle::Number => "number",
            TokenStyle::Tag => "tag",
            TokenStyle::Property => "property",
            TokenStyle::Value => "value",
            TokenStyle::Variable => "variable",
        }
    }
}

/// A token within one line. `start` and `end` are byte offsets into the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub style: Option<TokenStyle>,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn is_whitespace(&self) -> bool {
        self.style.is_none() && self.text.starts_with(char::is_whitespace)
    }

    /// True if this is the structural character `c` on its own.
    pub fn is_punct(&self, c: char) -> bool {
        self.style.is_none() && self.text.len() == c.len_utf8() && self.text.starts_with(c)
    }

    pub fn is_comment(&self) -> bool {
        self.style == Some(TokenStyle::Comment)
    }
}

/// Summary of the context stack, as seen by the extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseContext {
    /// Where selectors may appear, including the body of `@media`.
    TopLevel,
    /// Between a conditional at-rule keyword and its `{`.
    AtRulePrelude,
    /// Inside this many nested declaration blocks.
    DeclarationBlock(usize),
}

impl ParseContext {
    /// Number of open declaration blocks, zero outside any.
    pub fn block_depth(self) -> usize {
        match self {
            ParseContext::DeclarationBlock(depth) => depth,
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    AtRulePrelude,
    AtRuleBody,
    Block,
    Property,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Base,
    BlockComment,
    String(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Whitespace,
    Comment,
    Str,
    AtKeyword { conditional: bool },
    Hash,
    Punct(char),
    Word,
    Other,
}

/// State carried from one line to the next.
#[derive(Clone, Debug, Default)]
pub struct TokenizerState {
    dialect: Dialect,
    mode: Mode,
    stack: Vec<Frame>,
}

impl TokenizerState {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn context(&self) -> ParseContext {
        let blocks = self.stack.iter().filter(|f| **f == Frame::Block).count();
        if blocks > 0 {
            ParseContext::DeclarationBlock(blocks)
        } else if self.stack.last() == Some(&Frame::AtRulePrelude) {
            ParseContext::AtRulePrelude
        } else {
            ParseContext::TopLevel
        }
    }

    pub fn in_declaration_list(&self) -> bool {
        self.stack.contains(&Frame::Block)
    }

    /// Number of open frames of any kind.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn transition(&mut self, kind: Kind, style: Option<TokenStyle>) -> Option<TokenStyle> {
        if matches!(kind, Kind::Whitespace | Kind::Comment) {
            return style;
        }

        let context = self.stack.last().copied();
        let style = match (kind, style) {
            (Kind::Word, Some(TokenStyle::Variable)) => Some(match context {
                None | Some(Frame::AtRuleBody) => TokenStyle::Tag,
                Some(Frame::Block) => TokenStyle::Property,
                Some(Frame::Property) => TokenStyle::Value,
                Some(Frame::AtRulePrelude) => TokenStyle::Variable,
            }),
            (Kind::Hash, _) if context == Some(Frame::Property) => Some(TokenStyle::Atom),
            _ => style,
        };

        if context == Some(Frame::Property) && matches!(kind, Kind::Punct('{' | '}' | ';')) {
            self.stack.pop();
        }

        match kind {
            Kind::Punct('{') => {
                if context == Some(Frame::AtRulePrelude) {
                    if let Some(top) = self.stack.last_mut() {
                        *top = Frame::AtRuleBody;
                    }
                } else {
                    self.stack.push(Frame::Block);
                }
            }
            Kind::Punct('}') => {
                self.stack.pop();
            }
            Kind::Punct(';') if context == Some(Frame::AtRulePrelude) => {
                self.stack.pop();
            }
            Kind::AtKeyword { conditional: true } => self.stack.push(Frame::AtRulePrelude),
            _ if context == Some(Frame::Block) => self.stack.push(Frame::Property),
            _ => {}
        }

        style
    }
}

/// At-rules whose body is a list of rules rather than declarations.
pub fn is_conditional_at_rule(keyword: &str) -> bool {
    keyword.eq_ignore_ascii_case("@media") || keyword.eq_ignore_ascii_case("@supports")
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Tokens of a single line. Advancing the iterator updates the shared state.
pub struct LineTokens<'a, 's> {
    line: &'a str,
    pos: usize,
    state: &'s mut TokenizerState,
}

/// Starts tokenizing `line`, continuing from `state`.
pub fn tokenize_line<'a, 's>(line: &'a str, state: &'s mut TokenizerState) -> LineTokens<'a, 's> {
    LineTokens {
        line,
        pos: 0,
        state,
    }
}

impl<'a> LineTokens<'a, '_> {
    /// The state after the most recently returned token.
    pub fn state(&self) -> &TokenizerState {
        &*self.state
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Consumes name characters and backslash escapes.
    fn eat_name(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.bump();
            } else if is_name_char(c) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn block_comment(&mut self) {
        match self.rest().find("*/") {
            Some(idx) => {
                self.pos += idx + 2;
                self.state.mode = Mode::Base;
            }
            None => {
                self.pos = self.line.len();
                self.state.mode = Mode::BlockComment;
            }
        }
    }

    fn string(&mut self, quote: char) {
        let mut escaped = false;
        while let Some(c) = self.bump() {
            if c == quote && !escaped {
                self.state.mode = Mode::Base;
                return;
            }
            escaped = !escaped && c == '\\';
        }
        // An unterminated string only continues after a trailing backslash.
        self.state.mode = if escaped {
            Mode::String(quote)
        } else {
            Mode::Base
        };
    }

    /// A LESS `@{name}` or SCSS `#{$name}` interpolation, with any name
    /// characters glued to it.
    fn interpolation(&mut self) -> bool {
        if !self.state.dialect.has_line_comments() || self.peek() != Some('{') {
            return false;
        }
        match self.rest().find('}') {
            Some(idx) => self.pos += idx + 1,
            None => self.pos = self.line.len(),
        }
        self.eat_name();
        true
    }

    /// An unquoted `url(...)` body, consumed as one string token.
    fn unquoted_url(&mut self) -> bool {
        let Some(args) = self.rest().strip_prefix('(') else {
            return false;
        };
        if args.trim_start().starts_with(['"', '\'']) {
            return false;
        }
        match args.find(')') {
            Some(idx) => self.pos += idx + 2,
            None => self.pos = self.line.len(),
        }
        true
    }

    fn base(&mut self) -> (Option<TokenStyle>, Kind) {
        let Some(c) = self.bump() else {
            return (None, Kind::Other);
        };

        if c.is_whitespace() {
            self.eat_while(char::is_whitespace);
            return (None, Kind::Whitespace);
        }

        match c {
            '@' | '#' if self.interpolation() => (Some(TokenStyle::Variable), Kind::Word),
            '@' => {
                let start = self.pos - 1;
                self.eat_while(is_name_char);
                let conditional = is_conditional_at_rule(&self.line[start..self.pos]);
                (Some(TokenStyle::Meta), Kind::AtKeyword { conditional })
            }
            '/' if self.peek() == Some('*') => {
                self.bump();
                self.block_comment();
                (Some(TokenStyle::Comment), Kind::Comment)
            }
            '/' if self.peek() == Some('/') && self.state.dialect.has_line_comments() => {
                self.pos = self.line.len();
                (Some(TokenStyle::Comment), Kind::Comment)
            }
            '<' if self.rest().starts_with("!--") => {
                self.pos += 3;
                (Some(TokenStyle::Comment), Kind::Comment)
            }
            '-' if self.rest().starts_with("->") => {
                self.pos += 2;
                (Some(TokenStyle::Comment), Kind::Comment)
            }
            '"' | '\'' => {
                self.string(c);
                (Some(TokenStyle::String), Kind::Str)
            }
            '#' => {
                self.eat_name();
                (Some(TokenStyle::Atom), Kind::Hash)
            }
            '!' => {
                self.eat_while(char::is_whitespace);
                self.eat_while(is_name_char);
                (Some(TokenStyle::Keyword), Kind::Other)
            }
            '0'..='9' => {
                self.eat_while(|c| is_name_char(c) || c == '.' || c == '%');
                (Some(TokenStyle::Number), Kind::Other)
            }
            '~' | '|' | '^' | '$' | '*' if self.peek() == Some('=') => {
                self.bump();
                (None, Kind::Other)
            }
            ',' | '.' | '+' | '>' | '*' | '/' | '~' | '|' | '=' | '(' | ')' | ';' | '{' | '}'
            | ':' | '[' | ']' => (None, Kind::Punct(c)),
            '\\' => {
                self.bump();
                self.eat_name();
                (Some(TokenStyle::Variable), Kind::Word)
            }
            _ => {
                let start = self.pos - c.len_utf8();
                self.eat_name();
                if self.line[start..self.pos].eq_ignore_ascii_case("url") && self.unquoted_url() {
                    return (Some(TokenStyle::String), Kind::Word);
                }
                (Some(TokenStyle::Variable), Kind::Word)
            }
        }
    }
}

impl<'a> Iterator for LineTokens<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.line.len() {
            return None;
        }
        let start = self.pos;

        let (style, kind) = match self.state.mode {
            Mode::BlockComment => {
                self.block_comment();
                (Some(TokenStyle::Comment), Kind::Comment)
            }
            Mode::String(quote) => {
                self.string(quote);
                (Some(TokenStyle::String), Kind::Str)
            }
            Mode::Base => self.base(),
        };
        let style = self.state.transition(kind, style);

        Some(Token {
            text: &self.line[start..self.pos],
            style,
            start,
            end: self.pos,
        })
    }
}
