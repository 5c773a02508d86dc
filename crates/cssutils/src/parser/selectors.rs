use std::borrow::Cow;

use crate::parser::records::{Combinator, ElementKind, SelectorElement, SelectorElements};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while_m_n, take_while1},
    character::complete::{anychar, char, multispace0, multispace1, one_of},
    combinator::{map, opt, recognize},
    multi::many1,
    sequence::{pair, preceded, terminated, tuple},
};

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// `\31 `, `\000031` or `\:`. A hex escape swallows one whitespace after it.
fn parse_escape(input: &str) -> IResult<&str, &str> {
    recognize(preceded(
        char('\\'),
        alt((
            recognize(pair(
                take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit()),
                opt(alt((tag("\r\n"), recognize(one_of(" \t\n\r\x0c"))))),
            )),
            recognize(anychar),
        )),
    ))(input)
}

/// Parses an identifier, including backslash escapes such as `\31 0`.
pub fn parse_ident(input: &str) -> IResult<&str, &str> {
    recognize(many1(alt((take_while1(is_ident_char), parse_escape))))(input)
}

/// Replaces CSS escapes with the characters they stand for.
///
/// Code points that are zero, surrogates or out of range decode to U+FFFD.
///
/// ```rust
/// use cssutils::parser::decode_escapes;
///
/// assert_eq!(decode_escapes(r".\31 0"), ".10");
/// assert_eq!(decode_escapes(r".md\:flex"), ".md:flex");
/// assert_eq!(decode_escapes(".plain"), ".plain");
/// ```
pub fn decode_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            // A trailing backslash stays as it is.
            out.push(chars.next().unwrap_or('\\'));
            continue;
        }

        match chars.peek() {
            Some('\r') => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(' ' | '\t' | '\n' | '\x0c') => {
                chars.next();
            }
            _ => {}
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(decoded);
    }
    Cow::Owned(out)
}

/// Recognizes `open ... close` with nesting, skipping over quoted strings.
fn balanced(open: char, close: char) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input: &str| {
        let fail = || {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
        };
        if !input.starts_with(open) {
            return Err(fail());
        }
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for (idx, c) in input.char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            if c == '"' || c == '\'' {
                quote = Some(c);
            } else if c == open {
                depth += 1;
            } else if c == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = idx + c.len_utf8();
                    return Ok((&input[end..], &input[..end]));
                }
            }
        }
        Err(fail())
    }
}

fn parse_class(input: &str) -> IResult<&str, (ElementKind, &str)> {
    map(recognize(preceded(char('.'), parse_ident)), |s| {
        (ElementKind::Class, s)
    })(input)
}

fn parse_id(input: &str) -> IResult<&str, (ElementKind, &str)> {
    map(recognize(preceded(char('#'), parse_ident)), |s| {
        (ElementKind::Id, s)
    })(input)
}

fn parse_attribute(input: &str) -> IResult<&str, (ElementKind, &str)> {
    map(balanced('[', ']'), |s| (ElementKind::Attribute, s))(input)
}

fn parse_pseudo_element(input: &str) -> IResult<&str, (ElementKind, &str)> {
    map(
        recognize(tuple((tag("::"), parse_ident, opt(balanced('(', ')'))))),
        |s| (ElementKind::PseudoElement, s),
    )(input)
}

fn parse_pseudo_class(input: &str) -> IResult<&str, (ElementKind, &str)> {
    map(
        recognize(tuple((char(':'), parse_ident, opt(balanced('(', ')'))))),
        |s| (ElementKind::PseudoClass, s),
    )(input)
}

/// `div`, `*`, `ns|div`, `*|*`, `|p`.
fn parse_type(input: &str) -> IResult<&str, (ElementKind, &str)> {
    let name = || alt((parse_ident, tag("*")));
    let (rest, text) = recognize(pair(
        opt(terminated(opt(name()), char('|'))),
        name(),
    ))(input)?;
    let kind = if text.ends_with('*') {
        ElementKind::Universal
    } else {
        ElementKind::Type
    };
    Ok((rest, (kind, text)))
}

pub fn parse_simple_selector(input: &str) -> IResult<&str, (ElementKind, &str)> {
    alt((
        parse_id,
        parse_class,
        parse_attribute,
        parse_pseudo_element,
        parse_pseudo_class,
        parse_type,
    ))(input)
}

/// Parses a combinator with its surrounding whitespace.
pub fn parse_combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        map(
            tuple((
                multispace0,
                alt((
                    map(char('>'), |_| Combinator::Child),
                    map(char('+'), |_| Combinator::AdjacentSibling),
                    map(char('~'), |_| Combinator::GeneralSibling),
                )),
                multispace0,
            )),
            |(_, combinator, _)| combinator,
        ),
        map(multispace1, |_| Combinator::Descendant),
    ))(input)
}

/// Splits a selector into its simple-selector elements.
///
/// Each element records the combinator that precedes it. Elements of one
/// compound selector (`a.b:hover`) are joined with [`Combinator::None`];
/// pseudo-elements get [`Combinator::PseudoElement`]. A leading combinator,
/// as in the nested LESS rule `> li`, is kept on the first element. Escapes
/// are decoded in the element values. This never fails: anything
/// unrecognised becomes a single-character [`ElementKind::Other`].
///
/// ```rust
/// use cssutils::parser::{parse_selector_elements, Combinator, ElementKind};
///
/// let elements = parse_selector_elements("ul > li.item");
/// assert_eq!(elements.len(), 3);
/// assert_eq!(elements[1].value, "li");
/// assert_eq!(elements[1].combinator, Combinator::Child);
/// assert_eq!(elements[2].kind, ElementKind::Class);
/// assert_eq!(elements[2].combinator, Combinator::None);
/// ```
pub fn parse_selector_elements(selector: &str) -> SelectorElements {
    let mut elements = SelectorElements::new();
    let mut input = selector.trim();
    let mut pending = Combinator::None;

    while !input.is_empty() {
        if !elements.is_empty() || input.starts_with(['>', '+', '~']) {
            if let Ok((rest, combinator)) = parse_combinator(input) {
                pending = combinator;
                input = rest;
                if input.is_empty() {
                    break;
                }
            }
        }

        let (rest, kind, value) = match parse_simple_selector(input) {
            Ok((rest, (kind, value))) => (rest, kind, value),
            Err(_) => {
                let Some(c) = input.chars().next() else {
                    break;
                };
                let len = c.len_utf8();
                (&input[len..], ElementKind::Other, &input[..len])
            }
        };

        let combinator = if kind == ElementKind::PseudoElement && pending == Combinator::None {
            Combinator::PseudoElement
        } else {
            pending
        };
        elements.push(SelectorElement::new(kind, decode_escapes(value), combinator));
        pending = Combinator::None;
        input = rest;
    }

    elements
}
