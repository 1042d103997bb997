//! Selectors: literal CSS subset or custom resolver functions.
//!
//! A locator's selector is a tagged variant, dispatched explicitly:
//! [`Selector::Css`] for literal queries, [`Selector::Resolver`] for the
//! closures built by the factory functions.
//!
//! The CSS side is a deliberately small subset — compound selectors of tag,
//! `#id`, `.class` and `[attr]`/`[attr=value]` parts, with comma-separated
//! alternatives. Combinators are rejected at parse time; scoping is done by
//! chaining locators instead. This is not a general CSS engine.

use std::fmt;
use std::sync::Arc;

use crate::dom::Element;
use crate::locator::MatchOptions;
use crate::result::{HallarError, HallarResult};

/// Resolver function built by a factory: receives the locator options and the
/// scope element, returns matches within that scope in document order.
pub type ResolverFn = Arc<dyn Fn(&MatchOptions, &Element) -> Vec<Element> + Send + Sync>;

/// How a locator finds elements within a scope.
#[derive(Clone)]
pub enum Selector {
    /// Literal CSS subset query.
    Css(CssSelector),
    /// Factory-built resolver function.
    Resolver(ResolverFn),
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.debug_tuple("Css").field(&css.to_string()).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// One attribute requirement of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    /// `None` means presence only (`[attr]`), `Some` means exact value.
    value: Option<String>,
}

/// A compound selector: `tag#id.class[attr=value]`, all parts optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = element.attr("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|cond| match &cond.value {
            None => element.has_attr(&cond.name),
            Some(value) => element.attr(&cond.name).as_deref() == Some(value.as_str()),
        })
    }
}

/// A parsed CSS-subset selector: one or more comma-separated compounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    source: String,
    alternatives: Vec<Compound>,
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl CssSelector {
    /// Parse a selector string. Malformed input (including combinators,
    /// which this subset does not support) is a construction-time error.
    pub fn parse(input: &str) -> HallarResult<Self> {
        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid(input, "empty selector"));
            }
            alternatives.push(parse_compound(input, part)?);
        }
        Ok(Self {
            source: input.to_string(),
            alternatives,
        })
    }

    /// Whether the element matches any alternative.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }

    /// All matching descendants of `scope`, in document order.
    #[must_use]
    pub fn query(&self, scope: &Element) -> Vec<Element> {
        scope
            .descendants()
            .into_iter()
            .filter(|el| self.matches(el))
            .collect()
    }
}

fn invalid(selector: &str, message: &str) -> HallarError {
    HallarError::InvalidSelector {
        selector: selector.to_string(),
        message: message.to_string(),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(source: &str, part: &str) -> HallarResult<Compound> {
    if part.chars().any(char::is_whitespace) {
        return Err(invalid(
            source,
            "combinators are not supported; chain locators to scope a query",
        ));
    }
    let mut compound = Compound::default();
    let mut chars = part.chars().peekable();

    // Optional leading tag name or universal `*`.
    if chars.peek() == Some(&'*') {
        chars.next();
    } else if chars.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        let mut tag = String::new();
        while chars.peek().copied().is_some_and(is_name_char) {
            tag.push(chars.next().unwrap_or_default());
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(invalid(source, "expected id after '#'"));
                }
                compound.id = Some(name);
            }
            '.' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(invalid(source, "expected class after '.'"));
                }
                compound.classes.push(name);
            }
            '[' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(invalid(source, "expected attribute name after '['"));
                }
                match chars.next() {
                    Some(']') => compound.attrs.push(AttrCondition {
                        name: name.to_ascii_lowercase(),
                        value: None,
                    }),
                    Some('=') => {
                        let value = take_attr_value(source, &mut chars)?;
                        if chars.next() != Some(']') {
                            return Err(invalid(source, "unterminated attribute selector"));
                        }
                        compound.attrs.push(AttrCondition {
                            name: name.to_ascii_lowercase(),
                            value: Some(value),
                        });
                    }
                    _ => return Err(invalid(source, "unterminated attribute selector")),
                }
            }
            other => {
                return Err(invalid(
                    source,
                    &format!("unsupported selector syntax at '{other}'"),
                ));
            }
        }
    }

    if compound == Compound::default() && !part.starts_with('*') {
        return Err(invalid(source, "empty selector"));
    }
    Ok(compound)
}

fn take_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while chars.peek().copied().is_some_and(is_name_char) {
        name.push(chars.next().unwrap_or_default());
    }
    name
}

fn take_attr_value(
    source: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> HallarResult<String> {
    let mut value = String::new();
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            loop {
                match chars.next() {
                    Some(c) if c == quote => break,
                    Some(c) => value.push(c),
                    None => return Err(invalid(source, "unterminated quoted attribute value")),
                }
            }
        }
        _ => {
            while chars.peek().is_some_and(|&c| c != ']') {
                value.push(chars.next().unwrap_or_default());
            }
        }
    }
    Ok(value)
}
