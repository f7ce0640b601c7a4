//! Minimal `querySelector` support.
//!
//! Supported: comma-separated lists of compound selectors built from a type
//! selector (or `*`), `#id`, `.class`, `[attr]` and `[attr=value]` (value may
//! be quoted). Combinators and pseudo-classes are rejected.

use crate::document::Document;
use crate::types::NodeId;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector '{}': {}", self.selector, self.reason)
    }
}

impl std::error::Error for SelectorError {}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Clone, Debug, Default)]
struct Compound(Vec<Simple>);

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(text: &str, full: &str) -> Result<Compound, SelectorError> {
    let err = |reason| SelectorError {
        selector: full.to_string(),
        reason,
    };
    let mut parts = Vec::new();
    let mut rest = text;
    if rest.is_empty() {
        return Err(err("empty compound selector"));
    }
    while let Some(c) = rest.chars().next() {
        let take_ident = |s: &str| -> (String, usize) {
            let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
            (s[..end].to_string(), end)
        };
        match c {
            '*' => rest = &rest[1..],
            '#' | '.' => {
                let (ident, used) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err(err("expected identifier"));
                }
                parts.push(if c == '#' {
                    Simple::Id(ident)
                } else {
                    Simple::Class(ident)
                });
                rest = &rest[1 + used..];
            }
            '[' => {
                let close = rest.find(']').ok_or_else(|| err("unterminated attribute selector"))?;
                let inner = rest[1..close].trim();
                let (name, value) = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim();
                        let unquoted = value
                            .strip_prefix('"')
                            .and_then(|v| v.strip_suffix('"'))
                            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                            .unwrap_or(value);
                        (name.trim().to_string(), Some(unquoted.to_string()))
                    }
                    None => (inner.to_string(), None),
                };
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(err("bad attribute name"));
                }
                parts.push(Simple::Attribute { name, value });
                rest = &rest[close + 1..];
            }
            c if is_ident_char(c) => {
                let (ident, used) = take_ident(rest);
                parts.push(Simple::Type(ident));
                rest = &rest[used..];
            }
            _ => return Err(err("unsupported syntax")),
        }
    }
    Ok(Compound(parts))
}

fn parse(selector: &str) -> Result<Vec<Compound>, SelectorError> {
    selector
        .split(',')
        .map(|part| parse_compound(part.trim(), selector))
        .collect()
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        self.0.iter().all(|simple| match simple {
            Simple::Type(name) => element.is(name),
            Simple::Id(expected) => element.attribute("id") == Some(expected.as_str()),
            Simple::Class(class) => element
                .attribute("class")
                .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class)),
            Simple::Attribute { name, value } => match (element.attribute(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        })
    }
}

impl Document {
    /// First connected element in document order matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let compounds = parse(selector)?;
        Ok(self
            .subtree(self.root())
            .into_iter()
            .find(|&id| compounds.iter().any(|c| c.matches(self, id))))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let compounds = parse(selector)?;
        Ok(self
            .subtree(self.root())
            .into_iter()
            .filter(|&id| compounds.iter().any(|c| c.matches(self, id)))
            .collect())
    }
}
