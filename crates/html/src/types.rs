use std::fmt;

/// Stable identity of a node inside a [`crate::Document`] arena.
///
/// Ids are never reused within one document, so a stale id held by a side
/// table resolves to "missing" instead of aliasing a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

impl Namespace {
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => HTML_NAMESPACE,
            Namespace::Svg => SVG_NAMESPACE,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            HTML_NAMESPACE => Some(Namespace::Html),
            SVG_NAMESPACE => Some(Namespace::Svg),
            _ => None,
        }
    }
}

/// Live form-control state that is distinct from content attributes.
///
/// Mirrors the IDL properties (`value`, `checked`, `selected`) that diverge
/// from their attributes once script or user input touches them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    pub(crate) value: Option<String>,
    pub(crate) checked: bool,
    pub(crate) selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub(crate) name: String,
    pub(crate) namespace: Namespace,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) form: FormState,
}

impl ElementData {
    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// HTML tag names compare case-insensitively; foreign elements do not.
    pub fn is(&self, name: &str) -> bool {
        match self.namespace {
            Namespace::Html => self.name.eq_ignore_ascii_case(name),
            Namespace::Svg => self.name == name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn allows_children(&self) -> bool {
        matches!(self, NodeData::Document | NodeData::Element(_))
    }
}
