//! In-memory document tree.
//!
//! Nodes live in an arena keyed by [`NodeId`]; parent and child links are
//! explicit. Mutations follow DOM semantics: inserting a node that already
//! has a parent moves it, and detaching a subtree that contains the focused
//! element blurs it.
//!
//! Detached nodes stay in the arena until [`Document::release`] drops them,
//! the same way a detached DOM node survives while something references it.

use crate::types::{ElementData, FormState, Namespace, NodeData, NodeId};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    MissingNode(NodeId),
    NotAChild { parent: NodeId, child: NodeId },
    CannotHaveChildren(NodeId),
    Cycle { parent: NodeId, child: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::MissingNode(id) => write!(f, "node {id} does not exist"),
            DomError::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
            DomError::CannotHaveChildren(id) => write!(f, "node {id} cannot have children"),
            DomError::Cycle { parent, child } => {
                write!(f, "inserting {child} under {parent} would create a cycle")
            }
        }
    }
}

impl std::error::Error for DomError {}

struct NodeRecord {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

pub struct Document {
    nodes: HashMap<NodeId, NodeRecord>,
    next_id: u32,
    root: NodeId,
    active_element: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: 1,
            root: NodeId(0),
            active_element: None,
        };
        doc.root = doc.alloc(NodeData::Document);
        doc
    }

    /// A document with `<html><head></head><body></body></html>` already in place.
    pub fn with_body() -> Self {
        let mut doc = Self::new();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        let root = doc.root;
        // Fresh detached nodes under a fresh document: these cannot fail.
        let _ = doc.append_child(root, html);
        let _ = doc.append_child(html, head);
        let _ = doc.append_child(html, body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<NodeId> {
        let html = self
            .children(self.root)
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some_and(|e| e.is("html")))?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some_and(|e| e.is("body")))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeRecord {
                data,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Create an element in the HTML namespace; the name is ASCII-lowercased.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_ns(Namespace::Html, name)
    }

    pub fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> NodeId {
        let name = match namespace {
            Namespace::Html => name.to_ascii_lowercase(),
            Namespace::Svg => name.to_string(),
        };
        self.alloc(NodeData::Element(ElementData {
            name,
            namespace,
            attributes: Vec::new(),
            form: FormState::default(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id).map(|r| &r.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(&id).map(|r| &mut r.data)? {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Comment(_)))
    }

    /// True when `id` is an element whose tag matches `name`.
    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.is(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// True when `id` is attached (transitively) to the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_record = self.nodes.get(&parent).ok_or(DomError::MissingNode(parent))?;
        if !parent_record.data.allows_children() {
            return Err(DomError::CannotHaveChildren(parent));
        }
        if !self.contains(child) {
            return Err(DomError::MissingNode(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.unlink(child);
        let siblings = match self.nodes.get_mut(&parent) {
            Some(record) => &mut record.children,
            None => return Err(DomError::MissingNode(parent)),
        };
        let position = match reference {
            Some(reference) => siblings
                .iter()
                .position(|&c| c == reference)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => siblings.len(),
        };
        siblings.insert(position, child);
        if let Some(record) = self.nodes.get_mut(&child) {
            record.parent = Some(parent);
        }
        Ok(())
    }

    /// Moves keep focus; only a true detach blurs.
    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|r| r.parent.take()) else {
            return;
        };
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.retain(|&c| c != child);
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Detach `node` from its parent, if it has one.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(active) = self.active_element
            && self.is_inclusive_ancestor(node, active)
        {
            self.active_element = None;
        }
        self.unlink(node);
    }

    /// Remove every child of `node` from the tree.
    pub fn clear_children(&mut self, node: NodeId) {
        while let Some(child) = self.first_child(node) {
            self.detach(child);
        }
    }

    /// `node` followed by all of its descendants in document order.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Drop a detached subtree from the arena. Returns the number of nodes freed.
    pub fn release(&mut self, node: NodeId) -> usize {
        if node == self.root {
            return 0;
        }
        self.detach(node);
        let subtree = self.subtree(node);
        for id in &subtree {
            self.nodes.remove(id);
        }
        subtree.len()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set or replace an attribute. Returns `false` when `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        match element.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => element.attributes.push((name.to_string(), value.to_string())),
        }
        true
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let before = element.attributes.len();
        element.attributes.retain(|(k, _)| k != name);
        element.attributes.len() != before
    }

    /// Character data of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Replace the character data of a text or comment node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.nodes.get_mut(&id).map(|r| &mut r.data) {
            Some(NodeData::Text(existing)) | Some(NodeData::Comment(existing)) => {
                existing.clear();
                existing.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.subtree(id) {
            if let Some(NodeData::Text(t)) = self.data(node) {
                out.push_str(t);
            }
        }
        out
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Focus `id` if it is a connected element.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.is_element(id) && self.is_connected(id) {
            self.active_element = Some(id);
            return true;
        }
        false
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    /// Nearest inclusive ancestor element of `id` matching `name`.
    pub fn closest(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_tag(node, name) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
