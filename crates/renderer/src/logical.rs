//! Logical tree over the document.
//!
//! Every tracked node records its logical parent and an ordered list of
//! logical children. Elements nest logically the way they nest in the DOM;
//! comment nodes act as containers whose children are spliced into the DOM
//! as the comment's following siblings.

use crate::error::{Missing, RenderError, Unsupported};
use html::{Document, Namespace, NodeId};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct LogicalEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Closing marker of a prerendered range container.
    end: Option<NodeId>,
}

/// Move of one logical child within its parent, by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermutationEntry {
    pub from_sibling_index: usize,
    pub to_sibling_index: usize,
}

struct PendingMove {
    to_sibling_index: usize,
    range_start: NodeId,
    range_end: NodeId,
    marker: NodeId,
}

#[derive(Debug, Default)]
pub struct LogicalTree {
    entries: HashMap<NodeId, LogicalEntry>,
}

impl LogicalTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes carrying logical state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_tracked(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entries.get(&node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.entries
            .get(&node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child(&self, parent: NodeId, index: usize) -> Result<NodeId, RenderError> {
        self.children(parent)
            .get(index)
            .copied()
            .ok_or(RenderError::MissingTarget(Missing::LogicalChild { parent, index }))
    }

    pub fn end(&self, node: NodeId) -> Option<NodeId> {
        self.entries.get(&node)?.end
    }

    /// Make `node` a logical container. Existing DOM children are left
    /// untracked unless `allow_existing_contents` is false, in which case
    /// they are an error.
    pub fn create_container(
        &mut self,
        doc: &Document,
        node: NodeId,
        allow_existing_contents: bool,
    ) -> Result<(), RenderError> {
        if !doc.children(node).is_empty() && !allow_existing_contents {
            return Err(Unsupported::ExistingContents(node).into());
        }
        self.entries.entry(node).or_default();
        Ok(())
    }

    /// Track `node`'s current DOM children as its logical children.
    pub fn adopt_dom_children(&mut self, doc: &Document, node: NodeId) {
        let children = doc.children(node).to_vec();
        for &child in &children {
            self.entries.entry(child).or_default().parent = Some(node);
        }
        self.entries.entry(node).or_default().children = children;
    }

    pub fn set_end(&mut self, container: NodeId, end: NodeId) {
        self.entries.entry(container).or_default().end = Some(end);
    }

    pub fn take_end(&mut self, container: NodeId) -> Option<NodeId> {
        self.entries.get_mut(&container)?.end.take()
    }

    /// Insert an empty comment container at `index` under `parent`.
    pub fn create_and_insert_container(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        index: usize,
    ) -> Result<NodeId, RenderError> {
        let container = doc.create_comment("!");
        self.insert(doc, container, parent, index)?;
        Ok(container)
    }

    /// Insert `child` at logical `index` under `parent`, placing it in the
    /// DOM before the current occupant of that slot or at the end of the
    /// parent's range.
    pub fn insert(
        &mut self,
        doc: &mut Document,
        child: NodeId,
        parent: NodeId,
        index: usize,
    ) -> Result<(), RenderError> {
        if let Some(entry) = self.entries.get(&child) {
            if doc.is_comment(child) && !entry.children.is_empty() {
                return Err(Unsupported::InsertNonEmptyContainer(child).into());
            }
            if entry.parent.is_some() {
                return Err(Unsupported::MoveTrackedNode(child).into());
            }
        }

        match self.children(parent).get(index).copied() {
            Some(occupant) => {
                let dom_parent = doc
                    .parent(occupant)
                    .ok_or(Missing::DomParent(occupant))?;
                doc.insert_before(dom_parent, child, Some(occupant))?;
                self.entries
                    .entry(parent)
                    .or_default()
                    .children
                    .insert(index, child);
            }
            None => {
                self.append_dom_child(doc, child, parent)?;
                self.entries.entry(parent).or_default().children.push(child);
            }
        }
        self.entries.entry(child).or_default().parent = Some(parent);
        Ok(())
    }

    /// Remove the logical child at `index`, emptying it first when it is a
    /// comment container. Returns the detached nodes, innermost first; their
    /// own logical state is left for the caller to purge.
    pub fn remove(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        index: usize,
    ) -> Result<Vec<NodeId>, RenderError> {
        let mut removed = Vec::new();
        self.remove_into(doc, parent, index, &mut removed)?;
        Ok(removed)
    }

    fn remove_into(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        index: usize,
        removed: &mut Vec<NodeId>,
    ) -> Result<(), RenderError> {
        let child = self.child(parent, index)?;
        if let Some(entry) = self.entries.get_mut(&parent) {
            entry.children.remove(index);
        }
        if doc.is_comment(child) {
            while !self.children(child).is_empty() {
                self.remove_into(doc, child, 0, removed)?;
            }
        }
        if let Some(entry) = self.entries.get_mut(&child) {
            entry.parent = None;
        }
        doc.detach(child);
        removed.push(child);
        Ok(())
    }

    /// Drop all logical state for `node`.
    pub fn forget(&mut self, node: NodeId) {
        self.entries.remove(&node);
    }

    /// The logical sibling following `node`, if any.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let position = siblings.iter().position(|&s| s == node)?;
        siblings.get(position + 1).copied()
    }

    /// Append `child` at the end of `parent`'s DOM range. Under a comment
    /// that is just before the comment's next logical sibling, or at the end
    /// of its own parent's range when it is the last one.
    pub fn append_dom_child(
        &self,
        doc: &mut Document,
        child: NodeId,
        parent: NodeId,
    ) -> Result<(), RenderError> {
        if doc.is_element(parent) {
            doc.append_child(parent, child)?;
            return Ok(());
        }
        if !doc.is_comment(parent) {
            return Err(Unsupported::AppendUnder(parent).into());
        }
        match self.next_sibling(parent) {
            Some(sibling) => {
                let dom_parent = doc.parent(sibling).ok_or(Missing::DomParent(sibling))?;
                doc.insert_before(dom_parent, child, Some(sibling))?;
                Ok(())
            }
            None => {
                let grandparent = self.parent(parent).ok_or(Missing::LogicalParent(parent))?;
                self.append_dom_child(doc, child, grandparent)
            }
        }
    }

    /// Last DOM node belonging to `node`'s logical range.
    pub fn last_dom_node_in_range(&self, doc: &Document, node: NodeId) -> Result<NodeId, RenderError> {
        if doc.is_element(node) {
            return Ok(node);
        }
        if let Some(sibling) = self.next_sibling(node) {
            return doc
                .previous_sibling(sibling)
                .ok_or(RenderError::MissingTarget(Missing::DomParent(sibling)));
        }
        let parent = self.parent(node).ok_or(Missing::LogicalParent(node))?;
        if doc.is_element(parent) {
            doc.last_child(parent)
                .ok_or(RenderError::MissingTarget(Missing::LogicalChild { parent, index: 0 }))
        } else {
            self.last_dom_node_in_range(doc, parent)
        }
    }

    /// Whether new elements under `parent` belong to the SVG namespace.
    pub fn is_svg_context(&self, doc: &Document, parent: NodeId) -> bool {
        let element = if doc.is_element(parent) {
            Some(parent)
        } else if doc.is_comment(parent) {
            doc.parent_element(parent)
        } else {
            None
        };
        element
            .and_then(|e| doc.element(e))
            .is_some_and(|e| e.namespace() == Namespace::Svg && e.local_name() != "foreignObject")
    }

    /// Reorder `parent`'s logical children. Ranges and destination markers
    /// are resolved for every entry before any node moves.
    pub fn permute(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        entries: &[PermutationEntry],
    ) -> Result<(), RenderError> {
        let mut moves = Vec::with_capacity(entries.len());
        for entry in entries {
            let range_start = self.child(parent, entry.from_sibling_index)?;
            let range_end = self.last_dom_node_in_range(doc, range_start)?;
            moves.push(PendingMove {
                to_sibling_index: entry.to_sibling_index,
                range_start,
                range_end,
                marker: range_start,
            });
        }

        for pending in &mut moves {
            let marker = doc.create_comment("marker");
            match self.children(parent).get(pending.to_sibling_index + 1).copied() {
                Some(before) => {
                    let dom_parent = doc.parent(before).ok_or(Missing::DomParent(before))?;
                    doc.insert_before(dom_parent, marker, Some(before))?;
                }
                None => self.append_dom_child(doc, marker, parent)?,
            }
            pending.marker = marker;
        }

        for pending in &moves {
            let marker_parent = doc
                .parent(pending.marker)
                .ok_or(Missing::DomParent(pending.marker))?;
            let mut current = Some(pending.range_start);
            while let Some(node) = current {
                let next = doc.next_sibling(node);
                doc.insert_before(marker_parent, node, Some(pending.marker))?;
                if node == pending.range_end {
                    break;
                }
                current = next;
            }
            doc.release(pending.marker);
        }

        if let Some(entry) = self.entries.get_mut(&parent) {
            for pending in &moves {
                if let Some(slot) = entry.children.get_mut(pending.to_sibling_index) {
                    *slot = pending.range_start;
                }
            }
        }
        Ok(())
    }
}
