use crate::attributes::{DeferredValue, apply_deferred_value, capture_attribute_name};
use crate::config::RendererConfig;
use crate::error::{Malformed, Missing, RenderError};
use crate::logical::{LogicalTree, PermutationEntry};
use batch::{ComponentDiff, Edit, Frame, RenderBatch, StringIndex};
use core_types::{BrowserRendererId, ComponentId, EventHandlerId};
use events::EventDelegator;
use html::{Document, Namespace, NodeId, parse_fragment};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Applies component diffs to a document.
///
/// Owns all per-document side state: the logical tree, the event
/// delegator, where each component renders, and select values waiting for
/// their options to arrive.
#[derive(Debug)]
pub struct BrowserRenderer {
    pub(crate) logical: LogicalTree,
    pub(crate) delegator: EventDelegator,
    child_component_locations: HashMap<ComponentId, NodeId>,
    /// Roots whose prerendered contents are cleared on first render.
    pending_roots: HashMap<ComponentId, NodeId>,
    pub(crate) deferred_values: HashMap<NodeId, DeferredValue>,
    restore_focus: bool,
}

pub(crate) fn read_required<'a>(
    batch: &RenderBatch<'a>,
    index: StringIndex,
    field: &'static str,
) -> Result<Cow<'a, str>, RenderError> {
    batch
        .read_string(index)?
        .ok_or(RenderError::MalformedBatch(Malformed::NullString { field }))
}

impl BrowserRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            logical: LogicalTree::new(),
            delegator: EventDelegator::new(BrowserRendererId(config.browser_renderer_id)),
            child_component_locations: HashMap::new(),
            pending_roots: HashMap::new(),
            deferred_values: HashMap::new(),
            restore_focus: config.restore_focus,
        }
    }

    pub fn logical(&self) -> &LogicalTree {
        &self.logical
    }

    pub fn delegator(&self) -> &EventDelegator {
        &self.delegator
    }

    pub fn delegator_mut(&mut self) -> &mut EventDelegator {
        &mut self.delegator
    }

    pub fn component_location(&self, component: ComponentId) -> Option<NodeId> {
        self.child_component_locations.get(&component).copied()
    }

    pub fn is_pending_root(&self, component: ComponentId) -> bool {
        self.pending_roots.contains_key(&component)
    }

    /// Whether `element` holds a value waiting for matching options.
    pub fn has_deferred_value(&self, element: NodeId) -> bool {
        self.deferred_values.contains_key(&element)
    }

    /// Bind `component` to an already-prepared logical container. Its first
    /// render replaces whatever the container holds.
    pub fn attach_root_component_to_logical_element(&mut self, component: ComponentId, node: NodeId) {
        self.attach_component_to_element(component, node);
        self.pending_roots.insert(component, node);
    }

    /// Bind `component` to the content between the comments `start` and
    /// `end`, which must share a DOM parent.
    pub fn attach_root_component_to_range(
        &mut self,
        doc: &Document,
        start: NodeId,
        end: NodeId,
        component: ComponentId,
    ) -> Result<(), RenderError> {
        let parent = doc.parent(start).ok_or(Missing::DomParent(start))?;
        if doc.parent(end) != Some(parent) {
            return Err(Missing::RangeEnd(end).into());
        }
        if self.logical.children(parent).is_empty() {
            self.logical.adopt_dom_children(doc, parent);
        }
        self.logical.create_container(doc, start, true)?;
        self.logical.set_end(start, end);
        self.attach_root_component_to_logical_element(component, start);
        Ok(())
    }

    pub(crate) fn attach_component_to_element(&mut self, component: ComponentId, node: NodeId) {
        self.child_component_locations.insert(component, node);
    }

    pub fn dispose_component(&mut self, component: ComponentId) {
        self.child_component_locations.remove(&component);
        self.pending_roots.remove(&component);
    }

    pub fn dispose_event_handler(&mut self, id: EventHandlerId) {
        self.delegator.remove_listener(id);
    }

    /// Apply one component's diff at its recorded location.
    pub fn update_component(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        diff: &ComponentDiff<'_>,
    ) -> Result<(), RenderError> {
        let component = diff.component_id();
        let location = self
            .component_location(component)
            .ok_or(Missing::Component(component))?;

        if self.pending_roots.remove(&component).is_some() {
            match self.logical.take_end(location) {
                Some(end) => self.clear_between(doc, location, end)?,
                None => self.clear_existing_contents(doc, location),
            }
        }

        log::debug!(
            target: "renderer.edits",
            "component {component}: {} edits at {location}",
            diff.edit_count()
        );
        let active = doc.active_element();
        self.apply_edits(doc, batch, component, location, 0, diff)?;

        if self.restore_focus
            && let Some(previous) = active
            && doc.active_element() != Some(previous)
        {
            doc.focus(previous);
        }
        Ok(())
    }

    /// Drop a root's prerendered children, leaving it an empty container.
    fn clear_existing_contents(&mut self, doc: &mut Document, root: NodeId) {
        while let Some(child) = doc.first_child(root) {
            self.release_subtree(doc, child);
        }
    }

    /// Remove everything after `start` up to and including `end`, then mark
    /// `start` as an ordinary container comment.
    fn clear_between(&mut self, doc: &mut Document, start: NodeId, end: NodeId) -> Result<(), RenderError> {
        let parent = self.logical.parent(start).ok_or(Missing::LogicalParent(start))?;
        let siblings = self.logical.children(parent);
        let first = siblings.iter().position(|&n| n == start).map_or(0, |p| p + 1);
        let last = siblings
            .iter()
            .position(|&n| n == end)
            .ok_or(Missing::RangeEnd(end))?;
        for _ in first..=last {
            self.remove_logical_child(doc, parent, first)?;
        }
        doc.set_text(start, "!");
        Ok(())
    }

    fn apply_edits(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        component: ComponentId,
        location: NodeId,
        child_index: usize,
        diff: &ComponentDiff<'_>,
    ) -> Result<(), RenderError> {
        let frames = batch.reference_frames();
        let mut parent = location;
        let mut depth = 0isize;
        let mut offset = child_index;
        let mut permutations: Option<Vec<PermutationEntry>> = None;

        for index in 0..diff.edit_count() {
            let edit = diff.edit(index)?;
            log::trace!(target: "renderer.edits", "{component}: {edit:?}");
            match edit {
                Edit::PrependFrame {
                    sibling_index,
                    reference_frame_index,
                } => {
                    let frame_index = reference_frame_index as usize;
                    let frame = frames.frame(frame_index)?;
                    let at = offset + sibling_index as usize;
                    self.insert_frame(doc, batch, component, parent, at, frame, frame_index)?;
                }
                Edit::RemoveFrame { sibling_index } => {
                    self.remove_logical_child(doc, parent, offset + sibling_index as usize)?;
                }
                Edit::SetAttribute {
                    sibling_index,
                    reference_frame_index,
                } => {
                    let frame = frames.frame(reference_frame_index as usize)?;
                    let element = self.logical.child(parent, offset + sibling_index as usize)?;
                    if !doc.is_element(element) {
                        return Err(Malformed::NotAnElement {
                            node: element,
                            operation: "set attribute",
                        }
                        .into());
                    }
                    let Frame::Attribute {
                        name,
                        value,
                        event_handler_id,
                    } = frame
                    else {
                        return Err(Malformed::UnexpectedFrame {
                            operation: "set attribute",
                            found: frame.frame_type(),
                        }
                        .into());
                    };
                    self.apply_attribute(doc, batch, component, element, name, value, event_handler_id)?;
                }
                Edit::RemoveAttribute {
                    sibling_index,
                    removed_attribute_name,
                } => {
                    let element = self.logical.child(parent, offset + sibling_index as usize)?;
                    if !doc.is_element(element) {
                        return Err(Malformed::NotAnElement {
                            node: element,
                            operation: "remove attribute",
                        }
                        .into());
                    }
                    let name = read_required(batch, removed_attribute_name, "removed attribute name")?;
                    if !self.try_apply_special_property(doc, element, &name, None)? {
                        doc.remove_attribute(element, &name);
                    }
                }
                Edit::UpdateText {
                    sibling_index,
                    reference_frame_index,
                } => {
                    let frame = frames.frame(reference_frame_index as usize)?;
                    let node = self.logical.child(parent, offset + sibling_index as usize)?;
                    if !doc.is_text(node) {
                        return Err(Malformed::NotText(node).into());
                    }
                    let content = frame_content(&frame, "update text")?;
                    let text = batch.read_string(content)?.unwrap_or_default();
                    doc.set_text(node, &text);
                }
                Edit::UpdateMarkup {
                    sibling_index,
                    reference_frame_index,
                } => {
                    let frame = frames.frame(reference_frame_index as usize)?;
                    let content = frame_content(&frame, "update markup")?;
                    let at = offset + sibling_index as usize;
                    self.remove_logical_child(doc, parent, at)?;
                    self.insert_markup(doc, batch, parent, at, content)?;
                }
                Edit::StepIn { sibling_index } => {
                    parent = self.logical.child(parent, offset + sibling_index as usize)?;
                    depth += 1;
                    offset = 0;
                }
                Edit::StepOut => {
                    parent = self.logical.parent(parent).ok_or(Missing::LogicalParent(parent))?;
                    depth -= 1;
                    // Only the outermost level keeps the caller's offset.
                    offset = if depth == 0 { child_index } else { 0 };
                }
                Edit::PermutationListEntry {
                    sibling_index,
                    move_to_sibling_index,
                } => {
                    permutations.get_or_insert_with(Vec::new).push(PermutationEntry {
                        from_sibling_index: offset + sibling_index as usize,
                        to_sibling_index: offset + move_to_sibling_index as usize,
                    });
                }
                Edit::PermutationListEnd => {
                    let entries = permutations.take().unwrap_or_default();
                    self.logical.permute(doc, parent, &entries)?;
                }
            }
        }
        Ok(())
    }

    /// Insert one frame at `child_index`. Returns how many logical slots
    /// it filled.
    #[allow(clippy::too_many_arguments)]
    fn insert_frame(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        component: ComponentId,
        parent: NodeId,
        child_index: usize,
        frame: Frame,
        frame_index: usize,
    ) -> Result<usize, RenderError> {
        match frame {
            Frame::Element {
                subtree_length,
                name,
            } => {
                let end = frame_index + subtree_length as usize;
                self.insert_element(doc, batch, component, parent, child_index, name, frame_index, end)?;
                Ok(1)
            }
            Frame::Text { content } => {
                let text = batch.read_string(content)?.unwrap_or_default();
                let node = doc.create_text(&text);
                self.logical.insert(doc, node, parent, child_index)?;
                Ok(1)
            }
            Frame::Attribute { .. } => Err(Malformed::AttributeFrameOutsideElement.into()),
            Frame::Component { component_id, .. } => {
                let container = self.logical.create_and_insert_container(doc, parent, child_index)?;
                self.attach_component_to_element(component_id, container);
                Ok(1)
            }
            Frame::Region { subtree_length } => self.insert_frame_range(
                doc,
                batch,
                component,
                parent,
                child_index,
                frame_index + 1,
                frame_index + subtree_length as usize,
            ),
            Frame::ElementReferenceCapture {
                reference_capture_id,
            } => {
                if !doc.is_element(parent) {
                    return Err(Malformed::ReferenceCaptureOutsideElement.into());
                }
                let id = read_required(batch, reference_capture_id, "reference capture id")?;
                doc.set_attribute(parent, &capture_attribute_name(&id), "");
                Ok(0)
            }
            Frame::Markup { content } => {
                self.insert_markup(doc, batch, parent, child_index, content)?;
                Ok(1)
            }
        }
    }

    /// Insert frames `start..end` as consecutive logical children. Frames
    /// owning a subtree are inserted whole and their descendants skipped.
    #[allow(clippy::too_many_arguments)]
    fn insert_frame_range(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        component: ComponentId,
        parent: NodeId,
        child_index: usize,
        start: usize,
        end: usize,
    ) -> Result<usize, RenderError> {
        let frames = batch.reference_frames();
        let mut next_index = child_index;
        let mut index = start;
        while index < end {
            let frame = frames.frame(index)?;
            next_index += self.insert_frame(doc, batch, component, parent, next_index, frame, index)?;
            let skip = frame.subtree_length().map_or(0, |len| len.saturating_sub(1) as usize);
            index += skip + 1;
        }
        Ok(next_index - child_index)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_element(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        component: ComponentId,
        parent: NodeId,
        child_index: usize,
        name: StringIndex,
        frame_index: usize,
        end: usize,
    ) -> Result<(), RenderError> {
        let name = read_required(batch, name, "element name")?;
        let element = if name == "svg" || self.logical.is_svg_context(doc, parent) {
            doc.create_element_ns(Namespace::Svg, &name)
        } else {
            doc.create_element(&name)
        };
        self.logical.create_container(doc, element, false)?;

        // Attributes are applied before the element is connected; the first
        // non-attribute frame starts the children.
        let frames = batch.reference_frames();
        let mut inserted = false;
        for index in frame_index + 1..end {
            match frames.frame(index)? {
                Frame::Attribute {
                    name,
                    value,
                    event_handler_id,
                } => {
                    self.apply_attribute(doc, batch, component, element, name, value, event_handler_id)?;
                }
                _ => {
                    self.logical.insert(doc, element, parent, child_index)?;
                    inserted = true;
                    self.insert_frame_range(doc, batch, component, element, 0, index, end)?;
                    break;
                }
            }
        }
        if !inserted {
            self.logical.insert(doc, element, parent, child_index)?;
        }

        if doc.is_tag(element, "option") {
            self.try_set_select_value_from_option(doc, element);
        } else if let Some(deferred) = self.deferred_values.get(&element) {
            apply_deferred_value(doc, element, deferred);
        }
        Ok(())
    }

    /// Parse `content` into a fresh comment container at `child_index`.
    fn insert_markup(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        parent: NodeId,
        child_index: usize,
        content: StringIndex,
    ) -> Result<(), RenderError> {
        let container = self.logical.create_and_insert_container(doc, parent, child_index)?;
        let markup = batch
            .read_string(content)?
            .filter(|m| !m.is_empty())
            .unwrap_or(Cow::Borrowed(" "));
        let context = if self.logical.is_svg_context(doc, parent) {
            Namespace::Svg
        } else {
            Namespace::Html
        };
        let nodes = parse_fragment(doc, &markup, context);
        for (index, node) in nodes.into_iter().enumerate() {
            self.logical.insert(doc, node, container, index)?;
        }
        Ok(())
    }

    fn remove_logical_child(&mut self, doc: &mut Document, parent: NodeId, index: usize) -> Result<(), RenderError> {
        for node in self.logical.remove(doc, parent, index)? {
            self.release_subtree(doc, node);
        }
        Ok(())
    }

    /// Forget every piece of side state keyed by `node` or its DOM
    /// descendants, then free them.
    fn release_subtree(&mut self, doc: &mut Document, node: NodeId) {
        let subtree = doc.subtree(node);
        for &id in &subtree {
            self.logical.forget(id);
            self.delegator.purge_element(id);
            self.deferred_values.remove(&id);
        }
        if !self.child_component_locations.is_empty() {
            let released: HashSet<NodeId> = subtree.iter().copied().collect();
            self.child_component_locations
                .retain(|_, location| !released.contains(location));
        }
        let freed = doc.release(node);
        log::trace!(target: "renderer.edits", "released {node} ({freed} nodes)");
    }
}

fn frame_content(frame: &Frame, operation: &'static str) -> Result<StringIndex, RenderError> {
    match *frame {
        Frame::Text { content } | Frame::Markup { content } => Ok(content),
        _ => Err(Malformed::UnexpectedFrame {
            operation,
            found: frame.frame_type(),
        }
        .into()),
    }
}
