//! Build detached node lists from markup snippets.
//!
//! This is the `innerHTML`-on-a-detached-container step: the caller decides
//! the parsing context (an HTML `<template>` or an SVG `<g>`), receives the
//! top-level nodes, and inserts them wherever it wants. No implied end tags,
//! no foster parenting; mismatched end tags are ignored.

use crate::document::Document;
use crate::tokenizer::{MarkupToken, is_void_element, tokenize_markup};
use crate::types::{Namespace, NodeId};

struct OpenElement {
    node: NodeId,
    name: String,
    namespace: Namespace,
}

fn child_namespace(parent: Option<&OpenElement>, context: Namespace, name: &str) -> Namespace {
    let inherited = match parent {
        Some(open) if open.namespace == Namespace::Svg && open.name != "foreignObject" => {
            Namespace::Svg
        }
        Some(_) => Namespace::Html,
        None => context,
    };
    if inherited == Namespace::Html && name.eq_ignore_ascii_case("svg") {
        Namespace::Svg
    } else {
        inherited
    }
}

/// Parse `markup` into detached nodes owned by `doc`, returning the top-level
/// nodes in order.
pub fn parse_fragment(doc: &mut Document, markup: &str, context: Namespace) -> Vec<NodeId> {
    let mut roots: Vec<NodeId> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    for token in tokenize_markup(markup, true) {
        match token {
            MarkupToken::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let namespace = child_namespace(stack.last(), context, &name);
                let element = doc.create_element_ns(namespace, &name);
                for (attr_name, value) in attributes {
                    match namespace {
                        Namespace::Html => {
                            doc.set_attribute(element, &attr_name.to_ascii_lowercase(), &value)
                        }
                        Namespace::Svg => doc.set_attribute(element, &attr_name, &value),
                    };
                }
                attach(doc, &stack, &mut roots, element);
                let void = namespace == Namespace::Html
                    && is_void_element(&name.to_ascii_lowercase());
                if !self_closing && !void {
                    stack.push(OpenElement {
                        node: element,
                        name,
                        namespace,
                    });
                }
            }
            MarkupToken::EndTag(name) => {
                if let Some(pos) = stack
                    .iter()
                    .rposition(|open| open.name.eq_ignore_ascii_case(&name))
                {
                    stack.truncate(pos);
                }
            }
            MarkupToken::Comment(text) => {
                let comment = doc.create_comment(&text);
                attach(doc, &stack, &mut roots, comment);
            }
            MarkupToken::Text(text) => {
                let previous = match stack.last() {
                    Some(open) => doc.last_child(open.node),
                    None => roots.last().copied(),
                };
                match previous.filter(|&p| doc.is_text(p)) {
                    Some(existing) => {
                        let mut merged = doc.text(existing).unwrap_or_default().to_string();
                        merged.push_str(&text);
                        doc.set_text(existing, &merged);
                    }
                    None => {
                        let node = doc.create_text(&text);
                        attach(doc, &stack, &mut roots, node);
                    }
                }
            }
        }
    }
    roots
}

fn attach(doc: &mut Document, stack: &[OpenElement], roots: &mut Vec<NodeId>, node: NodeId) {
    match stack.last() {
        Some(open) => {
            let appended = doc.append_child(open.node, node);
            debug_assert!(appended.is_ok(), "fresh node under open element");
        }
        None => roots.push(node),
    }
}
