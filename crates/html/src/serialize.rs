//! HTML serialization of document subtrees.

use crate::document::Document;
use crate::tokenizer::is_void_element;
use crate::types::{Namespace, NodeData, NodeId};

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        Some(NodeData::Document) => write_children(doc, id, out),
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(element.local_name());
            for (name, value) in element.attributes() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(out, value);
                out.push('"');
            }
            out.push('>');
            if element.namespace() == Namespace::Html && is_void_element(element.local_name()) {
                return;
            }
            write_children(doc, id, out);
            out.push_str("</");
            out.push_str(element.local_name());
            out.push('>');
        }
        Some(NodeData::Text(text)) => escape_text(out, text),
        Some(NodeData::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        None => {}
    }
}

fn write_children(doc: &Document, id: NodeId, out: &mut String) {
    for &child in doc.children(id) {
        write_node(doc, child, out);
    }
}

pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_children(doc, id, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "title", "a\"b&c");
        let text = doc.create_text("1 < 2 & 3");
        let comment = doc.create_comment("!");
        doc.append_child(div, text).unwrap();
        doc.append_child(div, comment).unwrap();
        assert_eq!(
            outer_html(&doc, div),
            "<div title=\"a&quot;b&amp;c\">1 &lt; 2 &amp; 3<!--!--></div>"
        );
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let br = doc.create_element("br");
        doc.append_child(p, br).unwrap();
        assert_eq!(inner_html(&doc, p), "<br>");
    }
}
