use crate::document::Document;
use crate::types::{Namespace, NodeData, NodeId};
use std::fmt;

/// Deterministic, line-oriented rendering of a document subtree.
///
/// Not a stable format; intended for test comparisons and CLI output.
/// One node per line, two spaces of indentation per depth level:
/// - elements: `<name attr="value">` (SVG elements are prefixed `svg:`)
/// - text: `"text"` with newlines escaped
/// - comments: `<!-- text -->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(doc: &Document, root: NodeId) -> Self {
        let mut lines = Vec::new();
        walk(doc, root, 0, &mut lines);
        Self { lines }
    }

    /// Snapshot of `root`'s children only.
    pub fn children(doc: &Document, root: NodeId) -> Self {
        let mut lines = Vec::new();
        for &child in doc.children(root) {
            walk(doc, child, 0, &mut lines);
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn walk(doc: &Document, id: NodeId, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let line = match doc.data(id) {
        Some(NodeData::Document) => "#document".to_string(),
        Some(NodeData::Element(element)) => {
            let mut line = format!("{indent}<");
            if element.namespace() == Namespace::Svg {
                line.push_str("svg:");
            }
            line.push_str(element.local_name());
            for (name, value) in element.attributes() {
                line.push_str(&format!(" {name}=\"{value}\""));
            }
            line.push('>');
            line
        }
        Some(NodeData::Text(text)) => format!("{indent}\"{}\"", text.replace('\n', "\\n")),
        Some(NodeData::Comment(text)) => format!("{indent}<!-- {text} -->"),
        None => return,
    };
    lines.push(line);
    for &child in doc.children(id) {
        walk(doc, child, depth + 1, lines);
    }
}
