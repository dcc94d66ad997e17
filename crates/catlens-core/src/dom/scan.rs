//! Candidate discovery: text nodes that look like category ids.

use std::collections::HashSet;

use super::{Document, NodeId};
use crate::ident::looks_like_category_id;

/// Which rule found a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Text of a `li[role=treeitem] > button`.
    Tree,
    /// A `span` whose entire text is an id.
    Span,
    /// Text next to an arrow/chevron icon.
    Hierarchy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The node whose text gets rewritten (a text node, or a childless span).
    pub node: NodeId,
    /// Trimmed text of `node`.
    pub id: String,
    pub provenance: Provenance,
}

/// Run all three rules in order; a node found by more than one rule is kept once.
pub fn find_candidates(doc: &Document) -> Vec<Candidate> {
    let mut found = Vec::new();
    tree_items(doc, &mut found);
    bare_spans(doc, &mut found);
    hierarchy_rows(doc, &mut found);

    let mut seen = HashSet::new();
    found.retain(|c: &Candidate| seen.insert(c.node));
    found
}

fn push_text_children(doc: &Document, parent: NodeId, provenance: Provenance, out: &mut Vec<Candidate>) {
    for node in doc.text_children(parent) {
        let text = doc.text_content(node);
        let id = text.trim();
        if looks_like_category_id(id) {
            out.push(Candidate {
                node,
                id: id.to_string(),
                provenance,
            });
        }
    }
}

fn tree_items(doc: &Document, out: &mut Vec<Candidate>) {
    for el in doc.elements() {
        if doc.tag(el) != Some("button") {
            continue;
        }
        let in_tree_item = doc.parent_element(el).is_some_and(|p| {
            doc.tag(p) == Some("li") && doc.attr(p, "role") == Some("treeitem")
        });
        if in_tree_item {
            push_text_children(doc, el, Provenance::Tree, out);
        }
    }
}

fn bare_spans(doc: &Document, out: &mut Vec<Candidate>) {
    for el in doc.elements() {
        if doc.tag(el) != Some("span") {
            continue;
        }
        let text = doc.text_content(el);
        let id = text.trim();
        // Padded text means the span holds more than just the id.
        if !looks_like_category_id(id) || text != id {
            continue;
        }
        let node = doc.text_children(el).next().unwrap_or(el);
        out.push(Candidate {
            node,
            id: id.to_string(),
            provenance: Provenance::Span,
        });
    }
}

fn hierarchy_rows(doc: &Document, out: &mut Vec<Candidate>) {
    for el in doc.elements() {
        let is_icon =
            doc.attr_contains(el, "class", "arrow") || doc.attr_contains(el, "class", "chevron");
        if !is_icon {
            continue;
        }
        if let Some(parent) = doc.parent_element(el) {
            push_text_children(doc, parent, Provenance::Hierarchy, out);
        }
    }
}
