//! Label application: rewrite candidate text to `"{label} ({id})"` and mark the parent.

use super::{Candidate, Document};
use crate::cache::MappingCache;

/// Set to `"true"` on a parent once one of its children has been rewritten.
pub const APPLIED_ATTR: &str = "data-catlens-applied";
pub const ID_ATTR: &str = "data-catlens-id";
pub const LABEL_ATTR: &str = "data-catlens-label";

/// Apply known labels. Returns the number of rewritten nodes.
///
/// A parent that is already marked is left alone, so running this twice over
/// the same candidates changes nothing the second time.
pub fn apply_labels(doc: &mut Document, candidates: &[Candidate], mappings: &MappingCache) -> usize {
    let mut applied = 0;
    for cand in candidates {
        let Some(label) = mappings.get(&cand.id).filter(|l| !l.is_empty()) else {
            continue;
        };
        let Some(parent) = doc.parent_element(cand.node) else {
            continue;
        };
        if doc.attr(parent, APPLIED_ATTR) == Some("true") {
            continue;
        }

        let original = doc.text_content(cand.node);
        doc.set_text_content(cand.node, &format!("{} ({})", label, original.trim()));
        doc.set_attr(parent, APPLIED_ATTR, "true");
        doc.set_attr(parent, ID_ATTR, &cand.id);
        doc.set_attr(parent, LABEL_ATTR, label);
        applied += 1;
    }
    applied
}
