//! Per-page label context: the last known mappings and enabled flag.

use crate::cache::MappingCache;
use crate::store::State;

/// Page-side copy of the persisted state. Kept when a state read fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelContext {
    pub mappings: MappingCache,
    pub enabled: bool,
}

impl LabelContext {
    pub fn refresh(&mut self, state: State) {
        self.enabled = state.config.enabled;
        self.mappings = state.mappings;
    }

    /// Ids not yet mapped, first-seen order, deduplicated, at most `cap`.
    pub fn missing<'a>(&self, ids: impl IntoIterator<Item = &'a str>, cap: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in ids {
            if out.len() >= cap {
                break;
            }
            if !self.mappings.contains(id) && !out.iter().any(|o| o == id) {
                out.push(id.to_string());
            }
        }
        out
    }
}
