//! Depth-based skeleton item selection
//!
//! Maps a generation depth to the default set of skeleton items worth
//! drafting. Items are addressed as `{section_id}-{item_index}` so a UI can
//! toggle individual checkboxes; the defaults computed here are advisory and
//! the caller may override them before generation.

use std::collections::BTreeSet;

use crate::domain::{GenerationDepth, Importance, Section, Skeleton};

/// Whether an item of this importance is drafted at this depth
fn selected_at(depth: GenerationDepth, importance: Importance) -> bool {
    match depth {
        GenerationDepth::Short => importance == Importance::Core,
        GenerationDepth::Standard => matches!(importance, Importance::Core | Importance::Normal),
        GenerationDepth::Extended | GenerationDepth::Expert => true,
    }
}

/// Default item keys for a skeleton at the given depth
///
/// Keys are `{section_id}-{item_index}` with the index counting items within
/// their section, and come back sorted for stable output.
pub fn default_selected_items(skeleton: &Skeleton, depth: GenerationDepth) -> BTreeSet<String> {
    fn walk(section: &Section, depth: GenerationDepth, out: &mut BTreeSet<String>) {
        for (index, item) in section.items.iter().enumerate() {
            if selected_at(depth, item.importance) {
                out.insert(format!("{}-{}", section.id, index));
            }
        }
        for sub in &section.subsections {
            walk(sub, depth, out);
        }
    }

    let mut selected = BTreeSet::new();
    for section in &skeleton.sections {
        walk(section, depth, &mut selected);
    }
    selected
}

/// Section ids that have at least one selected item, in document order
pub fn sections_with_selection(skeleton: &Skeleton, depth: GenerationDepth) -> Vec<String> {
    let selected = default_selected_items(skeleton, depth);

    fn walk(section: &Section, selected: &BTreeSet<String>, out: &mut Vec<String>) {
        let any = (0..section.items.len()).any(|i| selected.contains(&format!("{}-{}", section.id, i)));
        if any {
            out.push(section.id.clone());
        }
        for sub in &section.subsections {
            walk(sub, selected, out);
        }
    }

    let mut sections = Vec::new();
    for section in &skeleton.sections {
        walk(section, &selected, &mut sections);
    }
    sections
}
