//! Final document assembly
//!
//! Walks the frozen skeleton in pre-order and stitches drafted clauses under
//! their section headings. Assembly is read-only: it never mutates the
//! session and can run any number of times over the same state.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Clause, Section, Skeleton};

/// Upper bound on skeleton nesting, anything deeper is a malformed proposal
pub const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("duplicate section id in skeleton: {0}")]
    DuplicateSection(String),

    #[error("skeleton nesting exceeds {MAX_TREE_DEPTH} levels at section: {0}")]
    TooDeep(String),
}

/// One rendered section in document order
#[derive(Debug, Clone, Serialize)]
pub struct AssembledSection {
    pub id: String,
    pub title: String,
    /// Nesting level, zero for top-level sections
    pub depth: usize,
    /// Drafted body, absent for title-only nodes
    pub body: Option<String>,
}

/// The stitched document
#[derive(Debug, Clone, Serialize)]
pub struct AssembledDocument {
    pub sections: Vec<AssembledSection>,
    pub full_text: String,
}

/// Assemble the document from a skeleton and its drafted clauses
pub fn assemble_document(
    skeleton: &Skeleton,
    clauses: &[Clause],
) -> Result<AssembledDocument, AssembleError> {
    // First clause per section wins
    let mut bodies: HashMap<&str, &str> = HashMap::new();
    for clause in clauses {
        bodies.entry(clause.section_id.as_str()).or_insert(clause.body.as_str());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut sections = Vec::new();

    fn walk<'a>(
        section: &'a Section,
        depth: usize,
        bodies: &HashMap<&str, &str>,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<AssembledSection>,
    ) -> Result<(), AssembleError> {
        if depth >= MAX_TREE_DEPTH {
            return Err(AssembleError::TooDeep(section.id.clone()));
        }
        if !seen.insert(section.id.as_str()) {
            return Err(AssembleError::DuplicateSection(section.id.clone()));
        }

        out.push(AssembledSection {
            id: section.id.clone(),
            title: section.title.clone(),
            depth,
            body: bodies.get(section.id.as_str()).map(|b| b.to_string()),
        });

        for sub in &section.subsections {
            walk(sub, depth + 1, bodies, seen, out)?;
        }
        Ok(())
    }

    for section in &skeleton.sections {
        walk(section, 0, &bodies, &mut seen, &mut sections)?;
    }

    let blocks: Vec<String> = sections
        .iter()
        .map(|s| {
            let heading = format!("{}{}", "  ".repeat(s.depth), s.title);
            match &s.body {
                Some(body) => format!("{heading}\n{body}"),
                None => heading,
            }
        })
        .collect();

    Ok(AssembledDocument {
        sections,
        full_text: blocks.join("\n\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Skeleton {
        Skeleton::new(vec![
            Section::new("a", "Alpha"),
            Section::new("b", "Beta").with_subsections(vec![Section::new("c", "Gamma")]),
        ])
    }

    #[test]
    fn sections_come_out_in_preorder() {
        let clauses = vec![Clause::new("c", "gamma body")];
        let doc = assemble_document(&abc(), &clauses).unwrap();

        let ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let pos_a = doc.full_text.find("Alpha").unwrap();
        let pos_b = doc.full_text.find("Beta").unwrap();
        let pos_c = doc.full_text.find("Gamma").unwrap();
        assert!(pos_a < pos_b && pos_b < pos_c);
    }

    #[test]
    fn title_only_nodes_still_render() {
        let doc = assemble_document(&abc(), &[]).unwrap();

        assert!(doc.sections.iter().all(|s| s.body.is_none()));
        assert!(doc.full_text.contains("Alpha"));
        assert!(doc.full_text.contains("  Gamma"));
    }

    #[test]
    fn titles_indent_by_depth() {
        let clauses = vec![Clause::new("c", "gamma body")];
        let doc = assemble_document(&abc(), &clauses).unwrap();

        assert!(doc.full_text.contains("\n\n  Gamma\ngamma body"));
        assert_eq!(doc.sections[2].depth, 1);
    }

    #[test]
    fn blocks_join_with_blank_line() {
        let skeleton = Skeleton::new(vec![Section::new("a", "Alpha"), Section::new("b", "Beta")]);
        let clauses = vec![Clause::new("a", "alpha body")];
        let doc = assemble_document(&skeleton, &clauses).unwrap();

        assert_eq!(doc.full_text, "Alpha\nalpha body\n\nBeta");
    }

    #[test]
    fn first_clause_per_section_wins() {
        let skeleton = Skeleton::new(vec![Section::new("a", "Alpha")]);
        let clauses = vec![Clause::new("a", "first"), Clause::new("a", "second")];
        let doc = assemble_document(&skeleton, &clauses).unwrap();

        assert_eq!(doc.sections[0].body.as_deref(), Some("first"));
    }

    #[test]
    fn clauses_for_unknown_sections_are_ignored() {
        let skeleton = Skeleton::new(vec![Section::new("a", "Alpha")]);
        let clauses = vec![Clause::new("ghost", "nowhere")];
        let doc = assemble_document(&skeleton, &clauses).unwrap();

        assert!(!doc.full_text.contains("nowhere"));
    }

    #[test]
    fn duplicate_section_ids_are_rejected() {
        let skeleton = Skeleton::new(vec![Section::new("a", "Alpha"), Section::new("a", "Again")]);
        let err = assemble_document(&skeleton, &[]).unwrap_err();
        assert!(matches!(err, AssembleError::DuplicateSection(id) if id == "a"));
    }

    #[test]
    fn runaway_nesting_is_rejected() {
        let mut section = Section::new("leaf", "Leaf");
        for i in 0..MAX_TREE_DEPTH {
            section = Section::new(format!("s{i}"), "S").with_subsections(vec![section]);
        }
        let skeleton = Skeleton::new(vec![section]);

        let err = assemble_document(&skeleton, &[]).unwrap_err();
        assert!(matches!(err, AssembleError::TooDeep(_)));
    }
}
