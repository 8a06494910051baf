//! Document skeleton types
//!
//! A skeleton is the proposed outline of the document: a tree of sections,
//! each carrying leaf items that describe the content to be drafted there.
//! Clauses are the drafted text fragments produced against frozen sections.

use serde::{Deserialize, Serialize};

/// How strongly a skeleton item should be included in generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Always generated, even in the shortest rendition
    Core,
    /// Generated in standard depth and above
    #[default]
    Normal,
    /// Generated only when the user asks for an extended document
    Optional,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Normal => write!(f, "normal"),
            Self::Optional => write!(f, "optional"),
        }
    }
}

/// A leaf content placeholder inside a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionItem {
    /// What should be drafted here
    pub text: String,

    /// Inclusion weight for depth selection
    #[serde(default)]
    pub importance: Importance,
}

impl SectionItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            importance: Importance::default(),
        }
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }
}

/// A node in the skeleton tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier, unique within the skeleton
    pub id: String,

    /// Heading shown in the assembled document
    pub title: String,

    /// Leaf content placeholders
    #[serde(default)]
    pub items: Vec<SectionItem>,

    /// Nested sections
    #[serde(default)]
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
            subsections: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<SectionItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_subsections(mut self, subsections: Vec<Section>) -> Self {
        self.subsections = subsections;
        self
    }
}

/// The proposed document outline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Skeleton {
    /// Top-level sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Skeleton {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// All section ids in pre-order
    pub fn section_ids(&self) -> Vec<&str> {
        fn walk<'a>(section: &'a Section, out: &mut Vec<&'a str>) {
            out.push(section.id.as_str());
            for sub in &section.subsections {
                walk(sub, out);
            }
        }
        let mut ids = Vec::new();
        for section in &self.sections {
            walk(section, &mut ids);
        }
        ids
    }

    /// Look up a section anywhere in the tree
    pub fn find_section(&self, id: &str) -> Option<&Section> {
        fn walk<'a>(section: &'a Section, id: &str) -> Option<&'a Section> {
            if section.id == id {
                return Some(section);
            }
            section.subsections.iter().find_map(|sub| walk(sub, id))
        }
        self.sections.iter().find_map(|s| walk(s, id))
    }
}

/// A drafted text fragment for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Section this fragment belongs to
    pub section_id: String,

    /// Drafted body text
    pub body: String,
}

impl Clause {
    pub fn new(section_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Skeleton {
        Skeleton::new(vec![
            Section::new("parties", "Parties").with_items(vec![SectionItem::new("who signs")]),
            Section::new("terms", "Terms").with_subsections(vec![Section::new(
                "payment",
                "Payment",
            )]),
        ])
    }

    #[test]
    fn section_ids_are_preorder() {
        let skeleton = sample();
        assert_eq!(skeleton.section_ids(), vec!["parties", "terms", "payment"]);
    }

    #[test]
    fn find_section_descends_into_subsections() {
        let skeleton = sample();
        assert_eq!(skeleton.find_section("payment").unwrap().title, "Payment");
        assert!(skeleton.find_section("missing").is_none());
    }

    #[test]
    fn importance_defaults_to_normal() {
        let item: SectionItem = serde_json::from_str(r#"{"text": "scope"}"#).unwrap();
        assert_eq!(item.importance, Importance::Normal);
    }

    #[test]
    fn importance_serializes_snake_case() {
        let json = serde_json::to_value(Importance::Core).unwrap();
        assert_eq!(json, serde_json::json!("core"));
    }
}
