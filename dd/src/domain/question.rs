//! Question and answer types
//!
//! Questions come from two places: the document-type catalog (interview
//! questions asked before the skeleton exists) and review planning (questions
//! asked about a proposed skeleton). Both share one shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a question is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free-form text entry
    #[default]
    Text,
    /// Pick one option
    Single,
    /// Pick any number of options
    Multi,
}

/// Answer tier, drives completion scoring and question sequencing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredLevel {
    /// Blocks skeleton generation until answered
    Must,
    /// Offered for refinement, never blocks
    Recommended,
    /// Nice to have
    Optional,
}

impl std::fmt::Display for RequiredLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Must => write!(f, "must"),
            Self::Recommended => write!(f, "recommended"),
            Self::Optional => write!(f, "optional"),
        }
    }
}

/// One selectable option for single/multi questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Stable option id
    pub id: String,

    /// Label shown to the user
    pub label: String,

    /// Machine-readable value merged into the document context
    pub value: Value,
}

/// A question posed to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, unique within its question set
    pub id: String,

    /// Prompt text shown to the user
    pub text: String,

    /// Presentation kind
    #[serde(default)]
    pub kind: QuestionKind,

    /// Legacy required flag, consulted only when `required_level` is absent
    #[serde(default)]
    pub required: bool,

    /// Explicit answer tier
    #[serde(default)]
    pub required_level: Option<RequiredLevel>,

    /// Options for single/multi kinds
    #[serde(default)]
    pub options: Vec<QuestionOption>,

    /// Context paths that must resolve before this question is eligible
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Context paths the answer is written to
    #[serde(default)]
    pub affects: Vec<String>,

    /// Explicit ordering weight, lower asks first
    #[serde(default)]
    pub order: Option<u32>,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: QuestionKind::default(),
            required: false,
            required_level: None,
            options: Vec::new(),
            depends_on: Vec::new(),
            affects: Vec::new(),
            order: None,
        }
    }

    /// Effective tier: explicit level wins, then the legacy flag
    pub fn tier(&self) -> RequiredLevel {
        match self.required_level {
            Some(level) => level,
            None if self.required => RequiredLevel::Must,
            None => RequiredLevel::Optional,
        }
    }

    /// Machine value for an option id, if the id is known
    pub fn option_value(&self, option_id: &str) -> Option<&Value> {
        self.options.iter().find(|o| o.id == option_id).map(|o| &o.value)
    }
}

/// A recorded answer to one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Question this answers
    pub question_id: String,

    /// Answer exactly as given, before any option resolution
    pub raw: Value,

    /// Option ids chosen, for single/multi questions
    #[serde(default)]
    pub selected_option_ids: Vec<String>,

    /// Resolved value as merged into the context, filled on apply
    #[serde(default)]
    pub normalized: Option<Value>,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, raw: Value) -> Self {
        Self {
            question_id: question_id.into(),
            raw,
            selected_option_ids: Vec::new(),
            normalized: None,
        }
    }

    pub fn with_selection(mut self, option_ids: Vec<String>) -> Self {
        self.selected_option_ids = option_ids;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tier_prefers_explicit_level() {
        let mut q = Question::new("q1", "who?");
        q.required = true;
        q.required_level = Some(RequiredLevel::Recommended);
        assert_eq!(q.tier(), RequiredLevel::Recommended);
    }

    #[test]
    fn tier_falls_back_to_required_flag() {
        let mut q = Question::new("q1", "who?");
        q.required = true;
        assert_eq!(q.tier(), RequiredLevel::Must);

        q.required = false;
        assert_eq!(q.tier(), RequiredLevel::Optional);
    }

    #[test]
    fn option_value_lookup() {
        let mut q = Question::new("q-term", "term?");
        q.options = vec![QuestionOption {
            id: "one-year".into(),
            label: "One year".into(),
            value: json!({"months": 12}),
        }];

        assert_eq!(q.option_value("one-year"), Some(&json!({"months": 12})));
        assert_eq!(q.option_value("two-years"), None);
    }

    #[test]
    fn question_deserializes_with_defaults() {
        let q: Question = serde_yaml::from_str("id: q1\ntext: who?\n").unwrap();
        assert_eq!(q.kind, QuestionKind::Text);
        assert!(!q.required);
        assert!(q.required_level.is_none());
        assert!(q.affects.is_empty());
        assert!(q.order.is_none());
    }
}
