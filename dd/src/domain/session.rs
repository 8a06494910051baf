//! Workflow session record
//!
//! A session is the single persisted record for one document being drafted.
//! The [`Stage`] enum is the workflow state machine: each variant carries
//! exactly the data valid at that stage, so illegal combinations (clauses
//! without a frozen skeleton, a review without a skeleton) cannot be
//! represented, stored, or loaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::generate_id;
use super::review::Review;
use super::skeleton::{Clause, Skeleton};
use draftstore::now_ms;

/// Depth of the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationDepth {
    /// Core items only
    Short,
    /// Core and normal items
    #[default]
    Standard,
    /// Everything
    Extended,
    /// Everything, alias kept for callers that think in audience terms
    Expert,
}

impl std::fmt::Display for GenerationDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Standard => write!(f, "standard"),
            Self::Extended => write!(f, "extended"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

impl std::str::FromStr for GenerationDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Self::Short),
            "standard" => Ok(Self::Standard),
            "extended" => Ok(Self::Extended),
            "expert" => Ok(Self::Expert),
            _ => Err(format!("unknown depth: {s} (expected short|standard|extended|expert)")),
        }
    }
}

/// Who said a dialogue line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    System,
}

/// One line of the interview dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: TurnRole,
    pub text: String,
    /// Unix milliseconds
    pub timestamp: i64,
}

impl DialogueTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            timestamp: now_ms(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            text: text.into(),
            timestamp: now_ms(),
        }
    }
}

/// Readiness gate between the interview and skeleton generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Gate {
    /// Set when the interview has covered enough ground to outline
    #[serde(default)]
    pub ready_for_skeleton: bool,
}

/// Workflow stage, tagged so stored JSON reads `{"stage": "skeleton_review", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Interviewing, no outline proposed yet
    PreSkeleton,

    /// Outline proposed, waiting for the review to start
    SkeletonReady { skeleton: Skeleton },

    /// Review running over the proposed outline
    SkeletonReview { skeleton: Skeleton, review: Review },

    /// Outline sealed, ready for clause generation
    SkeletonFrozen { skeleton: Skeleton, review: Review },

    /// Clause generation in flight
    Generating {
        skeleton: Skeleton,
        review: Review,
        clauses: Vec<Clause>,
        depth: GenerationDepth,
    },

    /// Every selected section has a drafted clause
    Complete {
        skeleton: Skeleton,
        review: Review,
        clauses: Vec<Clause>,
    },
}

impl Stage {
    /// Stage name as stored in JSON
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreSkeleton => "pre_skeleton",
            Self::SkeletonReady { .. } => "skeleton_ready",
            Self::SkeletonReview { .. } => "skeleton_review",
            Self::SkeletonFrozen { .. } => "skeleton_frozen",
            Self::Generating { .. } => "generating",
            Self::Complete { .. } => "complete",
        }
    }

    /// The skeleton, once one exists
    pub fn skeleton(&self) -> Option<&Skeleton> {
        match self {
            Self::PreSkeleton => None,
            Self::SkeletonReady { skeleton }
            | Self::SkeletonReview { skeleton, .. }
            | Self::SkeletonFrozen { skeleton, .. }
            | Self::Generating { skeleton, .. }
            | Self::Complete { skeleton, .. } => Some(skeleton),
        }
    }

    /// The review, once one exists
    pub fn review(&self) -> Option<&Review> {
        match self {
            Self::PreSkeleton | Self::SkeletonReady { .. } => None,
            Self::SkeletonReview { review, .. }
            | Self::SkeletonFrozen { review, .. }
            | Self::Generating { review, .. }
            | Self::Complete { review, .. } => Some(review),
        }
    }

    /// Drafted clauses, once generation has started
    pub fn clauses(&self) -> Option<&[Clause]> {
        match self {
            Self::Generating { clauses, .. } | Self::Complete { clauses, .. } => Some(clauses),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One document-drafting workflow, persisted as a single JSON record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: String,

    /// Document type id from the catalog
    pub document_type: String,

    /// Full interview transcript, oldest first
    #[serde(default)]
    pub dialogue: Vec<DialogueTurn>,

    /// Accumulated document context, a JSON object keyed by dot paths
    pub context: Value,

    /// Skeleton readiness gate
    #[serde(default)]
    pub gate: Gate,

    /// Workflow state machine
    #[serde(flatten)]
    pub stage: Stage,

    /// Bumped on every persisted mutation
    #[serde(default)]
    pub revision: u64,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Session {
    /// Create a fresh session in the pre-skeleton stage
    pub fn new(document_type: impl Into<String>) -> Self {
        let document_type = document_type.into();
        let now = now_ms();
        Self {
            id: generate_id("session", &document_type),
            document_type,
            dialogue: Vec::new(),
            context: Value::Object(serde_json::Map::new()),
            gate: Gate::default(),
            stage: Stage::PreSkeleton,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user line to the dialogue
    pub fn push_user_turn(&mut self, text: impl Into<String>) {
        self.dialogue.push(DialogueTurn::user(text));
    }

    /// Append a system line to the dialogue
    pub fn push_system_turn(&mut self, text: impl Into<String>) {
        self.dialogue.push(DialogueTurn::system(text));
    }

    /// Mark the record mutated before persisting
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = now_ms();
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.stage, Stage::Complete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question::Question;
    use crate::domain::skeleton::Section;

    #[test]
    fn new_session_starts_empty() {
        let session = Session::new("service-agreement");

        assert_eq!(session.stage.name(), "pre_skeleton");
        assert_eq!(session.context, serde_json::json!({}));
        assert!(!session.gate.ready_for_skeleton);
        assert!(session.dialogue.is_empty());
        assert_eq!(session.revision, 0);
        assert!(session.id.contains("-session-"));
    }

    #[test]
    fn stage_tag_lands_in_json() {
        let session = Session::new("nda");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["stage"], "pre_skeleton");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back.stage, Stage::PreSkeleton);
    }

    #[test]
    fn stage_variants_roundtrip_with_payload() {
        let mut session = Session::new("nda");
        session.stage = Stage::SkeletonReview {
            skeleton: Skeleton::new(vec![Section::new("s1", "Scope")]),
            review: Review::new(vec![Question::new("r1", "keep scope?")]),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["stage"], "skeleton_review");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back.stage.skeleton().unwrap().sections[0].id, "s1");
        assert_eq!(back.stage.review().unwrap().questions.len(), 1);
    }

    #[test]
    fn touch_bumps_revision() {
        let mut session = Session::new("nda");
        let before = session.revision;
        session.touch();
        assert_eq!(session.revision, before + 1);
    }

    #[test]
    fn depth_parses_from_str() {
        assert_eq!("short".parse::<GenerationDepth>().unwrap(), GenerationDepth::Short);
        assert_eq!("expert".parse::<GenerationDepth>().unwrap(), GenerationDepth::Expert);
        assert!("deep".parse::<GenerationDepth>().is_err());
    }
}
