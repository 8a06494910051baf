//! Domain types for draftdaemon
//!
//! Core domain types: Session, Skeleton, Question, Review.
//! Sessions persist through DraftStore; everything they carry is plain
//! serde data so the whole workflow state round-trips as one JSON document.
//!
//! Stage-specific data (the skeleton, the review, generated clauses) lives
//! inside the [`Stage`] enum variant for the stage that owns it, so a
//! session cannot hold a review before one exists or clauses before
//! generation starts.

mod id;
mod question;
mod review;
mod session;
mod skeleton;

pub use id::generate_id;
pub use question::{Answer, Question, QuestionKind, QuestionOption, RequiredLevel};
pub use review::{Review, ReviewStatus};
pub use session::{DialogueTurn, Gate, GenerationDepth, Session, Stage, TurnRole};
pub use skeleton::{Clause, Importance, Section, SectionItem, Skeleton};

// Re-export draftstore time helper for convenience
pub use draftstore::now_ms;
