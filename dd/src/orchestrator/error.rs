//! Workflow error taxonomy
//!
//! Precondition failures carry enough detail to tell the caller what the
//! operation expected versus what it found. Every check runs before any
//! reasoning call or mutation, so a returned error always means the stored
//! session is exactly as it was.

use thiserror::Error;

use crate::assembler::AssembleError;
use crate::reason::ReasonError;
use draftstore::StoreError;

/// Errors surfaced by orchestrator operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("{operation} requires stage {expected}, session is in {actual}")]
    InvalidStage {
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("skeleton gate is not ready: {reason}")]
    GateNotReady { reason: String },

    #[error("review is frozen and can no longer change")]
    ReviewFrozen,

    #[error("review has no questions to apply")]
    ReviewQuestionsEmpty,

    #[error("review must be applied before freezing, status is {status}")]
    ReviewNotApplied { status: String },

    #[error("reasoning step failed: {0}")]
    Reasoning(#[from] ReasonError),

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("assembly failed: {0}")]
    Assemble(#[from] AssembleError),
}

impl WorkflowError {
    /// Stable machine-readable code for the API error payload
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidStage { .. } => "invalid_stage",
            Self::GateNotReady { .. } => "gate_not_ready",
            Self::ReviewFrozen => "review_frozen",
            Self::ReviewQuestionsEmpty => "review_questions_empty",
            Self::ReviewNotApplied { .. } => "review_not_applied",
            Self::Reasoning(_) => "reasoning_failed",
            Self::Store(_) => "storage_failed",
            Self::Assemble(_) => "assembly_failed",
        }
    }

    /// HTTP-equivalent status class
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidStage { .. }
            | Self::GateNotReady { .. }
            | Self::ReviewFrozen
            | Self::ReviewQuestionsEmpty
            | Self::ReviewNotApplied { .. } => 400,
            Self::Reasoning(_) | Self::Store(_) | Self::Assemble(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert_eq!(WorkflowError::NotFound("x".into()).status(), 404);
        assert_eq!(
            WorkflowError::InvalidStage {
                operation: "plan_review",
                expected: "skeleton_ready",
                actual: "pre_skeleton",
            }
            .status(),
            400
        );
        assert_eq!(
            WorkflowError::Reasoning(ReasonError::Malformed("bad".into())).status(),
            500
        );
    }

    #[test]
    fn invalid_stage_names_expected_and_actual() {
        let err = WorkflowError::InvalidStage {
            operation: "freeze_review",
            expected: "skeleton_review",
            actual: "complete",
        };
        let message = err.to_string();
        assert!(message.contains("skeleton_review"));
        assert!(message.contains("complete"));
    }

    #[test]
    fn review_codes_are_stable() {
        assert_eq!(WorkflowError::ReviewFrozen.code(), "review_frozen");
        assert_eq!(WorkflowError::ReviewQuestionsEmpty.code(), "review_questions_empty");
        assert_eq!(
            WorkflowError::ReviewNotApplied { status: "collecting".into() }.code(),
            "review_not_applied"
        );
    }
}
