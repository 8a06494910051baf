//! Reasoning steps
//!
//! Everything the workflow needs a language model for sits behind the
//! [`Reasoner`] trait: interpreting a user message, proposing a skeleton,
//! planning a review, drafting clauses. Each step is a single call with no
//! model-side state, so a failed step can be retried against unchanged
//! session state. Tests drive the orchestrator with a scripted
//! implementation and never touch the network.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::candidates::SkeletonCandidate;
use crate::domain::{Answer, Clause, Question, Session, Skeleton};
use crate::llm::LlmError;

mod llm;

pub use llm::LlmReasoner;

/// Errors from a reasoning step
///
/// Any of these leaves the session untouched; the caller reports the failure
/// and the same operation can be retried as-is.
#[derive(Debug, Error)]
pub enum ReasonError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("malformed reasoning output: {0}")]
    Malformed(String),

    #[error("prompt rendering failed: {0}")]
    Prompt(String),

    #[error("reasoning unavailable: {0}")]
    Unavailable(String),
}

/// A direct context write requested by the interpretation step
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSet {
    /// Dot-separated path into the document context
    pub path: String,
    pub value: Value,
}

/// Structured result of interpreting one user message
#[derive(Debug, Clone, Default)]
pub struct InterpretOutcome {
    /// Conversational reply to show the user
    pub reply: String,

    /// Answers recognized in the message
    pub answers: Vec<Answer>,

    /// Facts that fit no question but belong in the context
    pub context_sets: Vec<ContextSet>,

    /// Explicit gate override, `None` leaves the computed gate in place
    pub gate_ready: Option<bool>,

    /// Requested document type switch
    pub document_type: Option<String>,
}

/// One section the clause step should draft
#[derive(Debug, Clone)]
pub struct ClauseRequest {
    pub section_id: String,
    pub section_title: String,
    /// Item texts selected for drafting, in section order
    pub items: Vec<String>,
}

/// The model-backed steps of the workflow
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Read the latest user message against the question set and produce a
    /// reply plus structured updates
    async fn interpret(
        &self,
        session: &Session,
        questions: &[Question],
    ) -> Result<InterpretOutcome, ReasonError>;

    /// Propose a skeleton for the gathered context
    async fn generate_skeleton(
        &self,
        session: &Session,
        candidates: &[SkeletonCandidate],
    ) -> Result<Skeleton, ReasonError>;

    /// Plan review questions for the proposed skeleton
    async fn plan_review(&self, session: &Session) -> Result<Vec<Question>, ReasonError>;

    /// Draft clause bodies for the requested sections
    async fn draft_clauses(
        &self,
        session: &Session,
        requests: &[ClauseRequest],
    ) -> Result<Vec<Clause>, ReasonError>;
}

/// Reasoner for commands that never reason
///
/// Store-only commands (status, listing, review bookkeeping, assembly)
/// still construct an orchestrator; this fills the reasoner slot without
/// requiring LLM credentials. Every step fails with the same message.
pub struct Unconfigured;

impl Unconfigured {
    fn error() -> ReasonError {
        ReasonError::Unavailable("no LLM client configured for this command".to_string())
    }
}

#[async_trait]
impl Reasoner for Unconfigured {
    async fn interpret(
        &self,
        _session: &Session,
        _questions: &[Question],
    ) -> Result<InterpretOutcome, ReasonError> {
        Err(Self::error())
    }

    async fn generate_skeleton(
        &self,
        _session: &Session,
        _candidates: &[SkeletonCandidate],
    ) -> Result<Skeleton, ReasonError> {
        Err(Self::error())
    }

    async fn plan_review(&self, _session: &Session) -> Result<Vec<Question>, ReasonError> {
        Err(Self::error())
    }

    async fn draft_clauses(
        &self,
        _session: &Session,
        _requests: &[ClauseRequest],
    ) -> Result<Vec<Clause>, ReasonError> {
        Err(Self::error())
    }
}
