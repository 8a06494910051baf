//! Draftdaemon - staged document drafting
//!
//! Draftdaemon turns a free-form request into a finished document through a
//! fixed sequence of stages. An interview gathers the required facts, a
//! skeleton proposes the outline, a review collects targeted confirmations,
//! and only a frozen outline is drafted into clauses and assembled.
//!
//! # Core Concepts
//!
//! - **Stages, not flags**: a session is always in exactly one stage, and the
//!   data a stage needs lives on that stage
//! - **State in the store**: every operation loads a session, works on a
//!   copy, and persists the result; a failed step changes nothing
//! - **One completion per step**: each reasoning step is a single stateless
//!   LLM call that can be retried as-is
//! - **Frozen means frozen**: once a review is frozen the outline and its
//!   answers are immutable
//!
//! # Modules
//!
//! - [`domain`] - Sessions, stages, skeletons, questions, reviews
//! - [`orchestrator`] - The workflow operations over stored sessions
//! - [`reason`] - LLM-backed reasoning steps behind a trait
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`catalog`] - Document type definitions and interview questions
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod api;
pub mod assembler;
pub mod candidates;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod llm;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod reason;
pub mod scoring;
pub mod selector;
pub mod validate;

// Re-export commonly used types
pub use api::{ErrorBody, SessionSnapshot};
pub use catalog::{Catalog, DocumentTypeDef};
pub use config::{Config, LlmConfig};
pub use domain::{
    Answer, Clause, DialogueTurn, Gate, GenerationDepth, Importance, Question, QuestionKind,
    QuestionOption, RequiredLevel, Review, ReviewStatus, Section, SectionItem, Session, Skeleton,
    Stage, TurnRole,
};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError};
pub use orchestrator::{NextAction, Orchestrator, WorkflowError};
pub use reason::{LlmReasoner, ReasonError, Reasoner};
