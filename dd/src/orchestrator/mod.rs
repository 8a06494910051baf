//! Workflow orchestration
//!
//! The [`Orchestrator`] owns the store, the reasoner, the candidate search,
//! and the document-type catalog, and exposes one method per workflow
//! operation. [`NextAction`] guidance and the [`WorkflowError`] taxonomy live
//! alongside it.

mod actions;
mod engine;
mod error;

pub use actions::{NextAction, compute_next_action};
pub use engine::Orchestrator;
pub use error::WorkflowError;
