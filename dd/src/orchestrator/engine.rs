//! Workflow engine
//!
//! Every operation is a single read-compute-write unit: load the full
//! session, check preconditions, run at most one reasoning step, apply the
//! mutation, persist. Reasoning calls happen strictly after all precondition
//! checks and strictly before any write, so a failed operation is a no-op on
//! stored state and can be retried as-is.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use draftstore::SessionStore;

use super::actions::compute_next_action;
use super::error::WorkflowError;
use crate::api::SessionSnapshot;
use crate::assembler::{self, AssembledDocument};
use crate::candidates::CandidateSearch;
use crate::catalog::Catalog;
use crate::context::{merge_answer, resolve_answer_value, set_path};
use crate::domain::{
    Answer, GenerationDepth, RequiredLevel, Review, ReviewStatus, Session, Stage,
};
use crate::reason::{ClauseRequest, Reasoner};
use crate::scoring::{completion_state, is_answered};
use crate::selector;
use crate::validate::{CREATE_SESSION_SCHEMA, validate_payload, warn_on_invalid};

/// Drives sessions through the interview, skeleton, review, and generation
/// stages
pub struct Orchestrator {
    store: SessionStore,
    reasoner: Arc<dyn Reasoner>,
    candidates: Arc<dyn CandidateSearch>,
    catalog: Catalog,
    default_document_type: String,
    default_depth: GenerationDepth,
}

impl Orchestrator {
    pub fn new(
        store: SessionStore,
        reasoner: Arc<dyn Reasoner>,
        candidates: Arc<dyn CandidateSearch>,
        catalog: Catalog,
        default_document_type: impl Into<String>,
        default_depth: GenerationDepth,
    ) -> Self {
        Self {
            store,
            reasoner,
            candidates,
            catalog,
            default_document_type: default_document_type.into(),
            default_depth,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn load(&self, session_id: &str) -> Result<Session, WorkflowError> {
        self.store
            .get::<Session>(session_id)?
            .ok_or_else(|| WorkflowError::NotFound(session_id.to_string()))
    }

    fn persist(&self, session: &mut Session) -> Result<(), WorkflowError> {
        session.touch();
        self.store.set(&session.id, session)?;
        Ok(())
    }

    fn snapshot(&self, session: Session) -> SessionSnapshot {
        let questions = self.catalog.questions(&session.document_type);
        let next_action = compute_next_action(&session, questions, self.default_depth);
        SessionSnapshot { session, next_action }
    }

    /// Create a session from a wire payload
    ///
    /// Always succeeds on well-formed storage: schema violations are logged,
    /// an unknown document type falls back to the default, and an initial
    /// message is appended to the dialogue without a reasoning pass.
    pub fn create_session(&self, payload: &Value) -> Result<SessionSnapshot, WorkflowError> {
        let report = validate_payload(payload, CREATE_SESSION_SCHEMA);
        warn_on_invalid(&report);

        let document_type = match payload.get("document_type").and_then(Value::as_str) {
            Some(requested) if self.catalog.contains(requested) => requested.to_string(),
            Some(requested) => {
                warn!(
                    document_type = requested,
                    fallback = %self.default_document_type,
                    "unknown document type, using default"
                );
                self.default_document_type.clone()
            }
            None => self.default_document_type.clone(),
        };

        let mut session = Session::new(document_type);
        if let Some(message) = payload.get("message").and_then(Value::as_str)
            && !message.is_empty()
        {
            session.push_user_turn(message);
        }

        self.store.set(&session.id, &session)?;
        info!(session = %session.id, document_type = %session.document_type, "session created");
        Ok(self.snapshot(session))
    }

    /// Read-only lookup, never persists
    pub fn get_session_state(&self, session_id: &str) -> Result<SessionSnapshot, WorkflowError> {
        Ok(self.snapshot(self.load(session_id)?))
    }

    pub fn list_sessions(&self) -> Result<Vec<String>, WorkflowError> {
        Ok(self.store.list()?)
    }

    /// Interpret one user message and fold the outcome into the session
    ///
    /// Messages are accepted at any stage. The patch only ever adds context,
    /// so late clarifications land safely; the stage machine itself moves
    /// only through the staged operations.
    pub async fn process_user_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;

        session.push_user_turn(message);
        let questions = self.catalog.questions(&session.document_type).to_vec();
        let outcome = self.reasoner.interpret(&session, &questions).await?;

        for answer in &outcome.answers {
            match questions.iter().find(|q| q.id == answer.question_id) {
                Some(question) => {
                    session.context = merge_answer(&session.context, answer, question);
                }
                None => warn!(
                    question = %answer.question_id,
                    "interpretation answered an unknown question, skipping"
                ),
            }
        }
        for set in &outcome.context_sets {
            set_path(&mut session.context, &set.path, set.value.clone());
        }

        if let Some(requested) = &outcome.document_type
            && requested != &session.document_type
        {
            if !matches!(session.stage, Stage::PreSkeleton) {
                warn!(
                    document_type = %requested,
                    "document type can only change before a skeleton exists, keeping current"
                );
            } else if self.catalog.contains(requested) {
                info!(from = %session.document_type, to = %requested, "switching document type");
                session.document_type = requested.clone();
            } else {
                warn!(document_type = %requested, "requested unknown document type, keeping current");
            }
        }

        let questions = self.catalog.questions(&session.document_type);
        let completion = completion_state(questions, &session.context);
        session.gate.ready_for_skeleton = outcome.gate_ready.unwrap_or(completion.must_completed);
        session.push_system_turn(&outcome.reply);

        debug!(
            session = %session.id,
            answers = outcome.answers.len(),
            gate = session.gate.ready_for_skeleton,
            overall = completion.overall,
            "message processed"
        );
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Propose a skeleton once the interview gate is open
    pub async fn generate_skeleton(
        &self,
        session_id: &str,
    ) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        if !matches!(session.stage, Stage::PreSkeleton) {
            return Err(WorkflowError::InvalidStage {
                operation: "generate_skeleton",
                expected: "pre_skeleton",
                actual: session.stage.name(),
            });
        }
        if !session.gate.ready_for_skeleton {
            let missing: Vec<String> = self
                .catalog
                .questions(&session.document_type)
                .iter()
                .filter(|q| q.tier() == RequiredLevel::Must && !is_answered(q, &session.context))
                .map(|q| q.id.clone())
                .collect();
            let reason = if missing.is_empty() {
                "the interview has not confirmed readiness".to_string()
            } else {
                format!("unanswered required questions: {}", missing.join(", "))
            };
            return Err(WorkflowError::GateNotReady { reason });
        }

        let candidates = match self
            .candidates
            .find(&session.document_type, &session.context)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "candidate search failed, generating without reuse");
                Vec::new()
            }
        };
        if !candidates.is_empty() {
            debug!(count = candidates.len(), "reuse candidates found");
        }

        let skeleton = self.reasoner.generate_skeleton(&session, &candidates).await?;
        info!(
            session = %session.id,
            sections = skeleton.sections.len(),
            "skeleton proposed"
        );
        session.stage = Stage::SkeletonReady { skeleton };
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Plan the review questions for a proposed skeleton
    ///
    /// Re-planning while the review is still open replaces the whole review;
    /// any recorded answers are discarded with it.
    pub async fn plan_review(&self, session_id: &str) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        let skeleton = match &session.stage {
            Stage::SkeletonReady { skeleton } | Stage::SkeletonReview { skeleton, .. } => {
                skeleton.clone()
            }
            other => {
                return Err(WorkflowError::InvalidStage {
                    operation: "plan_review",
                    expected: "skeleton_ready or skeleton_review",
                    actual: other.name(),
                });
            }
        };

        let questions = self.reasoner.plan_review(&session).await?;
        info!(session = %session.id, questions = questions.len(), "review planned");
        session.stage = Stage::SkeletonReview {
            skeleton,
            review: Review::new(questions),
        };
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Record answers to review questions, no reasoning involved
    pub fn record_review_answers(
        &self,
        session_id: &str,
        answers: Vec<Answer>,
    ) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        let review = match &mut session.stage {
            Stage::SkeletonReview { review, .. } => review,
            other => {
                // later stages still carry the review, frozen by then
                if other.review().is_some_and(Review::is_frozen) {
                    return Err(WorkflowError::ReviewFrozen);
                }
                return Err(WorkflowError::InvalidStage {
                    operation: "answer_review",
                    expected: "skeleton_review",
                    actual: other.name(),
                });
            }
        };
        if review.is_frozen() {
            return Err(WorkflowError::ReviewFrozen);
        }

        let mut recorded = 0;
        for answer in answers {
            if review.questions.iter().any(|q| q.id == answer.question_id) {
                review.record_answer(answer);
                recorded += 1;
            } else {
                warn!(question = %answer.question_id, "answer for unknown review question, skipping");
            }
        }
        if recorded > 0 {
            review.status = if review.unanswered_required().is_empty() {
                ReviewStatus::ReadyToApply
            } else {
                ReviewStatus::Collecting
            };
        }

        debug!(session = %session.id, recorded, status = %review.status, "review answers recorded");
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Merge review answers into the document context
    ///
    /// Answers passed here are recorded on the review first, so one call can
    /// answer and commit together, or commit answers recorded earlier with an
    /// empty list. A partial apply succeeds: the merges land and the review
    /// stays `collecting` until every required question is answered.
    pub fn apply_review(
        &self,
        session_id: &str,
        answers: Vec<Answer>,
    ) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        let review = match &mut session.stage {
            Stage::SkeletonReview { review, .. } => review,
            other => {
                // later stages still carry the review, frozen by then
                if other.review().is_some_and(Review::is_frozen) {
                    return Err(WorkflowError::ReviewFrozen);
                }
                return Err(WorkflowError::InvalidStage {
                    operation: "apply_review",
                    expected: "skeleton_review",
                    actual: other.name(),
                });
            }
        };
        if review.is_frozen() {
            return Err(WorkflowError::ReviewFrozen);
        }
        if review.questions.is_empty() {
            return Err(WorkflowError::ReviewQuestionsEmpty);
        }

        for answer in answers {
            if review.questions.iter().any(|q| q.id == answer.question_id) {
                review.record_answer(answer);
            } else {
                warn!(question = %answer.question_id, "answer for unknown review question, skipping");
            }
        }
        let complete = review.unanswered_required().is_empty();

        let Review { questions, answers, status } = review;
        let mut context = session.context.clone();
        let mut applied = 0;
        for question in questions.iter() {
            let Some(answer) = answers.iter_mut().find(|a| a.question_id == question.id) else {
                continue;
            };
            answer.normalized = Some(resolve_answer_value(answer, question));
            context = merge_answer(&context, answer, question);
            applied += 1;
        }
        *status = if complete {
            ReviewStatus::Applied
        } else {
            ReviewStatus::Collecting
        };
        session.context = context;

        info!(session = %session.id, applied, complete, "review applied");
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Freeze the applied review; the skeleton becomes immutable
    pub fn freeze_review(&self, session_id: &str) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        let Stage::SkeletonReview { skeleton, review } = &session.stage else {
            return Err(WorkflowError::InvalidStage {
                operation: "freeze_review",
                expected: "skeleton_review",
                actual: session.stage.name(),
            });
        };
        if review.status != ReviewStatus::Applied {
            return Err(WorkflowError::ReviewNotApplied {
                status: review.status.to_string(),
            });
        }

        let skeleton = skeleton.clone();
        let mut review = review.clone();
        review.status = ReviewStatus::Frozen;
        session.stage = Stage::SkeletonFrozen { skeleton, review };

        info!(session = %session.id, "review frozen");
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Draft clauses for the sections selected at the generation depth
    ///
    /// The depth argument only matters on the first call; once generation has
    /// started the stored depth is kept so partial progress stays coherent.
    /// Each call drafts the still-pending sections and persists whatever was
    /// produced, so interrupted runs resume where they left off.
    pub async fn process_clause_generation(
        &self,
        session_id: &str,
        depth: Option<GenerationDepth>,
    ) -> Result<SessionSnapshot, WorkflowError> {
        let mut session = self.load(session_id)?;
        let (skeleton, review, mut clauses, depth) = match &session.stage {
            Stage::SkeletonFrozen { skeleton, review } => (
                skeleton.clone(),
                review.clone(),
                Vec::new(),
                depth.unwrap_or(self.default_depth),
            ),
            Stage::Generating { skeleton, review, clauses, depth: stored } => {
                if let Some(requested) = depth
                    && requested != *stored
                {
                    warn!(
                        requested = %requested,
                        stored = %stored,
                        "generation depth is fixed once started, keeping stored depth"
                    );
                }
                (skeleton.clone(), review.clone(), clauses.clone(), *stored)
            }
            other => {
                return Err(WorkflowError::InvalidStage {
                    operation: "generate_clauses",
                    expected: "skeleton_frozen or generating",
                    actual: other.name(),
                });
            }
        };

        let selection = selector::default_selected_items(&skeleton, depth);
        let drafted: HashSet<String> = clauses.iter().map(|c| c.section_id.clone()).collect();
        let pending: Vec<String> = selector::sections_with_selection(&skeleton, depth)
            .into_iter()
            .filter(|id| !drafted.contains(id))
            .collect();

        if !pending.is_empty() {
            let requests: Vec<ClauseRequest> = pending
                .iter()
                .filter_map(|id| {
                    let section = skeleton.find_section(id)?;
                    let items = section
                        .items
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| selection.contains(&format!("{id}-{index}")))
                        .map(|(_, item)| item.text.clone())
                        .collect();
                    Some(ClauseRequest {
                        section_id: id.clone(),
                        section_title: section.title.clone(),
                        items,
                    })
                })
                .collect();

            let new_clauses = self.reasoner.draft_clauses(&session, &requests).await?;
            info!(
                session = %session.id,
                requested = requests.len(),
                drafted = new_clauses.len(),
                "clauses drafted"
            );
            clauses.extend(new_clauses);
        }

        let remaining = {
            let drafted: HashSet<&str> = clauses.iter().map(|c| c.section_id.as_str()).collect();
            selector::sections_with_selection(&skeleton, depth)
                .into_iter()
                .filter(|id| !drafted.contains(id.as_str()))
                .count()
        };
        session.stage = if remaining == 0 {
            info!(session = %session.id, clauses = clauses.len(), "generation complete");
            Stage::Complete { skeleton, review, clauses }
        } else {
            debug!(session = %session.id, remaining, "generation in progress");
            Stage::Generating { skeleton, review, clauses, depth }
        };
        self.persist(&mut session)?;
        Ok(self.snapshot(session))
    }

    /// Assemble the document from the drafted clauses, read-only
    pub fn assemble_document(
        &self,
        session_id: &str,
    ) -> Result<AssembledDocument, WorkflowError> {
        let session = self.load(session_id)?;
        let (skeleton, clauses) = match &session.stage {
            Stage::Generating { skeleton, clauses, .. }
            | Stage::Complete { skeleton, clauses, .. } => (skeleton, clauses),
            other => {
                return Err(WorkflowError::InvalidStage {
                    operation: "assemble_document",
                    expected: "generating or complete",
                    actual: other.name(),
                });
            }
        };
        Ok(assembler::assemble_document(skeleton, clauses)?)
    }
}
