//! Interview sequencing
//!
//! Decides what to put in front of the user next: the single blocking must
//! question, a short menu of refinement questions, or the invitation to
//! generate the skeleton. Decisions are a pure function of the question set,
//! the context, and the completion state, so the same session always plans
//! the same step.

use serde::Serialize;
use serde_json::Value;

use crate::context::path_resolves;
use crate::domain::{Question, RequiredLevel};
use crate::scoring::{CompletionState, is_answered};

/// Refinement menu never offers more than this many questions
pub const MAX_REFINEMENT_QUESTIONS: usize = 5;

/// What the interview should do next
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum NextStep {
    /// Ask the single blocking question; an empty list means the question
    /// set is inconsistent (a must question exists but none is askable)
    AskMore { questions: Vec<Question> },

    /// Offer a refinement menu, generation stays available as an escape
    OfferChoice { questions: Vec<Question> },

    /// Nothing left worth asking
    Generate,
}

/// A question is eligible once everything it depends on resolves
pub fn is_eligible(question: &Question, context: &Value) -> bool {
    question.depends_on.iter().all(|path| path_resolves(context, path))
}

/// Plan the next interview step
pub fn plan_next_step(
    state: &CompletionState,
    questions: &[Question],
    context: &Value,
) -> NextStep {
    if !state.must_completed {
        // One blocking question at a time, in document order
        let next_must = questions.iter().find(|q| {
            q.tier() == RequiredLevel::Must && !is_answered(q, context) && is_eligible(q, context)
        });
        return NextStep::AskMore {
            questions: next_must.into_iter().cloned().collect(),
        };
    }

    let mut refinements: Vec<&Question> = questions
        .iter()
        .filter(|q| {
            q.tier() == RequiredLevel::Recommended
                && !is_answered(q, context)
                && is_eligible(q, context)
        })
        .collect();

    if refinements.is_empty() {
        return NextStep::Generate;
    }

    // Stable sort keeps document order for equal weights, unweighted sink last
    refinements.sort_by_key(|q| q.order.map(u64::from).unwrap_or(u64::MAX));
    refinements.truncate(MAX_REFINEMENT_QUESTIONS);

    NextStep::OfferChoice {
        questions: refinements.into_iter().cloned().collect(),
    }
}
