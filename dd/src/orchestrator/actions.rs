//! Next-action guidance
//!
//! Every operation response tells the caller what the workflow expects next,
//! derived purely from the session. The guidance is advisory; the operations
//! themselves re-check preconditions.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{GenerationDepth, Question, ReviewStatus, Session, Stage};
use crate::planner::{self, NextStep};
use crate::scoring::completion_state;
use crate::selector;

/// What the caller should do next with the session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    /// Answer the blocking interview question; an empty list signals an
    /// inconsistent question set
    AskRequired { questions: Vec<Question> },

    /// Optionally answer refinement questions, or move on to the skeleton
    OfferRefinement {
        questions: Vec<Question>,
        can_generate: bool,
    },

    GenerateSkeleton,

    PlanReview,

    /// Answer the outstanding review questions
    AnswerReview { pending: Vec<Question> },

    ApplyReview,

    FreezeReview,

    /// Draft the listed sections
    GenerateClauses { pending_sections: Vec<String> },

    AssembleDocument,
}

/// Derive the next action from the session alone
pub fn compute_next_action(
    session: &Session,
    interview_questions: &[Question],
    default_depth: GenerationDepth,
) -> NextAction {
    match &session.stage {
        Stage::PreSkeleton => {
            let state = completion_state(interview_questions, &session.context);
            match planner::plan_next_step(&state, interview_questions, &session.context) {
                NextStep::AskMore { questions } => NextAction::AskRequired { questions },
                NextStep::OfferChoice { questions } => NextAction::OfferRefinement {
                    questions,
                    can_generate: session.gate.ready_for_skeleton,
                },
                NextStep::Generate => NextAction::GenerateSkeleton,
            }
        }
        Stage::SkeletonReady { .. } => NextAction::PlanReview,
        Stage::SkeletonReview { review, .. } => match review.status {
            ReviewStatus::Collecting => NextAction::AnswerReview {
                pending: review
                    .questions
                    .iter()
                    .filter(|q| !review.is_answered(&q.id))
                    .cloned()
                    .collect(),
            },
            ReviewStatus::ReadyToApply => NextAction::ApplyReview,
            ReviewStatus::Applied | ReviewStatus::Frozen => NextAction::FreezeReview,
        },
        Stage::SkeletonFrozen { skeleton, .. } => NextAction::GenerateClauses {
            pending_sections: selector::sections_with_selection(skeleton, default_depth),
        },
        Stage::Generating {
            skeleton, clauses, depth, ..
        } => {
            let drafted: HashSet<&str> = clauses.iter().map(|c| c.section_id.as_str()).collect();
            let pending: Vec<String> = selector::sections_with_selection(skeleton, *depth)
                .into_iter()
                .filter(|id| !drafted.contains(id.as_str()))
                .collect();
            if pending.is_empty() {
                NextAction::AssembleDocument
            } else {
                NextAction::GenerateClauses { pending_sections: pending }
            }
        }
        Stage::Complete { .. } => NextAction::AssembleDocument,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Clause, Review, Section, SectionItem, Skeleton};
    use serde_json::json;

    fn must(id: &str, affects: &str) -> Question {
        let mut q = Question::new(id, id);
        q.required = true;
        q.affects = vec![affects.to_string()];
        q
    }

    fn skeleton_with_items() -> Skeleton {
        Skeleton::new(vec![
            Section::new("scope", "Scope").with_items(vec![
                SectionItem::new("deliverables").with_importance(crate::domain::Importance::Core),
            ]),
            Section::new("notes", "Notes").with_items(vec![SectionItem::new("extras")]),
        ])
    }

    #[test]
    fn fresh_session_asks_the_first_required_question() {
        let session = Session::new("service-agreement");
        let questions = vec![must("q-client", "client.name"), must("q-scope", "scope.summary")];

        let action = compute_next_action(&session, &questions, GenerationDepth::Standard);
        match action {
            NextAction::AskRequired { questions } => {
                assert_eq!(questions.len(), 1);
                assert_eq!(questions[0].id, "q-client");
            }
            other => panic!("expected ask_required, got {other:?}"),
        }
    }

    #[test]
    fn refinement_offer_reflects_the_gate() {
        let mut session = Session::new("service-agreement");
        session.context = json!({"client": {"name": "Acme"}});
        session.gate.ready_for_skeleton = true;

        let mut recommended = Question::new("q-term", "term?");
        recommended.required_level = Some(crate::domain::RequiredLevel::Recommended);
        recommended.affects = vec!["term.months".to_string()];
        let questions = vec![must("q-client", "client.name"), recommended];

        let action = compute_next_action(&session, &questions, GenerationDepth::Standard);
        match action {
            NextAction::OfferRefinement { questions, can_generate } => {
                assert_eq!(questions.len(), 1);
                assert!(can_generate);
            }
            other => panic!("expected offer_refinement, got {other:?}"),
        }
    }

    #[test]
    fn collecting_review_lists_unanswered_questions() {
        let mut session = Session::new("service-agreement");
        let mut review = Review::new(vec![Question::new("rq-1", "keep?"), Question::new("rq-2", "drop?")]);
        review.record_answer(crate::domain::Answer::new("rq-1", json!("yes")));
        session.stage = Stage::SkeletonReview {
            skeleton: skeleton_with_items(),
            review,
        };

        let action = compute_next_action(&session, &[], GenerationDepth::Standard);
        match action {
            NextAction::AnswerReview { pending } => {
                assert_eq!(pending.len(), 1);
                assert_eq!(pending[0].id, "rq-2");
            }
            other => panic!("expected answer_review, got {other:?}"),
        }
    }

    #[test]
    fn frozen_stage_points_at_selected_sections() {
        let mut session = Session::new("service-agreement");
        session.stage = Stage::SkeletonFrozen {
            skeleton: skeleton_with_items(),
            review: Review::new(vec![]),
        };

        let action = compute_next_action(&session, &[], GenerationDepth::Short);
        assert_eq!(
            action,
            NextAction::GenerateClauses {
                pending_sections: vec!["scope".to_string()],
            }
        );
    }

    #[test]
    fn generating_stage_excludes_drafted_sections() {
        let mut session = Session::new("service-agreement");
        session.stage = Stage::Generating {
            skeleton: skeleton_with_items(),
            review: Review::new(vec![]),
            clauses: vec![Clause::new("scope", "done")],
            depth: GenerationDepth::Standard,
        };

        let action = compute_next_action(&session, &[], GenerationDepth::Standard);
        assert_eq!(
            action,
            NextAction::GenerateClauses {
                pending_sections: vec!["notes".to_string()],
            }
        );
    }

    #[test]
    fn complete_stage_assembles() {
        let mut session = Session::new("service-agreement");
        session.stage = Stage::Complete {
            skeleton: skeleton_with_items(),
            review: Review::new(vec![]),
            clauses: vec![],
        };

        let action = compute_next_action(&session, &[], GenerationDepth::Standard);
        assert_eq!(action, NextAction::AssembleDocument);
    }
}
