//! Interview completion scoring
//!
//! Pure measurement over the question set and the current document context.
//! A question counts as answered when every context path it affects holds a
//! usable value, so scoring never needs the dialogue history and recomputes
//! to the same result on every call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::path_resolves;
use crate::domain::{Question, RequiredLevel};

const WEIGHT_MUST: f64 = 0.6;
const WEIGHT_RECOMMENDED: f64 = 0.3;
const WEIGHT_OPTIONAL: f64 = 0.1;

/// Snapshot of interview completeness, recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionState {
    pub must_total: usize,
    pub must_answered: usize,
    pub recommended_total: usize,
    pub recommended_answered: usize,
    pub optional_total: usize,
    pub optional_answered: usize,

    /// True only when must questions exist and all are answered
    pub must_completed: bool,

    pub must_coverage: f64,
    pub recommended_coverage: f64,
    pub optional_coverage: f64,

    /// Weighted blend of the three tier coverages
    pub overall: f64,
}

/// Whether every path this question affects resolves in the context
pub fn is_answered(question: &Question, context: &Value) -> bool {
    question.affects.iter().all(|path| path_resolves(context, path))
}

/// An empty tier scores full marks rather than dragging the blend down
fn tier_coverage(answered: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        answered as f64 / total as f64
    }
}

/// Score the question set against the current context
pub fn completion_state(questions: &[Question], context: &Value) -> CompletionState {
    let mut must = (0usize, 0usize);
    let mut recommended = (0usize, 0usize);
    let mut optional = (0usize, 0usize);

    for question in questions {
        let bucket = match question.tier() {
            RequiredLevel::Must => &mut must,
            RequiredLevel::Recommended => &mut recommended,
            RequiredLevel::Optional => &mut optional,
        };
        bucket.0 += 1;
        if is_answered(question, context) {
            bucket.1 += 1;
        }
    }

    let must_coverage = tier_coverage(must.1, must.0);
    let recommended_coverage = tier_coverage(recommended.1, recommended.0);
    let optional_coverage = tier_coverage(optional.1, optional.0);

    CompletionState {
        must_total: must.0,
        must_answered: must.1,
        recommended_total: recommended.0,
        recommended_answered: recommended.1,
        optional_total: optional.0,
        optional_answered: optional.1,
        must_completed: must.0 > 0 && must.1 == must.0,
        must_coverage,
        recommended_coverage,
        optional_coverage,
        overall: WEIGHT_MUST * must_coverage
            + WEIGHT_RECOMMENDED * recommended_coverage
            + WEIGHT_OPTIONAL * optional_coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: &str, tier: RequiredLevel, affects: &[&str]) -> Question {
        let mut q = Question::new(id, "?");
        q.required_level = Some(tier);
        q.affects = affects.iter().map(|s| s.to_string()).collect();
        q
    }

    fn sample_questions() -> Vec<Question> {
        vec![
            question("m1", RequiredLevel::Must, &["parties.client"]),
            question("m2", RequiredLevel::Must, &["parties.vendor"]),
            question("m3", RequiredLevel::Must, &["scope.summary"]),
            question("r1", RequiredLevel::Recommended, &["term.months"]),
            question("r2", RequiredLevel::Recommended, &["payment.schedule"]),
            question("o1", RequiredLevel::Optional, &["extras.notes"]),
        ]
    }

    #[test]
    fn two_of_three_musts_is_not_completed() {
        let ctx = json!({"parties": {"client": "Acme", "vendor": "Bolt"}});
        let state = completion_state(&sample_questions(), &ctx);

        assert_eq!(state.must_total, 3);
        assert_eq!(state.must_answered, 2);
        assert!(!state.must_completed);
    }

    #[test]
    fn all_musts_answered_completes() {
        let ctx = json!({
            "parties": {"client": "Acme", "vendor": "Bolt"},
            "scope": {"summary": "build the thing"},
        });
        let state = completion_state(&sample_questions(), &ctx);
        assert!(state.must_completed);
    }

    #[test]
    fn zero_musts_never_completes() {
        let questions = vec![question("r1", RequiredLevel::Recommended, &["a"])];
        let state = completion_state(&questions, &json!({"a": 1}));

        assert!(!state.must_completed);
        // but the empty tier still scores full coverage
        assert!((state.must_coverage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_tiers_score_full_coverage() {
        let state = completion_state(&[], &json!({}));
        assert!((state.overall - 1.0).abs() < 1e-12);
    }

    #[test]
    fn overall_blends_tier_coverages() {
        // musts 2/2, recommended 1/2, optional 0/1
        let questions = vec![
            question("m1", RequiredLevel::Must, &["a"]),
            question("m2", RequiredLevel::Must, &["b"]),
            question("r1", RequiredLevel::Recommended, &["c"]),
            question("r2", RequiredLevel::Recommended, &["d"]),
            question("o1", RequiredLevel::Optional, &["e"]),
        ];
        let ctx = json!({"a": 1, "b": 2, "c": 3});
        let state = completion_state(&questions, &ctx);

        let expected = 0.6 * 1.0 + 0.3 * 0.5 + 0.1 * 0.0;
        assert!((state.overall - expected).abs() < 1e-12);
    }

    #[test]
    fn scoring_is_idempotent() {
        let ctx = json!({"parties": {"client": "Acme"}, "term": {"months": 12}});
        let questions = sample_questions();

        let first = completion_state(&questions, &ctx);
        let second = completion_state(&questions, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn null_and_empty_string_do_not_count() {
        let questions = vec![question("m1", RequiredLevel::Must, &["a", "b"])];
        let ctx = json!({"a": null, "b": ""});
        let state = completion_state(&questions, &ctx);
        assert_eq!(state.must_answered, 0);
    }

    #[test]
    fn question_with_no_affects_counts_as_answered() {
        let questions = vec![question("m1", RequiredLevel::Must, &[])];
        let state = completion_state(&questions, &json!({}));
        assert_eq!(state.must_answered, 1);
        assert!(state.must_completed);
    }
}
