//! Skeleton review subflow
//!
//! After a skeleton is proposed, a review collects targeted questions about
//! it. The review moves `collecting -> ready_to_apply -> applied -> frozen`;
//! `frozen` is terminal and the answers become immutable.

use serde::{Deserialize, Serialize};

use super::question::{Answer, Question, RequiredLevel};

/// Review lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Questions posed, answers trickling in
    #[default]
    Collecting,
    /// Every required question has a recorded answer
    ReadyToApply,
    /// Answers merged into the document context
    Applied,
    /// Review sealed, no further changes accepted
    Frozen,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting => write!(f, "collecting"),
            Self::ReadyToApply => write!(f, "ready_to_apply"),
            Self::Applied => write!(f, "applied"),
            Self::Frozen => write!(f, "frozen"),
        }
    }
}

/// A review of a proposed skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Current lifecycle status
    pub status: ReviewStatus,

    /// Questions posed about the skeleton
    pub questions: Vec<Question>,

    /// Answers recorded so far, one entry per answered question
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Review {
    /// Start a review over the given questions
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            status: ReviewStatus::Collecting,
            questions,
            answers: Vec::new(),
        }
    }

    /// Record an answer, replacing any previous answer to the same question
    pub fn record_answer(&mut self, answer: Answer) {
        if let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            *existing = answer;
        } else {
            self.answers.push(answer);
        }
    }

    /// Whether a question already has a recorded answer
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answers.iter().any(|a| a.question_id == question_id)
    }

    /// Ids of must-tier questions still waiting for an answer
    pub fn unanswered_required(&self) -> Vec<&str> {
        self.questions
            .iter()
            .filter(|q| q.tier() == RequiredLevel::Must && !self.is_answered(&q.id))
            .map(|q| q.id.as_str())
            .collect()
    }

    pub fn is_frozen(&self) -> bool {
        self.status == ReviewStatus::Frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required(id: &str) -> Question {
        let mut q = Question::new(id, "?");
        q.required_level = Some(RequiredLevel::Must);
        q
    }

    #[test]
    fn new_review_is_collecting() {
        let review = Review::new(vec![required("r1")]);
        assert_eq!(review.status, ReviewStatus::Collecting);
        assert!(review.answers.is_empty());
    }

    #[test]
    fn record_answer_replaces_previous() {
        let mut review = Review::new(vec![required("r1")]);
        review.record_answer(Answer::new("r1", json!("first")));
        review.record_answer(Answer::new("r1", json!("second")));

        assert_eq!(review.answers.len(), 1);
        assert_eq!(review.answers[0].raw, json!("second"));
    }

    #[test]
    fn unanswered_required_shrinks_as_answers_land() {
        let mut review = Review::new(vec![required("r1"), required("r2"), Question::new("r3", "?")]);
        assert_eq!(review.unanswered_required(), vec!["r1", "r2"]);

        review.record_answer(Answer::new("r1", json!("yes")));
        assert_eq!(review.unanswered_required(), vec!["r2"]);

        review.record_answer(Answer::new("r2", json!("no")));
        assert!(review.unanswered_required().is_empty());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(ReviewStatus::ReadyToApply).unwrap();
        assert_eq!(json, serde_json::json!("ready_to_apply"));
    }
}
