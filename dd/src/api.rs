//! Operation response shapes
//!
//! Transport-agnostic request/response contract. Every mutating operation
//! answers with the full session plus next-action guidance; failures map to
//! an `{error, message}` payload and a status class.

use serde::Serialize;

use crate::domain::Session;
use crate::orchestrator::{NextAction, WorkflowError};

/// Stage-agnostic operation response
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session: Session,
    pub next_action: NextAction,
}

/// Client-visible error payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Stable code, see [`WorkflowError::code`]
    pub error: String,
    /// Human-readable message naming expected versus actual state
    pub message: String,
}

impl From<&WorkflowError> for ErrorBody {
    fn from(err: &WorkflowError) -> Self {
        Self {
            error: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_code_and_message() {
        let err = WorkflowError::GateNotReady {
            reason: "unanswered required questions: q-client".to_string(),
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "gate_not_ready");
        assert!(body.message.contains("q-client"));
    }

    #[test]
    fn snapshot_serializes_session_and_action() {
        let snapshot = SessionSnapshot {
            session: Session::new("mutual-nda"),
            next_action: NextAction::GenerateSkeleton,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["session"]["stage"], "pre_skeleton");
        assert_eq!(json["next_action"]["action"], "generate_skeleton");
    }
}
