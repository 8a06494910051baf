//! Skeleton candidate search
//!
//! Before proposing an outline, the orchestrator can look up outlines of
//! comparable finished documents and hand them to the reasoning step as
//! inspiration. The search is pluggable; the default finds nothing and the
//! skeleton step proceeds from the context alone.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::Skeleton;

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("candidate search failed: {0}")]
    Search(String),
}

/// An outline from a comparable document, with a relevance score
#[derive(Debug, Clone)]
pub struct SkeletonCandidate {
    /// Where the candidate came from (a session id, a template name)
    pub source_id: String,

    /// Relevance in [0, 1], higher is closer
    pub score: f64,

    pub skeleton: Skeleton,
}

/// Pluggable source of comparable outlines
#[async_trait]
pub trait CandidateSearch: Send + Sync {
    async fn find(
        &self,
        document_type: &str,
        context: &Value,
    ) -> Result<Vec<SkeletonCandidate>, CandidateError>;
}

/// Default search that finds nothing
pub struct NoReuse;

#[async_trait]
impl CandidateSearch for NoReuse {
    async fn find(
        &self,
        _document_type: &str,
        _context: &Value,
    ) -> Result<Vec<SkeletonCandidate>, CandidateError> {
        Ok(Vec::new())
    }
}

/// Search over previously completed sessions in the store
///
/// Scores by document type match; a finished session of the same type is a
/// strong candidate, anything else is ignored.
pub struct StoreCandidates {
    store: draftstore::SessionStore,
    limit: usize,
}

impl StoreCandidates {
    pub fn new(store: draftstore::SessionStore, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl CandidateSearch for StoreCandidates {
    async fn find(
        &self,
        document_type: &str,
        _context: &Value,
    ) -> Result<Vec<SkeletonCandidate>, CandidateError> {
        let ids = self
            .store
            .list()
            .map_err(|e| CandidateError::Search(e.to_string()))?;

        let mut candidates = Vec::new();
        for id in ids {
            let session: Option<crate::domain::Session> = self
                .store
                .get(&id)
                .map_err(|e| CandidateError::Search(e.to_string()))?;
            let Some(session) = session else { continue };

            if session.document_type != document_type || !session.is_complete() {
                continue;
            }
            let Some(skeleton) = session.stage.skeleton() else { continue };

            candidates.push(SkeletonCandidate {
                source_id: session.id.clone(),
                score: 1.0,
                skeleton: skeleton.clone(),
            });
            if candidates.len() >= self.limit {
                break;
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Review, Section, Session, Stage};
    use draftstore::SessionStore;
    use serde_json::json;

    #[tokio::test]
    async fn no_reuse_finds_nothing() {
        let found = NoReuse.find("service-agreement", &json!({})).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn store_candidates_only_match_completed_same_type() {
        let store = SessionStore::memory();

        let mut done = Session::new("service-agreement");
        done.stage = Stage::Complete {
            skeleton: Skeleton::new(vec![Section::new("scope", "Scope")]),
            review: Review::new(vec![]),
            clauses: vec![],
        };
        store.set(&done.id, &done).unwrap();

        let in_flight = Session::new("service-agreement");
        store.set(&in_flight.id, &in_flight).unwrap();

        let mut other_type = Session::new("mutual-nda");
        other_type.stage = Stage::Complete {
            skeleton: Skeleton::new(vec![Section::new("parties", "Parties")]),
            review: Review::new(vec![]),
            clauses: vec![],
        };
        store.set(&other_type.id, &other_type).unwrap();

        let search = StoreCandidates::new(store, 5);
        let found = search.find("service-agreement", &json!({})).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_id, done.id);
        assert_eq!(found[0].skeleton.sections[0].id, "scope");
    }
}
