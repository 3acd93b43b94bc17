//! Collaborator contracts: the search and submit endpoints, and the values
//! that cross them.

use std::future::Future;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::patient::{PatientId, PatientSubmission, SubmissionTarget};
use crate::prelude::*;
use crate::record::RecordSubmission;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
    Into,
)]
#[serde(transparent)]
pub struct CandidateId(u64);

impl CandidateId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One search hit. Two candidates are the same candidate when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(alias = "food_name")]
    pub label: String,
}

impl Candidate {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id: CandidateId(id),
            label: label.into(),
        }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One page of search results with opaque cursors to its neighbours.
/// A missing `next` means there are no further pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(alias = "results")]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl SearchPage {
    pub const fn new(
        candidates: Vec<Candidate>,
        next: Option<String>,
        previous: Option<String>,
    ) -> Self {
        Self {
            candidates,
            next,
            previous,
        }
    }

    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "request#{_0}")]
pub struct RequestId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    Next,
    Previous,
}

/// A search the selector wants sent. `cursor` is `None` for the first page of
/// a fresh query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub id: RequestId,
    pub query: String,
    pub cursor: Option<String>,
}

impl SearchRequest {
    pub const fn is_fresh_query(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Failure reported by a collaborator, shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, From)]
#[error("{0}")]
pub struct EndpointError(String);

impl EndpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EndpointError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}

/// Free-text lookup of candidates. Requests cannot be cancelled once sent.
pub trait SearchEndpoint {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchPage, EndpointError>>;
}

/// Persists patient registrations, edits and body-metric records.
pub trait SubmitEndpoint {
    fn submit(
        &self,
        target: SubmissionTarget,
        submission: &PatientSubmission,
    ) -> impl Future<Output = Result<(), EndpointError>>;

    fn add_record(
        &self,
        patient: PatientId,
        record: &RecordSubmission,
    ) -> impl Future<Output = Result<(), EndpointError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_compare_by_id() {
        assert_eq!(Candidate::new(1, "Peanut"), Candidate::new(1, "Peanuts"));
        assert_ne!(Candidate::new(1, "Peanut"), Candidate::new(2, "Peanut"));
    }

    #[test]
    fn test_page_deserializes_backend_shape() {
        let json = r#"{
            "results": [{"id": 7, "food_name": "Lactose"}],
            "next": "cursor-2",
            "previous": null
        }"#;
        let page: SearchPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.candidates, vec![Candidate::new(7, "Lactose")]);
        assert_eq!(page.candidates[0].label, "Lactose");
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_cursors_default_to_absent() {
        let page: SearchPage = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_endpoint_error_displays_verbatim() {
        let err = EndpointError::new("Servidor indisponível");
        assert_eq!(err.to_string(), "Servidor indisponível");
        assert_eq!(EndpointError::from("timeout").message(), "timeout");
    }
}
