use serde::{Deserialize, Serialize};

use crate::model::db::candidate::{Candidate, CandidateId};

/// What a voter sees of a candidate on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

impl From<Candidate> for CandidateSummary {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            party: candidate.party,
            portrait: candidate.portrait,
        }
    }
}

/// A candidate's profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDetail {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    /// Sanitized HTML, rendered as-is.
    pub biography: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    /// Username of the account managing this profile.
    pub managed_by: Option<String>,
}

impl CandidateDetail {
    pub fn new(candidate: Candidate, managed_by: Option<String>) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            party: candidate.party,
            biography: candidate.biography,
            portrait: candidate.portrait,
            managed_by,
        }
    }
}
