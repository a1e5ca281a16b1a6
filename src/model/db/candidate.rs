use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

pub type CandidateId = u32;

pub const DEFAULT_CANDIDATE_NAME: &str = "Unknown Candidate";
pub const DEFAULT_PARTY: &str = "Independent";

/// A candidate that has not yet been assigned an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub party: String,
    /// Sanitized HTML, owned by the rich-text tooling and passed through untouched.
    pub biography: String,
    /// Reference to a portrait held by the media store.
    pub portrait: Option<String>,
    /// The account the candidate manages their profile with, if any.
    pub account_id: Option<Id>,
}

impl Default for NewCandidate {
    fn default() -> Self {
        Self {
            name: DEFAULT_CANDIDATE_NAME.to_string(),
            party: DEFAULT_PARTY.to_string(),
            biography: String::new(),
            portrait: None,
            account_id: None,
        }
    }
}

/// A candidate from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_party")]
    pub party: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    /// At most one candidate per account. Deleting the account deletes the
    /// candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Id>,
}

impl Candidate {
    pub fn new(id: CandidateId, candidate: NewCandidate) -> Self {
        Self {
            id,
            name: candidate.name,
            party: candidate.party,
            biography: candidate.biography,
            portrait: candidate.portrait,
            account_id: candidate.account_id,
        }
    }
}

fn default_name() -> String {
    DEFAULT_CANDIDATE_NAME.to_string()
}

fn default_party() -> String {
    DEFAULT_PARTY.to_string()
}
