use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{auth::SessionId, db::candidate::CandidateId, mongodb::Id};

pub type VoteId = u32;

/// A single recorded vote. Votes are immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: VoteId,
    pub candidate_id: CandidateId,
    /// Cleared if the account is deleted; the vote itself survives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Id>,
    pub session_id: SessionId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub voted_at: DateTime<Utc>,
}

impl Vote {
    /// Create a vote timestamped now.
    pub fn new(
        id: VoteId,
        candidate_id: CandidateId,
        account_id: Option<Id>,
        session_id: SessionId,
    ) -> Self {
        Self {
            id,
            candidate_id,
            account_id,
            session_id,
            voted_at: Utc::now(),
        }
    }
}
