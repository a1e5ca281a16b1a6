use serde::{Deserialize, Serialize};

use super::{candidate::CandidateSummary, notice::Notice};

/// The home page: a greeting, any pending notice, and one of three views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    pub username: Option<String>,
    pub notice: Option<Notice>,
    #[serde(flatten)]
    pub view: HomeView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HomeView {
    /// Live results, for administrators.
    Results { total_votes: u64, tallies: Vec<Tally> },
    /// Confirmation for casters who have already voted.
    Voted { voted_for: Option<String> },
    /// The ballot itself.
    Ballot { candidates: Vec<CandidateSummary> },
}

/// One candidate's share of the vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub candidate: CandidateSummary,
    pub vote_count: u64,
    /// Percentage of all votes, to one decimal place.
    pub vote_percentage: f64,
}
