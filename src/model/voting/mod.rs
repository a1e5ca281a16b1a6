//! The voting workflow: who may vote, recording votes, and the home view.
//!
//! Double voting is guarded twice. A cheap existence check gives the common
//! case a friendly message; the store's unique indexes catch the rest, such
//! as two submissions racing past the check together.

use log::{info, warn};
use thiserror::Error;

use crate::error::Error;
use crate::model::{
    api::home::HomeView,
    auth::Caster,
    db::candidate::{Candidate, CandidateId},
    store::BallotStore,
};

mod tally;

pub use tally::{percentage, tally};

/// Where a caster stands with respect to voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasterState {
    NotVoted,
    Voted,
    Admin,
}

/// Reasons a submission is turned away. None of these change any state.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Please select a candidate before submitting your vote.")]
    MissingSelection,
    #[error("Administrators are not allowed to submit votes.")]
    AdminForbidden,
    #[error("The selected candidate does not exist.")]
    UnknownCandidate,
    #[error("You have already voted.")]
    AccountAlreadyVoted,
    #[error("You have already cast your vote in this browser.")]
    SessionAlreadyVoted,
    #[error("Your vote could not be recorded. Please try again.")]
    Store(#[source] Error),
}

impl VoteError {
    /// The flash message kind to surface this rejection with.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccountAlreadyVoted | Self::SessionAlreadyVoted => "warning",
            _ => "error",
        }
    }

    fn duplicate(authenticated: bool) -> Self {
        if authenticated {
            Self::AccountAlreadyVoted
        } else {
            Self::SessionAlreadyVoted
        }
    }
}

impl From<Error> for VoteError {
    fn from(err: Error) -> Self {
        Self::Store(err)
    }
}

/// Work out whether the caster is an administrator, has voted, or may vote.
///
/// Logged-in casters are matched by account, anonymous ones by session.
pub async fn caster_state<S>(store: &S, caster: &Caster) -> Result<CasterState, Error>
where
    S: BallotStore + ?Sized,
{
    let voted = match caster {
        Caster::Admin { .. } => return Ok(CasterState::Admin),
        Caster::Voter { account, .. } => store.vote_exists_for_account(account.id).await?,
        Caster::Anonymous { session } => match session.id() {
            Some(id) => store.vote_exists_for_session(id).await?,
            None => false,
        },
    };
    Ok(if voted {
        CasterState::Voted
    } else {
        CasterState::NotVoted
    })
}

/// Build the home view for the caster.
///
/// `voted_for` is the candidate name the caster's session remembers, if any.
pub async fn render_home<S>(
    store: &S,
    caster: &Caster,
    voted_for: Option<String>,
) -> Result<HomeView, Error>
where
    S: BallotStore + ?Sized,
{
    let view = match caster_state(store, caster).await? {
        CasterState::Admin => {
            let rows = store.list_candidates_with_vote_counts().await?;
            let total_votes = store.total_vote_count().await?;
            HomeView::Results {
                total_votes,
                tallies: tally(rows, total_votes),
            }
        }
        CasterState::Voted => HomeView::Voted { voted_for },
        CasterState::NotVoted => HomeView::Ballot {
            candidates: store
                .list_candidates()
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        },
    };
    Ok(view)
}

/// Cast the caster's vote for the selected candidate.
///
/// Issues the caster a session if they don't have one yet; the caller is
/// responsible for handing a fresh session to the browser. Returns the
/// candidate voted for.
pub async fn submit_vote<S>(
    store: &S,
    caster: &mut Caster,
    selection: Option<&str>,
) -> Result<Candidate, VoteError>
where
    S: BallotStore + ?Sized,
{
    let selection = selection
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(VoteError::MissingSelection)?;

    let (account_id, session) = match caster {
        Caster::Admin { account } => {
            warn!("Administrator '{}' attempted to vote", account.username);
            return Err(VoteError::AdminForbidden);
        }
        Caster::Voter { account, session } => (Some(account.id), session),
        Caster::Anonymous { session } => (None, session),
    };

    let candidate_id = selection
        .parse::<CandidateId>()
        .map_err(|_| VoteError::UnknownCandidate)?;
    let candidate = store
        .get_candidate(candidate_id)
        .await?
        .ok_or(VoteError::UnknownCandidate)?;

    let session_id = session.ensure().clone();

    let authenticated = account_id.is_some();
    let already_voted = match account_id {
        Some(id) => store.vote_exists_for_account(id).await?,
        None => store.vote_exists_for_session(&session_id).await?,
    };
    if already_voted {
        return Err(VoteError::duplicate(authenticated));
    }

    match store
        .record_vote(candidate.id, account_id, &session_id)
        .await
    {
        Ok(vote) => {
            info!("Recorded vote {} for candidate {}", vote.id, candidate.id);
            Ok(candidate)
        }
        // Lost a race with a concurrent submission.
        Err(Error::Duplicate(what)) => {
            info!("Rejected concurrent duplicate: {what}");
            Err(VoteError::duplicate(authenticated))
        }
        Err(Error::NotFound(_)) => Err(VoteError::UnknownCandidate),
        Err(e) => Err(e.into()),
    }
}
