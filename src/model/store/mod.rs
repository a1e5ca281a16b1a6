//! Persistence for candidates, votes and accounts.
//!
//! Routes never talk to MongoDB directly; they go through the [`Store`]
//! handle so that uniqueness enforcement lives in exactly one place per
//! backend.

use std::{ops::Deref, sync::Arc};

use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::error::Result;
use crate::model::{
    auth::SessionId,
    db::{
        account::{Account, NewAccount},
        candidate::{Candidate, CandidateId, NewCandidate},
        vote::Vote,
    },
    mongodb::Id,
};

#[cfg(test)]
mod behaviour;
#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Candidate and vote persistence.
#[rocket::async_trait]
pub trait BallotStore: Send + Sync {
    /// Look up a single candidate.
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>>;

    /// All candidates, ordered by name.
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    /// Every candidate paired with its number of votes, including candidates
    /// nobody has voted for.
    async fn list_candidates_with_vote_counts(&self) -> Result<Vec<(Candidate, u64)>>;

    async fn vote_exists_for_account(&self, account_id: Id) -> Result<bool>;

    async fn vote_exists_for_session(&self, session_id: &SessionId) -> Result<bool>;

    /// Record a vote.
    ///
    /// Fails with [`Error::Duplicate`](crate::error::Error::Duplicate) if the
    /// session or account already has a vote.
    async fn record_vote(
        &self,
        candidate_id: CandidateId,
        account_id: Option<Id>,
        session_id: &SessionId,
    ) -> Result<Vote>;

    async fn total_vote_count(&self) -> Result<u64>;

    /// Insert a candidate, allocating its ID. Fails with
    /// [`Error::Duplicate`](crate::error::Error::Duplicate) if the linked
    /// account already has a candidate.
    async fn add_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    /// Delete a candidate along with all of its votes.
    /// Returns false if there was no such candidate.
    async fn delete_candidate(&self, id: CandidateId) -> Result<bool>;
}

/// Account lookup, standing in for the identity provider.
#[rocket::async_trait]
pub trait AccountStore: Send + Sync {
    async fn account_by_id(&self, id: Id) -> Result<Option<Account>>;

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Insert an account. Fails with
    /// [`Error::Duplicate`](crate::error::Error::Duplicate) if the username is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account>;

    /// Is there at least one staff or superuser account?
    async fn any_admin_exists(&self) -> Result<bool>;

    /// Delete an account. Its votes are kept but no longer reference it; a
    /// candidate linked to it is deleted along with that candidate's votes.
    /// Returns false if there was no such account.
    async fn delete_account(&self, id: Id) -> Result<bool>;
}

/// A complete storage backend.
pub trait Backend: BallotStore + AccountStore {}

impl<T> Backend for T where T: BallotStore + AccountStore {}

/// Shared handle on the storage backend, kept in managed state.
#[derive(Clone)]
pub struct Store(Arc<dyn Backend>);

impl Store {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self(Arc::new(backend))
    }

    /// A fresh, empty in-memory store.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl Deref for Store {
    type Target = dyn Backend;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store {
    type Error = ();

    /// Get the store from the managed state.
    ///
    /// Panics iff the [`Store`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = req.guard::<&State<Store>>().await.unwrap();
        request::Outcome::Success(store.inner().clone())
    }
}
