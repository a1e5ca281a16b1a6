use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::model::{
    auth::SessionId,
    db::{
        account::{Account, NewAccount},
        candidate::{Candidate, CandidateId, NewCandidate},
        vote::{Vote, VoteId},
    },
    mongodb::Id,
};

use super::{AccountStore, BallotStore};

/// An in-process store mirroring the MongoDB store's constraints.
///
/// Every check-and-write happens under a single lock, which plays the role
/// of the unique indexes.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    candidates: BTreeMap<CandidateId, Candidate>,
    votes: BTreeMap<VoteId, Vote>,
    last_candidate_id: CandidateId,
    last_vote_id: VoteId,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[rocket::async_trait]
impl BallotStore for MemoryStore {
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.lock().candidates.get(&id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let mut candidates: Vec<_> = self.lock().candidates.values().cloned().collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(candidates)
    }

    async fn list_candidates_with_vote_counts(&self) -> Result<Vec<(Candidate, u64)>> {
        let state = self.lock();
        let rows = state
            .candidates
            .values()
            .map(|candidate| {
                let count = state
                    .votes
                    .values()
                    .filter(|vote| vote.candidate_id == candidate.id)
                    .count() as u64;
                (candidate.clone(), count)
            })
            .collect();
        Ok(rows)
    }

    async fn vote_exists_for_account(&self, account_id: Id) -> Result<bool> {
        Ok(self
            .lock()
            .votes
            .values()
            .any(|vote| vote.account_id == Some(account_id)))
    }

    async fn vote_exists_for_session(&self, session_id: &SessionId) -> Result<bool> {
        Ok(self
            .lock()
            .votes
            .values()
            .any(|vote| &vote.session_id == session_id))
    }

    async fn record_vote(
        &self,
        candidate_id: CandidateId,
        account_id: Option<Id>,
        session_id: &SessionId,
    ) -> Result<Vote> {
        let mut state = self.lock();
        if !state.candidates.contains_key(&candidate_id) {
            return Err(Error::not_found(format!("Candidate with ID '{candidate_id}'")));
        }
        let duplicate = state.votes.values().any(|vote| {
            &vote.session_id == session_id
                || (account_id.is_some() && vote.account_id == account_id)
        });
        if duplicate {
            return Err(Error::duplicate(format!("Vote for session '{session_id}'")));
        }

        state.last_vote_id += 1;
        let vote = Vote::new(state.last_vote_id, candidate_id, account_id, session_id.clone());
        state.votes.insert(vote.id, vote.clone());
        Ok(vote)
    }

    async fn total_vote_count(&self) -> Result<u64> {
        Ok(self.lock().votes.len() as u64)
    }

    async fn add_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let mut state = self.lock();
        if let Some(account_id) = candidate.account_id {
            if state
                .candidates
                .values()
                .any(|c| c.account_id == Some(account_id))
            {
                return Err(Error::duplicate(format!(
                    "Candidate for account '{account_id}'"
                )));
            }
        }
        state.last_candidate_id += 1;
        let candidate = Candidate::new(state.last_candidate_id, candidate);
        state.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn delete_candidate(&self, id: CandidateId) -> Result<bool> {
        let mut state = self.lock();
        if state.candidates.remove(&id).is_none() {
            return Ok(false);
        }
        state.votes.retain(|_, vote| vote.candidate_id != id);
        Ok(true)
    }
}

#[rocket::async_trait]
impl AccountStore for MemoryStore {
    async fn account_by_id(&self, id: Id) -> Result<Option<Account>> {
        Ok(self.lock().accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut state = self.lock();
        if state.accounts.iter().any(|a| a.username == account.username) {
            return Err(Error::duplicate(format!(
                "Account with username '{}'",
                account.username
            )));
        }
        let account = Account {
            id: Id::new(),
            account,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn any_admin_exists(&self) -> Result<bool> {
        Ok(self.lock().accounts.iter().any(|a| a.is_admin()))
    }

    async fn delete_account(&self, id: Id) -> Result<bool> {
        let mut state = self.lock();
        let before = state.accounts.len();
        state.accounts.retain(|a| a.id != id);
        if state.accounts.len() == before {
            return Ok(false);
        }
        let linked: Vec<_> = state
            .candidates
            .values()
            .filter(|c| c.account_id == Some(id))
            .map(|c| c.id)
            .collect();
        for candidate_id in linked {
            state.candidates.remove(&candidate_id);
            state.votes.retain(|_, vote| vote.candidate_id != candidate_id);
        }
        for vote in state.votes.values_mut() {
            if vote.account_id == Some(id) {
                vote.account_id = None;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::behaviour;
    use super::*;

    #[rocket::async_test]
    async fn zero_vote_candidates_are_counted() {
        behaviour::zero_vote_candidates_are_counted(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn duplicate_session_rejected() {
        behaviour::duplicate_session_rejected(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn duplicate_account_rejected_across_sessions() {
        behaviour::duplicate_account_rejected_across_sessions(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn vote_for_missing_candidate_rejected() {
        behaviour::vote_for_missing_candidate_rejected(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn deleting_candidate_cascades() {
        behaviour::deleting_candidate_cascades(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn deleting_account_keeps_votes() {
        behaviour::deleting_account_keeps_votes(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn deleting_account_deletes_linked_candidate() {
        behaviour::deleting_account_deletes_linked_candidate(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn one_candidate_per_account() {
        behaviour::one_candidate_per_account(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn usernames_are_unique() {
        behaviour::usernames_are_unique(&MemoryStore::default()).await;
    }

    #[rocket::async_test]
    async fn candidates_listed_by_name() {
        behaviour::candidates_listed_by_name(&MemoryStore::default()).await;
    }
}
