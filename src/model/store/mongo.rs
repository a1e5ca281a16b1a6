use log::debug;
use mongodb::{
    bson::{doc, from_document},
    options::FindOptions,
    Database,
};
use rocket::futures::TryStreamExt;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    auth::SessionId,
    db::{
        account::{Account, NewAccount},
        candidate::{Candidate, CandidateId, NewCandidate},
        vote::Vote,
    },
    mongodb::{
        is_duplicate_key_error, u32_id_filter, Coll, Counter, Id, MongoCollection,
        CANDIDATE_ID_COUNTER_ID, VOTE_ID_COUNTER_ID,
    },
};

use super::{AccountStore, BallotStore};

/// The production store, backed by MongoDB.
///
/// Expects the indexes from
/// [`ensure_indexes_exist`](crate::model::mongodb::ensure_indexes_exist) and
/// the counters from
/// [`ensure_counters_exist`](crate::model::mongodb::ensure_counters_exist).
#[derive(Clone)]
pub struct MongoStore {
    accounts: Coll<Account>,
    new_accounts: Coll<NewAccount>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
    counters: Coll<Counter>,
}

impl MongoStore {
    pub fn from_db(db: &Database) -> Self {
        Self {
            accounts: Coll::from_db(db),
            new_accounts: Coll::from_db(db),
            candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }
}

/// One row of the vote-count aggregation.
#[derive(Deserialize)]
struct CandidateVotes {
    #[serde(flatten)]
    candidate: Candidate,
    vote_count: u64,
}

#[rocket::async_trait]
impl BallotStore for MongoStore {
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        let candidate = self.candidates.find_one(u32_id_filter(id), None).await?;
        Ok(candidate)
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let by_name = FindOptions::builder().sort(doc! {"name": 1, "_id": 1}).build();
        let candidates = self
            .candidates
            .find(None, by_name)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn list_candidates_with_vote_counts(&self) -> Result<Vec<(Candidate, u64)>> {
        // Left join: candidates without votes get an empty `votes` array.
        let pipeline = [
            doc! {
                "$lookup": {
                    "from": Vote::NAME,
                    "localField": "_id",
                    "foreignField": "candidate_id",
                    "as": "votes",
                }
            },
            doc! { "$addFields": { "vote_count": { "$size": "$votes" } } },
            doc! { "$project": { "votes": 0 } },
        ];
        let rows = self
            .candidates
            .aggregate(pipeline, None)
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        rows.into_iter()
            .map(|row| -> Result<(Candidate, u64)> {
                let row: CandidateVotes = from_document(row).map_err(mongodb::error::Error::from)?;
                Ok((row.candidate, row.vote_count))
            })
            .collect()
    }

    async fn vote_exists_for_account(&self, account_id: Id) -> Result<bool> {
        let count = self
            .votes
            .count_documents(doc! { "account_id": *account_id }, None)
            .await?;
        Ok(count > 0)
    }

    async fn vote_exists_for_session(&self, session_id: &SessionId) -> Result<bool> {
        let count = self
            .votes
            .count_documents(doc! { "session_id": session_id.as_str() }, None)
            .await?;
        Ok(count > 0)
    }

    async fn record_vote(
        &self,
        candidate_id: CandidateId,
        account_id: Option<Id>,
        session_id: &SessionId,
    ) -> Result<Vote> {
        if self.get_candidate(candidate_id).await?.is_none() {
            return Err(Error::not_found(format!(
                "Candidate with ID '{candidate_id}'"
            )));
        }
        let id = Counter::next(&self.counters, VOTE_ID_COUNTER_ID).await?;
        let vote = Vote::new(id, candidate_id, account_id, session_id.clone());

        match self.votes.insert_one(&vote, None).await {
            Ok(_) => Ok(vote),
            Err(e) if is_duplicate_key_error(&e) => Err(Error::duplicate(format!(
                "Vote for session '{session_id}'"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn total_vote_count(&self) -> Result<u64> {
        let count = self.votes.count_documents(None, None).await?;
        Ok(count)
    }

    async fn add_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let id = Counter::next(&self.counters, CANDIDATE_ID_COUNTER_ID).await?;
        let candidate = Candidate::new(id, candidate);
        match self.candidates.insert_one(&candidate, None).await {
            Ok(_) => Ok(candidate),
            Err(e) if is_duplicate_key_error(&e) => Err(Error::duplicate(format!(
                "Candidate '{}' for an already linked account",
                candidate.name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_candidate(&self, id: CandidateId) -> Result<bool> {
        let deleted = self
            .candidates
            .delete_one(u32_id_filter(id), None)
            .await?
            .deleted_count;
        if deleted == 0 {
            return Ok(false);
        }
        let votes = self
            .votes
            .delete_many(doc! { "candidate_id": id }, None)
            .await?
            .deleted_count;
        debug!("Deleted candidate {id} and {votes} vote(s)");
        Ok(true)
    }
}

#[rocket::async_trait]
impl AccountStore for MongoStore {
    async fn account_by_id(&self, id: Id) -> Result<Option<Account>> {
        let account = self.accounts.find_one(id.as_doc(), None).await?;
        Ok(account)
    }

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = self
            .accounts
            .find_one(doc! { "username": username }, None)
            .await?;
        Ok(account)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let inserted = match self.new_accounts.insert_one(&account, None).await {
            Ok(inserted) => inserted,
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::duplicate(format!(
                    "Account with username '{}'",
                    account.username
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let id: Id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| {
                Error::Status(
                    rocket::http::Status::InternalServerError,
                    "Account inserted without an object ID".to_string(),
                )
            })?
            .into();
        Ok(Account { id, account })
    }

    async fn any_admin_exists(&self) -> Result<bool> {
        let admins = doc! {
            "$or": [{"is_staff": true}, {"is_superuser": true}],
        };
        let count = self.accounts.count_documents(admins, None).await?;
        Ok(count > 0)
    }

    async fn delete_account(&self, id: Id) -> Result<bool> {
        let deleted = self
            .accounts
            .delete_one(id.as_doc(), None)
            .await?
            .deleted_count;
        if deleted == 0 {
            return Ok(false);
        }
        let linked: Vec<Candidate> = self
            .candidates
            .find(doc! { "account_id": *id }, None)
            .await?
            .try_collect()
            .await?;
        for candidate in linked {
            self.delete_candidate(candidate.id).await?;
        }
        self.votes
            .update_many(
                doc! { "account_id": *id },
                doc! { "$unset": { "account_id": "" } },
                None,
            )
            .await?;
        Ok(true)
    }
}
