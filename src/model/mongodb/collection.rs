use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{
    account::{Account, NewAccount},
    candidate::Candidate,
    vote::Vote,
};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Account collections
const ACCOUNTS: &str = "accounts";
impl MongoCollection for Account {
    const NAME: &'static str = ACCOUNTS;
}
impl MongoCollection for NewAccount {
    const NAME: &'static str = ACCOUNTS;
}

// Candidate collection
const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}

// Vote collection
const VOTES: &str = "votes";
impl MongoCollection for Vote {
    const NAME: &'static str = VOTES;
}

// Counter collection
const COUNTERS: &str = "counters";
impl MongoCollection for Counter {
    const NAME: &'static str = COUNTERS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// The unique indexes on `votes` are what actually prevent double voting
/// under concurrent submissions.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Account collection.
    let account_index = IndexModel::builder()
        .keys(doc! {"username": 1})
        .options(unique.clone())
        .build();
    Coll::<Account>::from_db(db)
        .create_index(account_index, None)
        .await?;

    // Vote collection: one vote per session...
    let session_index = IndexModel::builder()
        .keys(doc! {"session_id": 1})
        .options(unique.clone())
        .build();
    // ...and one vote per account, ignoring anonymous votes.
    let unique_account = IndexOptions::builder()
        .unique(true)
        .partial_filter_expression(doc! {"account_id": {"$type": "objectId"}})
        .build();
    let account_vote_index = IndexModel::builder()
        .keys(doc! {"account_id": 1})
        .options(unique_account.clone())
        .build();
    let candidate_index = IndexModel::builder()
        .keys(doc! {"candidate_id": 1})
        .build();
    Coll::<Vote>::from_db(db)
        .create_indexes([session_index, account_vote_index, candidate_index], None)
        .await?;

    // Candidate collection: at most one candidate per linked account.
    let name_index = IndexModel::builder().keys(doc! {"name": 1}).build();
    let account_candidate_index = IndexModel::builder()
        .keys(doc! {"account_id": 1})
        .options(unique_account)
        .build();
    Coll::<Candidate>::from_db(db)
        .create_indexes([name_index, account_candidate_index], None)
        .await?;

    Ok(())
}
