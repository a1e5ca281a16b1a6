//! Checks every storage backend must pass. Each backend's test module runs
//! these against a fresh, empty store.

use crate::error::Error;
use crate::model::{
    auth::SessionId,
    db::{account::NewAccount, candidate::NewCandidate},
    mongodb::Id,
};

use super::{AccountStore, BallotStore};

pub async fn zero_vote_candidates_are_counted<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    let alice = store.add_candidate(NewCandidate::named("Alice", "Green")).await.unwrap();
    let bob = store.add_candidate(NewCandidate::named("Bob", "Blue")).await.unwrap();
    let nobody = store.add_candidate(NewCandidate::default()).await.unwrap();
    store.record_vote(alice.id, None, &SessionId::from("s1")).await.unwrap();
    store.record_vote(alice.id, None, &SessionId::from("s2")).await.unwrap();
    store.record_vote(bob.id, None, &SessionId::from("s3")).await.unwrap();

    let rows = store.list_candidates_with_vote_counts().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.contains(&(alice, 2)));
    assert!(rows.contains(&(bob, 1)));
    assert!(rows.contains(&(nobody, 0)));

    let sum: u64 = rows.iter().map(|(_, count)| count).sum();
    assert_eq!(sum, store.total_vote_count().await.unwrap());
}

pub async fn duplicate_session_rejected<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    let alice = store.add_candidate(NewCandidate::named("Alice", "Green")).await.unwrap();
    let session = SessionId::from("s1");

    let vote = store.record_vote(alice.id, None, &session).await.unwrap();
    assert_eq!(vote.candidate_id, alice.id);
    assert_eq!(vote.session_id, session);
    let second = store.record_vote(alice.id, None, &session).await;

    assert!(matches!(second, Err(Error::Duplicate(_))));
    assert_eq!(store.total_vote_count().await.unwrap(), 1);
}

pub async fn duplicate_account_rejected_across_sessions<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    let alice = store.add_candidate(NewCandidate::named("Alice", "Green")).await.unwrap();
    let account = Id::new();

    store
        .record_vote(alice.id, Some(account), &SessionId::from("laptop"))
        .await
        .unwrap();
    let second = store
        .record_vote(alice.id, Some(account), &SessionId::from("phone"))
        .await;
    assert!(matches!(second, Err(Error::Duplicate(_))));

    // Anonymous votes never collide on the account.
    store.record_vote(alice.id, None, &SessionId::from("kiosk-1")).await.unwrap();
    store.record_vote(alice.id, None, &SessionId::from("kiosk-2")).await.unwrap();

    assert!(store.vote_exists_for_account(account).await.unwrap());
    assert_eq!(store.total_vote_count().await.unwrap(), 3);
}

pub async fn vote_for_missing_candidate_rejected<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    let result = store.record_vote(42, None, &SessionId::from("s1")).await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(!store.vote_exists_for_session(&SessionId::from("s1")).await.unwrap());
    assert_eq!(store.total_vote_count().await.unwrap(), 0);
}

pub async fn deleting_candidate_cascades<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    let alice = store.add_candidate(NewCandidate::named("Alice", "Green")).await.unwrap();
    let bob = store.add_candidate(NewCandidate::named("Bob", "Blue")).await.unwrap();
    store.record_vote(alice.id, None, &SessionId::from("s1")).await.unwrap();
    store.record_vote(bob.id, None, &SessionId::from("s2")).await.unwrap();

    assert!(store.delete_candidate(alice.id).await.unwrap());
    assert!(!store.delete_candidate(alice.id).await.unwrap());

    assert_eq!(store.get_candidate(alice.id).await.unwrap(), None);
    assert_eq!(store.total_vote_count().await.unwrap(), 1);
    assert!(!store.vote_exists_for_session(&SessionId::from("s1")).await.unwrap());
}

pub async fn deleting_account_keeps_votes<S>(store: &S)
where
    S: BallotStore + AccountStore + ?Sized,
{
    let alice = store.add_candidate(NewCandidate::named("Alice", "Green")).await.unwrap();
    let voter = store.create_account(NewAccount::voter_example()).await.unwrap();
    let other = store.create_account(NewAccount::voter2_example()).await.unwrap();
    store
        .record_vote(alice.id, Some(voter.id), &SessionId::from("s1"))
        .await
        .unwrap();
    store
        .record_vote(alice.id, Some(other.id), &SessionId::from("s2"))
        .await
        .unwrap();

    assert!(store.delete_account(voter.id).await.unwrap());
    assert!(!store.delete_account(voter.id).await.unwrap());

    assert_eq!(store.account_by_id(voter.id).await.unwrap(), None);
    assert!(!store.vote_exists_for_account(voter.id).await.unwrap());
    assert!(store.vote_exists_for_account(other.id).await.unwrap());
    assert!(store.vote_exists_for_session(&SessionId::from("s1")).await.unwrap());
    assert_eq!(store.total_vote_count().await.unwrap(), 2);

    // Detached votes do not collide with each other.
    assert!(store.delete_account(other.id).await.unwrap());
    store.record_vote(alice.id, None, &SessionId::from("s3")).await.unwrap();
    assert_eq!(store.total_vote_count().await.unwrap(), 3);
}

pub async fn deleting_account_deletes_linked_candidate<S>(store: &S)
where
    S: BallotStore + AccountStore + ?Sized,
{
    let alice = store.create_account(NewAccount::voter_example()).await.unwrap();
    let linked = store
        .add_candidate(NewCandidate::linked("Alice", "Green", alice.id))
        .await
        .unwrap();
    let bob = store.add_candidate(NewCandidate::named("Bob", "Blue")).await.unwrap();
    store.record_vote(linked.id, None, &SessionId::from("s1")).await.unwrap();
    store.record_vote(bob.id, None, &SessionId::from("s2")).await.unwrap();

    assert!(store.delete_account(alice.id).await.unwrap());

    assert_eq!(store.get_candidate(linked.id).await.unwrap(), None);
    assert_eq!(store.get_candidate(bob.id).await.unwrap(), Some(bob));
    assert_eq!(store.total_vote_count().await.unwrap(), 1);
}

pub async fn one_candidate_per_account<S>(store: &S)
where
    S: BallotStore + AccountStore + ?Sized,
{
    let alice = store.create_account(NewAccount::voter_example()).await.unwrap();
    let first = store
        .add_candidate(NewCandidate::linked("Alice", "Green", alice.id))
        .await
        .unwrap();
    assert_eq!(first.account_id, Some(alice.id));

    let second = store
        .add_candidate(NewCandidate::linked("Alice Again", "Green", alice.id))
        .await;
    assert!(matches!(second, Err(Error::Duplicate(_))));

    // Unlinked candidates never collide.
    store.add_candidate(NewCandidate::named("Bob", "Blue")).await.unwrap();
    store.add_candidate(NewCandidate::named("Carol", "Red")).await.unwrap();
    assert_eq!(store.list_candidates().await.unwrap().len(), 3);
}

pub async fn usernames_are_unique<S>(store: &S)
where
    S: AccountStore + ?Sized,
{
    let created = store.create_account(NewAccount::voter_example()).await.unwrap();
    let again = store.create_account(NewAccount::voter_example()).await;
    assert!(matches!(again, Err(Error::Duplicate(_))));
    assert!(!store.any_admin_exists().await.unwrap());

    let found = store
        .account_by_username(&created.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(store.account_by_username("nobody").await.unwrap(), None);

    store.create_account(NewAccount::admin_example()).await.unwrap();
    assert!(store.any_admin_exists().await.unwrap());
}

pub async fn candidates_listed_by_name<S>(store: &S)
where
    S: BallotStore + ?Sized,
{
    for name in ["Zed", "Amy", "Moe"] {
        store
            .add_candidate(NewCandidate::named(name, "Independent"))
            .await
            .unwrap();
    }
    let names: Vec<_> = store
        .list_candidates()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Amy", "Moe", "Zed"]);
}
