use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::candidate::CandidateDetail,
    db::candidate::CandidateId,
    store::{AccountStore, BallotStore, Store},
};

pub fn routes() -> Vec<Route> {
    routes![candidate_detail]
}

#[get("/candidate/<candidate_id>")]
pub async fn candidate_detail(
    candidate_id: CandidateId,
    store: Store,
) -> Result<Json<CandidateDetail>> {
    let candidate = store
        .get_candidate(candidate_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate with ID '{candidate_id}'")))?;
    let managed_by = match candidate.account_id {
        Some(account_id) => store
            .account_by_id(account_id)
            .await?
            .map(|account| account.username.clone()),
        None => None,
    };
    Ok(Json(CandidateDetail::new(candidate, managed_by)))
}
