use log::{error, info};
use rocket::{
    form::Form,
    http::CookieJar,
    request::FlashMessage,
    response::{Flash, Redirect},
    serde::json::Json,
    FromForm, Responder, Route, State,
};

use crate::{
    error::Result,
    model::{
        api::home::HomePage,
        auth::{remember_voted_for, voted_for, Caster},
        store::Store,
        voting::{render_home, submit_vote, VoteError},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![home, vote]
}

#[derive(Responder)]
pub enum HomeResponse {
    Page(Json<HomePage>),
    Login(Redirect),
}

#[get("/")]
pub async fn home(
    mut caster: Caster,
    store: Store,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
    flash: Option<FlashMessage<'_>>,
) -> Result<HomeResponse> {
    if !caster.is_authenticated() {
        return Ok(HomeResponse::Login(Redirect::to(uri!(
            super::auth::login_page
        ))));
    }

    if let Some(session) = caster.session_mut() {
        session.ensure();
        session.persist(cookies, config);
    }

    let view = render_home(&*store, &caster, voted_for(cookies)).await?;
    Ok(HomeResponse::Page(Json(HomePage {
        username: caster.account().map(|account| account.username.clone()),
        notice: flash.map(Into::into),
        view,
    })))
}

#[derive(FromForm)]
pub struct VoteForm {
    vote: Option<String>,
}

#[post("/vote", data = "<form>")]
pub async fn vote(
    mut caster: Caster,
    store: Store,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
    form: Form<VoteForm>,
) -> Flash<Redirect> {
    let result = submit_vote(&*store, &mut caster, form.vote.as_deref()).await;
    if let Some(session) = caster.session() {
        session.persist(cookies, config);
    }

    let to_home = Redirect::to(uri!(home));
    match result {
        Ok(candidate) => {
            remember_voted_for(cookies, &candidate.name);
            Flash::success(
                to_home,
                format!(
                    "Thank you! Your vote for {} has been recorded.",
                    candidate.name
                ),
            )
        }
        Err(e) => {
            match &e {
                VoteError::Store(err) => error!("Failed to record vote: {err}"),
                _ => info!("Vote rejected: {e}"),
            }
            Flash::new(to_home, e.kind(), e.to_string())
        }
    }
}
