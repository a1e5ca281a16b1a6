use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};

use crate::config::Config;
use crate::error::Error;
use crate::model::{
    db::account::Account,
    store::{AccountStore, Store},
};

use super::{
    session::{Session, SessionId},
    token::{AuthToken, AUTH_TOKEN_COOKIE},
};

/// Whoever is making the current request, resolved once per request.
#[derive(Debug, Clone)]
pub enum Caster {
    /// Not logged in: identified only by the browser session.
    Anonymous { session: Session },
    /// A logged-in account without administrative rights.
    Voter { account: Account, session: Session },
    /// A staff or superuser account. Never votes.
    Admin { account: Account },
}

impl Caster {
    /// Classify a logged-in account.
    pub fn for_account(account: Account, session: Session) -> Self {
        if account.is_admin() {
            Self::Admin { account }
        } else {
            Self::Voter { account, session }
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Anonymous { .. } => None,
            Self::Voter { account, .. } | Self::Admin { account } => Some(account),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Anonymous { session } | Self::Voter { session, .. } => Some(session),
            Self::Admin { .. } => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Anonymous { session } | Self::Voter { session, .. } => Some(session),
            Self::Admin { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account().is_some()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caster {
    type Error = Error;

    /// Resolve the caster from the auth token and session cookies.
    ///
    /// A missing, expired or dangling auth token resolves to an anonymous
    /// caster rather than failing the request.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` and `Store` are always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();
        let store = req.guard::<&State<Store>>().await.unwrap();

        let cookies = req.cookies();
        let session = SessionId::from_cookies(cookies)
            .map(Session::existing)
            .unwrap_or_else(Session::none);

        let token = cookies
            .get(AUTH_TOKEN_COOKIE)
            .and_then(|cookie| AuthToken::from_cookie(cookie, config).ok());
        let Some(token) = token else {
            return Outcome::Success(Caster::Anonymous { session });
        };

        match store.account_by_id(token.id).await {
            Ok(Some(account)) => Outcome::Success(Caster::for_account(account, session)),
            Ok(None) => Outcome::Success(Caster::Anonymous { session }),
            Err(e) => Outcome::Failure((Status::InternalServerError, e)),
        }
    }
}
