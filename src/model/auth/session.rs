use std::fmt::Display;

use rand::{distributions::Alphanumeric, Rng};
use rocket::{
    http::{Cookie, CookieJar, SameSite},
    time::Duration,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const SESSION_COOKIE: &str = "session_id";
pub const VOTED_FOR_COOKIE: &str = "voted_for";

const SESSION_ID_LENGTH: usize = 32;

/// An opaque, stable per-browser token. Anonymous casters are identified by
/// this alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session identifier.
    pub fn generate() -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LENGTH)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the session identifier from the private session cookie, if any.
    pub fn from_cookies(cookies: &CookieJar<'_>) -> Option<Self> {
        cookies
            .get_private(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .map(Self)
    }

    /// Build the private cookie carrying this session identifier.
    pub fn to_cookie(&self, config: &Config) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.0.clone())
            .max_age(Duration::seconds(config.session_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The caster's session: a possibly not-yet-issued identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    id: Option<SessionId>,
    fresh: bool,
}

impl Session {
    /// A session the browser already holds.
    pub fn existing(id: SessionId) -> Self {
        Self {
            id: Some(id),
            fresh: false,
        }
    }

    /// No session cookie has been issued yet.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    /// Get the session identifier, issuing a new one if absent.
    pub fn ensure(&mut self) -> &SessionId {
        if self.id.is_none() {
            self.fresh = true;
        }
        self.id.get_or_insert_with(SessionId::generate)
    }

    /// Was the identifier issued during this request? If so it still has to
    /// be handed to the browser.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Hand a freshly issued identifier to the browser. No-op otherwise.
    pub fn persist(&self, cookies: &CookieJar<'_>, config: &Config) {
        if let (true, Some(id)) = (self.fresh, &self.id) {
            cookies.add_private(id.to_cookie(config));
        }
    }
}

/// Remember the name of the candidate this browser last voted for.
pub fn remember_voted_for(cookies: &CookieJar<'_>, name: &str) {
    cookies.add_private(
        Cookie::build(VOTED_FOR_COOKIE, name.to_string())
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    );
}

/// Drop the browser's session so the next request is issued a fresh one.
/// Called whenever the logged-in account changes.
pub fn forget_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::named(SESSION_COOKIE));
    cookies.remove_private(Cookie::named(VOTED_FOR_COOKIE));
}

/// The candidate this browser last voted for, if it remembers one.
pub fn voted_for(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get_private(VOTED_FOR_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
