mod caster;
mod session;
mod token;

pub use caster::Caster;
pub use session::{
    forget_session, remember_voted_for, voted_for, Session, SessionId, SESSION_COOKIE,
    VOTED_FOR_COOKIE,
};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
