use std::ops::{Deref, DerefMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::mongodb::Id;

/// Core account data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCore {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl AccountCore {
    /// Create an account, hashing the given plaintext password.
    pub fn new(
        username: impl Into<String>,
        password: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<Self> {
        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())?;
        Ok(Self {
            username: username.into(),
            password_hash,
            is_staff,
            is_superuser,
        })
    }

    /// Check whether the given password is correct.
    /// A malformed stored hash never verifies.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }

    /// Staff and superusers administer the election and may never vote.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// An account without an ID.
pub type NewAccount = AccountCore;

/// An account from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub account: AccountCore,
}

impl Deref for Account {
    type Target = AccountCore;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

impl DerefMut for Account {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.account
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    use crate::model::api::login::Credentials;

    impl AccountCore {
        pub fn admin_example() -> Self {
            let creds = Credentials::admin_example();
            Self::new(creds.username, &creds.password, true, false).unwrap()
        }

        pub fn superuser_example() -> Self {
            let creds = Credentials::superuser_example();
            Self::new(creds.username, &creds.password, false, true).unwrap()
        }

        pub fn voter_example() -> Self {
            let creds = Credentials::voter_example();
            Self::new(creds.username, &creds.password, false, false).unwrap()
        }

        pub fn voter2_example() -> Self {
            let creds = Credentials::voter2_example();
            Self::new(creds.username, &creds.password, false, false).unwrap()
        }
    }
}
