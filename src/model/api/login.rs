use rocket::FromForm;
use serde::{Deserialize, Serialize};

use super::notice::Notice;

/// Login form fields. The password is plaintext and never stored.
#[derive(Clone, FromForm, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPage {
    pub notice: Option<Notice>,
}
