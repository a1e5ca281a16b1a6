use rocket::request::FlashMessage;
use serde::{Deserialize, Serialize};

/// A one-shot message carried over a redirect, e.g. "Thank you for voting".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// One of `success`, `info`, `warning` or `error`.
    pub kind: String,
    pub message: String,
}

impl From<FlashMessage<'_>> for Notice {
    fn from(flash: FlashMessage<'_>) -> Self {
        Self {
            kind: flash.kind().to_string(),
            message: flash.message().to_string(),
        }
    }
}
