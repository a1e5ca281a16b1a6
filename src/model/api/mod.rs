//! API-facing types: the JSON views handed to the frontend and the forms it
//! submits.

pub mod candidate;
pub mod home;
pub mod login;
pub mod notice;
