//! Request handlers.

pub mod home;
pub mod oauth;
