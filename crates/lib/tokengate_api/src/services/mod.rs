//! Request orchestration behind the handlers.

pub mod bearer;
pub mod grant;
