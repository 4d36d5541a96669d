//! Domain model module declarations.

pub mod outcome;
pub mod request;
pub mod session;
