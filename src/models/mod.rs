//! Data models for the team service.
//!
//! Field names serialize in camelCase to match the JSON the gateway speaks.

mod request;
mod status;
mod team;

pub use request::*;
pub use status::*;
pub use team::*;
