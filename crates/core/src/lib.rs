//! Domain rules for the Quranic Transformation backend.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! call into these modules for validation, role checks, search matching,
//! page gating, reflection rendering and gamification counters.

pub mod account;
pub mod error;
pub mod gamification;
pub mod gate;
pub mod lesson;
pub mod links;
pub mod markdown;
pub mod reflection;
pub mod roles;
pub mod search;
pub mod types;
