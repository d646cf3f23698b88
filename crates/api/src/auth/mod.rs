//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`tokens`] -- random single-use tokens for email links and OAuth state.
//! - [`cookies`] -- session, refresh and OAuth-state cookies.
//! - [`oauth`] -- Google and GitHub authorization-code flow.

pub mod cookies;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod tokens;
