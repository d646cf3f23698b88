//! Authentication, authorization and page-gate middleware.
//!
//! - [`auth::AuthUser`] -- the signed-in user from the session cookie or a Bearer token.
//! - [`auth::MaybeAuthUser`] -- the same, but anonymous requests are allowed.
//! - [`rbac::RequireAdmin`] -- requires the `ADMIN` role.
//! - [`gate::page_gate`] -- redirects page requests per `qt_core::gate`.

pub mod auth;
pub mod gate;
pub mod rbac;
