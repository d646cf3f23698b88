//! Page gate: which frontend pages a visitor may load.
//!
//! Protected pages send anonymous visitors to the login page, public auth
//! pages send signed-in users to the dashboard, and admin pages require the
//! `ADMIN` role. API routes, health checks and static assets are never gated
//! here; API handlers enforce auth through extractors instead.

use crate::roles::Role;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Pages that require a signed-in user.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/lessons",
    "/notes",
    "/bookmarks",
    "/profile",
    "/admin",
];

/// Pages that require the `ADMIN` role.
pub const ADMIN_PREFIXES: &[&str] = &["/admin"];

/// Pages only meaningful to signed-out visitors.
pub const AUTH_PAGE_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
];

/// Outcome of gating a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

/// Segment-aware prefix match: `/admin` matches `/admin` and `/admin/x`,
/// but not `/administrator`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn under_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| under_prefix(path, p))
}

/// Decide whether a page request for `path` proceeds or redirects.
///
/// `role` is the role of the signed-in user, or `None` for anonymous visitors.
pub fn gate_decision(path: &str, role: Option<Role>) -> GateDecision {
    match role {
        None if under_any(path, PROTECTED_PREFIXES) => GateDecision::Redirect(format!(
            "{LOGIN_PATH}?next={}",
            urlencoding::encode(path)
        )),
        Some(role) if under_any(path, ADMIN_PREFIXES) && !role.is_admin() => {
            GateDecision::Redirect(DASHBOARD_PATH.to_string())
        }
        Some(_) if under_any(path, AUTH_PAGE_PREFIXES) => {
            GateDecision::Redirect(DASHBOARD_PATH.to_string())
        }
        _ => GateDecision::Allow,
    }
}
