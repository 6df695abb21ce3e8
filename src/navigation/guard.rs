//! Role-based route guard for the platform area.

use crate::config::RoutesConfig;
use crate::models::UserRole;
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Identity is still being resolved; render nothing yet
    Wait,
    RedirectToLogin,
    /// The path belongs to another role's area
    Redirect(String),
    Allow,
}

const ROLE_AREAS: [(&str, UserRole); 3] = [
    ("/empresa", UserRole::Company),
    ("/influencer", UserRole::Influencer),
    ("/admin", UserRole::Admin),
];

fn area_owner(path: &str) -> Option<UserRole> {
    ROLE_AREAS.iter().find_map(|(prefix, role)| {
        let inside = path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        inside.then_some(*role)
    })
}

/// Decide whether the current session may stay on `path`.
pub fn guard_route(snapshot: &SessionSnapshot, path: &str, routes: &RoutesConfig) -> RouteDecision {
    if snapshot.is_loading {
        return RouteDecision::Wait;
    }
    let Some(user) = snapshot.user.as_ref() else {
        return RouteDecision::RedirectToLogin;
    };

    match area_owner(path) {
        Some(owner) if owner != user.role => match routes.landing_path(user.role) {
            Some(home) => RouteDecision::Redirect(home.to_string()),
            None => RouteDecision::RedirectToLogin,
        },
        _ => RouteDecision::Allow,
    }
}
