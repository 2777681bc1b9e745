use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;

use super::guard::{self, GuardDecision};
use super::routes::{normalize_path, resolve, RouteDescriptor, LOGIN_PATH};
use crate::auth::Session;

/// Redirects followed before giving up on a navigation.
/// The route table never needs more than one.
const MAX_REDIRECTS: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Too many redirects navigating to {0}")]
    RedirectLoop(String),
}

/// Where a navigation ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub location: String,
    /// `None` when the location matches no route
    pub route: Option<&'static RouteDescriptor>,
    pub redirected: bool,
}

/// Tracks the current location and runs every transition through the guard.
#[derive(Default)]
pub struct Navigator {
    location: Mutex<Option<String>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn location(&self) -> MutexGuard<'_, Option<String>> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current location, `None` before the first navigation
    pub fn current(&self) -> Option<String> {
        self.location().clone()
    }

    pub fn navigate(&self, path: &str, session: &Session) -> Result<Navigation, NavigationError> {
        let requested = normalize_path(path);
        let mut target = requested.clone();
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let route = resolve(&target);
            let decision = route
                .map(|r| guard::check(r, session))
                .unwrap_or(GuardDecision::Proceed);

            match decision.redirect_path() {
                Some(next) => {
                    debug!(from = %target, to = next, "Navigation redirected");
                    target = next.to_string();
                    redirected = true;
                }
                None => {
                    *self.location() = Some(target.clone());
                    return Ok(Navigation {
                        requested,
                        location: target,
                        route,
                        redirected,
                    });
                }
            }
        }

        Err(NavigationError::RedirectLoop(requested))
    }

    /// Jump to the sign-in page without consulting the guard
    pub fn force_login(&self) -> &'static str {
        *self.location() = Some(LOGIN_PATH.to_string());
        debug!("Forced navigation to sign-in");
        LOGIN_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::router::RouteName;

    fn employee_session() -> Session {
        Session {
            user: Some(User {
                id: 2,
                username: "dave".to_string(),
                email: None,
                real_name: None,
                employee_id: None,
                department: None,
                position: None,
                phone: None,
                role: Some("employee".to_string()),
                is_active: None,
                created_at: None,
            }),
            token: Some("abc123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_employee_admin_page_lands_on_dashboard() {
        let navigator = Navigator::new();
        let nav = navigator.navigate("/admin/users", &employee_session()).unwrap();
        assert_eq!(nav.location, "/");
        assert!(nav.redirected);
        assert_eq!(nav.route.map(|r| r.name), Some(RouteName::Dashboard));
        assert_eq!(navigator.current().as_deref(), Some("/"));
    }

    #[test]
    fn test_anonymous_lands_on_login() {
        let navigator = Navigator::new();
        let nav = navigator.navigate("/admin/users", &Session::default()).unwrap();
        assert_eq!(nav.location, "/login");
        assert_eq!(nav.requested, "/admin/users");
        assert!(nav.redirected);
    }

    #[test]
    fn test_unknown_path_proceeds() {
        let navigator = Navigator::new();
        let nav = navigator.navigate("/does-not-exist", &Session::default()).unwrap();
        assert_eq!(nav.location, "/does-not-exist");
        assert!(nav.route.is_none());
        assert!(!nav.redirected);
    }

    #[test]
    fn test_force_login() {
        let navigator = Navigator::new();
        assert_eq!(navigator.current(), None);
        navigator.navigate("/schedule", &employee_session()).unwrap();
        assert_eq!(navigator.force_login(), "/login");
        assert_eq!(navigator.current().as_deref(), Some("/login"));
    }
}
