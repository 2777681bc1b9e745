use super::routes::{RouteDescriptor, HOME_PATH, LOGIN_PATH};
use crate::auth::Session;
use crate::models::ADMIN_ROLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    RedirectLogin,
    RedirectHome,
    Proceed,
}

impl GuardDecision {
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectHome => Some(HOME_PATH),
            GuardDecision::Proceed => None,
        }
    }
}

/// Decide whether navigating to `route` may proceed. First matching rule wins.
pub fn check(route: &RouteDescriptor, session: &Session) -> GuardDecision {
    let authenticated = session.is_authenticated();

    if route.meta.requires_auth && !authenticated {
        GuardDecision::RedirectLogin
    } else if route.meta.requires_admin && session.user_role() != ADMIN_ROLE {
        GuardDecision::RedirectHome
    } else if route.name.is_entry_page() && authenticated {
        GuardDecision::RedirectHome
    } else {
        GuardDecision::Proceed
    }
}
