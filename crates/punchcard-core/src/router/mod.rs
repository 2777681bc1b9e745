//! Page routing: the static route table, the navigation guard, and the
//! navigator that applies the guard on every transition.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{check, GuardDecision};
pub use navigator::{Navigation, NavigationError, Navigator};
pub use routes::{
    find, normalize_path, resolve, routes, RouteDescriptor, RouteMeta, RouteName, HOME_PATH,
    LOGIN_PATH,
};
