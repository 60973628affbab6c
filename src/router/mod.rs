/*
 * Responsibility
 * - Client-side routing: route table, navigation guard, navigator
 * - Guard は全ての遷移 (初回ロード含む) の前に評価される
 */
pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{AuthState, GuardDecision, NavigationGuard};
pub use navigator::{Navigation, NavigationError, Navigator};
pub use routes::{Route, RouteMeta, RouteTable, RouteTableError, portal_routes};
