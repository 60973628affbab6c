use thiserror::Error;
use tracing::info;

use crate::router::guard::{GuardDecision, NavigationGuard};
use crate::router::routes::{Route, RouteTable, normalize};

/// Upper bound on guard redirects followed for a single navigation.
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("redirect target does not exist: {0}")]
    UnknownRedirect(String),
    #[error("too many redirects while navigating to {0}")]
    TooManyRedirects(String),
}

/// Where a navigation settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Name of the route that was entered.
    pub route: String,
    pub path: String,
    /// Originally requested path, when the guard redirected.
    pub redirected_from: Option<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

/// Owns the route table and the current route. Navigations are serialized
/// through `&mut self`.
#[derive(Debug)]
pub struct Navigator {
    table: RouteTable,
    guard: NavigationGuard,
    current: Option<Navigation>,
}

impl Navigator {
    pub fn new(table: RouteTable, guard: NavigationGuard) -> Self {
        Self {
            table,
            guard,
            current: None,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn current(&self) -> Option<&Navigation> {
        self.current.as_ref()
    }

    fn current_route(&self) -> Option<&Route> {
        self.current
            .as_ref()
            .and_then(|nav| self.table.by_name(&nav.route))
    }

    /// Navigate to `path`, running the guard before entering any route.
    ///
    /// On error the current route is left unchanged.
    pub fn push(&mut self, path: &str) -> Result<Navigation, NavigationError> {
        let requested = normalize(path);

        let (mut target, mut target_path) = match self.table.resolve(&requested) {
            Some(route) => (route, requested.clone()),
            None => {
                let fallback = self
                    .table
                    .fallback()
                    .ok_or_else(|| NavigationError::NotFound(requested.clone()))?;
                (fallback, fallback.path.clone())
            }
        };
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            match self.guard.evaluate(&self.table, target, self.current_route()) {
                GuardDecision::Proceed => {
                    let navigation = Navigation {
                        route: target.name.clone(),
                        path: target_path,
                        redirected_from: redirected.then(|| requested.clone()),
                    };
                    info!(
                        route = %navigation.route,
                        path = %navigation.path,
                        redirected_from = navigation.redirected_from.as_deref().unwrap_or("-"),
                        "navigated"
                    );
                    self.current = Some(navigation.clone());
                    return Ok(navigation);
                }
                GuardDecision::Redirect(name) => {
                    target = self
                        .table
                        .by_name(&name)
                        .ok_or(NavigationError::UnknownRedirect(name))?;
                    target_path = target.path.clone();
                    redirected = true;
                }
            }
        }

        Err(NavigationError::TooManyRedirects(requested))
    }
}
