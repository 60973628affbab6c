/*
 * Responsibility
 * - Route descriptor (path / name / view / meta) と route table の定義
 * - Table 構築時に不変条件を検証する (login は公開、home は role 不要、path/name は一意)
 * - path → route の解決 (`:param` segment 対応)
 */
use std::collections::HashSet;

use thiserror::Error;

use crate::services::auth::Role;

/// Route metadata read by the navigation guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub required_role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: String,
    /// Name of the view component rendered for this route.
    pub view: String,
    pub meta: RouteMeta,
}

impl Route {
    pub fn public(path: &str, name: &str, view: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            view: view.to_string(),
            meta: RouteMeta::default(),
        }
    }

    pub fn protected(path: &str, name: &str, view: &str) -> Self {
        let mut route = Self::public(path, name, view);
        route.meta.requires_auth = true;
        route
    }

    /// Restrict the route to `role`. Implies `requires_auth`.
    pub fn with_role(mut self, role: Role) -> Self {
        self.meta.requires_auth = true;
        self.meta.required_role = Some(role);
        self
    }

    fn matches(&self, path: &str) -> bool {
        let pattern = segments(&self.path);
        let actual = segments(path);

        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route path must start with '/': {0}")]
    InvalidPath(String),
    #[error("duplicate route path: {0}")]
    DuplicatePath(String),
    #[error("duplicate route name: {0}")]
    DuplicateName(String),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("login route must not require authentication: {0}")]
    LoginRequiresAuth(String),
    #[error("home route must not require a role: {0}")]
    HomeRequiresRole(String),
    #[error("login and home must be different routes")]
    LoginIsHome,
}

/// Validated route table with a designated login route, home route and
/// optional fallback for unknown paths.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    login: usize,
    home: usize,
    fallback: Option<usize>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, login: &str, home: &str) -> Result<Self, RouteTableError> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(RouteTableError::InvalidPath(route.path.clone()));
            }
            if !paths.insert(normalize(&route.path)) {
                return Err(RouteTableError::DuplicatePath(route.path.clone()));
            }
            if !names.insert(route.name.as_str()) {
                return Err(RouteTableError::DuplicateName(route.name.clone()));
            }
        }

        let index_of = |name: &str| {
            routes
                .iter()
                .position(|r| r.name == name)
                .ok_or_else(|| RouteTableError::UnknownRoute(name.to_string()))
        };
        let login = index_of(login)?;
        let home = index_of(home)?;

        if login == home {
            return Err(RouteTableError::LoginIsHome);
        }
        if routes[login].meta.requires_auth {
            return Err(RouteTableError::LoginRequiresAuth(routes[login].name.clone()));
        }
        if routes[home].meta.required_role.is_some() {
            return Err(RouteTableError::HomeRequiresRole(routes[home].name.clone()));
        }

        Ok(Self {
            routes,
            login,
            home,
            fallback: None,
        })
    }

    /// Route rendered for paths that match nothing.
    pub fn with_fallback(mut self, name: &str) -> Result<Self, RouteTableError> {
        let index = self
            .routes
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RouteTableError::UnknownRoute(name.to_string()))?;
        self.fallback = Some(index);
        Ok(self)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn login(&self) -> &Route {
        &self.routes[self.login]
    }

    pub fn home(&self) -> &Route {
        &self.routes[self.home]
    }

    pub fn fallback(&self) -> Option<&Route> {
        self.fallback.map(|i| &self.routes[i])
    }

    pub fn is_login(&self, route: &Route) -> bool {
        route.name == self.login().name
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Resolve a concrete path. Query string, fragment and trailing slash are ignored.
    /// Static routes win over parameterized ones.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);

        self.routes
            .iter()
            .find(|r| normalize(&r.path) == path)
            .or_else(|| self.routes.iter().find(|r| r.matches(&path)))
    }
}

/// Strip query/fragment and trailing slashes; `""` becomes `/`.
pub fn normalize(path: &str) -> String {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Page table of the monitoring portal.
pub fn portal_routes() -> Result<RouteTable, RouteTableError> {
    let routes = vec![
        Route::protected("/", "Home", "Home"),
        Route::public("/login", "Login", "Login"),
        Route::protected("/face-recognition", "FaceRecognition", "FaceRecognition"),
        Route::protected("/pavement-detection", "PavementDetection", "PavementDetection"),
        Route::protected("/traffic-analysis", "TrafficAnalysis", "TrafficAnalysis"),
        Route::protected("/alerts-logs", "AlertsLogs", "AlertsLogs"),
        Route::protected("/admin", "Admin", "Admin").with_role(Role::admin()),
        Route::protected("/logs", "Log", "Log").with_role(Role::admin()),
        Route::public("/404", "NotFound", "NotFound"),
    ];

    RouteTable::new(routes, "Login", "Home")?.with_fallback("NotFound")
}
