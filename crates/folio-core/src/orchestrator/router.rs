//! Path to view resolution.

use crate::models::ViewId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Matches exactly this path.
    Literal(String),
    /// Matches this path and everything below it (`/project/*`).
    Prefix(String),
}

impl RoutePattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Literal(literal) => path == literal,
            RoutePattern::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }

    /// Length of the literal part, used to pick the most specific match.
    fn specificity(&self) -> usize {
        match self {
            RoutePattern::Literal(literal) => literal.len(),
            RoutePattern::Prefix(prefix) => prefix.len(),
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    pattern: RoutePattern,
    view: ViewId,
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub view: ViewId,
    /// Normalized path the view is shown under. For redirects this is the
    /// default view's path.
    pub path: String,
    /// True when the requested path was the root alias or unmatched.
    pub redirected: bool,
}

/// Ordered path patterns plus a wildcard fallback to the default view.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    default_view: ViewId,
}

impl RouteTable {
    pub fn new(default_view: ViewId) -> Self {
        Self {
            routes: Vec::new(),
            default_view,
        }
    }

    pub fn literal(mut self, path: &str, view: ViewId) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::Literal(normalize(path)),
            view,
        });
        self
    }

    pub fn prefix(mut self, path: &str, view: ViewId) -> Self {
        let path = normalize(path.trim_end_matches('*'));
        self.routes.push(Route {
            pattern: RoutePattern::Prefix(path),
            view,
        });
        self
    }

    /// The portfolio's routes: one literal path per view, `/` and every
    /// unknown path going to the home view.
    pub fn portfolio() -> Self {
        ViewId::ALL
            .iter()
            .fold(Self::new(ViewId::Home), |table, view| {
                table.literal(&view.path(), *view)
            })
    }

    pub fn default_view(&self) -> ViewId {
        self.default_view
    }

    /// Resolve a path to exactly one view. The most specific matching
    /// pattern wins; ties go to the earlier route.
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = normalize(path);
        let matched = self
            .routes
            .iter()
            .filter(|route| route.pattern.matches(&path))
            .fold(None::<&Route>, |best, route| match best {
                Some(b) if b.pattern.specificity() >= route.pattern.specificity() => Some(b),
                _ => Some(route),
            });

        match matched {
            Some(route) => Resolution {
                view: route.view,
                path,
                redirected: false,
            },
            None => Resolution {
                view: self.default_view,
                path: self.default_view.path(),
                redirected: true,
            },
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portfolio()
    }
}

/// Strip query and fragment, collapse a trailing slash, and map an empty
/// path to `/`.
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
