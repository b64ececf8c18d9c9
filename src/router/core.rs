//! Router core module - route table and best-match selection.

use crate::error::PatternError;
use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

use super::pattern::{split_path, RoutePattern};

/// Maximum number of path parameters before heap allocation.
/// Most routes bind ≤4 parameters (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered `(name, value)` bindings produced by a match.
///
/// Param names are `Arc<str>` shared with the compiled pattern, so binding a
/// parameter never copies its name.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered route. Never mutated after registration.
#[derive(Debug, Clone)]
pub struct DynamicRoute<H> {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: H,
}

impl<H> DynamicRoute<H> {
    #[must_use]
    pub fn score(&self) -> u32 {
        self.pattern.score()
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug)]
pub struct RouteMatch<'r, H> {
    pub route: &'r DynamicRoute<H>,
    /// Bindings in segment order (e.g. `:id` → `("id", "42")`)
    pub path_params: ParamVec,
}

impl<H> RouteMatch<'_, H> {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name is bound twice.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Route table that picks the most specific matching pattern.
///
/// Every route with the request method is tried; the highest specificity score wins
/// and equal scores go to the route registered first.
///
/// # Example
///
/// ```rust
/// use embedroute::router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.register(Method::GET, "/users/:id", "show_user").unwrap();
/// router.register(Method::GET, "/users/new", "new_user").unwrap();
///
/// let m = router.route_path(&Method::GET, "/users/new").unwrap();
/// assert_eq!(m.route.handler, "new_user");
/// ```
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<DynamicRoute<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> Router<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append a route. Duplicates and overlaps are allowed.
    pub fn register(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), PatternError> {
        let pattern = RoutePattern::compile(pattern)?;
        info!(
            method = %method,
            pattern = %pattern.as_str(),
            score = pattern.score(),
            routes_count = self.routes.len() + 1,
            "Route registered"
        );
        self.routes.push(DynamicRoute {
            method,
            pattern,
            handler,
        });
        Ok(())
    }

    #[must_use]
    pub fn routes(&self) -> &[DynamicRoute<H>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match pre-split path segments.
    #[must_use]
    pub fn route(&self, method: &Method, segments: &[&str]) -> Option<RouteMatch<'_, H>> {
        let mut best: Option<RouteMatch<'_, H>> = None;
        for route in self.routes.iter().filter(|r| r.method == *method) {
            let Some(path_params) = route.pattern.match_segments(segments) else {
                continue;
            };
            // Strictly greater: the earlier registration keeps ties.
            if best.as_ref().map_or(true, |b| route.score() > b.route.score()) {
                best = Some(RouteMatch { route, path_params });
            }
        }

        match &best {
            Some(m) => debug!(
                method = %method,
                route_pattern = %m.route.pattern.as_str(),
                score = m.route.score(),
                path_params = ?m.path_params,
                "Route matched"
            ),
            None => debug!(method = %method, segments = ?segments, "No route matched"),
        }
        best
    }

    /// Split a decoded path and match it.
    #[must_use]
    pub fn route_path(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        self.route(method, &split_path(path))
    }

    /// Log every registered route, useful for verifying start-up wiring.
    pub fn dump_routes(&self) {
        for route in &self.routes {
            info!(
                method = %route.method,
                pattern = %route.pattern.as_str(),
                score = route.score(),
                "Registered route"
            );
        }
    }
}
