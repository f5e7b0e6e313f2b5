//! Static endpoint access declarations.
//!
//! Handlers are registered together with their access requirement so the
//! axum [`Router`] and the [`RoutePolicy`] consulted by the guard can never
//! drift apart.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use axum::routing::{MethodFilter, on};
use http::Method;
use sleepr_security::{RequiredRoles, RoleName};

/// Access requirement resolved for a `(method, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No credential is looked at.
    Public,
    /// A valid credential carrying every listed role is required.
    Guarded(Arc<RequiredRoles>),
}

impl Access {
    #[must_use]
    pub fn authenticated() -> Self {
        Self::Guarded(Arc::new(RequiredRoles::none()))
    }
}

/// A single route declaration. Guarded with no role requirement unless told otherwise.
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: Method,
    filter: MethodFilter,
    path: String,
    access: Access,
}

impl Endpoint {
    fn new(method: Method, filter: MethodFilter, path: &str) -> Self {
        Self {
            method,
            filter,
            path: path.to_owned(),
            access: Access::authenticated(),
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, MethodFilter::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, MethodFilter::POST, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, MethodFilter::PUT, path)
    }

    #[must_use]
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, MethodFilter::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, MethodFilter::DELETE, path)
    }

    /// Serve without authentication.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }

    /// Require every role in `roles`. Replaces any earlier requirement.
    #[must_use]
    pub fn require_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        self.access = Access::Guarded(Arc::new(RequiredRoles::all_of(roles)));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn access(&self) -> &Access {
        &self.access
    }
}

/// Builder collecting handlers and their access declarations.
///
/// A conflicting declaration is not registered with the router; it is kept
/// and reported by [`GuardedRoutes::build`].
pub struct GuardedRoutes<S = ()> {
    router: Router<S>,
    declared: Vec<(Method, String, Access)>,
    patterns: matchit::Router<()>,
    error: Option<anyhow::Error>,
}

impl<S> Default for GuardedRoutes<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GuardedRoutes<S>
where
    S: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            declared: Vec::new(),
            patterns: matchit::Router::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn route<H, T>(mut self, endpoint: Endpoint, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        if self.error.is_some() {
            return self;
        }
        if let Err(err) = self.admit(&endpoint) {
            self.error = Some(err);
            return self;
        }
        self.router = self
            .router
            .route(&endpoint.path, on(endpoint.filter, handler));
        self.declared
            .push((endpoint.method, endpoint.path, endpoint.access));
        self
    }

    /// Reject what axum would panic on: a repeated `(method, path)`, a path
    /// without a leading `/`, or a pattern conflicting with an earlier one.
    fn admit(&mut self, endpoint: &Endpoint) -> anyhow::Result<()> {
        let (method, path) = (&endpoint.method, endpoint.path.as_str());
        if self.declared.iter().any(|(m, p, _)| m == method && p == path) {
            anyhow::bail!("Route {method} '{path}' is declared twice");
        }
        if !path.starts_with('/') {
            anyhow::bail!("Route pattern {method} '{path}' must start with '/'");
        }
        if !self.declared.iter().any(|(_, p, _)| p == path) {
            self.patterns.insert(path, ()).map_err(|e| {
                anyhow::anyhow!("Failed to insert route pattern {method} '{path}': {e}")
            })?;
        }
        Ok(())
    }

    /// Finish registration.
    ///
    /// # Errors
    ///
    /// Fails if the same method and path pattern were declared twice or a
    /// pattern is not a valid route.
    pub fn build(self, require_auth_by_default: bool) -> anyhow::Result<(Router<S>, RoutePolicy)> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let policy = build_route_policy(self.declared, require_auth_by_default)?;
        Ok((self.router, policy))
    }
}

/// Per-method lookup of the access requirement for an inbound request.
#[derive(Clone)]
pub struct RoutePolicy {
    matchers: Arc<HashMap<Method, matchit::Router<Access>>>,
    fallback: Access,
}

impl RoutePolicy {
    /// Resolve the requirement for `(method, path)`.
    ///
    /// `HEAD` without its own declaration inherits the `GET` requirement, since
    /// axum serves it with the `GET` handler.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Access {
        if let Some(access) = self.lookup(method, path) {
            return access.clone();
        }
        if method == Method::HEAD
            && let Some(access) = self.lookup(&Method::GET, path)
        {
            return access.clone();
        }
        self.fallback.clone()
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<&Access> {
        self.matchers
            .get(method)
            .and_then(|matcher| matcher.at(path).ok())
            .map(|matched| matched.value)
    }
}

impl std::fmt::Debug for RoutePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePolicy")
            .field("methods", &self.matchers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

fn build_route_policy(
    declared: Vec<(Method, String, Access)>,
    require_auth_by_default: bool,
) -> anyhow::Result<RoutePolicy> {
    let mut matchers: HashMap<Method, matchit::Router<Access>> = HashMap::new();

    for (method, path, access) in declared {
        matchers
            .entry(method.clone())
            .or_insert_with(matchit::Router::new)
            .insert(path.as_str(), access)
            .map_err(|e| anyhow::anyhow!("Failed to insert route pattern {method} '{path}': {e}"))?;
    }

    let fallback = if require_auth_by_default {
        Access::authenticated()
    } else {
        Access::Public
    };

    Ok(RoutePolicy {
        matchers: Arc::new(matchers),
        fallback,
    })
}
