//! Route descriptors and path matching.

use sagip_session::Role;
use serde::Serialize;

/// Access metadata of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    /// Whether a signed-in session is required.
    pub requires_auth: bool,
    /// Roles allowed in; `None` means any role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<Role>>,
}

impl RouteMeta {
    /// Metadata for a public route.
    pub fn public() -> Self {
        Self::default()
    }

    /// Metadata for a route that requires one of the given roles.
    pub fn protected(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            requires_auth: true,
            required_roles: Some(roles.into_iter().collect()),
        }
    }

    /// Check whether a role is allowed by this route.
    pub fn allows(&self, role: Role) -> bool {
        self.required_roles
            .as_ref()
            .map(|roles| roles.contains(&role))
            .unwrap_or(true)
    }
}

/// A node of the route table.
///
/// Paths of children are relative to their parent; an empty child path
/// matches the parent's own path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Path or path segment (`:name` segments match anything).
    pub path: String,
    /// Route name.
    pub name: Option<String>,
    /// Whether this subtree requires a signed-in session.
    pub requires_auth: bool,
    /// Roles allowed into this subtree.
    pub required_roles: Option<Vec<Role>>,
    /// Static redirect target.
    pub redirect: Option<String>,
    /// Nested routes.
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    /// Create a route for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            requires_auth: false,
            required_roles: None,
            redirect: None,
            children: Vec::new(),
        }
    }

    /// Create a redirect-only route.
    pub fn redirect(path: impl Into<String>, to: impl Into<String>) -> Self {
        let mut route = Self::new(path);
        route.redirect = Some(to.into());
        route
    }

    /// Set the route name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Require a signed-in session.
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Restrict the subtree to the given roles.
    pub fn roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.required_roles = Some(roles.into_iter().collect());
        self
    }

    /// Add a child route.
    pub fn child(mut self, child: RouteDescriptor) -> Self {
        self.children.push(child);
        self
    }
}

/// Result of matching a path against the table.
///
/// Metadata is merged over the matched chain: authentication is required
/// if any route in the chain requires it, and the role set comes from the
/// deepest route that declares one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Normalized path that was matched.
    pub path: String,
    /// Name of the leaf route.
    pub name: Option<String>,
    /// Merged access metadata.
    pub meta: RouteMeta,
    /// Redirect declared by the leaf route.
    pub redirect: Option<String>,
}

/// A flattened table entry, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Full path.
    pub path: String,
    /// Route name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Merged access metadata.
    pub meta: RouteMeta,
    /// Redirect target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Static, hierarchical route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level route.
    pub fn route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    /// The application's route table.
    pub fn default_routes() -> Self {
        Self::new()
            .route(RouteDescriptor::redirect("/", "/auth/login"))
            .route(RouteDescriptor::new("/auth/login").named("UserLogin"))
            .route(RouteDescriptor::new("/auth/register").named("UserRegister"))
            .route(
                RouteDescriptor::new("/user")
                    .requires_auth()
                    .roles([Role::Citizen])
                    .child(RouteDescriptor::redirect("", "/user/dashboard"))
                    .child(RouteDescriptor::new("dashboard").named("UserDashboard"))
                    .child(RouteDescriptor::new("report").named("UserHazardReport"))
                    .child(RouteDescriptor::new("map").named("UserMap"))
                    .child(RouteDescriptor::new("alerts").named("UserAlerts"))
                    .child(RouteDescriptor::new("profile").named("UserProfile")),
            )
            .route(
                RouteDescriptor::new("/admin")
                    .requires_auth()
                    .roles([Role::Admin])
                    .child(RouteDescriptor::redirect("", "/admin/dashboard"))
                    .child(RouteDescriptor::new("dashboard").named("Dashboard"))
                    .child(RouteDescriptor::new("hazard_report").named("HazardReports"))
                    .child(RouteDescriptor::new("analytics").named("Analytics"))
                    .child(RouteDescriptor::new("centers").named("EvacuationCenters"))
                    .child(RouteDescriptor::new("map").named("GISMap"))
                    .child(RouteDescriptor::new("users").named("UserManagement"))
                    .child(RouteDescriptor::new("logs").named("EvacuationLogs")),
            )
            .route(
                RouteDescriptor::new("/staff")
                    .requires_auth()
                    .roles([Role::Staff])
                    .child(RouteDescriptor::redirect("", "/staff/dashboard"))
                    .child(RouteDescriptor::new("dashboard").named("StaffDashboard"))
                    .child(RouteDescriptor::new("centers").named("StaffCenters"))
                    .child(RouteDescriptor::new("logs").named("StaffLogs"))
                    .child(RouteDescriptor::new("map").named("StaffMap")),
            )
    }

    /// Top-level routes.
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Match a path.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);
        let mut chain = Vec::new();
        if !match_routes(&self.routes, "", &path, &mut chain) {
            return None;
        }

        let leaf = chain.last()?;
        Some(RouteMatch {
            name: leaf.name.clone(),
            redirect: leaf.redirect.clone(),
            meta: merge_meta(&chain),
            path,
        })
    }

    /// All routes with their full paths, depth first.
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut out = Vec::new();
        let mut chain = Vec::new();
        collect_entries(&self.routes, "", &mut chain, &mut out);
        out
    }
}

fn merge_meta(chain: &[&RouteDescriptor]) -> RouteMeta {
    RouteMeta {
        requires_auth: chain.iter().any(|r| r.requires_auth),
        required_roles: chain
            .iter()
            .rev()
            .find_map(|r| r.required_roles.clone()),
    }
}

fn match_routes<'a>(
    routes: &'a [RouteDescriptor],
    parent: &str,
    path: &str,
    chain: &mut Vec<&'a RouteDescriptor>,
) -> bool {
    for route in routes {
        let full = join_path(parent, &route.path);
        chain.push(route);

        if route.children.is_empty() {
            if segments_match(&full, path, false) {
                return true;
            }
        } else if segments_match(&full, path, true)
            && match_routes(&route.children, &full, path, chain)
        {
            return true;
        }

        chain.pop();
    }
    false
}

fn collect_entries<'a>(
    routes: &'a [RouteDescriptor],
    parent: &str,
    chain: &mut Vec<&'a RouteDescriptor>,
    out: &mut Vec<RouteEntry>,
) {
    for route in routes {
        let full = join_path(parent, &route.path);
        chain.push(route);
        if route.children.is_empty() {
            out.push(RouteEntry {
                path: full.clone(),
                name: route.name.clone(),
                meta: merge_meta(chain),
                redirect: route.redirect.clone(),
            });
        } else {
            collect_entries(&route.children, &full, chain, out);
        }
        chain.pop();
    }
}

/// Join a child path onto its parent.
fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else if child.is_empty() {
        normalize_path(parent)
    } else {
        normalize_path(&format!("{}/{}", parent.trim_end_matches('/'), child))
    }
}

/// Compare a pattern with a path segment by segment.
///
/// With `prefix` set, the pattern only has to match the start of the path.
fn segments_match(pattern: &str, path: &str, prefix: bool) -> bool {
    let mut pattern_segs = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segs = path.split('/').filter(|s| !s.is_empty());

    loop {
        match (pattern_segs.next(), path_segs.next()) {
            (None, None) => return true,
            (None, Some(_)) => return prefix,
            (Some(_), None) => return false,
            (Some(p), Some(s)) => {
                if !p.starts_with(':') && p != s {
                    return false;
                }
            }
        }
    }
}

/// Normalize a navigation path.
///
/// Drops any query string or fragment, ensures a leading slash and strips
/// trailing slashes (except for the root).
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}
