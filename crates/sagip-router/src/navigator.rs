//! Navigation resolution.

use sagip_session::Session;
use serde::Serialize;
use tracing::debug;

use crate::guard::{decide, GuardDecision};
use crate::route::{normalize_path, RouteTable};
use crate::RouteError;

/// Maximum redirects followed before giving up.
pub const MAX_HOPS: usize = 8;

/// Why a hop happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopReason {
    /// The route table declares a redirect.
    RouteRedirect,
    /// The guard redirected.
    Guard(GuardDecision),
}

/// One redirect followed during navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    /// Path that was requested.
    pub from: String,
    /// Path redirected to.
    pub to: String,
    /// Cause of the redirect.
    pub reason: HopReason,
}

/// Settled navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Path the user lands on.
    pub path: String,
    /// Route name of the landing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Redirects followed, in order.
    pub hops: Vec<Hop>,
}

impl Navigation {
    /// Check if the navigation landed where it was aimed.
    pub fn is_direct(&self) -> bool {
        self.hops.is_empty()
    }
}

/// Follows table redirects and guard decisions until a page is reached.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: RouteTable,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RouteTable::default_routes())
    }
}

impl Navigator {
    /// Create a navigator over a route table.
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// The route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a navigation for the given session.
    pub fn navigate(&self, path: &str, session: &Session) -> Result<Navigation, RouteError> {
        let mut current = normalize_path(path);
        let mut hops = Vec::new();

        while hops.len() <= MAX_HOPS {
            let matched = self
                .table
                .resolve(&current)
                .ok_or_else(|| RouteError::NotFound(current.clone()))?;

            if let Some(to) = matched.redirect {
                let to = normalize_path(&to);
                hops.push(Hop {
                    from: std::mem::replace(&mut current, to.clone()),
                    to,
                    reason: HopReason::RouteRedirect,
                });
                continue;
            }

            let decision = decide(&current, &matched.meta, session);
            match decision.redirect_path() {
                None => {
                    debug!(path = %current, hops = hops.len(), "navigation settled");
                    return Ok(Navigation {
                        path: current,
                        name: matched.name,
                        hops,
                    });
                }
                Some(to) => {
                    hops.push(Hop {
                        from: std::mem::replace(&mut current, to.to_string()),
                        to: to.to_string(),
                        reason: HopReason::Guard(decision),
                    });
                }
            }
        }

        Err(RouteError::RedirectLoop {
            path: normalize_path(path),
            hops: hops.len(),
        })
    }
}
