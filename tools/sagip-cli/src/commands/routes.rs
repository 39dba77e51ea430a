//! Route table and navigation commands.

use anyhow::Result;
use sagip_core::router::{GuardDecision, HopReason, RouteEntry, RouteTable};

use super::NavigateArgs;
use crate::context::Context;

/// Run the navigate command.
pub async fn navigate(args: NavigateArgs, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let navigation = app.navigate(&args.path)?;

    if ctx.output.is_json() {
        ctx.output.json(&navigation);
        return Ok(());
    }

    for hop in &navigation.hops {
        ctx.output
            .debug(&format!("{} -> {} ({})", hop.from, hop.to, describe(hop.reason)));
    }

    if navigation.is_direct() {
        ctx.output.success(&format!("Allowed: {}", navigation.path));
    } else {
        ctx.output.info(&format!(
            "{} redirected to {}",
            args.path, navigation.path
        ));
        for hop in &navigation.hops {
            ctx.output
                .list_item(&format!("{} -> {}  {}", hop.from, hop.to, describe(hop.reason)));
        }
    }
    if let Some(ref name) = navigation.name {
        ctx.output.kv("page", name);
    }

    Ok(())
}

/// Run the routes command.
pub async fn list(ctx: &Context) -> Result<()> {
    let entries = RouteTable::default_routes().entries();

    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    ctx.output.header("Routes");
    ctx.output
        .table_row(&["PATH", "NAME", "ACCESS"], &[28, 22, 30]);
    for entry in &entries {
        let name = entry.name.as_deref().unwrap_or("-");
        ctx.output
            .table_row(&[&entry.path, name, &access(entry)], &[28, 22, 30]);
    }

    Ok(())
}

fn describe(reason: HopReason) -> &'static str {
    match reason {
        HopReason::RouteRedirect => "route redirect",
        HopReason::Guard(GuardDecision::RedirectToLogin) => "sign-in required",
        HopReason::Guard(GuardDecision::RedirectToRoleHome(_)) => "already signed in",
        HopReason::Guard(GuardDecision::RedirectToRoleFallback(_)) => "role not allowed",
        HopReason::Guard(GuardDecision::Proceed) => "proceed",
    }
}

fn access(entry: &RouteEntry) -> String {
    if let Some(ref to) = entry.redirect {
        return format!("redirect to {}", to);
    }
    match (entry.meta.requires_auth, &entry.meta.required_roles) {
        (false, _) => "public".to_string(),
        (true, None) => "signed in".to_string(),
        (true, Some(roles)) => roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_labels() {
        let entries = RouteTable::default_routes().entries();
        let by_path = |path: &str| {
            entries
                .iter()
                .find(|e| e.path == path)
                .map(access)
                .unwrap()
        };

        assert_eq!(by_path("/auth/login"), "public");
        assert_eq!(by_path("/admin/dashboard"), "admin");
        assert_eq!(by_path("/"), "redirect to /auth/login");
    }

    #[test]
    fn test_describe_guard_hops() {
        assert_eq!(
            describe(HopReason::Guard(GuardDecision::RedirectToLogin)),
            "sign-in required"
        );
        assert_eq!(describe(HopReason::RouteRedirect), "route redirect");
    }
}
