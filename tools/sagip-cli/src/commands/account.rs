//! Sign-in and account commands.

use anyhow::Result;
use chrono::Local;
use dialoguer::{Input, Password};
use sagip_core::auth::{Credentials, Registration};
use sagip_core::session::{Session, TokenClaims};
use serde_json::json;

use super::{LoginArgs, RegisterArgs, WhoamiArgs};
use crate::context::Context;

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Signing in...");
    let result = app.auth().login(&Credentials::new(email, password)).await;
    spinner.finish_and_clear();
    let session = result?;

    let role = session.role();
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "authenticated": session.is_authenticated,
            "role": role,
            "home": role.home_path(),
            "profile": session.user_profile,
        }));
        return Ok(());
    }

    match session.user_profile {
        Some(ref profile) => ctx
            .output
            .success(&format!("Signed in as {}", profile.display_name())),
        None => {
            ctx.output.success("Signed in");
            ctx.output
                .warn("Profile could not be loaded; run `sagip whoami` to retry.");
        }
    }
    ctx.output.kv("role", role.as_str());
    ctx.output.kv("home", role.home_path());

    Ok(())
}

/// Run the register command.
pub async fn register(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let mut registration =
        Registration::new(args.email.clone(), password, args.first_name, args.last_name);
    if let Some(role) = args.role {
        registration = registration.with_role(role);
    }
    if let Some(contact) = args.contact {
        registration = registration.with_contact_number(contact);
    }
    if let Some(municipality) = args.municipality {
        registration = registration.with_municipality(municipality);
    }

    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Creating account...");
    let result = app.auth().register(&registration).await;
    spinner.finish_and_clear();
    let record = result?;

    if ctx.output.is_json() {
        ctx.output.json(&record);
        return Ok(());
    }

    ctx.output.success(
        record
            .message
            .as_deref()
            .unwrap_or("Account created"),
    );
    ctx.output.kv("email", &args.email);
    if let Some(ref role) = record.role {
        ctx.output.kv("role", role);
    }
    ctx.output.info("Run `sagip login` to sign in.");

    Ok(())
}

/// Run the logout command.
pub async fn logout(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let was_signed_in = app.session().load()?.is_authenticated;
    app.auth().logout();

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "signed_out": was_signed_in }));
    } else if was_signed_in {
        ctx.output.success("Signed out");
    } else {
        ctx.output.info("Not signed in");
    }

    Ok(())
}

/// Run the whoami command.
pub async fn whoami(args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let mut session = app.session().load()?;

    if !session.is_authenticated {
        if ctx.output.is_json() {
            ctx.output.json(&json!({ "authenticated": false }));
        } else {
            ctx.output.info("Not signed in. Run `sagip login`.");
        }
        return Ok(());
    }

    if !args.local {
        let spinner = ctx.output.spinner("Loading profile...");
        let result = app.auth().get_user_profile().await;
        spinner.finish_and_clear();
        let profile = result?;
        app.session().set_profile(&profile)?;
        session = session.with_profile(profile);
    }

    let expires = token_expiry(&session);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "authenticated": true,
            "role": session.role(),
            "home": session.role().home_path(),
            "access_expires": expires,
            "profile": session.user_profile,
        }));
        return Ok(());
    }

    ctx.output.header("Session");
    match session.user_profile {
        Some(ref profile) => {
            ctx.output.kv("name", &profile.display_name());
            ctx.output.kv("email", &profile.email);
            if let Some(ref number) = profile.contact_number {
                ctx.output.kv("contact", number);
            }
        }
        None => ctx.output.kv("profile", "not loaded"),
    }
    ctx.output.kv("role", session.role().as_str());
    ctx.output.kv("home", session.role().home_path());
    ctx.output.kv(
        "access token",
        &expires.unwrap_or_else(|| "no expiry".to_string()),
    );

    Ok(())
}

/// Expiry of the stored access token, in local time.
fn token_expiry(session: &Session) -> Option<String> {
    let claims = TokenClaims::peek(session.access_token.as_deref()?).ok()?;
    let at = claims.expires_at()?.with_timezone(&Local);
    let state = if claims.is_expired() { "expired" } else { "expires" };
    Some(format!("{} {}", state, at.format("%Y-%m-%d %H:%M")))
}
