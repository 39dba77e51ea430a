//! Sagip CLI - Sign in and work with evacuation centers from the terminal.

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sagip_core::auth::AuthError;
use sagip_core::client::RequestError;
use sagip_core::evac::EvacError;
use sagip_core::SagipError;
use tracing_subscriber::EnvFilter;

use commands::{
    CentersArgs, ConfigArgs, HazardsArgs, LoginArgs, LogsArgs, NavigateArgs, RegisterArgs,
    WhoamiArgs,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SAGIP_LOG";

/// Sagip CLI - Disaster-response client for evacuation centers
#[derive(Parser)]
#[command(name = "sagip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami(WhoamiArgs),

    /// Check where a path leads for the stored session
    Navigate(NavigateArgs),

    /// Print the route table
    Routes,

    /// Evacuation centers and congestion forecasts
    Centers(CentersArgs),

    /// Evacuation head-count logs
    Logs(LogsArgs),

    /// Hazard reports
    Hazards(HazardsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Check whether a failure means the user has to sign in again.
fn is_session_expired(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<SagipError>() {
            e.is_session_expired()
        } else if let Some(e) = cause.downcast_ref::<AuthError>() {
            e.is_session_expired()
        } else if let Some(EvacError::Request(e)) = cause.downcast_ref::<EvacError>() {
            e.is_session_expired()
        } else if let Some(e) = cause.downcast_ref::<RequestError>() {
            e.is_session_expired()
        } else {
            false
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Login(args) => commands::account::login(args, &ctx).await,
        Commands::Register(args) => commands::account::register(args, &ctx).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::Whoami(args) => commands::account::whoami(args, &ctx).await,
        Commands::Navigate(args) => commands::routes::navigate(args, &ctx).await,
        Commands::Routes => commands::routes::list(&ctx).await,
        Commands::Centers(args) => commands::centers::run(args, &ctx).await,
        Commands::Logs(args) => commands::logs::run(args, &ctx).await,
        Commands::Hazards(args) => commands::hazards::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        if is_session_expired(&e) {
            ctx.output
                .info("Your session has ended. Run `sagip login` to sign in again.");
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sagip_core::client::ExpiredReason;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sagip", "centers", "--remote", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Centers(args) => assert!(args.remote),
            _ => panic!("expected centers"),
        }
    }

    #[test]
    fn test_session_expired_detection() {
        let expired = RequestError::SessionExpired(ExpiredReason::RefreshFailed);
        assert!(is_session_expired(&anyhow::Error::from(expired)));

        let wrapped = EvacError::Request(RequestError::SessionExpired(ExpiredReason::NoRefreshToken));
        let err = anyhow::Error::from(wrapped).context("Failed to list logs");
        assert!(is_session_expired(&err));

        let other = RequestError::Timeout;
        assert!(!is_session_expired(&anyhow::Error::from(other)));
    }
}
