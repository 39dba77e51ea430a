//! Configuration management commands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, API_URL_ENV, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force, base_url } => init_config(force, base_url.as_deref(), ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "none (defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    ctx.output.kv("refresh_path", &ctx.config.api.refresh_path);
    ctx.output.kv(
        "timeout_secs",
        &ctx.config
            .api
            .timeout_secs
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );

    ctx.output.info("");
    ctx.output.info("[session]");
    ctx.output
        .kv("path", &ctx.config.session_path().display().to_string());

    if std::env::var_os(API_URL_ENV).is_some() {
        ctx.output.info("");
        ctx.output
            .warn(&format!("api.base_url is overridden by {}", API_URL_ENV));
    }

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value.unwrap_or_default());
    }

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let path = match ctx.config_path {
        Some(ref path) => path.clone(),
        None => bail!("No config file found. Run `sagip config init` to create one."),
    };
    let path = path_str(&path)?;

    // Reload so environment overrides are not written back
    let mut config = CliConfig::load(path)?;
    set_config_value(&mut config, key, value)?;
    config.save(path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn init_config(force: bool, base_url: Option<&str>, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let base_url = base_url.unwrap_or(&ctx.config.api.base_url);
    fs::write(&config_path, generate_default_config(base_url))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Collect configuration errors and warnings.
fn check(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = config.app_config().validate() {
        errors.push(e.to_string());
    }

    let base_url = &config.api.base_url;
    if base_url.starts_with("http://") && !is_local(base_url) {
        warnings.push(format!(
            "api.base_url '{}' sends credentials without TLS",
            base_url
        ));
    }

    if config.api.refresh_path.starts_with("http") {
        warnings.push("api.refresh_path should be relative to api.base_url".to_string());
    }

    if let Some(ref path) = config.session.path {
        if path.is_relative() {
            warnings.push(format!(
                "session.path '{}' is relative to the working directory",
                path.display()
            ));
        }
    }

    (errors, warnings)
}

fn is_local(url: &str) -> bool {
    let rest = url.trim_start_matches("http://");
    if rest.starts_with("[::1]") {
        return true;
    }
    let host = rest.split(['/', ':']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}

fn get_config_value(config: &CliConfig, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["api", "base_url"] => Ok(Some(config.api.base_url.clone())),
        ["api", "refresh_path"] => Ok(Some(config.api.refresh_path.clone())),
        ["api", "timeout_secs"] => Ok(config.api.timeout_secs.map(|t| t.to_string())),
        ["session", "path"] => Ok(Some(config.session_path().display().to_string())),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["api", "base_url"] => config.api.base_url = value.to_string(),
        ["api", "refresh_path"] => config.api.refresh_path = value.to_string(),
        ["api", "timeout_secs"] if value.is_empty() || value == "none" => {
            config.api.timeout_secs = None
        }
        ["api", "timeout_secs"] => config.api.timeout_secs = Some(value.parse()?),
        ["session", "path"] => config.session.path = Some(PathBuf::from(value)),
        _ => bail!("Unknown config key: {}", key),
    }

    Ok(())
}

fn path_str(path: &std::path::Path) -> Result<&str> {
    match path.to_str() {
        Some(s) => Ok(s),
        None => bail!("Config path is not valid UTF-8: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set_values() {
        let mut config = CliConfig::default();
        assert_eq!(
            get_config_value(&config, "api.timeout_secs").unwrap(),
            None
        );

        set_config_value(&mut config, "api.timeout_secs", "30").unwrap();
        set_config_value(&mut config, "api.base_url", "https://sagip.example/api/").unwrap();
        assert_eq!(config.api.timeout_secs, Some(30));
        assert_eq!(
            get_config_value(&config, "api.base_url").unwrap().as_deref(),
            Some("https://sagip.example/api/")
        );

        set_config_value(&mut config, "api.timeout_secs", "none").unwrap();
        assert_eq!(config.api.timeout_secs, None);

        assert!(set_config_value(&mut config, "api.timeout_secs", "soon").is_err());
        assert!(get_config_value(&config, "deploy.canary").is_err());
    }

    #[test]
    fn test_check_reports_errors_and_warnings() {
        let (errors, warnings) = check(&CliConfig::default());
        assert!(errors.is_empty());
        assert!(warnings.is_empty());

        let mut config = CliConfig::default();
        config.api.base_url = "http://sagip.example/api/".to_string();
        config.session.path = Some(PathBuf::from("session.json"));
        let (errors, warnings) = check(&config);
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 2);

        config.api.base_url = "sagip.example".to_string();
        config.api.timeout_secs = Some(0);
        let (errors, _) = check(&config);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("http://127.0.0.1:8000/api/"));
        assert!(is_local("http://localhost/api/"));
        assert!(is_local("http://[::1]:8000/api/"));
        assert!(!is_local("http://sagip.example/api/"));
    }
}
