//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use sagip_core::store::{FileStore, Store};
use sagip_core::SagipApp;

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration, with environment overrides applied.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try the current directory, then its parents
            match find_config_file(&cwd) {
                Some(path) => (load_found(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        if let Some(ref path) = config_path {
            output.debug(&format!("Using config: {}", path.display()));
        }

        Ok(Self {
            config: config.with_env_overrides(),
            config_path,
            output,
            cwd,
        })
    }

    /// Wire a client whose session lives in the configured session file.
    pub fn app(&self) -> Result<SagipApp> {
        let session_path = self.config.session_path();
        let store = FileStore::open(&session_path)
            .with_context(|| format!("Failed to open session file: {}", session_path.display()))?;

        let app = SagipApp::builder(self.config.app_config().with_name("sagip-cli"))
            .with_store(Store::new(store))
            .build()?;
        Ok(app)
    }
}

/// Load a config file found during discovery.
fn load_found(path: &Path) -> Result<CliConfig> {
    let path = path
        .to_str()
        .with_context(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
    CliConfig::load(path)
}

/// Find a config file in the directory tree.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".sagip.toml"), "").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(".sagip.toml"));
    }

    #[test]
    fn test_malformed_found_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".sagip.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let found = find_config_file(dir.path()).unwrap();
        let err = load_found(&found).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_find_config_prefers_first_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sagip.json"), "{}").unwrap();
        std::fs::write(dir.path().join("sagip.toml"), "").unwrap();

        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("sagip.toml")
        );
    }
}
