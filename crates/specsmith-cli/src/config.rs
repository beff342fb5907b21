//! Configuration file management for specsmith.
//!
//! Provides a TOML-based config file at `~/.config/specsmith/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.
//! The model API key is deliberately never written to the config file;
//! it comes from the environment only.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use specsmith_core::llm::LlmConfig;
use specsmith_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmSection {
    /// Base URL of the OpenAI-compatible model endpoint.
    pub base_url: String,
    /// Model identifier to request.
    pub model: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: LlmConfig::DEFAULT_BASE_URL.to_string(),
            model: LlmConfig::DEFAULT_MODEL.to_string(),
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the specsmith config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/specsmith` or
/// `~/.config/specsmith`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support`
/// on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("specsmith");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("specsmith")
}

/// Return the path to the specsmith config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct SpecsmithConfig {
    pub db_config: DbConfig,
    pub llm_config: LlmConfig,
}

impl SpecsmithConfig {
    /// Resolve configuration using the chain: CLI flag > env var >
    /// config file > default.
    ///
    /// - DB URL: `cli_db_url` > `SPECSMITH_DATABASE_URL` env >
    ///   `config_file.database.url` > `DbConfig::DEFAULT_URL`
    /// - Model endpoint/model: `SPECSMITH_LLM_BASE_URL` /
    ///   `SPECSMITH_LLM_MODEL` env > `config_file.llm` > defaults
    /// - API key: `SPECSMITH_LLM_API_KEY` > `GEMINI_API_KEY` env only
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("SPECSMITH_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        let mut llm_config = LlmConfig::from_env();
        if let Some(ref cfg) = file_config {
            if std::env::var("SPECSMITH_LLM_BASE_URL").is_err() {
                llm_config.base_url = cfg.llm.base_url.trim_end_matches('/').to_string();
            }
            if std::env::var("SPECSMITH_LLM_MODEL").is_err() {
                llm_config.model = cfg.llm.model.clone();
            }
        }

        Ok(Self {
            db_config,
            llm_config,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
