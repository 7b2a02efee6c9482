use crate::common::constants::{API_URL_ENV, DEFAULT_API_URL, TICKET_HEIGHT, TICKET_WIDTH};
use crate::common::error::{Result, StageError};
use serde::Deserialize;
use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub ticket: TicketConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the persisted user-info blob
    pub dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(".idol_stage") }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub width: u32,
    pub height: u32,
    /// Ticket-shaped alpha mask; a generated stub is used when unset
    pub mask_path: Option<String>,
    /// TrueType/OpenType font used for ticket text; the bundled DejaVu Sans when unset
    pub font_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            width: TICKET_WIDTH,
            height: TICKET_HEIGHT,
            mask_path: None,
            font_path: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_string() }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let mut config = if path.exists() {
            Self::from_path(path)?
        } else {
            Config::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            StageError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_override(std::env::var(API_URL_ENV))? {
            self.api.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(StageError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.ticket.width == 0 || self.ticket.height == 0 {
            return Err(StageError::Config("ticket dimensions must be non-zero".into()));
        }
        Ok(())
    }
}

/// Trimmed override value; unset or blank means no override, non-UTF-8 is an error
fn env_override(value: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match value {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v.trim().to_string())),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
