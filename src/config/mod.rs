use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::UserRole;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the marketplace backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for ordinary requests in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Timeout for the session refresh call in seconds (default: 5)
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            refresh_timeout: default_refresh_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_refresh_timeout() -> u64 {
    5
}

/// Application routes used for redirect decisions.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_login_route")]
    pub login: String,
    #[serde(default = "default_pending_route")]
    pub pending_approval: String,
    #[serde(default = "default_company_dashboard")]
    pub company_dashboard: String,
    #[serde(default = "default_influencer_dashboard")]
    pub influencer_dashboard: String,
    #[serde(default = "default_admin_dashboard")]
    pub admin_dashboard: String,
    #[serde(default = "default_subscribe_route")]
    pub subscribe: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            pending_approval: default_pending_route(),
            company_dashboard: default_company_dashboard(),
            influencer_dashboard: default_influencer_dashboard(),
            admin_dashboard: default_admin_dashboard(),
            subscribe: default_subscribe_route(),
        }
    }
}

impl RoutesConfig {
    /// Dashboard a role lands on after login. Unknown roles have none.
    pub fn landing_path(&self, role: UserRole) -> Option<&str> {
        match role {
            UserRole::Company => Some(&self.company_dashboard),
            UserRole::Influencer => Some(&self.influencer_dashboard),
            UserRole::Admin => Some(&self.admin_dashboard),
            UserRole::Unknown => None,
        }
    }
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_pending_route() -> String {
    "/pendiente".to_string()
}

fn default_company_dashboard() -> String {
    "/empresa/dashboard".to_string()
}

fn default_influencer_dashboard() -> String {
    "/influencer/dashboard".to_string()
}

fn default_admin_dashboard() -> String {
    "/admin/dashboard".to_string()
}

fn default_subscribe_route() -> String {
    "/empresa/planes".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Where the CLI keeps the session cookie between runs
    #[serde(default = "default_cookie_file")]
    pub cookie_file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_file: default_cookie_file(),
        }
    }
}

fn default_cookie_file() -> PathBuf {
    PathBuf::from("./data/session.cookie")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }
}
