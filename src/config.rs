//! Proxy configuration - built by the binary from flags, env and `.env`

use std::path::PathBuf;
use std::time::Duration;

use crate::core::paths::files;

pub const DEFAULT_PORT: u16 = 3000;

pub mod env {
    pub const CLI: &str = "CBDC_PROXY_CLI";
    pub const CLI_CONFIG: &str = "CBDC_PROXY_CLI_CONFIG";
    pub const WORK_DIR: &str = "CBDC_PROXY_WORK_DIR";
    pub const REGISTRY: &str = "CBDC_PROXY_REGISTRY";
    pub const TIMEOUT_SECS: &str = "CBDC_PROXY_TIMEOUT_SECS";
    pub const API_KEY: &str = "API_KEY";
    pub const PORT: &str = "PORT";
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub cli_path: PathBuf,
    pub cli_config: String,
    /// Directory client-cli runs in; wallet and mempool files live here.
    pub work_dir: PathBuf,
    /// Defaults to `<work_dir>/walletInfo.json` when unset.
    pub registry_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub port: u16,
    pub command_timeout: Option<Duration>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cli_path: PathBuf::from(files::CLI_BINARY),
            cli_config: files::CLI_CONFIG.into(),
            work_dir: PathBuf::from("."),
            registry_path: None,
            api_key: None,
            port: DEFAULT_PORT,
            command_timeout: None,
        }
    }
}

impl ProxyConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_cli(mut self, path: impl Into<PathBuf>) -> Self { self.cli_path = path.into(); self }
    pub fn with_cli_config(mut self, name: impl Into<String>) -> Self { self.cli_config = name.into(); self }
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.work_dir = dir.into(); self }
    pub fn with_registry(mut self, path: impl Into<PathBuf>) -> Self { self.registry_path = Some(path.into()); self }
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self { self.api_key = Some(key.into()); self }
    pub fn with_port(mut self, port: u16) -> Self { self.port = port; self }
    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.command_timeout = Some(timeout); self }

    pub fn registry_path(&self) -> PathBuf {
        self.registry_path.clone().unwrap_or_else(|| self.work_dir.join(files::REGISTRY))
    }

    /// Overlay environment variables on the defaults.
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();
        if let Some(v) = get(env::CLI) { config.cli_path = v.into(); }
        if let Some(v) = get(env::CLI_CONFIG) { config.cli_config = v; }
        if let Some(v) = get(env::WORK_DIR) { config.work_dir = v.into(); }
        if let Some(v) = get(env::REGISTRY) { config.registry_path = Some(v.into()); }
        config.api_key = get(env::API_KEY);
        if let Some(port) = get(env::PORT).and_then(|v| v.parse().ok()) { config.port = port; }
        config.command_timeout = get(env::TIMEOUT_SECS)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        config
    }
}
