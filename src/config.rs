use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "sitegrade";
const ENV_PREFIX: &str = "SITEGRADE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub fetch_timeout_secs: u64,
    pub whois_timeout_secs: u64,
    pub tls_timeout_secs: u64,
    pub whois_server: String,
    pub user_agent: String,
}

impl Settings {
    /// Defaults, then `sitegrade.toml` if present, then `SITEGRADE_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("output_dir", "reports")?
            .set_default("fetch_timeout_secs", 10)?
            .set_default("whois_timeout_secs", 10)?
            .set_default("tls_timeout_secs", 10)?
            .set_default("whois_server", "whois.iana.org")?
            .set_default("user_agent", concat!("sitegrade/", env!("CARGO_PKG_VERSION")))?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }
}
