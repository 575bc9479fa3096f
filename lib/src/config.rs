//! Defines the configuration structures for an easyLOD deployment.
//! This includes the main `Config` struct and the per-source settings used to build the
//! source registry at start-up.

use anyhow::{anyhow, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "easylod.json";

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// One metadata backend, keyed by the identifier namespace that selects it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum SourceConfig {
    /// A CONTENTdm server.
    #[serde(rename = "contentdm")]
    ContentDm {
        namespace: String,
        /// Web services API prefix; query paths are appended verbatim.
        ws_url: String,
        /// Public item page prefix; `<alias>/id/<pointer>` is appended verbatim.
        base_url: String,
    },
}

impl SourceConfig {
    pub fn namespace(&self) -> &str {
        match self {
            SourceConfig::ContentDm { namespace, .. } => namespace,
        }
    }

    pub fn source_type(&self) -> &'static str {
        match self {
            SourceConfig::ContentDm { .. } => "contentdm",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct Config {
    // address the HTTP server binds to
    #[serde(default = "default_listen")]
    #[builder(default = "default_listen()")]
    pub listen: String,
    // scheme and authority for absolute /data and /resource URLs; the Host header is used
    // when unset
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub base_url: Option<String>,
    // timeout for each backend request
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    pub timeout_secs: u64,
    #[serde(default)]
    #[builder(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks the settings that serde cannot: URL shapes, timeouts, and namespace clashes.
    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.base_url {
            check_http_url("base_url", base)?;
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            let namespace = source.namespace();
            if namespace.is_empty() || namespace.contains(':') {
                return Err(anyhow!("Invalid source namespace '{}'", namespace));
            }
            if !seen.insert(namespace) {
                return Err(anyhow!("Namespace '{}' is configured twice", namespace));
            }
            match source {
                SourceConfig::ContentDm {
                    ws_url, base_url, ..
                } => {
                    check_http_url("ws_url", ws_url)?;
                    check_http_url("base_url", base_url)?;
                }
            }
        }
        Ok(())
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Listen: {}", self.listen);
        match &self.base_url {
            Some(base) => println!("  Base URL: {}", base),
            None => println!("  Base URL: (from Host header)"),
        }
        println!("  Backend Timeout: {}s", self.timeout_secs);
        println!("  Sources:");
        for source in &self.sources {
            match source {
                SourceConfig::ContentDm {
                    namespace,
                    ws_url,
                    base_url,
                } => {
                    println!("    - {} ({})", namespace, source.source_type());
                    println!("        Web services: {}", ws_url);
                    println!("        Item pages:   {}", base_url);
                }
            }
        }
    }
}

fn check_http_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| anyhow!("Invalid {} '{}': {}", key, value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("Unsupported scheme '{}' in {}", other, key)),
    }
}
