//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.soilscope.toml` files. The resulting [`Config`] is built once at
//! startup and handed to the provider client and the server.

use crate::models::{dedup_depths, default_depths};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".soilscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Soil provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Aggregation and analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report path for one-shot analysis.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "soil_report.md".to_string()
}

/// Soil provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login username.
    #[serde(default)]
    pub username: Option<String>,

    /// Login password.
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds. Unset leaves the HTTP client default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/soil/v2".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Aggregation and analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Depth layers queried when a request names none.
    #[serde(default = "default_depths")]
    pub depths: Vec<String>,

    /// Upper bound on in-flight provider calls. Unset fires every call at once.
    #[serde(default)]
    pub max_concurrent_fetches: Option<usize>,

    /// Latitude used when a request omits `lat`.
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,

    /// Longitude used when a request omits `lon`.
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depths: default_depths(),
            max_concurrent_fetches: None,
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

fn default_latitude() -> f64 {
    -26.2041
}

fn default_longitude() -> f64 {
    28.0473
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment fallbacks) take precedence over
    /// config file settings, but only when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.provider.base_url = url.clone();
        }
        if let Some(ref username) = args.username {
            self.provider.username = Some(username.clone());
        }
        if let Some(ref password) = args.password {
            self.provider.password = Some(password.clone());
        }
        if let Some(timeout) = args.timeout {
            self.provider.timeout_seconds = Some(timeout);
        }

        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        if let Some(ref depths) = args.depths {
            self.analysis.depths = depths.clone();
        }
        self.analysis.depths = dedup_depths(std::mem::take(&mut self.analysis.depths));
        if let Some(limit) = args.max_concurrency {
            self.analysis.max_concurrent_fetches = Some(limit);
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.depths.len(), 6);
        assert_eq!(config.analysis.depths[0], "0-5");
        assert!(config.analysis.max_concurrent_fetches.is_none());
        assert!(config.provider.username.is_none());
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "farm.json"
verbose = true

[provider]
base_url = "https://soil.example.org/v2"
username = "farmer"
password = "hunter2"
timeout_seconds = 20

[analysis]
depths = ["0-5", "5-15"]
max_concurrent_fetches = 8
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "farm.json");
        assert!(config.general.verbose);
        assert_eq!(config.provider.username.as_deref(), Some("farmer"));
        assert_eq!(config.provider.timeout_seconds, Some(20));
        assert_eq!(config.analysis.depths, vec!["0-5", "5-15"]);
        assert_eq!(config.analysis.max_concurrent_fetches, Some(8));
        assert_eq!(config.analysis.default_latitude, -26.2041);
    }

    #[test]
    fn test_merge_collapses_repeated_depths() {
        use clap::Parser;

        let args =
            crate::cli::Args::try_parse_from(["soilscope", "--depths", "0-5,5-15,0-5", "-v"])
                .unwrap();
        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.analysis.depths, vec!["0-5", "5-15"]);
        assert!(config.general.verbose);

        let mut from_file: Config = toml::from_str(
            r#"
[analysis]
depths = ["0-5", "0-5"]
"#,
        )
        .unwrap();
        from_file.merge_with_args(&crate::cli::Args::try_parse_from(["soilscope"]).unwrap());
        assert_eq!(from_file.analysis.depths, vec!["0-5"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"0.0.0.0:9000\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.provider.base_url, default_base_url());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ndepths = 12").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[provider]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[analysis]"));
    }
}
