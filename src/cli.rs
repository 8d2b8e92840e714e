//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{parse_depth, Coordinates};
use clap::Parser;
use std::path::PathBuf;

/// SoilScope - soil property aggregation and agronomic analysis
///
/// Fetches soil properties for a location from an external soil provider
/// across several depth layers and derives physical, chemical, biological,
/// hydrological and structural indicators plus crop suitability.
///
/// Examples:
///   soilscope --bind 0.0.0.0:8080
///   soilscope --analyze --lat -26.2041 --lon 28.0473 --format json -o soil.json
///   soilscope --analyze --depths 0-5,5-15 --dry-run
///   soilscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Address for the HTTP server to listen on
    #[arg(long, value_name = "ADDR", env = "SOILSCOPE_BIND")]
    pub bind: Option<String>,

    /// Soil provider base URL
    #[arg(long, value_name = "URL", env = "SOIL_API_URL")]
    pub api_url: Option<String>,

    /// Soil provider login username
    #[arg(long, env = "SOIL_API_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Soil provider login password
    #[arg(long, env = "SOIL_API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .soilscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Run a single analysis and write a report instead of serving HTTP
    #[arg(long)]
    pub analyze: bool,

    /// Latitude for --analyze (decimal degrees)
    #[arg(long, allow_hyphen_values = true, requires = "analyze")]
    pub lat: Option<f64>,

    /// Longitude for --analyze (decimal degrees)
    #[arg(long, allow_hyphen_values = true, requires = "analyze")]
    pub lon: Option<f64>,

    /// Depth layers to query (comma-separated, in cm)
    ///
    /// Example: --depths 0-5,5-15,15-30
    #[arg(long, value_name = "LAYERS", value_delimiter = ',')]
    pub depths: Option<Vec<String>>,

    /// Include raw per-call provider results in the report
    #[arg(long, requires = "analyze")]
    pub include_raw: bool,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of concurrent provider requests
    ///
    /// Unset issues every (property, depth) request at once.
    #[arg(long, value_name = "NUM")]
    pub max_concurrency: Option<usize>,

    /// Provider request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Dry run: print the (property, depth) fetch plan without calling the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .soilscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Soil API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(lat) = self.lat {
            Coordinates::new(lat, 0.0).validate()?;
        }
        if let Some(lon) = self.lon {
            Coordinates::new(0.0, lon).validate()?;
        }

        if let Some(ref depths) = self.depths {
            if depths.is_empty() {
                return Err("At least one depth layer is required".to_string());
            }
            if let Some(bad) = depths.iter().find(|d| parse_depth(d).is_none()) {
                return Err(format!(
                    "Invalid depth layer '{}': expected <top>-<bottom> in cm, e.g. 0-5",
                    bad
                ));
            }
        }

        if self.max_concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` comes from the config file; `--quiet` overrides it.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
