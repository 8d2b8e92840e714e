//! SoilScope - soil property aggregation and agronomic analysis
//!
//! Fetches soil properties for a coordinate pair from an authenticated
//! provider, derives agronomic indicators, and serves the result over HTTP
//! or writes it as a one-shot report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, provider authentication, I/O, etc.)

mod analysis;
mod assistant;
mod cli;
mod config;
mod derive;
mod models;
mod provider;
mod report;
mod server;

use analysis::AggregationPlan;
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::Coordinates;
use provider::{catalog, SoilApiClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let (mut config, source) = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("SoilScope v{}", env!("CARGO_PKG_VERSION"));
    match source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Defaults => debug!("No config file found, using defaults"),
        ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
    }
    debug!(
        "Mode: analyze={} dry_run={} format={:?}",
        args.analyze, args.dry_run, args.format
    );

    let outcome = if args.dry_run {
        handle_dry_run(&args, &config)
    } else if args.analyze {
        run_analysis(&args, &config).await
    } else {
        run_server(&config).await
    };

    if let Err(e) = outcome {
        error!("SoilScope failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .soilscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the provider URL, depths, concurrency and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Coordinates for one-shot modes: CLI flags, else configured defaults.
fn coordinates(args: &Args, config: &Config) -> Coordinates {
    Coordinates::new(
        args.lat.unwrap_or(config.analysis.default_latitude),
        args.lon.unwrap_or(config.analysis.default_longitude),
    )
}

/// Handle --dry-run: print the fetch plan without touching the network.
fn handle_dry_run(args: &Args, config: &Config) -> Result<()> {
    let coords = coordinates(args, config);
    let properties = catalog::default_properties();
    let depths = &config.analysis.depths;
    let pairs = analysis::aggregator::fetch_plan(&properties, depths);

    println!("\n🔍 Dry run: fetch plan for {} (no provider calls)...\n", coords);
    for property in &properties {
        println!(
            "     🧪 {:<11} {:<8} x{:<5} → {}",
            property.name, property.unit, property.conversion_factor, property.target_unit
        );
    }
    println!("\n   Depths (cm): {}", depths.join(", "));
    println!(
        "   Total: {} requests ({} properties x {} depths)",
        pairs.len(),
        properties.len(),
        depths.len()
    );
    match config.analysis.max_concurrent_fetches {
        Some(limit) => println!("   Concurrency: at most {} in flight", limit),
        None => println!("   Concurrency: all at once"),
    }
    println!("\n   Provider listing may replace the built-in catalog at run time.");

    println!("\n✅ Dry run complete. No provider calls were made.");
    Ok(())
}

/// Run the pipeline once and write the report to disk.
async fn run_analysis(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let coords = coordinates(args, config);
    coords.validate().map_err(anyhow::Error::msg)?;

    let client = SoilApiClient::new(&config.provider)?;
    let plan = AggregationPlan {
        coords,
        depths: config.analysis.depths.clone(),
        max_concurrent: config.analysis.max_concurrent_fetches,
    };

    println!("🌍 Analyzing soil at {}", coords);
    println!("   Provider: {}", config.provider.base_url);
    println!("   Depths: {}", plan.depths.join(", "));

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching soil properties...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = analysis::run(&client, &plan, args.include_raw).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let quality = &report.data_quality;
    println!("\n📊 Analysis Summary:");
    println!("   Soil type: {}", report.classification.soil_type);
    println!(
        "   Requests: {} ok / {} failed",
        report.metadata.requests_succeeded, report.metadata.requests_failed
    );
    println!(
        "   Completeness: {:.0}% ({} reliability)",
        quality.completeness * 100.0,
        quality.reliability
    );
    if !report.suitability.recommended_crops.is_empty() {
        println!(
            "   Recommended crops: {}",
            report.suitability.recommended_crops.join(", ")
        );
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(())
}

/// Start the HTTP server.
async fn run_server(config: &Config) -> Result<()> {
    let client = SoilApiClient::new(&config.provider)?;
    if !client.has_credentials() {
        warn!("Soil API credentials are not configured; /api/soil will answer 500 until they are");
    }

    let state = server::AppState {
        source: Arc::new(client),
        analysis: config.analysis.clone(),
        assistant: assistant::CommandExecutor::new(Arc::new(assistant::InMemoryFarmStore::new())),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    server::serve(listener, state).await
}

/// Where the active configuration came from.
enum ConfigSource {
    File(PathBuf),
    Defaults,
    /// The default config file exists but could not be loaded.
    Fallback(anyhow::Error),
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so the outcome is returned for
/// `main` to report.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::File(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(e))),
    }
}
