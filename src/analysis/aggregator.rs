//! Concurrent fetch fan-out and property grid assembly.
//!
//! One provider call is issued per (property, depth) pair. All calls run
//! concurrently (optionally capped), every call is awaited, and successes are
//! folded into the [`PropertyGrid`]. Failures are counted, never raised.

use crate::models::{dedup_depths, Coordinates, FetchOutcome, PropertyGrid, PropertyInfo};
use crate::provider::{catalog, fetch_property, ProviderError, SoilDataSource};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// What to fetch for one request.
#[derive(Debug, Clone)]
pub struct AggregationPlan {
    pub coords: Coordinates,
    pub depths: Vec<String>,
    /// Upper bound on in-flight calls; `None` issues them all at once.
    pub max_concurrent: Option<usize>,
}

/// Result of a completed fan-out.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub grid: PropertyGrid,
    pub properties: Vec<PropertyInfo>,
    pub outcomes: Vec<FetchOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl Aggregation {
    pub fn requests_made(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Build the cartesian (property, depth) fetch plan, property-major.
pub fn fetch_plan<'a>(
    properties: &'a [PropertyInfo],
    depths: &'a [String],
) -> Vec<(&'a PropertyInfo, &'a str)> {
    properties
        .iter()
        .flat_map(|p| depths.iter().map(move |d| (p, d.as_str())))
        .collect()
}

/// Fold fetch outcomes into a grid, returning (grid, succeeded, failed).
pub fn build_grid(outcomes: &[FetchOutcome], depths: &[String]) -> (PropertyGrid, usize, usize) {
    let mut grid = PropertyGrid::new(depths.to_vec());

    for outcome in outcomes {
        if let FetchOutcome::Success {
            property,
            depth,
            data,
        } = outcome
        {
            grid.insert(property, depth, data.clone());
        }
    }

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    (grid, succeeded, outcomes.len() - succeeded)
}

/// Authenticate, discover properties, fan out every fetch, and assemble the grid.
///
/// Only authentication (or missing credentials) aborts; a failed layer
/// listing falls back to the built-in catalog.
pub async fn aggregate<S: SoilDataSource + ?Sized>(
    source: &S,
    plan: &AggregationPlan,
) -> Result<Aggregation, ProviderError> {
    let token = source.authenticate().await?;

    let properties = match source.list_properties(&token).await {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            warn!("Provider advertised no properties, using built-in catalog");
            catalog::default_properties()
        }
        Err(e) => {
            warn!("Failed to list provider properties ({}), using built-in catalog", e);
            catalog::default_properties()
        }
    };

    let depths = dedup_depths(plan.depths.iter().map(String::as_str));
    let pairs = fetch_plan(&properties, &depths);
    let limit = plan.max_concurrent.unwrap_or(pairs.len()).max(1);

    info!(
        "Fetching {} properties x {} depths ({} requests, concurrency {}) at {}",
        properties.len(),
        depths.len(),
        pairs.len(),
        limit,
        plan.coords
    );

    let token = token.as_str();
    let coords = plan.coords;
    let fetches: Vec<_> = pairs
        .into_iter()
        .map(|(info, depth)| fetch_property(source, token, coords, info, depth))
        .collect();
    let outcomes: Vec<FetchOutcome> = stream::iter(fetches).buffered(limit).collect().await;

    let (grid, succeeded, failed) = build_grid(&outcomes, &depths);
    let aggregation = Aggregation {
        grid,
        properties,
        outcomes,
        succeeded,
        failed,
    };
    debug!(
        "Fan-out settled: {} of {} requests succeeded",
        aggregation.succeeded,
        aggregation.requests_made()
    );

    Ok(aggregation)
}
