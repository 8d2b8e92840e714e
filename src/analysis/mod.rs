//! Soil analysis pipeline.
//!
//! Fetch fan-out and grid assembly live in [`aggregator`], coverage
//! scoring in [`quality`]. [`run`] wires them to the derivation engine
//! and the response assembler.

pub mod aggregator;
pub mod quality;

pub use aggregator::{aggregate, Aggregation, AggregationPlan};

use crate::provider::{ProviderError, SoilDataSource};
use crate::report::{assemble, SoilReport};
use chrono::Utc;
use std::time::Instant;
use tracing::info;

/// Run the full pipeline for one location.
pub async fn run<S: SoilDataSource + ?Sized>(
    source: &S,
    plan: &AggregationPlan,
    include_raw: bool,
) -> Result<SoilReport, ProviderError> {
    let started = Instant::now();

    let aggregation = aggregate(source, plan).await?;
    let report = assemble(
        aggregation,
        plan.coords,
        include_raw,
        Utc::now(),
        started.elapsed().as_secs_f64(),
    );

    info!(
        "Soil analysis for {} complete: completeness {:.2} ({})",
        plan.coords, report.data_quality.completeness, report.data_quality.reliability
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use crate::provider::testing::FakeSource;

    #[tokio::test]
    async fn test_end_to_end_texture() {
        let source = FakeSource::new()
            .advertising(&["clay", "sand", "silt", "phh2o"])
            .with("clay", "0-5", Some(30.0))
            .with("sand", "0-5", Some(40.0))
            .with("silt", "0-5", Some(30.0));
        let plan = AggregationPlan {
            coords: Coordinates::new(-26.2041, 28.0473),
            depths: vec!["0-5".to_string(), "5-15".to_string()],
            max_concurrent: None,
        };

        let report = run(&source, &plan, false).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        // clay 30 >= 27 with sand 40 <= 45 reaches the Silty Clay rule.
        assert_eq!(json["analysis"]["physical"]["texture"]["textureClass"], "Silty Clay");
        assert_eq!(json["analysis"]["chemical"]["phClassification"], "N/A");
        assert_eq!(json["dataQuality"]["missingProperties"][0], "phh2o");
        assert_eq!(json["metadata"]["requestsFailed"], 5);
        assert!(json.get("raw").is_none());
    }
}
