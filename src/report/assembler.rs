//! Response assembly: composes the grid and every derived record into one
//! report. No business logic beyond composition.

use crate::analysis::quality::{self, DataQuality};
use crate::analysis::Aggregation;
use crate::derive::classification::{self, SoilClassification};
use crate::derive::context::{self, EnvironmentalContext, TemporalContext};
use crate::derive::suitability::{self, Suitability};
use crate::derive::{derive_analysis, DerivedAnalysis};
use crate::models::{Coordinates, FetchOutcome, PropertyGrid, PropertyInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata about one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub latitude: f64,
    pub longitude: f64,
    pub depths: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub properties_requested: usize,
    pub requests_made: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub duration_seconds: f64,
    pub generator: String,
}

/// The complete soil analysis report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilReport {
    pub metadata: ReportMetadata,
    pub soil_properties: PropertyGrid,
    pub analysis: DerivedAnalysis,
    pub classification: SoilClassification,
    pub suitability: Suitability,
    pub environmental: EnvironmentalContext,
    pub data_quality: DataQuality,
    pub temporal: TemporalContext,
    pub property_metadata: BTreeMap<String, PropertyInfo>,
    /// Per-call provider results, only with the debug flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<FetchOutcome>>,
}

pub fn assemble(
    aggregation: Aggregation,
    coords: Coordinates,
    include_raw: bool,
    now: DateTime<Utc>,
    duration_seconds: f64,
) -> SoilReport {
    let Aggregation {
        grid,
        properties,
        outcomes,
        succeeded,
        failed,
    } = aggregation;

    let analysis = derive_analysis(&grid);
    let classification = classification::classify(&analysis);
    let suitability = suitability::assess(&analysis);

    let expected: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();
    let data_quality = quality::assess(&grid, &expected, failed);

    let metadata = ReportMetadata {
        latitude: coords.lat,
        longitude: coords.lon,
        depths: grid.depths().to_vec(),
        generated_at: now,
        properties_requested: properties.len(),
        requests_made: succeeded + failed,
        requests_succeeded: succeeded,
        requests_failed: failed,
        duration_seconds,
        generator: concat!("soilscope/", env!("CARGO_PKG_VERSION")).to_string(),
    };

    SoilReport {
        metadata,
        soil_properties: grid,
        analysis,
        classification,
        suitability,
        environmental: context::environmental(coords),
        data_quality,
        temporal: context::temporal(coords, now),
        property_metadata: properties.into_iter().map(|p| (p.name.clone(), p)).collect(),
        raw: include_raw.then_some(outcomes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::build_grid;
    use crate::models::PropertyMeasurement;

    fn aggregation() -> Aggregation {
        let properties = vec![PropertyInfo::new("clay"), PropertyInfo::new("soc")];
        let depths = vec!["0-5".to_string()];
        let outcomes = vec![
            FetchOutcome::Success {
                property: "clay".to_string(),
                depth: "0-5".to_string(),
                data: PropertyMeasurement::new(35.0, None, None, &properties[0]),
            },
            FetchOutcome::Failure {
                property: "soc".to_string(),
                depth: "0-5".to_string(),
                error: "http 503: unavailable".to_string(),
            },
        ];
        let (grid, succeeded, failed) = build_grid(&outcomes, &depths);

        Aggregation {
            grid,
            properties,
            outcomes,
            succeeded,
            failed,
        }
    }

    #[test]
    fn test_top_level_keys() {
        let coords = Coordinates::new(-26.2041, 28.0473);
        let report = assemble(aggregation(), coords, false, Utc::now(), 0.5);
        let json = serde_json::to_value(&report).unwrap();

        for key in [
            "metadata",
            "soilProperties",
            "analysis",
            "classification",
            "suitability",
            "environmental",
            "dataQuality",
            "temporal",
            "propertyMetadata",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert!(json.get("raw").is_none());
        assert_eq!(json["soilProperties"]["clay"]["0-5"]["scaledValue"], 35.0);
        assert_eq!(json["metadata"]["requestsMade"], 2);
        assert_eq!(json["dataQuality"]["missingProperties"][0], "soc");
    }

    #[test]
    fn test_raw_included_with_debug_flag() {
        let report = assemble(aggregation(), Coordinates::new(0.0, 0.0), true, Utc::now(), 0.5);
        let json = serde_json::to_value(&report).unwrap();

        let raw = json["raw"].as_array().unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1]["error"], "http 503: unavailable");
    }
}
