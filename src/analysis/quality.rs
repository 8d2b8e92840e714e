//! Data-quality scoring for a property grid.

use crate::models::PropertyGrid;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// Mean depth coverage over properties that returned any data.
    pub completeness: f64,
    pub missing_properties: Vec<String>,
    pub reliability: String,
    pub recommendations: Vec<String>,
    pub measurements_expected: usize,
    pub measurements_received: usize,
    pub failed_requests: usize,
}

/// Average of (depths present / depths requested) over present properties.
///
/// An empty grid, or a request with no depths, scores 0.0.
pub fn completeness(grid: &PropertyGrid) -> f64 {
    let requested = grid.depths().len();
    if requested == 0 || grid.is_empty() {
        return 0.0;
    }

    let ratios: Vec<f64> = grid
        .properties()
        .map(|p| grid.depth_count(p) as f64 / requested as f64)
        .collect();

    ratios.iter().sum::<f64>() / ratios.len() as f64
}

pub fn reliability(completeness: f64) -> &'static str {
    if completeness >= 0.8 {
        "high"
    } else if completeness >= 0.6 {
        "moderate"
    } else {
        "low"
    }
}

/// Assess how much of the expected property × depth matrix was populated.
pub fn assess(grid: &PropertyGrid, expected_properties: &[String], failed: usize) -> DataQuality {
    let completeness = completeness(grid);
    let reliability = reliability(completeness);

    let missing_properties: Vec<String> = expected_properties
        .iter()
        .filter(|p| grid.depth_count(p) == 0)
        .cloned()
        .collect();

    let mut recommendations = Vec::new();
    if grid.is_empty() {
        recommendations.push(
            "No soil measurements were returned; verify the coordinates are on land and retry."
                .to_string(),
        );
    } else {
        match reliability {
            "high" => recommendations
                .push("Data coverage is good; results are suitable for planning.".to_string()),
            "moderate" => recommendations.push(
                "Some depth layers are missing; confirm key values with a field sample."
                    .to_string(),
            ),
            _ => recommendations.push(
                "Coverage is sparse; treat derived indices as indicative and take a lab soil test."
                    .to_string(),
            ),
        }
    }
    if !missing_properties.is_empty() {
        recommendations.push(format!(
            "No data for: {}. Dependent indicators are reported as N/A.",
            missing_properties.join(", ")
        ));
    }
    if failed > 0 {
        recommendations.push(format!(
            "{} provider request(s) failed; retrying later may improve coverage.",
            failed
        ));
    }

    DataQuality {
        completeness,
        missing_properties,
        reliability: reliability.to_string(),
        recommendations,
        measurements_expected: expected_properties.len() * grid.depths().len(),
        measurements_received: grid.len(),
        failed_requests: failed,
    }
}
