//! Soil structure: aggregate stability, erosion risk, workability.

use crate::derive::biological::organic_matter;
use crate::models::PropertyGrid;
use serde::Serialize;

/// Aggregate stability index in [0, 100] from organic matter % and clay %.
pub fn aggregate_stability(organic_matter: f64, clay: f64) -> f64 {
    let index = organic_matter * 15.0 + clay * 0.5;
    if index.is_nan() {
        return 0.0;
    }
    index.clamp(0.0, 100.0)
}

pub fn stability_class(index: f64) -> &'static str {
    if index >= 60.0 {
        "stable"
    } else if index >= 35.0 {
        "moderately stable"
    } else {
        "unstable"
    }
}

/// Erosion risk from stability, worsened by silty low-clay topsoil.
pub fn erosion_risk(stability: Option<f64>, silt: Option<f64>) -> &'static str {
    match stability {
        Some(s) if s < 35.0 => "high",
        Some(_) if silt.is_some_and(|silt| silt > 50.0) => "high",
        Some(s) if s < 60.0 => "moderate",
        Some(_) => "low",
        None => "unknown",
    }
}

pub fn workability(clay: Option<f64>, sand: Option<f64>) -> &'static str {
    match (clay, sand) {
        (Some(clay), _) if clay > 40.0 => "difficult",
        (_, Some(sand)) if sand > 70.0 => "easy",
        (Some(_), Some(_)) => "moderate",
        _ => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_stability: Option<f64>,
    pub stability_class: String,
    pub erosion_risk: String,
    pub workability: String,
}

pub fn analyze(grid: &PropertyGrid) -> StructuralAnalysis {
    let clay = grid.topsoil("clay");
    let om = grid.topsoil("soc").map(organic_matter);

    let stability = match (om, clay) {
        (Some(om), Some(clay)) => Some(aggregate_stability(om, clay)),
        _ => None,
    };

    StructuralAnalysis {
        aggregate_stability: stability,
        stability_class: stability
            .map(|s| stability_class(s).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        erosion_risk: erosion_risk(stability, grid.topsoil("silt")).to_string(),
        workability: workability(clay, grid.topsoil("sand")).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_stability() {
        assert!((aggregate_stability(2.0, 30.0) - 45.0).abs() < 1e-9);
        assert_eq!(aggregate_stability(10.0, 60.0), 100.0);
        assert_eq!(stability_class(45.0), "moderately stable");
        assert_eq!(stability_class(60.0), "stable");
        assert_eq!(stability_class(10.0), "unstable");
    }

    #[test]
    fn test_erosion_risk() {
        assert_eq!(erosion_risk(Some(20.0), Some(10.0)), "high");
        assert_eq!(erosion_risk(Some(70.0), Some(60.0)), "high");
        assert_eq!(erosion_risk(Some(45.0), None), "moderate");
        assert_eq!(erosion_risk(Some(70.0), Some(20.0)), "low");
        assert_eq!(erosion_risk(None, Some(20.0)), "unknown");
    }

    #[test]
    fn test_workability() {
        assert_eq!(workability(Some(45.0), Some(10.0)), "difficult");
        assert_eq!(workability(Some(5.0), Some(80.0)), "easy");
        assert_eq!(workability(Some(20.0), Some(40.0)), "moderate");
        assert_eq!(workability(None, None), "unknown");
    }

    #[test]
    fn test_empty_grid() {
        let analysis = analyze(&PropertyGrid::default());
        assert_eq!(analysis.aggregate_stability, None);
        assert_eq!(analysis.stability_class, "N/A");
        assert_eq!(analysis.erosion_risk, "unknown");
    }
}
