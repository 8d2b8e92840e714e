//! Biological indicators: organic matter, carbon, biological activity.

use crate::models::{DepthValue, PropertyGrid};
use serde::Serialize;
use std::fmt;

/// van Bemmelen factor: organic matter per unit organic carbon.
pub const VAN_BEMMELEN_FACTOR: f64 = 1.72;

/// Organic matter (%) from organic carbon (%).
pub fn organic_matter(carbon_content: f64) -> f64 {
    carbon_content * VAN_BEMMELEN_FACTOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarbonClass {
    #[serde(rename = "very low")]
    VeryLow,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl fmt::Display for CarbonClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CarbonClass::VeryLow => "very low",
            CarbonClass::Low => "low",
            CarbonClass::Moderate => "moderate",
            CarbonClass::High => "high",
            CarbonClass::VeryHigh => "very high",
        };
        write!(f, "{}", label)
    }
}

/// Organic carbon tier from carbon content (%).
pub fn carbon_class(carbon_content: f64) -> CarbonClass {
    if carbon_content < 0.6 {
        CarbonClass::VeryLow
    } else if carbon_content < 1.0 {
        CarbonClass::Low
    } else if carbon_content < 2.0 {
        CarbonClass::Moderate
    } else if carbon_content < 3.0 {
        CarbonClass::High
    } else {
        CarbonClass::VeryHigh
    }
}

/// Biological activity index in [0, 100].
///
/// Starts at ten times organic matter, boosted in the 6-8 pH window and
/// damped in strongly acidic or alkaline soil.
pub fn biological_activity_index(organic_matter: f64, ph: Option<f64>) -> f64 {
    let mut index = organic_matter * 10.0;

    match ph {
        Some(ph) if (6.0..=8.0).contains(&ph) => index *= 1.2,
        Some(ph) if ph < 5.5 || ph > 8.5 => index *= 0.8,
        _ => {}
    }

    if index.is_nan() {
        return 0.0;
    }
    index.clamp(0.0, 100.0)
}

/// Remaining carbon sequestration capacity from organic carbon density (kg/m³).
pub fn sequestration_potential(carbon_density: Option<f64>) -> &'static str {
    match carbon_density {
        Some(v) if v < 20.0 => "high",
        Some(v) if v < 50.0 => "moderate",
        Some(_) => "low",
        None => "N/A",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiologicalAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_carbon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_matter: Option<f64>,
    pub carbon_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biological_activity_index: Option<f64>,
    pub carbon_sequestration_potential: String,
    pub carbon_stock_profile: Vec<DepthValue>,
}

pub fn analyze(grid: &PropertyGrid) -> BiologicalAnalysis {
    let organic_carbon = grid.topsoil("soc");
    let om = organic_carbon.map(organic_matter);

    BiologicalAnalysis {
        organic_carbon,
        organic_matter: om,
        carbon_class: organic_carbon
            .map(|c| carbon_class(c).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        biological_activity_index: om
            .map(|om| biological_activity_index(om, grid.topsoil("phh2o"))),
        carbon_sequestration_potential: sequestration_potential(grid.topsoil("ocd")).to_string(),
        carbon_stock_profile: grid.profile("ocd"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organic_matter_factor() {
        assert_eq!(organic_matter(0.0), 0.0);
        assert_eq!(organic_matter(2.0), 2.0 * 1.72);
        assert_eq!(organic_matter(1.35), 1.35 * 1.72);
    }

    #[test]
    fn test_carbon_class() {
        assert_eq!(carbon_class(0.3), CarbonClass::VeryLow);
        assert_eq!(carbon_class(0.6), CarbonClass::Low);
        assert_eq!(carbon_class(1.5), CarbonClass::Moderate);
        assert_eq!(carbon_class(2.9), CarbonClass::High);
        assert_eq!(carbon_class(3.0), CarbonClass::VeryHigh);
    }

    #[test]
    fn test_activity_index_ph_adjustment() {
        assert!((biological_activity_index(3.0, Some(6.5)) - 36.0).abs() < 1e-9);
        assert!((biological_activity_index(3.0, Some(5.0)) - 24.0).abs() < 1e-9);
        assert!((biological_activity_index(3.0, Some(5.8)) - 30.0).abs() < 1e-9);
        assert!((biological_activity_index(3.0, None) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_index_is_clamped() {
        assert_eq!(biological_activity_index(50.0, Some(7.0)), 100.0);
        assert_eq!(biological_activity_index(-4.0, Some(7.0)), 0.0);
        assert_eq!(biological_activity_index(f64::MAX, None), 100.0);
        for om in [0.0, 0.5, 4.0, 9.0, 1e6] {
            let index = biological_activity_index(om, Some(9.0));
            assert!((0.0..=100.0).contains(&index));
        }
    }

    #[test]
    fn test_empty_grid() {
        let analysis = analyze(&PropertyGrid::default());
        assert_eq!(analysis.organic_matter, None);
        assert_eq!(analysis.carbon_class, "N/A");
        assert_eq!(analysis.carbon_sequestration_potential, "N/A");
        assert!(analysis.carbon_stock_profile.is_empty());
    }
}
