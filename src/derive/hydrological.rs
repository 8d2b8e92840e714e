//! Water retention and drainage estimates.
//!
//! Retention values are fixed linear combinations of clay %, sand % and
//! organic matter %, expressed as volumetric water content (%).

use crate::derive::biological::organic_matter;
use crate::models::PropertyGrid;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterRetention {
    pub field_capacity: f64,
    pub wilting_point: f64,
    pub available_water: f64,
}

/// Estimate field capacity, wilting point and plant-available water.
pub fn water_retention(clay: f64, sand: f64, organic_matter: f64) -> WaterRetention {
    let field_capacity = 8.0 + 0.30 * clay - 0.05 * sand + 1.50 * organic_matter;
    let wilting_point = 2.0 + 0.25 * clay + 0.40 * organic_matter;

    WaterRetention {
        field_capacity,
        wilting_point,
        available_water: (field_capacity - wilting_point).max(0.0),
    }
}

/// Drainage class from texture fractions.
pub fn drainage_class(clay: Option<f64>, sand: Option<f64>) -> &'static str {
    match (clay, sand) {
        (_, Some(sand)) if sand > 70.0 => "excessive",
        (Some(clay), _) if clay > 40.0 => "poor",
        (Some(clay), _) if clay > 27.0 => "moderate",
        (Some(_), Some(_)) => "good",
        _ => "unknown",
    }
}

/// Infiltration rate class from texture fractions.
pub fn infiltration_rate(clay: Option<f64>, sand: Option<f64>) -> &'static str {
    match (clay, sand) {
        (_, Some(sand)) if sand > 70.0 => "rapid",
        (Some(clay), _) if clay > 40.0 => "slow",
        (Some(_), Some(_)) => "moderate",
        _ => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrologicalAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_retention: Option<WaterRetention>,
    pub drainage_class: String,
    pub infiltration_rate: String,
}

pub fn analyze(grid: &PropertyGrid) -> HydrologicalAnalysis {
    let clay = grid.topsoil("clay");
    let sand = grid.topsoil("sand");
    let om = grid.topsoil("soc").map(organic_matter);

    let water_retention = match (clay, sand, om) {
        (Some(clay), Some(sand), Some(om)) => Some(water_retention(clay, sand, om)),
        _ => None,
    };

    HydrologicalAnalysis {
        water_retention,
        drainage_class: drainage_class(clay, sand).to_string(),
        infiltration_rate: infiltration_rate(clay, sand).to_string(),
    }
}
