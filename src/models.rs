//! Data models for soil property aggregation.
//!
//! This module contains the core data structures shared by the provider
//! client, the aggregator, and the derivation engine: coordinates,
//! property metadata, individual measurements, and the per-request
//! property grid.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Depth layer that top-soil derivations read from.
pub const TOPSOIL: &str = "0-5";

/// Default depth layers, spanning 0-200 cm.
pub const DEFAULT_DEPTHS: [&str; 6] = ["0-5", "5-15", "15-30", "30-60", "60-100", "100-200"];

/// Returns the default depth layers as owned labels.
pub fn default_depths() -> Vec<String> {
    DEFAULT_DEPTHS.iter().map(|d| d.to_string()).collect()
}

/// Parse a depth label such as `"15-30"` into its (top, bottom) bounds in cm.
pub fn parse_depth(label: &str) -> Option<(u32, u32)> {
    let (top, bottom) = label.trim().split_once('-')?;
    let top: u32 = top.trim().parse().ok()?;
    let bottom: u32 = bottom.trim().parse().ok()?;
    (top < bottom).then_some((top, bottom))
}

/// Drop repeated depth labels, keeping the first occurrence of each.
pub fn dedup_depths<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(Into::into)
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that both components are finite and within range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("Latitude must be between -90 and 90, got {}", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!(
                "Longitude must be between -180 and 180, got {}",
                self.lon
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Metadata describing one soil property offered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    /// Provider property name (e.g. `phh2o`, `clay`).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Unit the provider reports raw values in.
    pub unit: String,
    /// Unit after applying the conversion factor.
    pub target_unit: String,
    /// Multiplier from raw to scaled value.
    pub conversion_factor: f64,
    /// Measurement or estimation method.
    pub method: String,
}

impl PropertyInfo {
    /// Creates metadata with a neutral conversion factor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            target_unit: String::new(),
            conversion_factor: 1.0,
            method: "unknown".to_string(),
        }
    }
}

/// One (property, depth) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMeasurement {
    /// Raw value as reported by the provider.
    pub value: f64,
    /// Unit of the raw value.
    pub unit: String,
    /// Confidence interval reported with the value.
    pub confidence: String,
    /// Measurement method.
    pub method: String,
    /// Factor applied to obtain the scaled value.
    pub conversion_factor: f64,
    /// `value * conversion_factor`.
    pub scaled_value: f64,
}

impl PropertyMeasurement {
    /// Build a measurement from a raw reading and the property's metadata.
    pub fn new(
        value: f64,
        unit: Option<String>,
        confidence: Option<String>,
        info: &PropertyInfo,
    ) -> Self {
        let factor = info.conversion_factor;
        let conversion_factor = if factor.is_finite() && factor != 0.0 {
            factor
        } else {
            1.0
        };

        Self {
            value,
            unit: unit
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| info.unit.clone()),
            confidence: confidence
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            method: info.method.clone(),
            conversion_factor,
            scaled_value: value * conversion_factor,
        }
    }
}

/// Result of a single property fetch, kept for the debug payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Success {
        property: String,
        depth: String,
        data: PropertyMeasurement,
    },
    Failure {
        property: String,
        depth: String,
        error: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// A scaled value at a given depth, used for profiles across the soil column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthValue {
    pub depth: String,
    pub value: f64,
}

/// Property × depth measurement matrix for one request.
///
/// Serializes as `{ property: { depth: measurement } }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyGrid {
    depths: Vec<String>,
    cells: BTreeMap<String, BTreeMap<String, PropertyMeasurement>>,
}

impl PropertyGrid {
    /// Creates an empty grid for the requested depth layers. Repeated labels collapse.
    pub fn new(depths: Vec<String>) -> Self {
        Self {
            depths: dedup_depths(depths),
            cells: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, property: &str, depth: &str, measurement: PropertyMeasurement) {
        self.cells
            .entry(property.to_string())
            .or_default()
            .insert(depth.to_string(), measurement);
    }

    pub fn get(&self, property: &str, depth: &str) -> Option<&PropertyMeasurement> {
        self.cells.get(property)?.get(depth)
    }

    /// Scaled value at a depth, if present.
    pub fn value(&self, property: &str, depth: &str) -> Option<f64> {
        self.get(property, depth).map(|m| m.scaled_value)
    }

    /// Scaled value in the top-soil layer.
    pub fn topsoil(&self, property: &str) -> Option<f64> {
        self.value(property, TOPSOIL)
    }

    /// Scaled values across every requested depth that has data, top first.
    pub fn profile(&self, property: &str) -> Vec<DepthValue> {
        self.depths
            .iter()
            .filter_map(|depth| {
                self.value(property, depth).map(|value| DepthValue {
                    depth: depth.clone(),
                    value,
                })
            })
            .collect()
    }

    /// Requested depth layers in request order.
    pub fn depths(&self) -> &[String] {
        &self.depths
    }

    /// Names of properties with at least one measurement.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Number of depths with data for a property.
    pub fn depth_count(&self, property: &str) -> usize {
        self.cells.get(property).map_or(0, |depths| depths.len())
    }

    /// Total number of populated cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for PropertyGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.cells.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(factor: f64) -> PropertyInfo {
        PropertyInfo {
            conversion_factor: factor,
            unit: "g/kg".to_string(),
            ..PropertyInfo::new("clay")
        }
    }

    #[test]
    fn test_parse_depth() {
        assert_eq!(parse_depth("0-5"), Some((0, 5)));
        assert_eq!(parse_depth(" 100-200 "), Some((100, 200)));
        assert_eq!(parse_depth("30-15"), None);
        assert_eq!(parse_depth("topsoil"), None);
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(-26.2041, 28.0473).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -180.5).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_measurement_scaling() {
        let m = PropertyMeasurement::new(300.0, None, Some("90%".to_string()), &info(0.1));
        assert!((m.scaled_value - 30.0).abs() < 1e-9);
        assert_eq!(m.unit, "g/kg");
        assert_eq!(m.confidence, "90%");

        let unscaled = PropertyMeasurement::new(6.4, Some("pH".to_string()), None, &info(0.0));
        assert_eq!(unscaled.conversion_factor, 1.0);
        assert_eq!(unscaled.scaled_value, 6.4);
        assert_eq!(unscaled.confidence, "unknown");
    }

    #[test]
    fn test_grid_profile_follows_request_order() {
        let mut grid = PropertyGrid::new(default_depths());
        grid.insert("soc", "30-60", PropertyMeasurement::new(50.0, None, None, &info(1.0)));
        grid.insert("soc", "0-5", PropertyMeasurement::new(200.0, None, None, &info(1.0)));
        grid.insert("soc", "100-200", PropertyMeasurement::new(10.0, None, None, &info(1.0)));

        let depths: Vec<_> = grid.profile("soc").into_iter().map(|d| d.depth).collect();
        assert_eq!(depths, vec!["0-5", "30-60", "100-200"]);
        assert_eq!(grid.depth_count("soc"), 3);
        assert_eq!(grid.len(), 3);
        assert!(grid.profile("clay").is_empty());
    }

    #[test]
    fn test_repeated_depths_collapse() {
        assert_eq!(
            dedup_depths(["5-15", "0-5", "5-15", "0-5"]),
            vec!["5-15".to_string(), "0-5".to_string()]
        );

        let mut grid = PropertyGrid::new(vec!["0-5".to_string(), "0-5".to_string()]);
        grid.insert("clay", "0-5", PropertyMeasurement::new(30.0, None, None, &info(1.0)));
        assert_eq!(grid.depths().to_vec(), vec!["0-5"]);
        assert_eq!(grid.profile("clay").len(), 1);
    }

    #[test]
    fn test_fetch_outcome_serialization() {
        let failure = FetchOutcome::Failure {
            property: "clay".to_string(),
            depth: "0-5".to_string(),
            error: "timeout".to_string(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["error"], "timeout");
        assert!(json.get("data").is_none());
        assert!(!failure.is_success());
    }
}
