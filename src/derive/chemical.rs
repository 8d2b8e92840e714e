//! Chemical soil properties: acidity, exchange capacity, nutrients.

use crate::models::{DepthValue, PropertyGrid};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Nutrients with adequacy thresholds, in the order they are reported.
pub const NUTRIENTS: [&str; 3] = ["nitrogen", "phosphorus", "potassium"];

/// Six ordered pH bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcidityClass {
    #[serde(rename = "extremely acidic")]
    ExtremelyAcidic,
    #[serde(rename = "strongly acidic")]
    StronglyAcidic,
    #[serde(rename = "moderately acidic")]
    ModeratelyAcidic,
    Neutral,
    #[serde(rename = "moderately alkaline")]
    ModeratelyAlkaline,
    #[serde(rename = "strongly alkaline")]
    StronglyAlkaline,
}

impl fmt::Display for AcidityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcidityClass::ExtremelyAcidic => "extremely acidic",
            AcidityClass::StronglyAcidic => "strongly acidic",
            AcidityClass::ModeratelyAcidic => "moderately acidic",
            AcidityClass::Neutral => "neutral",
            AcidityClass::ModeratelyAlkaline => "moderately alkaline",
            AcidityClass::StronglyAlkaline => "strongly alkaline",
        };
        write!(f, "{}", label)
    }
}

/// Classify a pH value. Boundaries belong to the band above them.
pub fn classify_acidity(ph: f64) -> AcidityClass {
    if ph < 4.5 {
        AcidityClass::ExtremelyAcidic
    } else if ph < 5.5 {
        AcidityClass::StronglyAcidic
    } else if ph < 6.5 {
        AcidityClass::ModeratelyAcidic
    } else if ph < 7.3 {
        AcidityClass::Neutral
    } else if ph < 8.5 {
        AcidityClass::ModeratelyAlkaline
    } else {
        AcidityClass::StronglyAlkaline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientLevel {
    Low,
    Adequate,
    High,
    Unknown,
}

/// Adequacy of a nutrient value.
///
/// Nitrogen is in g/kg, phosphorus and potassium in mg/kg. Names without
/// thresholds classify as [`NutrientLevel::Unknown`].
pub fn nutrient_status(nutrient: &str, value: f64) -> NutrientLevel {
    let (low, adequate) = match nutrient {
        "nitrogen" => (1.0, 2.0),
        "phosphorus" => (15.0, 30.0),
        "potassium" => (100.0, 200.0),
        _ => return NutrientLevel::Unknown,
    };

    if value < low {
        NutrientLevel::Low
    } else if value < adequate {
        NutrientLevel::Adequate
    } else {
        NutrientLevel::High
    }
}

/// Cation exchange capacity class, cmol(c)/kg.
pub fn cec_class(cec: Option<f64>) -> &'static str {
    match cec {
        Some(v) if v < 10.0 => "low",
        Some(v) if v < 25.0 => "moderate",
        Some(_) => "high",
        None => "N/A",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    /// Acidity band label, or "N/A" without a pH reading.
    pub ph_classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cec: Option<f64>,
    pub cec_class: String,
    pub nutrients: BTreeMap<String, NutrientLevel>,
    pub ph_profile: Vec<DepthValue>,
}

pub fn analyze(grid: &PropertyGrid) -> ChemicalAnalysis {
    let ph = grid.topsoil("phh2o");
    let cec = grid.topsoil("cec");

    let nutrients = NUTRIENTS
        .iter()
        .filter_map(|name| {
            grid.topsoil(name)
                .map(|value| (name.to_string(), nutrient_status(name, value)))
        })
        .collect();

    ChemicalAnalysis {
        ph,
        ph_classification: ph
            .map(|v| classify_acidity(v).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        cec,
        cec_class: cec_class(cec).to_string(),
        nutrients,
        ph_profile: grid.profile("phh2o"),
    }
}
