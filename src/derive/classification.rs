//! Overall soil classification built from the derived analysis groups.

use crate::derive::chemical::NutrientLevel;
use crate::derive::physical::TextureClass;
use crate::derive::DerivedAnalysis;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilClassification {
    pub texture_class: TextureClass,
    pub acidity_class: String,
    pub fertility_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fertility_score: Option<f64>,
    pub soil_type: String,
}

/// Fertility score in [0, 1] over whichever indicators are available.
///
/// CEC and organic matter weigh two points each, every nutrient one.
pub fn fertility_score(analysis: &DerivedAnalysis) -> Option<f64> {
    let mut points = 0.0;
    let mut possible = 0.0;

    if let Some(cec) = analysis.chemical.cec {
        possible += 2.0;
        points += if cec >= 25.0 {
            2.0
        } else if cec >= 10.0 {
            1.0
        } else {
            0.0
        };
    }

    if let Some(om) = analysis.biological.organic_matter {
        possible += 2.0;
        points += if om >= 3.0 {
            2.0
        } else if om >= 1.5 {
            1.0
        } else {
            0.0
        };
    }

    for level in analysis.chemical.nutrients.values() {
        possible += 1.0;
        if matches!(level, NutrientLevel::Adequate | NutrientLevel::High) {
            points += 1.0;
        }
    }

    (possible > 0.0).then(|| points / possible)
}

pub fn fertility_class(score: Option<f64>) -> &'static str {
    match score {
        Some(s) if s >= 0.7 => "high",
        Some(s) if s >= 0.4 => "moderate",
        Some(_) => "low",
        None => "unknown",
    }
}

pub fn classify(analysis: &DerivedAnalysis) -> SoilClassification {
    let texture_class = analysis.physical.texture.texture_class;
    let acidity_class = analysis.chemical.ph_classification.clone();
    let score = fertility_score(analysis);

    let soil_type = match (texture_class, analysis.chemical.ph.is_some()) {
        (TextureClass::Unknown, _) => "Unclassified".to_string(),
        (texture, true) => format!("{} ({})", texture, acidity_class),
        (texture, false) => texture.to_string(),
    };

    SoilClassification {
        texture_class,
        acidity_class,
        fertility_class: fertility_class(score).to_string(),
        fertility_score: score,
        soil_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_analysis;
    use crate::models::{default_depths, PropertyGrid, PropertyInfo, PropertyMeasurement};

    fn grid(values: &[(&str, f64)]) -> PropertyGrid {
        let mut grid = PropertyGrid::new(default_depths());
        for (name, value) in values {
            grid.insert(
                name,
                "0-5",
                PropertyMeasurement::new(*value, None, None, &PropertyInfo::new(*name)),
            );
        }
        grid
    }

    #[test]
    fn test_full_classification() {
        let analysis = derive_analysis(&grid(&[
            ("clay", 30.0),
            ("sand", 40.0),
            ("silt", 30.0),
            ("phh2o", 6.2),
            ("cec", 18.0),
            ("soc", 2.0),
            ("nitrogen", 1.4),
        ]));
        let classification = classify(&analysis);

        assert_eq!(classification.texture_class, TextureClass::SiltyClay);
        assert_eq!(classification.acidity_class, "moderately acidic");
        assert_eq!(classification.soil_type, "Silty Clay (moderately acidic)");
        // cec 1/2, om 3.44 -> 2/2, nitrogen adequate 1/1
        assert_eq!(classification.fertility_score, Some(0.8));
        assert_eq!(classification.fertility_class, "high");
    }

    #[test]
    fn test_empty_classification() {
        let classification = classify(&derive_analysis(&PropertyGrid::default()));
        assert_eq!(classification.soil_type, "Unclassified");
        assert_eq!(classification.fertility_class, "unknown");
        assert_eq!(classification.fertility_score, None);
        assert_eq!(classification.acidity_class, "N/A");
    }
}
