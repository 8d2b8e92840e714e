//! Crop suitability scoring against fixed pH and organic-matter bands.

use crate::derive::DerivedAnalysis;
use serde::Serialize;

/// Requirements for one crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRequirement {
    pub crop: &'static str,
    pub ph_min: f64,
    pub ph_max: f64,
    /// Minimum organic matter, %.
    pub min_organic_matter: f64,
}

pub const CROPS: [CropRequirement; 6] = [
    CropRequirement {
        crop: "maize",
        ph_min: 5.5,
        ph_max: 7.5,
        min_organic_matter: 2.0,
    },
    CropRequirement {
        crop: "wheat",
        ph_min: 6.0,
        ph_max: 7.5,
        min_organic_matter: 1.5,
    },
    CropRequirement {
        crop: "sorghum",
        ph_min: 5.5,
        ph_max: 8.5,
        min_organic_matter: 1.0,
    },
    CropRequirement {
        crop: "soybean",
        ph_min: 6.0,
        ph_max: 7.0,
        min_organic_matter: 2.0,
    },
    CropRequirement {
        crop: "potato",
        ph_min: 4.8,
        ph_max: 6.5,
        min_organic_matter: 2.5,
    },
    CropRequirement {
        crop: "cassava",
        ph_min: 4.5,
        ph_max: 7.0,
        min_organic_matter: 1.0,
    },
];

/// Score a crop: 40 or 20 for pH, plus 30 or 15 for organic matter.
pub fn crop_score(requirement: &CropRequirement, ph: f64, organic_matter: f64) -> u32 {
    let ph_points = if (requirement.ph_min..=requirement.ph_max).contains(&ph) {
        40
    } else {
        20
    };
    let om_points = if organic_matter >= requirement.min_organic_matter {
        30
    } else {
        15
    };
    ph_points + om_points
}

pub fn suitability_label(score: u32) -> &'static str {
    if score > 60 {
        "suitable"
    } else if score > 40 {
        "moderately suitable"
    } else {
        "marginally suitable"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSuitability {
    pub crop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    pub rating: String,
    pub optimal_ph: [f64; 2],
    pub min_organic_matter: f64,
    pub limitations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suitability {
    pub crops: Vec<CropSuitability>,
    pub recommended_crops: Vec<String>,
    pub overall: String,
}

fn assess_crop(
    requirement: &CropRequirement,
    ph: Option<f64>,
    om: Option<f64>,
) -> CropSuitability {
    let (score, rating, limitations) = match (ph, om) {
        (Some(ph), Some(om)) => {
            let score = crop_score(requirement, ph, om);
            let mut limitations = Vec::new();
            if ph < requirement.ph_min {
                limitations.push(format!("pH {:.1} below optimum {:.1}", ph, requirement.ph_min));
            } else if ph > requirement.ph_max {
                limitations.push(format!("pH {:.1} above optimum {:.1}", ph, requirement.ph_max));
            }
            if om < requirement.min_organic_matter {
                limitations.push(format!(
                    "organic matter {:.2}% below {:.1}%",
                    om, requirement.min_organic_matter
                ));
            }
            (Some(score), suitability_label(score).to_string(), limitations)
        }
        _ => (None, "insufficient data".to_string(), Vec::new()),
    };

    CropSuitability {
        crop: requirement.crop.to_string(),
        score,
        rating,
        optimal_ph: [requirement.ph_min, requirement.ph_max],
        min_organic_matter: requirement.min_organic_matter,
        limitations,
    }
}

pub fn assess(analysis: &DerivedAnalysis) -> Suitability {
    let ph = analysis.chemical.ph;
    let om = analysis.biological.organic_matter;

    let crops: Vec<CropSuitability> = CROPS.iter().map(|r| assess_crop(r, ph, om)).collect();

    let recommended_crops = crops
        .iter()
        .filter(|c| c.rating == "suitable")
        .map(|c| c.crop.clone())
        .collect();

    let overall = crops
        .iter()
        .filter_map(|c| c.score)
        .max()
        .map(|best| suitability_label(best).to_string())
        .unwrap_or_else(|| "insufficient data".to_string());

    Suitability {
        crops,
        recommended_crops,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_score_combinations() {
        let maize = &CROPS[0];
        assert_eq!(crop_score(maize, 6.5, 3.0), 70);
        assert_eq!(crop_score(maize, 6.5, 1.0), 55);
        assert_eq!(crop_score(maize, 4.0, 3.0), 50);
        assert_eq!(crop_score(maize, 4.0, 1.0), 35);
    }

    #[test]
    fn test_labels() {
        assert_eq!(suitability_label(70), "suitable");
        assert_eq!(suitability_label(60), "moderately suitable");
        assert_eq!(suitability_label(41), "moderately suitable");
        assert_eq!(suitability_label(40), "marginally suitable");
        assert_eq!(suitability_label(35), "marginally suitable");
    }

    #[test]
    fn test_assess_crop_limitations() {
        let potato = CROPS.iter().find(|c| c.crop == "potato").unwrap();
        let result = assess_crop(potato, Some(7.2), Some(1.2));
        assert_eq!(result.score, Some(35));
        assert_eq!(result.rating, "marginally suitable");
        assert_eq!(result.limitations.len(), 2);
    }

    #[test]
    fn test_missing_inputs() {
        let result = assess_crop(&CROPS[1], None, Some(2.0));
        assert_eq!(result.score, None);
        assert_eq!(result.rating, "insufficient data");
    }
}
