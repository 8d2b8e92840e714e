//! Physical soil properties: texture, bulk density, porosity.

use crate::models::PropertyGrid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Particle density of mineral soil, g/cm³.
const PARTICLE_DENSITY: f64 = 2.65;

/// Soil texture class derived from clay/sand/silt fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureClass {
    Clay,
    #[serde(rename = "Sandy Clay")]
    SandyClay,
    #[serde(rename = "Silty Clay")]
    SiltyClay,
    #[serde(rename = "Sandy Clay Loam")]
    SandyClayLoam,
    #[serde(rename = "Silty Clay Loam")]
    SiltyClayLoam,
    Silt,
    #[serde(rename = "Silt Loam")]
    SiltLoam,
    #[serde(rename = "Sandy Loam")]
    SandyLoam,
    Loam,
    Unknown,
}

impl fmt::Display for TextureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TextureClass::Clay => "Clay",
            TextureClass::SandyClay => "Sandy Clay",
            TextureClass::SiltyClay => "Silty Clay",
            TextureClass::SandyClayLoam => "Sandy Clay Loam",
            TextureClass::SiltyClayLoam => "Silty Clay Loam",
            TextureClass::Silt => "Silt",
            TextureClass::SiltLoam => "Silt Loam",
            TextureClass::SandyLoam => "Sandy Loam",
            TextureClass::Loam => "Loam",
            TextureClass::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Classify texture from clay, sand and silt percentages.
///
/// Rules are checked in order and the first match wins. Any missing
/// fraction yields [`TextureClass::Unknown`].
pub fn texture_class(clay: Option<f64>, sand: Option<f64>, silt: Option<f64>) -> TextureClass {
    let (Some(clay), Some(sand), Some(silt)) = (clay, sand, silt) else {
        return TextureClass::Unknown;
    };

    if clay > 40.0 {
        TextureClass::Clay
    } else if clay >= 27.0 && sand > 45.0 {
        TextureClass::SandyClay
    } else if clay >= 27.0 {
        TextureClass::SiltyClay
    } else if clay > 20.0 && sand > 45.0 {
        TextureClass::SandyClayLoam
    } else if clay > 20.0 {
        TextureClass::SiltyClayLoam
    } else if silt >= 80.0 && clay < 12.0 {
        TextureClass::Silt
    } else if silt >= 50.0 {
        TextureClass::SiltLoam
    } else if sand > 52.0 {
        TextureClass::SandyLoam
    } else if clay >= 7.0 && silt >= 28.0 {
        TextureClass::Loam
    } else {
        TextureClass::Unknown
    }
}

/// Total porosity (%) from bulk density (g/cm³).
pub fn porosity(bulk_density: f64) -> f64 {
    ((1.0 - bulk_density / PARTICLE_DENSITY) * 100.0).clamp(0.0, 100.0)
}

/// Compaction risk label from bulk density (g/cm³).
pub fn compaction_risk(bulk_density: Option<f64>) -> &'static str {
    match bulk_density {
        Some(bd) if bd > 1.6 => "high",
        Some(bd) if bd > 1.4 => "moderate",
        Some(_) => "low",
        None => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureAnalysis {
    pub texture_class: TextureClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sand: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAnalysis {
    pub texture: TextureAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub porosity: Option<f64>,
    pub compaction_risk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coarse_fragments: Option<f64>,
}

pub fn analyze(grid: &PropertyGrid) -> PhysicalAnalysis {
    let clay = grid.topsoil("clay");
    let sand = grid.topsoil("sand");
    let silt = grid.topsoil("silt");
    let bulk_density = grid.topsoil("bdod");

    PhysicalAnalysis {
        texture: TextureAnalysis {
            texture_class: texture_class(clay, sand, silt),
            clay,
            sand,
            silt,
        },
        bulk_density,
        porosity: bulk_density.map(porosity),
        compaction_risk: compaction_risk(bulk_density).to_string(),
        coarse_fragments: grid.topsoil("cfvo"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(clay: f64, sand: f64, silt: f64) -> TextureClass {
        texture_class(Some(clay), Some(sand), Some(silt))
    }

    #[test]
    fn test_texture_rules_in_priority_order() {
        assert_eq!(tc(45.0, 30.0, 25.0), TextureClass::Clay);
        assert_eq!(tc(35.0, 50.0, 15.0), TextureClass::SandyClay);
        assert_eq!(tc(35.0, 20.0, 45.0), TextureClass::SiltyClay);
        assert_eq!(tc(24.0, 55.0, 21.0), TextureClass::SandyClayLoam);
        assert_eq!(tc(24.0, 20.0, 56.0), TextureClass::SiltyClayLoam);
        assert_eq!(tc(5.0, 10.0, 85.0), TextureClass::Silt);
        assert_eq!(tc(15.0, 20.0, 65.0), TextureClass::SiltLoam);
        assert_eq!(tc(10.0, 70.0, 20.0), TextureClass::SandyLoam);
        assert_eq!(tc(18.0, 42.0, 40.0), TextureClass::Loam);
        assert_eq!(tc(5.0, 50.0, 45.0), TextureClass::Unknown);
    }

    #[test]
    fn test_clay_thirty_sand_forty_is_silty_clay() {
        // clay >= 27 with sand <= 45 reaches the third rule.
        assert_eq!(tc(30.0, 40.0, 30.0), TextureClass::SiltyClay);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(tc(40.0, 30.0, 30.0), TextureClass::SiltyClay);
        assert_eq!(tc(27.0, 46.0, 27.0), TextureClass::SandyClay);
        assert_eq!(tc(20.0, 46.0, 34.0), TextureClass::Loam);
        assert_eq!(tc(20.0, 53.0, 27.0), TextureClass::SandyLoam);
    }

    #[test]
    fn test_every_triple_yields_a_class() {
        for clay in (0..=100).step_by(5) {
            for sand in (0..=(100 - clay)).step_by(5) {
                let silt = 100 - clay - sand;
                let class = tc(clay as f64, sand as f64, silt as f64);
                assert!(!class.to_string().is_empty());
            }
        }
    }

    #[test]
    fn test_missing_fraction_is_unknown() {
        assert_eq!(texture_class(Some(30.0), None, Some(30.0)), TextureClass::Unknown);
    }

    #[test]
    fn test_serialized_label() {
        let json = serde_json::to_string(&TextureClass::SandyClayLoam).unwrap();
        assert_eq!(json, "\"Sandy Clay Loam\"");
        assert_eq!(TextureClass::SiltLoam.to_string(), "Silt Loam");
    }

    #[test]
    fn test_porosity_and_compaction() {
        assert!((porosity(1.325) - 50.0).abs() < 1e-9);
        assert_eq!(porosity(3.0), 0.0);
        assert_eq!(compaction_risk(Some(1.7)), "high");
        assert_eq!(compaction_risk(Some(1.5)), "moderate");
        assert_eq!(compaction_risk(Some(1.2)), "low");
        assert_eq!(compaction_risk(None), "unknown");
    }

    #[test]
    fn test_empty_grid() {
        let analysis = analyze(&PropertyGrid::default());
        assert_eq!(analysis.texture.texture_class, TextureClass::Unknown);
        assert!(analysis.porosity.is_none());
        assert_eq!(analysis.compaction_risk, "unknown");
    }
}
