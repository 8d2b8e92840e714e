//! Derivation engine.
//!
//! Pure functions over a [`PropertyGrid`]: no network or storage access.
//! Every function tolerates missing cells and falls back to omitted fields,
//! "N/A" or "unknown" labels instead of failing.

pub mod biological;
pub mod chemical;
pub mod classification;
pub mod context;
pub mod hydrological;
pub mod physical;
pub mod structural;
pub mod suitability;

use crate::models::PropertyGrid;
use serde::Serialize;

/// The five analysis groups computed for one grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedAnalysis {
    pub physical: physical::PhysicalAnalysis,
    pub chemical: chemical::ChemicalAnalysis,
    pub biological: biological::BiologicalAnalysis,
    pub hydrological: hydrological::HydrologicalAnalysis,
    pub structural: structural::StructuralAnalysis,
}

pub fn derive_analysis(grid: &PropertyGrid) -> DerivedAnalysis {
    DerivedAnalysis {
        physical: physical::analyze(grid),
        chemical: chemical::analyze(grid),
        biological: biological::analyze(grid),
        hydrological: hydrological::analyze(grid),
        structural: structural::analyze(grid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_depths, PropertyInfo, PropertyMeasurement};

    fn grid_without_ph() -> PropertyGrid {
        let mut grid = PropertyGrid::new(default_depths());
        for (name, value) in [("clay", 22.0), ("sand", 50.0), ("silt", 28.0), ("soc", 1.2)] {
            for depth in ["0-5", "5-15"] {
                grid.insert(
                    name,
                    depth,
                    PropertyMeasurement::new(value, None, None, &PropertyInfo::new(name)),
                );
            }
        }
        grid
    }

    #[test]
    fn test_missing_property_degrades_gracefully() {
        let analysis = derive_analysis(&grid_without_ph());

        assert_eq!(analysis.chemical.ph, None);
        assert_eq!(analysis.chemical.ph_classification, "N/A");
        assert!(analysis.chemical.ph_profile.is_empty());
        // Activity index still computed, without the pH adjustment.
        let index = analysis.biological.biological_activity_index.unwrap();
        assert!((index - 1.2 * 1.72 * 10.0).abs() < 1e-9);
        assert_eq!(
            analysis.physical.texture.texture_class,
            physical::TextureClass::SandyClayLoam
        );

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["chemical"].get("ph").is_none());
        assert_eq!(json["chemical"]["phClassification"], "N/A");
        assert_eq!(json["physical"]["texture"]["textureClass"], "Sandy Clay Loam");
    }

    #[test]
    fn test_empty_grid_never_panics() {
        let analysis = derive_analysis(&PropertyGrid::default());
        let classification = classification::classify(&analysis);
        let suitability = suitability::assess(&analysis);

        assert_eq!(classification.fertility_class, "unknown");
        assert_eq!(suitability.overall, "insufficient data");
        assert!(suitability.recommended_crops.is_empty());
        assert!(analysis.hydrological.water_retention.is_none());
    }

    #[test]
    fn test_only_topsoil_is_read() {
        let mut grid = PropertyGrid::new(default_depths());
        grid.insert(
            "phh2o",
            "5-15",
            PropertyMeasurement::new(6.8, None, None, &PropertyInfo::new("phh2o")),
        );

        let analysis = derive_analysis(&grid);
        assert_eq!(analysis.chemical.ph, None);
        assert_eq!(analysis.chemical.ph_profile.len(), 1);
    }
}
