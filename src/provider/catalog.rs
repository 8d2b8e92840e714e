//! Built-in soil property catalog.
//!
//! Used when the provider's layer listing cannot be retrieved, and by
//! `--dry-run` to print the fetch plan without touching the network.

use crate::models::PropertyInfo;

/// (name, description, unit, target unit, conversion factor, method)
const CATALOG: [(&str, &str, &str, &str, f64, &str); 12] = [
    (
        "bdod",
        "Bulk density of the fine earth fraction",
        "cg/cm3",
        "g/cm3",
        0.01,
        "digital soil mapping",
    ),
    (
        "cec",
        "Cation exchange capacity at pH 7",
        "mmol(c)/kg",
        "cmol(c)/kg",
        0.1,
        "ammonium acetate",
    ),
    (
        "cfvo",
        "Volumetric fraction of coarse fragments (> 2 mm)",
        "cm3/dm3",
        "%",
        0.1,
        "digital soil mapping",
    ),
    (
        "clay",
        "Proportion of clay particles (< 0.002 mm)",
        "g/kg",
        "%",
        0.1,
        "pipette",
    ),
    (
        "nitrogen",
        "Total nitrogen",
        "cg/kg",
        "g/kg",
        0.01,
        "kjeldahl",
    ),
    (
        "ocd",
        "Organic carbon density",
        "hg/m3",
        "kg/m3",
        0.1,
        "digital soil mapping",
    ),
    (
        "phh2o",
        "Soil pH in water",
        "pHx10",
        "pH",
        0.1,
        "1:1 soil-water suspension",
    ),
    (
        "sand",
        "Proportion of sand particles (> 0.05 mm)",
        "g/kg",
        "%",
        0.1,
        "sieving",
    ),
    (
        "silt",
        "Proportion of silt particles (0.002-0.05 mm)",
        "g/kg",
        "%",
        0.1,
        "pipette",
    ),
    (
        "soc",
        "Soil organic carbon content",
        "dg/kg",
        "%",
        0.01,
        "walkley-black",
    ),
    (
        "phosphorus",
        "Extractable phosphorus",
        "mg/kg",
        "mg/kg",
        1.0,
        "mehlich-3",
    ),
    (
        "potassium",
        "Extractable potassium",
        "mg/kg",
        "mg/kg",
        1.0,
        "mehlich-3",
    ),
];

/// Returns the built-in property catalog.
pub fn default_properties() -> Vec<PropertyInfo> {
    CATALOG
        .iter()
        .map(
            |(name, description, unit, target_unit, factor, method)| PropertyInfo {
                name: name.to_string(),
                description: description.to_string(),
                unit: unit.to_string(),
                target_unit: target_unit.to_string(),
                conversion_factor: *factor,
                method: method.to_string(),
            },
        )
        .collect()
}

/// Looks up a property in the built-in catalog.
pub fn lookup(name: &str) -> Option<PropertyInfo> {
    default_properties().into_iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_derivation_inputs() {
        let names: Vec<String> = default_properties().into_iter().map(|p| p.name).collect();
        for required in ["clay", "sand", "silt", "phh2o", "soc", "bdod", "cec", "nitrogen"] {
            assert!(names.contains(&required.to_string()), "missing {}", required);
        }
    }

    #[test]
    fn test_lookup() {
        let ph = lookup("phh2o").unwrap();
        assert_eq!(ph.conversion_factor, 0.1);
        assert_eq!(ph.target_unit, "pH");
        assert!(lookup("unobtainium").is_none());
    }
}
