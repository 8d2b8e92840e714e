//! Markdown and JSON report generation.
//!
//! This module renders a [`SoilReport`] for the one-shot CLI mode.

use crate::analysis::quality::DataQuality;
use crate::derive::suitability::Suitability;
use crate::derive::DerivedAnalysis;
use crate::report::{ReportMetadata, SoilReport};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SoilReport) -> String {
    let mut output = String::new();

    output.push_str("# SoilScope Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_classification_section(report));
    output.push_str(&generate_properties_section(report));
    output.push_str(&generate_analysis_section(&report.analysis));
    output.push_str(&generate_suitability_section(&report.suitability));
    output.push_str(&generate_quality_section(&report.data_quality));
    output.push_str(&generate_footer());

    output
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Location:** {:.4}, {:.4}\n",
        metadata.latitude, metadata.longitude
    ));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Depths (cm):** {}\n", metadata.depths.join(", ")));
    section.push_str(&format!(
        "- **Provider Requests:** {} ({} succeeded)\n",
        metadata.requests_made, metadata.requests_succeeded
    ));
    if metadata.requests_failed > 0 {
        section.push_str(&format!(
            "- **Requests Failed:** {}\n",
            metadata.requests_failed
        ));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_classification_section(report: &SoilReport) -> String {
    let c = &report.classification;
    let mut section = String::new();

    section.push_str("## Classification\n\n");
    section.push_str("| Soil Type | Texture | Acidity | Fertility |\n");
    section.push_str("|:---|:---|:---|:---|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        c.soil_type, c.texture_class, c.acidity_class, c.fertility_class
    ));
    section.push_str(&format!(
        "*Climate zone: {} ({} hemisphere) | Season: {} | {}*\n\n",
        report.environmental.climate_zone,
        report.environmental.hemisphere,
        report.temporal.season,
        report.temporal.planting_window
    ));

    section
}

/// Property × depth table of scaled values.
fn generate_properties_section(report: &SoilReport) -> String {
    let grid = &report.soil_properties;
    let mut section = String::new();

    section.push_str("## Soil Properties\n\n");

    if grid.is_empty() {
        section.push_str("No measurements were returned by the provider.\n\n");
        return section;
    }

    section.push_str("| Property | Unit |");
    for depth in grid.depths() {
        section.push_str(&format!(" {} cm |", depth));
    }
    section.push_str("\n|:---|:---|");
    for _ in grid.depths() {
        section.push_str(":---:|");
    }
    section.push('\n');

    for property in grid.properties() {
        let unit = report
            .property_metadata
            .get(property)
            .map(|p| p.target_unit.as_str())
            .unwrap_or("");
        section.push_str(&format!("| {} | {} |", property, unit));
        for depth in grid.depths() {
            section.push_str(&format!(" {} |", fmt_opt(grid.value(property, depth), 2)));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_analysis_section(analysis: &DerivedAnalysis) -> String {
    let mut section = String::new();
    let physical = &analysis.physical;
    let chemical = &analysis.chemical;
    let biological = &analysis.biological;
    let hydrological = &analysis.hydrological;
    let structural = &analysis.structural;

    section.push_str("## Analysis\n\n");

    section.push_str("### Physical\n\n");
    section.push_str(&format!(
        "- Texture: **{}** (clay {}%, sand {}%, silt {}%)\n",
        physical.texture.texture_class,
        fmt_opt(physical.texture.clay, 1),
        fmt_opt(physical.texture.sand, 1),
        fmt_opt(physical.texture.silt, 1)
    ));
    section.push_str(&format!(
        "- Bulk density: {} g/cm³, porosity {}%, compaction risk {}\n\n",
        fmt_opt(physical.bulk_density, 2),
        fmt_opt(physical.porosity, 1),
        physical.compaction_risk
    ));

    section.push_str("### Chemical\n\n");
    section.push_str(&format!(
        "- pH: {} ({})\n",
        fmt_opt(chemical.ph, 1),
        chemical.ph_classification
    ));
    section.push_str(&format!(
        "- CEC: {} cmol(c)/kg ({})\n",
        fmt_opt(chemical.cec, 1),
        chemical.cec_class
    ));
    for (nutrient, level) in &chemical.nutrients {
        section.push_str(&format!("- {}: {:?}\n", nutrient, level).to_lowercase());
    }
    section.push('\n');

    section.push_str("### Biological\n\n");
    section.push_str(&format!(
        "- Organic matter: {}% (carbon class {})\n",
        fmt_opt(biological.organic_matter, 2),
        biological.carbon_class
    ));
    section.push_str(&format!(
        "- Biological activity index: {}\n",
        fmt_opt(biological.biological_activity_index, 0)
    ));
    section.push_str(&format!(
        "- Carbon sequestration potential: {}\n\n",
        biological.carbon_sequestration_potential
    ));

    section.push_str("### Hydrological\n\n");
    match hydrological.water_retention {
        Some(wr) => section.push_str(&format!(
            "- Field capacity {:.1}%, wilting point {:.1}%, available water {:.1}%\n",
            wr.field_capacity, wr.wilting_point, wr.available_water
        )),
        None => section.push_str("- Water retention: N/A\n"),
    }
    section.push_str(&format!(
        "- Drainage: {}, infiltration: {}\n\n",
        hydrological.drainage_class, hydrological.infiltration_rate
    ));

    section.push_str("### Structural\n\n");
    section.push_str(&format!(
        "- Aggregate stability: {} ({})\n",
        fmt_opt(structural.aggregate_stability, 0),
        structural.stability_class
    ));
    section.push_str(&format!(
        "- Erosion risk: {}, workability: {}\n\n",
        structural.erosion_risk, structural.workability
    ));

    section
}

fn generate_suitability_section(suitability: &Suitability) -> String {
    let mut section = String::new();

    section.push_str("## Crop Suitability\n\n");
    section.push_str("| Crop | Score | Rating | Limitations |\n");
    section.push_str("|:---|:---:|:---|:---|\n");

    for crop in &suitability.crops {
        let score = crop
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let limitations = if crop.limitations.is_empty() {
            "-".to_string()
        } else {
            crop.limitations.join("; ")
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            crop.crop, score, crop.rating, limitations
        ));
    }
    section.push('\n');

    if !suitability.recommended_crops.is_empty() {
        section.push_str(&format!(
            "**Recommended:** {}\n\n",
            suitability.recommended_crops.join(", ")
        ));
    }

    section
}

fn generate_quality_section(quality: &DataQuality) -> String {
    let mut section = String::new();

    section.push_str("## Data Quality\n\n");
    section.push_str(&format!(
        "- Completeness: {:.0}% ({} reliability)\n",
        quality.completeness * 100.0,
        quality.reliability
    ));
    section.push_str(&format!(
        "- Measurements: {} of {} expected\n\n",
        quality.measurements_received, quality.measurements_expected
    ));

    for (i, rec) in quality.recommendations.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "*Report generated by SoilScope. Environmental and seasonal context \
         are static lookups, not measurements.*\n",
    );

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SoilReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::build_grid;
    use crate::analysis::Aggregation;
    use crate::models::{Coordinates, FetchOutcome, PropertyInfo, PropertyMeasurement};
    use crate::report::assemble;
    use chrono::Utc;

    fn create_test_report(values: &[(&str, f64)]) -> SoilReport {
        let properties: Vec<PropertyInfo> =
            values.iter().map(|(n, _)| PropertyInfo::new(*n)).collect();
        let depths = vec!["0-5".to_string(), "5-15".to_string()];
        let outcomes: Vec<FetchOutcome> = values
            .iter()
            .zip(&properties)
            .map(|((name, value), info)| FetchOutcome::Success {
                property: name.to_string(),
                depth: "0-5".to_string(),
                data: PropertyMeasurement::new(*value, None, None, info),
            })
            .collect();
        let (grid, succeeded, failed) = build_grid(&outcomes, &depths);

        assemble(
            Aggregation {
                grid,
                properties,
                outcomes,
                succeeded,
                failed,
            },
            Coordinates::new(-26.2041, 28.0473),
            false,
            Utc::now(),
            1.2,
        )
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(&[
            ("clay", 30.0),
            ("sand", 40.0),
            ("silt", 30.0),
            ("phh2o", 6.1),
            ("soc", 1.8),
        ]);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# SoilScope Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Soil Properties"));
        assert!(markdown.contains("Silty Clay"));
        assert!(markdown.contains("moderately acidic"));
        assert!(markdown.contains("| maize |"));
        assert!(markdown.contains("## Data Quality"));
    }

    #[test]
    fn test_markdown_with_no_measurements() {
        let report = create_test_report(&[]);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("No measurements were returned"));
        assert!(markdown.contains("Water retention: N/A"));
        assert!(markdown.contains("insufficient data"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(&[("clay", 30.0)]);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"soilProperties\""));
        assert!(json.contains("\"dataQuality\""));
        assert!(!json.contains("\"raw\""));
    }
}
