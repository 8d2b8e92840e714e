//! Static environmental and seasonal context for a location.
//!
//! Nothing here is measured; it is a lookup from latitude and date.

use crate::models::Coordinates;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalContext {
    pub latitude: f64,
    pub longitude: f64,
    pub hemisphere: String,
    pub climate_zone: String,
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalContext {
    pub analysis_date: DateTime<Utc>,
    pub month: u32,
    pub season: String,
    pub planting_window: String,
}

pub fn hemisphere(lat: f64) -> &'static str {
    if lat < 0.0 {
        "southern"
    } else {
        "northern"
    }
}

/// Broad climate zone from absolute latitude.
pub fn climate_zone(lat: f64) -> &'static str {
    let lat = lat.abs();
    if lat < 23.5 {
        "tropical"
    } else if lat < 35.0 {
        "subtropical"
    } else if lat < 55.0 {
        "temperate"
    } else if lat < 66.5 {
        "subarctic"
    } else {
        "polar"
    }
}

/// Meteorological season for a month (1-12) at a latitude.
pub fn season(month: u32, lat: f64) -> &'static str {
    let northern = match month {
        12 | 1 | 2 => "winter",
        3..=5 => "spring",
        6..=8 => "summer",
        _ => "autumn",
    };
    if lat >= 0.0 {
        return northern;
    }
    match northern {
        "winter" => "summer",
        "spring" => "autumn",
        "summer" => "winter",
        _ => "spring",
    }
}

fn planting_window(season: &str, climate_zone: &str) -> &'static str {
    match (climate_zone, season) {
        ("tropical", _) => "rain-fed planting follows the local wet season",
        (_, "spring") => "main planting window",
        (_, "summer") => "in-season; late plantings only",
        (_, "autumn") => "harvest and winter cover crops",
        _ => "off-season; plan soil amendments",
    }
}

pub fn environmental(coords: Coordinates) -> EnvironmentalContext {
    EnvironmentalContext {
        latitude: coords.lat,
        longitude: coords.lon,
        hemisphere: hemisphere(coords.lat).to_string(),
        climate_zone: climate_zone(coords.lat).to_string(),
        data_source: "static latitude lookup".to_string(),
    }
}

pub fn temporal(coords: Coordinates, now: DateTime<Utc>) -> TemporalContext {
    let month = now.month();
    let season = season(month, coords.lat);

    TemporalContext {
        analysis_date: now,
        month,
        season: season.to_string(),
        planting_window: planting_window(season, climate_zone(coords.lat)).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_climate_zone() {
        assert_eq!(climate_zone(-26.2041), "subtropical");
        assert_eq!(climate_zone(1.3), "tropical");
        assert_eq!(climate_zone(52.0), "temperate");
        assert_eq!(climate_zone(-70.0), "polar");
    }

    #[test]
    fn test_seasons_flip_by_hemisphere() {
        assert_eq!(season(1, 40.0), "winter");
        assert_eq!(season(1, -26.0), "summer");
        assert_eq!(season(10, 40.0), "autumn");
        assert_eq!(season(10, -26.0), "spring");
        assert_eq!(season(7, -26.0), "winter");
    }

    #[test]
    fn test_temporal_context() {
        let now = Utc.with_ymd_and_hms(2024, 10, 5, 12, 0, 0).unwrap();
        let context = temporal(Coordinates::new(-26.2041, 28.0473), now);

        assert_eq!(context.month, 10);
        assert_eq!(context.season, "spring");
        assert_eq!(context.planting_window, "main planting window");
    }

    #[test]
    fn test_environmental_context() {
        let context = environmental(Coordinates::new(-26.2041, 28.0473));
        assert_eq!(context.hemisphere, "southern");
        assert_eq!(context.climate_zone, "subtropical");
    }
}
