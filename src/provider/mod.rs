//! Soil property provider access.
//!
//! The provider is reached through the [`SoilDataSource`] trait so the
//! aggregator can run against the real HTTP client or an in-process fake.

pub mod catalog;
pub mod client;

pub use client::{ProviderError, SoilApiClient};

use crate::models::{Coordinates, FetchOutcome, PropertyInfo, PropertyMeasurement};
use async_trait::async_trait;
use tracing::debug;

/// A raw provider answer for one (property, depth) query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReading {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub confidence: Option<String>,
}

/// An authenticated source of soil property readings.
#[async_trait]
pub trait SoilDataSource: Send + Sync {
    /// Log in and return a bearer token.
    async fn authenticate(&self) -> Result<String, ProviderError>;

    /// Properties the provider advertises.
    async fn list_properties(&self, token: &str) -> Result<Vec<PropertyInfo>, ProviderError>;

    /// Query a single property at a single depth.
    async fn fetch_reading(
        &self,
        token: &str,
        coords: Coordinates,
        property: &str,
        depth: &str,
    ) -> Result<RawReading, ProviderError>;
}

/// Fetch one (property, depth) cell and normalize it into a [`FetchOutcome`].
///
/// Transport errors and null values become failures; they never propagate.
pub async fn fetch_property<S: SoilDataSource + ?Sized>(
    source: &S,
    token: &str,
    coords: Coordinates,
    info: &PropertyInfo,
    depth: &str,
) -> FetchOutcome {
    let result = source
        .fetch_reading(token, coords, &info.name, depth)
        .await
        .and_then(|reading| match reading.value {
            Some(value) if value.is_finite() => Ok(PropertyMeasurement::new(
                value,
                reading.unit,
                reading.confidence,
                info,
            )),
            _ => Err(ProviderError::MissingValue {
                property: info.name.clone(),
                depth: depth.to_string(),
            }),
        });

    match result {
        Ok(data) => FetchOutcome::Success {
            property: info.name.clone(),
            depth: depth.to_string(),
            data,
        },
        Err(e) => {
            debug!("Fetch of {} at {} failed: {}", info.name, depth, e);
            FetchOutcome::Failure {
                property: info.name.clone(),
                depth: depth.to_string(),
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process provider fakes shared by tests across modules.

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A provider answering from a fixed (property, depth) → raw value table.
    pub struct FakeSource {
        pub readings: HashMap<(String, String), Option<f64>>,
        pub properties: Option<Vec<PropertyInfo>>,
        pub auth_error: Option<ProviderError>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub fn new() -> Self {
            Self {
                readings: HashMap::new(),
                properties: None,
                auth_error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with(mut self, property: &str, depth: &str, value: Option<f64>) -> Self {
            self.readings
                .insert((property.to_string(), depth.to_string()), value);
            self
        }

        /// Advertise these properties with a conversion factor of 1.
        pub fn advertising(mut self, names: &[&str]) -> Self {
            self.properties = Some(names.iter().map(|n| PropertyInfo::new(*n)).collect());
            self
        }

        pub fn failing_auth(mut self, error: ProviderError) -> Self {
            self.auth_error = Some(error);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SoilDataSource for FakeSource {
        async fn authenticate(&self) -> Result<String, ProviderError> {
            match &self.auth_error {
                Some(e) => Err(e.clone()),
                None => Ok("test-token".to_string()),
            }
        }

        async fn list_properties(&self, _token: &str) -> Result<Vec<PropertyInfo>, ProviderError> {
            self.properties.clone().ok_or(ProviderError::Http {
                status: 404,
                body: "no layer listing".to_string(),
            })
        }

        async fn fetch_reading(
            &self,
            token: &str,
            _coords: Coordinates,
            property: &str,
            depth: &str,
        ) -> Result<RawReading, ProviderError> {
            assert_eq!(token, "test-token");
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.readings.get(&(property.to_string(), depth.to_string())) {
                Some(value) => Ok(RawReading {
                    value: *value,
                    unit: None,
                    confidence: Some("90%".to_string()),
                }),
                None => Err(ProviderError::Http {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;

    #[tokio::test]
    async fn test_fetch_property_success() {
        let source = FakeSource::new().with("clay", "0-5", Some(300.0));
        let info = PropertyInfo {
            conversion_factor: 0.1,
            ..PropertyInfo::new("clay")
        };

        let outcome = fetch_property(&source, "test-token", Coordinates::new(0.0, 0.0), &info, "0-5").await;
        match outcome {
            FetchOutcome::Success { data, .. } => {
                assert!((data.scaled_value - 30.0).abs() < 1e-9);
                assert_eq!(data.confidence, "90%");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_value_is_failure_not_zero() {
        let source = FakeSource::new().with("soc", "0-5", None);
        let info = PropertyInfo::new("soc");

        let outcome = fetch_property(&source, "test-token", Coordinates::new(0.0, 0.0), &info, "0-5").await;
        match outcome {
            FetchOutcome::Failure { error, .. } => assert!(error.contains("no value")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_is_absorbed() {
        let source = FakeSource::new();
        let info = PropertyInfo::new("cec");

        let outcome = fetch_property(&source, "test-token", Coordinates::new(0.0, 0.0), &info, "5-15").await;
        assert!(!outcome.is_success());
        assert_eq!(source.call_count(), 1);
    }
}
