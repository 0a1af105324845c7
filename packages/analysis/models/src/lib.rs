#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Urban growth analysis result types.
//!
//! An [`AnalysisResult`] is the structured answer the AI backend returns for
//! a single location: a title, a summary, key points, a population trend,
//! urban sprawl predictions and predicted growth hotspots. The JSON shape
//! (camelCase field names, `type` on trend points) matches the response
//! schema sent to the backend.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Number of key points requested for every analysis.
pub const KEY_POINT_COUNT: usize = 3;

/// Number of urban sprawl predictions requested for every analysis.
pub const PREDICTION_COUNT: usize = 3;

/// Number of growth hotspots requested for every analysis.
pub const HOTSPOT_COUNT: usize = 3;

/// Full analysis of population growth and urban sprawl for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Page title specific to the analysed location.
    pub title: String,
    /// Short summary of the location's population growth.
    pub summary: String,
    /// Key insights about the growth.
    pub key_points: Vec<KeyPoint>,
    /// Historical and projected population, ascending by year once sorted.
    pub population_trend: Vec<TrendPoint>,
    /// Predictions about the future of urban sprawl.
    pub urban_sprawl_predictions: Vec<Prediction>,
    /// Sub-locations expected to see disproportionate growth.
    pub predicted_hotspots: Vec<Hotspot>,
}

/// A titled insight about the location's growth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPoint {
    /// Short, catchy title.
    pub title: String,
    /// Detailed description.
    pub description: String,
}

/// Whether a trend point is an observation or a forecast.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendKind {
    /// Observed population.
    Historical,
    /// Forecast population.
    Projected,
}

/// One year's population figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Calendar year.
    pub year: i32,
    /// Population for the year.
    pub population: f64,
    /// Observation or forecast.
    #[serde(rename = "type")]
    pub kind: TrendKind,
}

/// A prediction about the future of urban sprawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Short, insightful title.
    pub title: String,
    /// Detailed description.
    pub description: String,
}

/// A predicted high-growth area within the analysed location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Human-readable name (e.g. "East Harbour").
    pub name: String,
    /// Map-searchable query string (e.g. "East Harbour, Toronto, ON").
    pub location_query: String,
    /// Why the area is expected to grow.
    pub reason: String,
}

/// Reasons an [`AnalysisResult`] does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A list field does not have the requested number of entries.
    #[error("expected {expected} {field}, got {actual}")]
    WrongCount {
        /// JSON field name.
        field: &'static str,
        /// Requested number of entries.
        expected: usize,
        /// Number of entries received.
        actual: usize,
    },

    /// The population trend has no points.
    #[error("population trend is empty")]
    EmptyTrend,

    /// Two trend points share the same year.
    #[error("population trend contains year {year} more than once")]
    DuplicateYear {
        /// The repeated year.
        year: i32,
    },

    /// A population figure is negative, NaN or infinite.
    #[error("invalid population {population} for year {year}")]
    InvalidPopulation {
        /// Year of the offending point.
        year: i32,
        /// The offending value.
        population: f64,
    },
}

impl AnalysisResult {
    /// Sorts the population trend ascending by year.
    ///
    /// The backend does not guarantee ordering, so this runs on every
    /// ingested result.
    pub fn sort_trend(&mut self) {
        self.population_trend.sort_by_key(|point| point.year);
    }

    /// Checks the result against the shape requested from the backend.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_count("keyPoints", KEY_POINT_COUNT, self.key_points.len())?;
        check_count(
            "urbanSprawlPredictions",
            PREDICTION_COUNT,
            self.urban_sprawl_predictions.len(),
        )?;
        check_count(
            "predictedHotspots",
            HOTSPOT_COUNT,
            self.predicted_hotspots.len(),
        )?;

        if self.population_trend.is_empty() {
            return Err(ValidationError::EmptyTrend);
        }

        let mut years: Vec<i32> = Vec::with_capacity(self.population_trend.len());
        for point in &self.population_trend {
            if !point.population.is_finite() || point.population < 0.0 {
                return Err(ValidationError::InvalidPopulation {
                    year: point.year,
                    population: point.population,
                });
            }
            if years.contains(&point.year) {
                return Err(ValidationError::DuplicateYear { year: point.year });
            }
            years.push(point.year);
        }

        Ok(())
    }

    /// Returns the hotspot whose `location_query` equals `location` exactly.
    #[must_use]
    pub fn hotspot_for(&self, location: &str) -> Option<&Hotspot> {
        self.predicted_hotspots
            .iter()
            .find(|hotspot| hotspot.location_query == location)
    }

    /// Iterates over the trend points of one kind, in stored order.
    pub fn trend_of(&self, kind: TrendKind) -> impl Iterator<Item = &TrendPoint> {
        self.population_trend
            .iter()
            .filter(move |point| point.kind == kind)
    }
}

const fn check_count(
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ValidationError::WrongCount {
            field,
            expected,
            actual,
        })
    }
}
