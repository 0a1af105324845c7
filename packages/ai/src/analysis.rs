//! Structured urban growth analysis requests.
//!
//! Builds the analyst prompt and response schema for a location, sends them
//! through an [`LlmProvider`], then parses, validates and normalises the
//! JSON answer into an [`AnalysisResult`].

use chrono::Datelike as _;
use thiserror::Error;
use urbis_analysis_models::{AnalysisResult, HOTSPOT_COUNT, KEY_POINT_COUNT, PREDICTION_COUNT};

use crate::AiError;
use crate::providers::{GenerateRequest, LlmProvider, Message};

/// Number of historical (and, separately, projected) years requested.
pub const TREND_YEARS_EACH_WAY: i32 = 5;

const SPRAWL_CONTEXT: &str = "Predicting urban sprawl is a complex task that involves analyzing various factors and trends related to urban development. It is essential to consider a wide range of indicators and factors that can influence the extent and patterns of urban expansion. These indicators are typically derived from various data sources, including demographic, economic, environmental, and spatial data. Key indicators include population growth, economic indicators (job growth, income levels), Land Use and Land Cover (LULC), transportation infrastructure, zoning regulations, local politics, and proximity to services and natural features.";

/// User-facing analysis failures.
///
/// The `Display` text of each variant is safe to show directly to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The backend answered with a blank payload.
    #[error("The AI service returned an empty response. Please try again.")]
    EmptyResponse,

    /// The API key is absent or was rejected.
    #[error(
        "The API key is invalid or missing. Please ensure it is configured correctly in your environment."
    )]
    InvalidCredentials,

    /// Network failure, malformed or mismatched JSON, rate limiting, etc.
    #[error("Failed to retrieve population data due to a network or API error. Please try again.")]
    Transport,
}

impl From<AiError> for AnalysisError {
    fn from(err: AiError) -> Self {
        if err.is_credential_error() {
            Self::InvalidCredentials
        } else {
            Self::Transport
        }
    }
}

/// Builds the analyst prompt for `location`.
///
/// `current_year` anchors the historical/projected split of the trend.
#[must_use]
pub fn build_prompt(location: &str, current_year: i32) -> String {
    let first_year = current_year - TREND_YEARS_EACH_WAY + 1;
    let last_year = current_year + TREND_YEARS_EACH_WAY;

    format!(
        r#"Act as an expert urban planning analyst for the Greater Toronto Area.
Based on the provided context about predicting urban sprawl, generate a detailed analysis for {location}. If the location is 'Greater Toronto Area', provide data for the entire region.

Context on Urban Sprawl Prediction:
"{SPRAWL_CONTEXT}"

Your analysis must include:
1. A main title for the page, specific to {location}.
2. A concise summary (around 50-70 words) about {location}'s population growth.
3. Exactly {KEY_POINT_COUNT} key points, each with a short, catchy title and a detailed description (around 30-40 words each) relevant to {location}, covering:
   - The main drivers of growth.
   - The impact on local infrastructure and housing.
   - Future population projections and trends.
4. Historical population data for the last {TREND_YEARS_EACH_WAY} years and projected data for the next {TREND_YEARS_EACH_WAY} years for a chart, covering every year from {first_year} to {last_year} exactly once. Years up to and including {current_year} are 'historical'; later years are 'projected'. For each year, provide the year, population, and whether the data is 'historical' or 'projected'.
5. Exactly {PREDICTION_COUNT} predictions about the future of urban sprawl in {location}, based on the context provided. Each prediction needs a short, insightful title and a detailed description (around 40-50 words).
6. Exactly {HOTSPOT_COUNT} predicted growth hotspots for the next 10 years. These predictions must be hyper-realistic and well-founded. Crucially, they must be STRICTLY WITHIN the geographical boundaries of {location}. Do not suggest locations in adjacent municipalities. For each hotspot, provide:
   - 'name': A human-readable name for the area (e.g., "East Harbour").
   - 'locationQuery': A highly specific, Google Maps-searchable string for the location (e.g., "East Harbour, Toronto, ON" or "Don Roadway and Lake Shore Boulevard East, Toronto"). This is critical for map accuracy.
   - 'reason': A detailed explanation of why this specific area will experience significant growth. Your reasoning MUST be grounded in the principles from the 'Context on Urban Sprawl Prediction' provided above. Explicitly consider factors like local zoning laws, political initiatives, major transit projects (like new subway lines), housing availability/affordability, and the potential for redevelopment of underutilized land.

Return the entire response as a single JSON object."#
    )
}

fn titled_item(what: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": format!("The title of the {what}.") },
            "description": { "type": "STRING", "description": format!("The detailed description of the {what}.") }
        },
        "required": ["title", "description"]
    })
}

/// Response schema describing [`AnalysisResult`] to the backend.
#[must_use]
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "The main title for the web page."
            },
            "summary": {
                "type": "STRING",
                "description": "A brief summary of the location's population growth."
            },
            "keyPoints": {
                "type": "ARRAY",
                "description": "A list of key insights about the population growth.",
                "items": titled_item("key point")
            },
            "populationTrend": {
                "type": "ARRAY",
                "description": "Historical and projected population data for the location.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "year": { "type": "INTEGER", "description": "The year." },
                        "population": { "type": "NUMBER", "description": "The population number." },
                        "type": {
                            "type": "STRING",
                            "description": "Either 'historical' or 'projected'.",
                            "enum": ["historical", "projected"]
                        }
                    },
                    "required": ["year", "population", "type"]
                }
            },
            "urbanSprawlPredictions": {
                "type": "ARRAY",
                "description": "Predictions about the future of urban sprawl.",
                "items": titled_item("prediction")
            },
            "predictedHotspots": {
                "type": "ARRAY",
                "description": "Predicted high-growth neighborhoods or areas for the next 10 years.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {
                            "type": "STRING",
                            "description": "The human-readable name of the hotspot area (e.g., a neighborhood)."
                        },
                        "locationQuery": {
                            "type": "STRING",
                            "description": "A highly specific, searchable string for Google Maps."
                        },
                        "reason": {
                            "type": "STRING",
                            "description": "The detailed reason for the predicted growth."
                        }
                    },
                    "required": ["name", "locationQuery", "reason"]
                }
            }
        },
        "required": [
            "title",
            "summary",
            "keyPoints",
            "populationTrend",
            "urbanSprawlPredictions",
            "predictedHotspots"
        ]
    })
}

/// Parses a raw backend payload into a validated, trend-sorted result.
///
/// # Errors
///
/// * [`AnalysisError::EmptyResponse`] if the payload is blank
/// * [`AnalysisError::Transport`] if it is not valid JSON for the schema or
///   fails validation
pub fn parse_analysis(payload: &str) -> Result<AnalysisResult, AnalysisError> {
    let json_text = payload.trim();
    if json_text.is_empty() {
        log::error!("Analysis response was empty");
        return Err(AnalysisError::EmptyResponse);
    }

    let mut result: AnalysisResult = serde_json::from_str(json_text).map_err(|e| {
        log::error!("Analysis response did not match the schema: {e}");
        AnalysisError::Transport
    })?;

    result.sort_trend();

    result.validate().map_err(|e| {
        log::error!("Analysis response failed validation: {e}");
        AnalysisError::Transport
    })?;

    Ok(result)
}

/// Requests a full analysis for `location`.
///
/// No retry is performed; the caller decides whether to ask again.
///
/// # Errors
///
/// Returns [`AnalysisError`] describing the failure in user-facing terms.
pub async fn request_analysis(
    provider: &dyn LlmProvider,
    location: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let location = location.trim();
    if location.is_empty() {
        log::error!("Refusing to request analysis for a blank location");
        return Err(AnalysisError::Transport);
    }

    log::info!("Requesting analysis for {location}");

    let request = GenerateRequest {
        messages: vec![Message::user(build_prompt(
            location,
            chrono::Utc::now().year(),
        ))],
        system_instruction: None,
        response_schema: Some(response_schema()),
    };

    let payload = provider.generate(&request).await.map_err(|e| {
        log::error!("Analysis request for {location} failed: {e}");
        AnalysisError::from(e)
    })?;

    let result = parse_analysis(&payload)?;

    log::info!(
        "Received analysis for {location}: {} trend points",
        result.population_trend.len()
    );

    Ok(result)
}
