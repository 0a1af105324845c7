//! Scripted provider and canned payloads for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::AiError;
use crate::providers::{GenerateRequest, LlmProvider};

/// A provider that replays a fixed sequence of responses and records every
/// request it receives.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    /// Creates a provider answering with `responses` in order. Once they run
    /// out every call fails with a 500 provider error.
    #[must_use]
    pub fn new(responses: Vec<Result<String, AiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AiError::Provider {
                    status: 500,
                    message: "no scripted response left".to_string(),
                })
            })
    }
}

/// A well-formed analysis payload for `location` with an unsorted trend.
#[must_use]
pub fn analysis_json(location: &str) -> String {
    serde_json::json!({
        "title": format!("Growth in {location}"),
        "summary": format!("{location} keeps growing."),
        "keyPoints": [
            {"title": "Drivers", "description": "Immigration and jobs."},
            {"title": "Infrastructure", "description": "Transit is catching up."},
            {"title": "Outlook", "description": "Growth continues."}
        ],
        "populationTrend": [
            {"year": 2029, "population": 1_090_000, "type": "projected"},
            {"year": 2022, "population": 1_000_000, "type": "historical"},
            {"year": 2025, "population": 1_040_000, "type": "historical"},
            {"year": 2023, "population": 1_010_000, "type": "historical"},
            {"year": 2031, "population": 1_120_000, "type": "projected"},
            {"year": 2024, "population": 1_025_000, "type": "historical"},
            {"year": 2026, "population": 1_055_000, "type": "historical"},
            {"year": 2027, "population": 1_065_000, "type": "projected"},
            {"year": 2030, "population": 1_105_000, "type": "projected"},
            {"year": 2028, "population": 1_078_000, "type": "projected"}
        ],
        "urbanSprawlPredictions": [
            {"title": "Vertical", "description": "Towers near stations."},
            {"title": "Outward", "description": "Greenfield edges fill in."},
            {"title": "Mixed", "description": "Plazas become neighbourhoods."}
        ],
        "predictedHotspots": [
            {"name": "Centre", "locationQuery": format!("City Centre, {location}"), "reason": "Transit."},
            {"name": "North", "locationQuery": format!("North End, {location}"), "reason": "Zoning."},
            {"name": "Lakeside", "locationQuery": format!("Lakeside, {location}"), "reason": "Redevelopment."}
        ]
    })
    .to_string()
}
