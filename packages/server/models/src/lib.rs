#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Urbis server.
//!
//! Responses that render the screen reuse the view models from
//! [`urbis_app::views`]; only the request bodies and small envelopes live
//! here.

use serde::{Deserialize, Serialize};
use urbis_app::Action;
use urbis_app::navigation::Page;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error envelope returned for rejected requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Description of what went wrong.
    pub error: String,
}

/// Body of `POST /api/page`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Target page.
    pub page: Page,
}

/// Body of `POST /api/location`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    /// Search text or quick-select city name.
    pub location: String,
}

/// Body of `POST /api/hotspot`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotRequest {
    /// The hotspot's location query.
    pub location_query: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Message text.
    pub message: String,
}

/// Query parameters for `GET /api/map`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    /// Location to centre the map on.
    pub location: String,
}

impl From<PageRequest> for Action {
    fn from(req: PageRequest) -> Self {
        Self::SetPage { page: req.page }
    }
}

impl From<LocationRequest> for Action {
    fn from(req: LocationRequest) -> Self {
        Self::Search {
            location: req.location,
        }
    }
}

impl From<HotspotRequest> for Action {
    fn from(req: HotspotRequest) -> Self {
        Self::SelectHotspot {
            location_query: req.location_query,
        }
    }
}

impl From<ChatRequest> for Action {
    fn from(req: ChatRequest) -> Self {
        Self::SendMessage { text: req.message }
    }
}
