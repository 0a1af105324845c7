#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Known GTA cities, map zoom derivation and map embed URLs.
//!
//! The map view never talks to a backend: the zoom level is a pure
//! function of the location string and the [`CityRegistry`], and the map
//! itself is an external embed addressed by URL.

pub mod registry;

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

pub use registry::{CityRegistry, KnownCity};

/// Base URL of the embeddable map.
pub const MAP_EMBED_BASE: &str = "https://www.google.com/maps";

/// Errors that can occur loading a city registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The registry parsed but is not usable.
    #[error("Invalid registry: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Map zoom tier for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ZoomLevel {
    /// The whole region.
    Region,
    /// A known major city.
    City,
    /// An address, neighbourhood or hotspot query.
    Street,
}

impl ZoomLevel {
    /// Numeric zoom understood by the map embed.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Region => 9,
            Self::City => 12,
            Self::Street => 15,
        }
    }
}

/// Derives the zoom tier for `location`.
///
/// The region name gets the widest zoom, a known city the medium zoom, and
/// anything else is assumed to be a specific address or hotspot.
#[must_use]
pub fn zoom_level(location: &str, registry: &CityRegistry) -> ZoomLevel {
    if registry.is_region(location) {
        ZoomLevel::Region
    } else if registry.find_city(location).is_some() {
        ZoomLevel::City
    } else {
        ZoomLevel::Street
    }
}

/// Builds the embed URL centring the map on `location` at `zoom`.
#[must_use]
pub fn map_embed_url(location: &str, zoom: ZoomLevel) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", location)
        .append_pair("output", "embed")
        .append_pair("z", &zoom.value().to_string())
        .finish();

    format!("{MAP_EMBED_BASE}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_tiers() {
        let registry = CityRegistry::gta();
        assert_eq!(
            zoom_level("Greater Toronto Area", registry),
            ZoomLevel::Region
        );
        assert_eq!(zoom_level("Toronto", registry), ZoomLevel::City);
        assert_eq!(
            zoom_level("123 Main St, Toronto", registry),
            ZoomLevel::Street
        );
    }

    #[test]
    fn zoom_is_pure() {
        let registry = CityRegistry::gta();
        for location in ["Greater Toronto Area", "Toronto", "123 Main St, Toronto"] {
            assert_eq!(
                zoom_level(location, registry),
                zoom_level(location, registry)
            );
        }
    }

    #[test]
    fn zoom_values() {
        assert_eq!(ZoomLevel::Region.value(), 9);
        assert_eq!(ZoomLevel::City.value(), 12);
        assert_eq!(ZoomLevel::Street.value(), 15);
        assert_eq!(ZoomLevel::Region.to_string(), "region");
        assert_eq!(ZoomLevel::Street.to_string(), "street");
    }

    #[test]
    fn zoom_ignores_case() {
        let registry = CityRegistry::gta();
        assert_eq!(zoom_level("vaughan", registry), ZoomLevel::City);
        assert_eq!(
            zoom_level("GREATER TORONTO AREA", registry),
            ZoomLevel::Region
        );
    }

    #[test]
    fn embed_url_encodes_location() {
        let url = map_embed_url("East Harbour, Toronto, ON", ZoomLevel::Street);
        assert_eq!(
            url,
            "https://www.google.com/maps?q=East+Harbour%2C+Toronto%2C+ON&output=embed&z=15"
        );
    }

    #[test]
    fn embed_url_escapes_ampersand() {
        let url = map_embed_url("Yonge & Eglinton", ZoomLevel::Street);
        assert!(url.contains("q=Yonge+%26+Eglinton&"));
    }
}
