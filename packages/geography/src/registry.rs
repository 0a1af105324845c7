//! Registry of the analysed region and its major cities.
//!
//! The registry is compiled into the binary from `cities/*.toml` so the
//! quick-select buttons and zoom tiers never depend on runtime files.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::RegistryError;

/// A city offered as a quick-select location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownCity {
    /// Display name, also used verbatim as the location query.
    pub name: String,
}

/// The analysed region and the major cities inside it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityRegistry {
    /// Region-wide location name (the default location).
    pub region: String,
    /// Major cities, in quick-select display order.
    pub cities: Vec<KnownCity>,
}

const GTA_TOML: &str = include_str!("../cities/gta.toml");

static GTA: LazyLock<CityRegistry> = LazyLock::new(|| {
    CityRegistry::from_toml(GTA_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded GTA city registry: {e}"))
});

impl CityRegistry {
    /// Parses and checks a registry definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the TOML is malformed, the region name
    /// is blank, or a city name is blank or repeated (case-insensitively).
    pub fn from_toml(toml_str: &str) -> Result<Self, RegistryError> {
        let registry: Self = toml::from_str(toml_str)?;

        if registry.region.trim().is_empty() {
            return Err(RegistryError::Invalid {
                message: "region name is blank".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for city in &registry.cities {
            if city.name.trim().is_empty() {
                return Err(RegistryError::Invalid {
                    message: "city name is blank".to_string(),
                });
            }
            if !seen.insert(normalize(&city.name)) {
                return Err(RegistryError::Invalid {
                    message: format!("duplicate city: {}", city.name),
                });
            }
        }

        log::debug!(
            "Loaded city registry for {} ({} cities)",
            registry.region,
            registry.cities.len()
        );

        Ok(registry)
    }

    /// The embedded Greater Toronto Area registry.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded TOML is malformed (a build-time
    /// guarantee since the file is compiled in).
    #[must_use]
    pub fn gta() -> &'static Self {
        &GTA
    }

    /// Whether `location` names the whole region (case-insensitive).
    #[must_use]
    pub fn is_region(&self, location: &str) -> bool {
        normalize(location) == normalize(&self.region)
    }

    /// Finds the known city named by `location` (case-insensitive).
    #[must_use]
    pub fn find_city(&self, location: &str) -> Option<&KnownCity> {
        let wanted = normalize(location);
        self.cities.iter().find(|city| normalize(&city.name) == wanted)
    }

    /// City names in display order.
    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(|city| city.name.as_str())
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
