//! Page selection, current location and the analysis fetch cycle.
//!
//! Every transition into [`FetchState::Loading`] hands out a
//! [`FetchTicket`]. Only the ticket of the latest fetch can commit a
//! result; a slow response for an older location is discarded instead of
//! overwriting newer state.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use urbis_ai::analysis::AnalysisError;
use urbis_analysis_models::{AnalysisResult, Hotspot};

/// The views a user can navigate between.
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
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Page {
    /// Static introduction.
    Intro,
    /// Growth & population analysis for the current location.
    Analysis,
}

impl Page {
    /// All pages in navigation order.
    pub const ALL: &[Self] = &[Self::Intro, Self::Analysis];

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "Introduction",
            Self::Analysis => "Growth & Population",
        }
    }
}

/// Where the current location's analysis is in its fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading {
        /// Generation of the in-flight request.
        generation: u64,
    },
    /// The latest request succeeded.
    Success(AnalysisResult),
    /// The latest request failed.
    Error {
        /// User-facing message.
        message: String,
    },
}

/// Identifies one fetch so its result can be matched to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    location: String,
}

impl FetchTicket {
    /// Location the fetch was issued for.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Monotonic fetch number.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Page/location state and the fetch state machine.
#[derive(Debug, Clone)]
pub struct Navigator {
    page: Page,
    location: String,
    default_location: String,
    fetch: FetchState,
    generation: u64,
    selected_hotspot: Option<Hotspot>,
}

impl Navigator {
    /// Starts on the introduction page with `default_location` selected and
    /// nothing fetched.
    #[must_use]
    pub fn new(default_location: impl Into<String>) -> Self {
        let default_location = default_location.into();
        Self {
            page: Page::Intro,
            location: default_location.clone(),
            default_location,
            fetch: FetchState::Idle,
            generation: 0,
            selected_hotspot: None,
        }
    }

    /// Active page.
    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    /// Selected location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Current fetch state.
    #[must_use]
    pub const fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    /// The committed analysis, if the latest fetch succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&AnalysisResult> {
        match &self.fetch {
            FetchState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// The error message, if the latest fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.fetch {
            FetchState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// The hotspot whose growth overlay belongs on a map of `location`.
    ///
    /// A hotspot picked with [`Self::select_hotspot`] stays attached to its
    /// location while that location's own analysis loads and after it
    /// replaces the result it came from. Otherwise the committed result's
    /// hotspots are searched. Matching is exact.
    #[must_use]
    pub fn hotspot_at(&self, location: &str) -> Option<&Hotspot> {
        self.selected_hotspot
            .as_ref()
            .filter(|hotspot| hotspot.location_query == location)
            .or_else(|| self.result().and_then(|r| r.hotspot_for(location)))
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.fetch, FetchState::Loading { .. })
    }

    /// Switches page.
    ///
    /// Only the first visit to the analysis page triggers a fetch. Entering
    /// it with nothing to show for a non-default location (never fetched,
    /// or failed) resets the location to the default and fetches that.
    pub fn set_page(&mut self, page: Page) -> Option<FetchTicket> {
        self.page = page;
        if page != Page::Analysis {
            return None;
        }

        let at_default = self.location == self.default_location;
        match self.fetch {
            FetchState::Idle | FetchState::Error { .. } if !at_default => {
                log::info!(
                    "Resetting location from {} to {}",
                    self.location,
                    self.default_location
                );
                self.location.clone_from(&self.default_location);
                self.selected_hotspot = None;
                Some(self.begin_fetch())
            }
            FetchState::Idle => Some(self.begin_fetch()),
            _ => None,
        }
    }

    /// Selects a new location and starts fetching it.
    ///
    /// Blank input and the already-selected location are ignored.
    pub fn change_location(&mut self, location: &str) -> Option<FetchTicket> {
        let location = location.trim();
        if location.is_empty() || location == self.location {
            return None;
        }

        log::info!("Location changed to {location}");
        location.clone_into(&mut self.location);
        self.selected_hotspot = None;
        Some(self.begin_fetch())
    }

    /// Moves to a predicted hotspot of the committed result and starts
    /// fetching it, keeping the hotspot for the map overlay.
    ///
    /// A query that names no known hotspot behaves like a plain search.
    pub fn select_hotspot(&mut self, location_query: &str) -> Option<FetchTicket> {
        let hotspot = self.hotspot_at(location_query.trim()).cloned();
        let ticket = self.change_location(location_query);
        if let Some(hotspot) = hotspot {
            log::debug!("Selected hotspot {}", hotspot.name);
            self.selected_hotspot = Some(hotspot);
        }
        ticket
    }

    /// Re-issues the fetch for the current location after a failure.
    ///
    /// Does nothing unless the latest fetch failed.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if matches!(self.fetch, FetchState::Error { .. }) {
            log::info!("Retrying analysis for {}", self.location);
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Commits the outcome of the fetch identified by `ticket`.
    ///
    /// Returns `false` and changes nothing if a newer fetch has started
    /// since the ticket was issued.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        let current = matches!(
            self.fetch,
            FetchState::Loading { generation } if generation == ticket.generation
        );
        if !current {
            log::debug!(
                "Discarding stale analysis for {} (generation {}, current {})",
                ticket.location,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.fetch = match result {
            Ok(result) => FetchState::Success(result),
            Err(e) => FetchState::Error {
                message: e.to_string(),
            },
        };
        true
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.fetch = FetchState::Loading {
            generation: self.generation,
        };
        FetchTicket {
            generation: self.generation,
            location: self.location.clone(),
        }
    }
}
