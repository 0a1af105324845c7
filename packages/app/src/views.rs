//! Presentation view models.
//!
//! Each builder is a pure function of the session state. Front-ends (the
//! HTTP API, the terminal client) render these and send user interactions
//! back as [`crate::Action`]s; nothing here mutates state.

use serde::Serialize;
use urbis_ai::chat::ConversationTurn;
use urbis_analysis_models::{AnalysisResult, Hotspot, TrendKind};
use urbis_geography::{CityRegistry, ZoomLevel, map_embed_url, zoom_level};

use crate::conversation::Conversation;
use crate::navigation::{FetchState, Navigator, Page};

/// Header shown on the introduction page.
pub const INTRO_TITLE: &str = "Welcome to Urbis";

/// Header shown on the analysis page until a result provides a title.
pub const DEFAULT_ANALYSIS_TITLE: &str = "Urban Growth Analysis";

/// Title of the chat panel.
pub const CHAT_TITLE: &str = "Ask Urbo about GTA Growth";

/// Attribution shown under the chat panel.
pub const CHAT_FOOTER: &str = "Urbo is powered by Google Gemini";

/// Factors listed under every analysis.
pub const GROWTH_FACTORS: &[&str] = &[
    "Population growth",
    "Economic indicators (job growth, income levels)",
    "Land Use and Land Cover (LULC)",
    "Transportation Infrastructure",
    "Zoning and Land Use Regulations",
    "Proximity to essential services",
    "Proximity to natural features",
];

/// A block of static text on the introduction page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntroSection {
    /// Section heading.
    pub heading: &'static str,
    /// Section body.
    pub body: &'static str,
}

/// Introduction page content.
pub const INTRO_SECTIONS: &[IntroSection] = &[
    IntroSection {
        heading: "Introduction",
        body: "Welcome to Urbis, a tool for the urban planners of tomorrow. Urbis uses Google's Gemini API to produce data-driven insights into population trends and urban sprawl, helping planners build smarter, more sustainable cities with the clarity they need to make informed decisions.",
    },
    IntroSection {
        heading: "Our Vision for Canada",
        body: "Our journey begins with the Greater Toronto Area, but the goal is to cover every major urban centre across Canada, contributing to more efficient, equitable and forward-thinking urban development for all Canadians.",
    },
];

/// A quick-select city button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityButton {
    /// City name, sent back as the new location when pressed.
    pub name: String,
    /// Whether the city is the current location.
    pub active: bool,
}

/// Embedded map centred on the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Location the map is centred on.
    pub location: String,
    /// Zoom tier.
    pub zoom: ZoomLevel,
    /// Numeric zoom passed to the embed.
    pub zoom_value: u8,
    /// Embed URL.
    pub embed_url: String,
    /// Accessible title for the embed.
    pub title: String,
    /// Quick-select buttons.
    pub quick_select: Vec<CityButton>,
    /// The hotspot being viewed, when the location is one. Drives the
    /// growth overlay and the name/reason shown beneath the map.
    pub selected_hotspot: Option<Hotspot>,
}

impl MapView {
    /// Builds the map for `location`. `hotspot` is shown as the growth
    /// overlay only if its query equals `location` exactly.
    #[must_use]
    pub fn build(location: &str, hotspot: Option<&Hotspot>, registry: &CityRegistry) -> Self {
        let zoom = zoom_level(location, registry);
        Self {
            location: location.to_string(),
            zoom,
            zoom_value: zoom.value(),
            embed_url: map_embed_url(location, zoom),
            title: format!("Map of {location}"),
            quick_select: registry
                .city_names()
                .map(|name| CityButton {
                    name: name.to_string(),
                    active: name == location,
                })
                .collect(),
            selected_hotspot: hotspot
                .filter(|hotspot| hotspot.location_query == location)
                .cloned(),
        }
    }

    /// Whether the growth overlay is shown.
    #[must_use]
    pub const fn shows_overlay(&self) -> bool {
        self.selected_hotspot.is_some()
    }
}

/// One plotted year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Calendar year.
    pub year: i32,
    /// Population.
    pub population: f64,
}

/// Population trend chart with separate historical and projected series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendChart {
    /// Chart heading.
    pub title: String,
    /// Observed years, ascending.
    pub historical: Vec<ChartPoint>,
    /// Forecast years, ascending.
    pub projected: Vec<ChartPoint>,
    /// Largest population, for axis scaling.
    pub max_population: f64,
}

impl TrendChart {
    /// Builds the chart of `result`'s trend, or `None` when there is
    /// nothing to plot.
    #[must_use]
    pub fn build(location: &str, result: &AnalysisResult) -> Option<Self> {
        let trend = &result.population_trend;
        if trend.is_empty() {
            return None;
        }

        let series = |kind: TrendKind| {
            result
                .trend_of(kind)
                .map(|point| ChartPoint {
                    year: point.year,
                    population: point.population,
                })
                .collect::<Vec<_>>()
        };

        Some(Self {
            title: format!("Population Trend for {location}"),
            historical: series(TrendKind::Historical),
            projected: series(TrendKind::Projected),
            max_population: trend
                .iter()
                .map(|point| point.population)
                .fold(0.0, f64::max),
        })
    }
}

/// A hotspot entry in the list under the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotItem {
    /// Area name.
    pub name: String,
    /// Location query, sent back as the new location when viewed.
    pub location_query: String,
    /// Why the area will grow.
    pub reason: String,
    /// Whether the map is currently showing this hotspot.
    pub selected: bool,
}

/// Builds the hotspot list, marking the entry shown on the map.
#[must_use]
pub fn hotspot_items(hotspots: &[Hotspot], shown: Option<&Hotspot>) -> Vec<HotspotItem> {
    hotspots
        .iter()
        .map(|hotspot| HotspotItem {
            name: hotspot.name.clone(),
            location_query: hotspot.location_query.clone(),
            reason: hotspot.reason.clone(),
            selected: shown.is_some_and(|s| s.location_query == hotspot.location_query),
        })
        .collect()
}

/// A titled card (key point or prediction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Card title.
    pub title: String,
    /// Card body.
    pub description: String,
}

/// Everything shown once an analysis has loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyAnalysis {
    /// Growth summary.
    pub summary: String,
    /// Key insight cards.
    pub key_points: Vec<Card>,
    /// Map with search and quick-select.
    pub map: MapView,
    /// Predicted hotspots.
    pub hotspots: Vec<HotspotItem>,
    /// Population chart, absent if the trend is empty.
    pub chart: Option<TrendChart>,
    /// Sprawl prediction cards.
    pub predictions: Vec<Card>,
    /// Factors considered for the estimates.
    pub factors: Vec<&'static str>,
}

impl ReadyAnalysis {
    /// Builds the view of `result` for `location`, with `hotspot` as the
    /// map overlay candidate.
    #[must_use]
    pub fn build(
        result: &AnalysisResult,
        location: &str,
        hotspot: Option<&Hotspot>,
        registry: &CityRegistry,
    ) -> Self {
        let map = MapView::build(location, hotspot, registry);
        Self {
            summary: result.summary.clone(),
            key_points: result
                .key_points
                .iter()
                .map(|point| Card {
                    title: point.title.clone(),
                    description: point.description.clone(),
                })
                .collect(),
            hotspots: hotspot_items(&result.predicted_hotspots, map.selected_hotspot.as_ref()),
            map,
            chart: TrendChart::build(location, result),
            predictions: result
                .urban_sprawl_predictions
                .iter()
                .map(|prediction| Card {
                    title: prediction.title.clone(),
                    description: prediction.description.clone(),
                })
                .collect(),
            factors: GROWTH_FACTORS.to_vec(),
        }
    }
}

/// Body of the analysis page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AnalysisBody {
    /// Nothing requested yet.
    Idle,
    /// Spinner.
    Loading,
    /// Error message with a retry affordance. No analysis is shown.
    #[serde(rename_all = "camelCase")]
    Error {
        /// User-facing message.
        message: String,
        /// Whether a retry action is offered.
        can_retry: bool,
    },
    /// The loaded analysis.
    Ready(Box<ReadyAnalysis>),
}

/// Page-specific content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum PageBody {
    /// Static introduction.
    Intro {
        /// Text sections.
        sections: Vec<IntroSection>,
    },
    /// Growth & population analysis.
    Analysis {
        /// Current location.
        location: String,
        /// Fetch-dependent content.
        body: AnalysisBody,
    },
}

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Target page.
    pub page: Page,
    /// Display label.
    pub label: &'static str,
    /// Whether this is the current page.
    pub active: bool,
}

/// The chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPanel {
    /// Whether the panel is open.
    pub open: bool,
    /// Panel title.
    pub title: &'static str,
    /// Turns, oldest first.
    pub turns: Vec<ConversationTurn>,
    /// Whether a reply is awaited (typing indicator).
    pub pending: bool,
    /// Whether the input accepts a new question.
    pub input_enabled: bool,
    /// Attribution line.
    pub footer: &'static str,
}

impl ChatPanel {
    /// Builds the panel from the conversation.
    #[must_use]
    pub fn build(conversation: &Conversation, open: bool) -> Self {
        Self {
            open,
            title: CHAT_TITLE,
            turns: conversation.turns().to_vec(),
            pending: conversation.is_pending(),
            input_enabled: !conversation.is_pending(),
            footer: CHAT_FOOTER,
        }
    }
}

/// The complete screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Header title.
    pub header: String,
    /// Sidebar navigation.
    pub nav: Vec<NavItem>,
    /// Page content.
    pub body: PageBody,
    /// Chat panel.
    pub chat: ChatPanel,
}

impl PageView {
    /// Builds the screen for the given state.
    #[must_use]
    pub fn build(
        navigator: &Navigator,
        conversation: &Conversation,
        chat_open: bool,
        registry: &CityRegistry,
    ) -> Self {
        let page = navigator.page();

        let header = match page {
            Page::Intro => INTRO_TITLE.to_string(),
            Page::Analysis => navigator
                .result()
                .map_or_else(|| DEFAULT_ANALYSIS_TITLE.to_string(), |r| r.title.clone()),
        };

        let body = match page {
            Page::Intro => PageBody::Intro {
                sections: INTRO_SECTIONS.to_vec(),
            },
            Page::Analysis => PageBody::Analysis {
                location: navigator.location().to_string(),
                body: analysis_body(navigator, registry),
            },
        };

        Self {
            header,
            nav: Page::ALL
                .iter()
                .map(|p| NavItem {
                    page: *p,
                    label: p.label(),
                    active: *p == page,
                })
                .collect(),
            body,
            chat: ChatPanel::build(conversation, chat_open),
        }
    }
}

fn analysis_body(navigator: &Navigator, registry: &CityRegistry) -> AnalysisBody {
    match navigator.fetch_state() {
        FetchState::Idle => AnalysisBody::Idle,
        FetchState::Loading { .. } => AnalysisBody::Loading,
        FetchState::Error { message } => AnalysisBody::Error {
            message: message.clone(),
            can_retry: true,
        },
        FetchState::Success(result) => AnalysisBody::Ready(Box::new(ReadyAnalysis::build(
            result,
            navigator.location(),
            navigator.hotspot_at(navigator.location()),
            registry,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use urbis_ai::analysis::{AnalysisError, parse_analysis};
    use urbis_ai::test_support::analysis_json;

    use super::*;

    fn hotspots() -> Vec<Hotspot> {
        vec![
            Hotspot {
                name: "East Harbour".to_string(),
                location_query: "East Harbour, Toronto, ON".to_string(),
                reason: "Ontario Line station and employment lands.".to_string(),
            },
            Hotspot {
                name: "Downsview".to_string(),
                location_query: "Downsview Park, Toronto, ON".to_string(),
                reason: "Airport lands redevelopment.".to_string(),
            },
        ]
    }

    #[test]
    fn map_overlay_only_for_exact_hotspot_match() {
        let registry = CityRegistry::gta();

        let spots = hotspots();
        let map = MapView::build("East Harbour, Toronto, ON", spots.first(), registry);
        assert!(map.shows_overlay());
        let selected = map.selected_hotspot.unwrap();
        assert_eq!(selected.name, "East Harbour");
        assert_eq!(selected.reason, "Ontario Line station and employment lands.");
        assert_eq!(map.zoom, ZoomLevel::Street);

        let map = MapView::build("Toronto", spots.first(), registry);
        assert!(!map.shows_overlay());

        let map = MapView::build("east harbour, toronto, on", spots.first(), registry);
        assert!(!map.shows_overlay());
    }

    #[test]
    fn map_marks_active_city_and_zoom() {
        let map = MapView::build("Markham", None, CityRegistry::gta());
        assert_eq!(map.zoom_value, 12);
        assert_eq!(map.title, "Map of Markham");
        let active: Vec<&str> = map
            .quick_select
            .iter()
            .filter(|b| b.active)
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(active, vec!["Markham"]);
        assert!(map.embed_url.ends_with("&z=12"));
    }

    #[test]
    fn chart_splits_series() {
        let result = parse_analysis(&analysis_json("Toronto")).unwrap();
        let chart = TrendChart::build("Toronto", &result).unwrap();
        assert_eq!(chart.title, "Population Trend for Toronto");
        assert_eq!(chart.historical.len(), 5);
        assert_eq!(chart.projected.len(), 5);
        assert!(chart.historical.windows(2).all(|w| w[0].year < w[1].year));
        assert!((chart.max_population - 1_120_000.0).abs() < f64::EPSILON);
        let mut empty = result;
        empty.population_trend.clear();
        assert!(TrendChart::build("Toronto", &empty).is_none());
    }

    #[test]
    fn hotspot_list_marks_selection() {
        let spots = hotspots();
        let items = hotspot_items(&spots, spots.get(1));
        assert!(!items[0].selected);
        assert!(items[1].selected);
    }

    #[test]
    fn error_view_has_retry_and_no_analysis() {
        let registry = CityRegistry::gta();
        let mut nav = Navigator::new(registry.region.clone());
        let ticket = nav.set_page(Page::Analysis).unwrap();
        nav.complete(&ticket, Err(AnalysisError::InvalidCredentials));

        let view = PageView::build(&nav, &Conversation::new(), false, registry);
        assert_eq!(view.header, DEFAULT_ANALYSIS_TITLE);
        match view.body {
            PageBody::Analysis {
                body: AnalysisBody::Error { message, can_retry },
                ..
            } => {
                assert!(can_retry);
                assert_eq!(message, AnalysisError::InvalidCredentials.to_string());
            }
            other => panic!("expected error body, got {other:?}"),
        }
    }

    #[test]
    fn ready_view_uses_result_title() {
        let registry = CityRegistry::gta();
        let mut nav = Navigator::new(registry.region.clone());
        let ticket = nav.set_page(Page::Analysis).unwrap();
        nav.complete(
            &ticket,
            Ok(parse_analysis(&analysis_json("Greater Toronto Area")).unwrap()),
        );

        let view = PageView::build(&nav, &Conversation::new(), true, registry);
        assert_eq!(view.header, "Growth in Greater Toronto Area");
        assert!(view.chat.open);
        assert!(view.nav.iter().any(|item| item.page == Page::Analysis && item.active));

        let PageBody::Analysis {
            body: AnalysisBody::Ready(ready),
            ..
        } = view.body
        else {
            panic!("expected ready body");
        };
        assert_eq!(ready.map.zoom, ZoomLevel::Region);
        assert_eq!(ready.key_points.len(), 3);
        assert_eq!(ready.predictions.len(), 3);
        assert_eq!(ready.factors.len(), GROWTH_FACTORS.len());
    }

    #[test]
    fn ready_view_keeps_overlay_for_selected_hotspot() {
        let registry = CityRegistry::gta();
        let mut nav = Navigator::new(registry.region.clone());
        let ticket = nav.set_page(Page::Analysis).unwrap();
        nav.complete(
            &ticket,
            Ok(parse_analysis(&analysis_json("Greater Toronto Area")).unwrap()),
        );

        let query = "City Centre, Greater Toronto Area";
        let ticket = nav.select_hotspot(query).unwrap();
        nav.complete(&ticket, Ok(parse_analysis(&analysis_json(query)).unwrap()));

        let view = PageView::build(&nav, &Conversation::new(), false, registry);
        let PageBody::Analysis {
            body: AnalysisBody::Ready(ready),
            ..
        } = view.body
        else {
            panic!("expected ready body");
        };
        let shown = ready.map.selected_hotspot.as_ref().unwrap();
        assert_eq!(shown.name, "Centre");
        assert_eq!(shown.reason, "Transit.");
        assert!(ready.hotspots.iter().all(|item| !item.selected));
    }

    #[test]
    fn intro_view() {
        let registry = CityRegistry::gta();
        let nav = Navigator::new(registry.region.clone());
        let view = PageView::build(&nav, &Conversation::new(), false, registry);
        assert_eq!(view.header, INTRO_TITLE);
        assert!(matches!(view.body, PageBody::Intro { ref sections } if sections.len() == 2));
    }

    #[test]
    fn chat_panel_disables_input_while_pending() {
        let mut conversation = Conversation::new();
        conversation.begin_submit("Hi").unwrap();
        let panel = ChatPanel::build(&conversation, true);
        assert!(panel.pending);
        assert!(!panel.input_enabled);
        assert_eq!(panel.title, CHAT_TITLE);
    }

    #[test]
    fn view_serializes_with_tags() {
        let registry = CityRegistry::gta();
        let mut nav = Navigator::new(registry.region.clone());
        let _ = nav.set_page(Page::Analysis);
        let view = PageView::build(&nav, &Conversation::new(), false, registry);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["body"]["page"], "analysis");
        assert_eq!(value["body"]["body"]["state"], "loading");
        assert_eq!(value["chat"]["inputEnabled"], true);
    }
}
