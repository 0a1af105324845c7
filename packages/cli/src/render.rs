//! Plain-text rendering of the Urbis view models for the terminal.

use std::fmt::Write as _;

use console::style;
use urbis_app::views::{
    AnalysisBody, Card, ChatPanel, HotspotItem, MapView, PageBody, PageView, ReadyAnalysis,
    TrendChart,
};
use urbis_ai::providers::ChatRole;

/// Width of the longest bar in the population chart.
const BAR_WIDTH: usize = 40;

/// Renders a full screen.
#[must_use]
pub fn page(view: &PageView) -> String {
    let mut out = String::new();

    let nav: Vec<String> = view
        .nav
        .iter()
        .map(|item| {
            if item.active {
                format!("[{}]", item.label)
            } else {
                item.label.to_string()
            }
        })
        .collect();

    let _ = writeln!(out, "{}", style(&view.header).bold().cyan());
    let _ = writeln!(out, "{}", style(nav.join("  ")).dim());
    out.push('\n');

    match &view.body {
        PageBody::Intro { sections } => {
            for section in sections {
                let _ = writeln!(out, "{}", style(section.heading).bold());
                let _ = writeln!(out, "{}\n", section.body);
            }
        }
        PageBody::Analysis { location, body } => out.push_str(&analysis(location, body)),
    }

    if view.chat.open {
        out.push('\n');
        out.push_str(&chat(&view.chat));
    }

    out
}

/// Renders the analysis page body.
#[must_use]
pub fn analysis(location: &str, body: &AnalysisBody) -> String {
    match body {
        AnalysisBody::Idle => String::new(),
        AnalysisBody::Loading => format!("Analyzing {location}...\n"),
        AnalysisBody::Error { message, can_retry } => {
            let mut out = format!("{}\n", style(message).red());
            if *can_retry {
                out.push_str("Choose \"Retry\" to try again.\n");
            }
            out
        }
        AnalysisBody::Ready(ready) => ready_analysis(ready),
    }
}

fn ready_analysis(ready: &ReadyAnalysis) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}\n", ready.summary);

    section(&mut out, "Key Insights");
    cards(&mut out, &ready.key_points);

    out.push_str(&map(&ready.map));
    out.push('\n');

    section(&mut out, "Predicted Growth Hotspots");
    hotspots(&mut out, &ready.hotspots);

    if let Some(chart_view) = &ready.chart {
        out.push_str(&chart(chart_view));
        out.push('\n');
    }

    section(&mut out, "Urban Sprawl Predictions");
    cards(&mut out, &ready.predictions);

    section(&mut out, "Key Factors Considered");
    for factor in &ready.factors {
        let _ = writeln!(out, "  - {factor}");
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", style(title).bold().underlined());
}

fn cards(out: &mut String, cards: &[Card]) {
    for card in cards {
        let _ = writeln!(out, "  {}", style(&card.title).bold());
        let _ = writeln!(out, "    {}", card.description);
    }
    out.push('\n');
}

fn hotspots(out: &mut String, items: &[HotspotItem]) {
    for (i, item) in items.iter().enumerate() {
        let marker = if item.selected { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {}. {} ({})",
            i + 1,
            style(&item.name).bold(),
            item.location_query
        );
        let _ = writeln!(out, "     {}", item.reason);
    }
    out.push('\n');
}

/// Renders the map block: embed URL, zoom, overlay and quick-select row.
#[must_use]
pub fn map(map: &MapView) -> String {
    let mut out = String::new();

    section(&mut out, &map.title);
    let _ = writeln!(out, "  Zoom: {} ({})", map.zoom, map.zoom_value);
    let _ = writeln!(out, "  {}", style(&map.embed_url).dim());

    if let Some(hotspot) = &map.selected_hotspot {
        let _ = writeln!(
            out,
            "  {} {}",
            style("Projected growth area:").green().bold(),
            hotspot.name
        );
        let _ = writeln!(out, "  {}", hotspot.reason);
    }

    let buttons: Vec<String> = map
        .quick_select
        .iter()
        .map(|button| {
            if button.active {
                format!("[{}]", button.name)
            } else {
                button.name.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "  Quick select: {}", buttons.join(" | "));

    out
}

/// Renders the population chart as horizontal bars, historical years solid
/// and projected years shaded.
#[must_use]
pub fn chart(chart: &TrendChart) -> String {
    let mut out = String::new();
    section(&mut out, &chart.title);

    let rows = chart
        .historical
        .iter()
        .map(|p| (p, '#'))
        .chain(chart.projected.iter().map(|p| (p, '.')));

    for (point, fill) in rows {
        let bar: String = std::iter::repeat_n(fill, bar_len(point.population, chart.max_population))
            .collect();
        let _ = writeln!(
            out,
            "  {} {:<width$} {}",
            point.year,
            bar,
            format_population(point.population),
            width = BAR_WIDTH
        );
    }
    let _ = writeln!(out, "  # Historical  . Projected");

    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_len(population: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((population / max) * BAR_WIDTH as f64).round() as usize
}

/// Formats a population with thousands separators.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn format_population(population: f64) -> String {
    let digits = (population.round() as i64).to_string();
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits.as_str()), |d| ("-", d));

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}

/// Renders the chat panel.
#[must_use]
pub fn chat(panel: &ChatPanel) -> String {
    let mut out = String::new();
    section(&mut out, panel.title);

    for turn in &panel.turns {
        let speaker = match turn.role {
            ChatRole::User => style("You").bold().blue(),
            ChatRole::Assistant => style("Urbo").bold().green(),
        };
        let _ = writeln!(out, "{speaker}: {}", turn.text);
    }
    if panel.pending {
        let _ = writeln!(out, "{}", style("Urbo is typing...").dim());
    }
    let _ = writeln!(out, "{}", style(panel.footer).dim());

    out
}

#[cfg(test)]
mod tests {
    use urbis_ai::analysis::parse_analysis;
    use urbis_ai::test_support::analysis_json;
    use urbis_analysis_models::Hotspot;
    use urbis_geography::CityRegistry;

    use super::*;

    #[test]
    fn population_separators() {
        assert_eq!(format_population(0.0), "0");
        assert_eq!(format_population(999.0), "999");
        assert_eq!(format_population(1_000.0), "1,000");
        assert_eq!(format_population(6_372_000.4), "6,372,000");
    }

    #[test]
    fn chart_bars_scale_to_max() {
        let result = parse_analysis(&analysis_json("Toronto")).unwrap();
        let chart_view = TrendChart::build("Toronto", &result).unwrap();
        let text = chart(&chart_view);

        assert!(text.contains("Population Trend for Toronto"));
        assert!(text.contains(&"#".repeat(36)));
        assert!(text.contains(&".".repeat(BAR_WIDTH)));
        assert!(text.contains("1,120,000"));
        assert_eq!(bar_len(5.0, 0.0), 0);
    }

    #[test]
    fn map_shows_overlay_and_active_city() {
        let hotspot = Hotspot {
            name: "Port Lands".to_string(),
            location_query: "Port Lands, Toronto, ON".to_string(),
            reason: "Flood protection unlocks new neighbourhoods.".to_string(),
        };
        let view = MapView::build("Port Lands, Toronto, ON", Some(&hotspot), CityRegistry::gta());
        let text = map(&view);
        assert!(text.contains("Map of Port Lands, Toronto, ON"));
        assert!(text.contains("Projected growth area:"));
        assert!(text.contains("Flood protection"));

        let view = MapView::build("Toronto", Some(&hotspot), CityRegistry::gta());
        let text = map(&view);
        assert!(text.contains("[Toronto]"));
        assert!(!text.contains("Projected growth area:"));
    }

    #[test]
    fn error_body_mentions_retry() {
        let text = analysis(
            "Toronto",
            &AnalysisBody::Error {
                message: "Failed to fetch analysis.".to_string(),
                can_retry: true,
            },
        );
        assert!(text.contains("Failed to fetch analysis."));
        assert!(text.contains("Retry"));
    }
}
