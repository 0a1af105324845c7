#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Front-end agnostic session for the Urbis app.
//!
//! A [`Session`] owns the navigation state, the conversation and the chat
//! panel flag. Interactions arrive as [`Action`]s. Dispatching an action
//! updates state synchronously and may return an [`Effect`] (an AI call).
//! The caller runs the effect with [`run_effect`], outside of any lock it
//! holds on the session, and feeds the [`Outcome`] back through
//! [`Session::apply`]. [`Session::view`] renders the current state.

pub mod conversation;
pub mod navigation;
pub mod views;

use serde::Deserialize;
use urbis_ai::UrbisAi;
use urbis_ai::analysis::AnalysisError;
use urbis_ai::chat::ChatError;
use urbis_analysis_models::AnalysisResult;
use urbis_geography::CityRegistry;

use crate::conversation::{Conversation, PendingChat};
use crate::navigation::{FetchTicket, Navigator, Page};
use crate::views::PageView;

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Switch page.
    SetPage {
        /// Target page.
        page: Page,
    },
    /// Submit the location search box.
    Search {
        /// Search text.
        location: String,
    },
    /// Press a quick-select city button.
    SelectCity {
        /// City name.
        name: String,
    },
    /// View a predicted hotspot on the map.
    #[serde(rename_all = "camelCase")]
    SelectHotspot {
        /// The hotspot's location query.
        location_query: String,
    },
    /// Retry a failed analysis.
    Retry,
    /// Open the chat panel.
    OpenChat,
    /// Close the chat panel.
    CloseChat,
    /// Send a chat message.
    SendMessage {
        /// Message text.
        text: String,
    },
}

/// Work requested by a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the analysis identified by the ticket.
    Fetch(FetchTicket),
    /// Send a chat question.
    Chat(PendingChat),
}

/// Result of running an [`Effect`].
#[derive(Debug)]
pub enum Outcome {
    /// An analysis fetch finished.
    Analysis {
        /// Ticket of the fetch.
        ticket: FetchTicket,
        /// Fetch result.
        result: Result<AnalysisResult, AnalysisError>,
    },
    /// A chat reply arrived.
    Reply {
        /// Reply text or failure.
        result: Result<String, ChatError>,
    },
}

/// Runs `effect` against the AI backend.
pub async fn run_effect(ai: &UrbisAi, effect: Effect) -> Outcome {
    match effect {
        Effect::Fetch(ticket) => {
            log::debug!(
                "Fetching analysis for {} (generation {})",
                ticket.location(),
                ticket.generation()
            );
            let result = ai.request_analysis(ticket.location()).await;
            Outcome::Analysis { ticket, result }
        }
        Effect::Chat(pending) => {
            let result = ai
                .send_chat_message(pending.question(), pending.history())
                .await;
            Outcome::Reply { result }
        }
    }
}

/// One user's app state.
#[derive(Debug, Clone)]
pub struct Session {
    navigator: Navigator,
    conversation: Conversation,
    chat_open: bool,
    registry: &'static CityRegistry,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session for the Greater Toronto Area.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(CityRegistry::gta())
    }

    /// Creates a session over `registry`, defaulting to its region.
    #[must_use]
    pub fn with_registry(registry: &'static CityRegistry) -> Self {
        Self {
            navigator: Navigator::new(registry.region.clone()),
            conversation: Conversation::new(),
            chat_open: false,
            registry,
        }
    }

    /// Navigation and fetch state.
    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Chat history.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Whether the chat panel is open.
    #[must_use]
    pub const fn is_chat_open(&self) -> bool {
        self.chat_open
    }

    /// City registry backing the map.
    #[must_use]
    pub const fn registry(&self) -> &'static CityRegistry {
        self.registry
    }

    /// Applies `action` and returns the AI call it requires, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        log::trace!("dispatch: {action:?}");

        match action {
            Action::SetPage { page } => self.navigator.set_page(page).map(Effect::Fetch),
            Action::Search { location } | Action::SelectCity { name: location } => {
                self.navigator.change_location(&location).map(Effect::Fetch)
            }
            Action::SelectHotspot { location_query } => self
                .navigator
                .select_hotspot(&location_query)
                .map(Effect::Fetch),
            Action::Retry => self.navigator.retry().map(Effect::Fetch),
            Action::OpenChat => {
                self.chat_open = true;
                None
            }
            Action::CloseChat => {
                self.chat_open = false;
                None
            }
            Action::SendMessage { text } => self.conversation.begin_submit(&text).map(Effect::Chat),
        }
    }

    /// Commits the outcome of an effect.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Analysis { ticket, result } => {
                if let Err(e) = &result {
                    log::warn!("Analysis for {} failed: {e}", ticket.location());
                }
                self.navigator.complete(&ticket, result);
            }
            Outcome::Reply { result } => self.conversation.finish(result),
        }
    }

    /// Dispatches `action` and runs its effect to completion.
    pub async fn perform(&mut self, ai: &UrbisAi, action: Action) {
        if let Some(effect) = self.dispatch(action) {
            let outcome = run_effect(ai, effect).await;
            self.apply(outcome);
        }
    }

    /// Renders the current state.
    #[must_use]
    pub fn view(&self) -> PageView {
        PageView::build(
            &self.navigator,
            &self.conversation,
            self.chat_open,
            self.registry,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use urbis_ai::AiError;
    use urbis_ai::test_support::{ScriptedProvider, analysis_json};

    use super::*;
    use crate::views::{AnalysisBody, PageBody};

    fn ai(responses: Vec<Result<String, AiError>>) -> UrbisAi {
        UrbisAi::new(Arc::new(ScriptedProvider::new(responses)))
    }

    fn ready(view: PageView) -> Box<views::ReadyAnalysis> {
        match view.body {
            PageBody::Analysis {
                body: AnalysisBody::Ready(ready),
                ..
            } => ready,
            other => panic!("expected ready analysis, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn analysis_page_loads_default_region() {
        let ai = ai(vec![Ok(analysis_json("Greater Toronto Area"))]);
        let mut session = Session::new();

        session
            .perform(&ai, Action::SetPage { page: Page::Analysis })
            .await;

        let view = session.view();
        assert_eq!(view.header, "Growth in Greater Toronto Area");
        let ready = ready(view);
        assert!(!ready.map.shows_overlay());
        assert_eq!(ready.hotspots.len(), 3);
    }

    #[tokio::test]
    async fn hotspot_selection_shows_overlay() {
        let ai = ai(vec![
            Ok(analysis_json("Greater Toronto Area")),
            Ok(analysis_json("City Centre, Greater Toronto Area")),
            Ok(analysis_json("Markham")),
        ]);
        let mut session = Session::new();
        session
            .perform(&ai, Action::SetPage { page: Page::Analysis })
            .await;

        let query = session.navigator().result().unwrap().predicted_hotspots[0]
            .location_query
            .clone();

        session
            .perform(
                &ai,
                Action::SelectHotspot {
                    location_query: query.clone(),
                },
            )
            .await;

        assert_eq!(session.navigator().location(), query);
        let shown = ready(session.view());
        assert_eq!(shown.map.zoom_value, 15);
        assert!(shown.map.shows_overlay());
        let hotspot = shown.map.selected_hotspot.as_ref().unwrap();
        assert_eq!(hotspot.name, "Centre");
        assert_eq!(hotspot.reason, "Transit.");

        session
            .perform(
                &ai,
                Action::SelectCity {
                    name: "Markham".to_string(),
                },
            )
            .await;

        assert_eq!(session.navigator().location(), "Markham");
        let shown = ready(session.view());
        assert!(!shown.map.shows_overlay());
        assert!(shown.hotspots.iter().all(|item| !item.selected));
    }

    #[test]
    fn overlay_requires_exact_match_against_loaded_hotspots() {
        let mut session = Session::new();
        let Some(Effect::Fetch(ticket)) = session.dispatch(Action::SetPage {
            page: Page::Analysis,
        }) else {
            panic!("expected fetch");
        };
        let mut result = urbis_ai::analysis::parse_analysis(&analysis_json("Toronto")).unwrap();
        result.predicted_hotspots[0].location_query = "Greater Toronto Area".to_string();
        session.apply(Outcome::Analysis {
            ticket,
            result: Ok(result),
        });

        let ready = ready(session.view());
        assert!(ready.map.shows_overlay());
        assert!(ready.hotspots[0].selected);
    }

    #[tokio::test]
    async fn failure_shows_retry_and_retry_recovers() {
        let ai = ai(vec![
            Err(AiError::MissingApiKey),
            Ok(analysis_json("Greater Toronto Area")),
        ]);
        let mut session = Session::new();

        session
            .perform(&ai, Action::SetPage { page: Page::Analysis })
            .await;
        match session.view().body {
            PageBody::Analysis {
                body: AnalysisBody::Error { message, can_retry },
                ..
            } => {
                assert!(can_retry);
                assert_eq!(message, AnalysisError::InvalidCredentials.to_string());
            }
            other => panic!("expected error, got {other:?}"),
        }

        session.perform(&ai, Action::Retry).await;
        assert!(session.navigator().result().is_some());
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut session = Session::new();
        let Some(Effect::Fetch(first)) = session.dispatch(Action::SetPage {
            page: Page::Analysis,
        }) else {
            panic!("expected fetch");
        };
        let Some(Effect::Fetch(second)) = session.dispatch(Action::SelectCity {
            name: "Mississauga".to_string(),
        }) else {
            panic!("expected fetch");
        };

        session.apply(Outcome::Analysis {
            ticket: second,
            result: Ok(
                urbis_ai::analysis::parse_analysis(&analysis_json("Mississauga")).unwrap(),
            ),
        });
        session.apply(Outcome::Analysis {
            ticket: first,
            result: Ok(
                urbis_ai::analysis::parse_analysis(&analysis_json("Greater Toronto Area"))
                    .unwrap(),
            ),
        });

        assert_eq!(session.view().header, "Growth in Mississauga");
    }

    #[test]
    fn chat_panel_toggles_without_effects() {
        let mut session = Session::new();
        assert!(session.dispatch(Action::OpenChat).is_none());
        assert!(session.is_chat_open());
        assert!(session.dispatch(Action::CloseChat).is_none());
        assert!(!session.is_chat_open());
    }

    #[tokio::test]
    async fn chat_messages_flow_through_session() {
        let ai = ai(vec![Ok("Vaughan is growing fast.".to_string())]);
        let mut session = Session::new();

        assert!(
            session
                .dispatch(Action::SendMessage {
                    text: "  ".to_string()
                })
                .is_none()
        );

        let effect = session
            .dispatch(Action::SendMessage {
                text: "Where?".to_string(),
            })
            .unwrap();
        assert!(
            session
                .dispatch(Action::SendMessage {
                    text: "Again?".to_string()
                })
                .is_none()
        );
        assert!(session.view().chat.pending);

        let outcome = run_effect(&ai, effect).await;
        session.apply(outcome);

        let chat = session.view().chat;
        assert!(!chat.pending);
        assert_eq!(chat.turns.len(), 2);
        assert_eq!(chat.turns[1].text, "Vaughan is growing fast.");
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: Action =
            serde_json::from_str(r#"{"type":"selectHotspot","locationQuery":"Leslieville, Toronto"}"#)
                .unwrap();
        assert_eq!(
            action,
            Action::SelectHotspot {
                location_query: "Leslieville, Toronto".to_string()
            }
        );
        let action: Action = serde_json::from_str(r#"{"type":"setPage","page":"analysis"}"#).unwrap();
        assert_eq!(
            action,
            Action::SetPage {
                page: Page::Analysis
            }
        );
    }
}
