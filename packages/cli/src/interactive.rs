//! Interactive terminal client.
//!
//! Shows the current screen after every step and offers a menu of the
//! interactions available on it.

use dialoguer::{Input, Select};
use urbis_ai::UrbisAi;
use urbis_app::navigation::{FetchState, Page};
use urbis_app::{Action, Session};
use urbis_cli_utils::MultiProgress;

use crate::{perform, render};

/// Top-level menu entries.
#[derive(Clone, Copy)]
enum MenuAction {
    Introduction,
    Analysis,
    Search,
    QuickSelect,
    ViewHotspot,
    Retry,
    Chat,
    StartServer,
    Quit,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::Introduction,
        Self::Analysis,
        Self::Search,
        Self::QuickSelect,
        Self::ViewHotspot,
        Self::Retry,
        Self::Chat,
        Self::StartServer,
        Self::Quit,
    ];

    #[must_use]
    const fn label(self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::Analysis => "Growth & Population",
            Self::Search => "Search a location",
            Self::QuickSelect => "Quick-select a city",
            Self::ViewHotspot => "View a predicted hotspot",
            Self::Retry => "Retry",
            Self::Chat => "Ask Urbo",
            Self::StartServer => "Start API server",
            Self::Quit => "Quit",
        }
    }

    /// Whether the entry makes sense in the session's current state.
    fn available(self, session: &Session) -> bool {
        let nav = session.navigator();
        match self {
            Self::Search | Self::QuickSelect => nav.page() == Page::Analysis,
            Self::ViewHotspot => nav.page() == Page::Analysis && nav.result().is_some(),
            Self::Retry => matches!(nav.fetch_state(), FetchState::Error { .. }),
            Self::Introduction
            | Self::Analysis
            | Self::Chat
            | Self::StartServer
            | Self::Quit => true,
        }
    }
}

/// Runs the interactive client until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails or the server cannot be started.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let ai = UrbisAi::from_env();
    let mut session = Session::new();

    loop {
        println!();
        print!("{}", render::page(&session.view()));
        println!();

        let actions: Vec<MenuAction> = MenuAction::ALL
            .iter()
            .copied()
            .filter(|a| a.available(&session))
            .collect();
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = match actions[idx] {
            MenuAction::Introduction => Action::SetPage { page: Page::Intro },
            MenuAction::Analysis => Action::SetPage {
                page: Page::Analysis,
            },
            MenuAction::Search => {
                let location: String = Input::new()
                    .with_prompt("Search for a city, neighbourhood or address")
                    .allow_empty(true)
                    .interact_text()?;
                Action::Search { location }
            }
            MenuAction::QuickSelect => {
                let names: Vec<&str> = session.registry().city_names().collect();
                let idx = Select::new()
                    .with_prompt("City")
                    .items(&names)
                    .default(0)
                    .interact()?;
                Action::SelectCity {
                    name: names[idx].to_string(),
                }
            }
            MenuAction::ViewHotspot => {
                let Some(result) = session.navigator().result() else {
                    continue;
                };
                let labels: Vec<&str> = result
                    .predicted_hotspots
                    .iter()
                    .map(|h| h.name.as_str())
                    .collect();
                let idx = Select::new()
                    .with_prompt("Hotspot")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                Action::SelectHotspot {
                    location_query: result.predicted_hotspots[idx].location_query.clone(),
                }
            }
            MenuAction::Retry => Action::Retry,
            MenuAction::Chat => {
                chat(multi, &ai, &mut session).await?;
                continue;
            }
            MenuAction::StartServer => {
                // The server uses actix-web's runtime, so we need to run it
                // in a blocking task to avoid nesting tokio runtimes.
                tokio::task::spawn_blocking(|| {
                    actix_web::rt::System::new().block_on(urbis_server::interactive::run())
                })
                .await??;
                return Ok(());
            }
            MenuAction::Quit => return Ok(()),
        };

        perform(multi, &ai, &mut session, action).await;
    }
}

/// Chat loop. An empty message closes the panel.
async fn chat(
    multi: &MultiProgress,
    ai: &UrbisAi,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    session.dispatch(Action::OpenChat);
    println!();
    print!("{}", render::chat(&session.view().chat));

    loop {
        let text: String = Input::new()
            .with_prompt("You (empty to close)")
            .allow_empty(true)
            .interact_text()?;

        if text.trim().is_empty() {
            break;
        }

        let before = session.conversation().len();
        perform(multi, ai, session, Action::SendMessage { text }).await;

        for turn in &session.conversation().turns()[before..] {
            if turn.role == urbis_ai::providers::ChatRole::Assistant {
                println!("Urbo: {}", turn.text);
            }
        }
    }

    session.dispatch(Action::CloseChat);
    Ok(())
}
