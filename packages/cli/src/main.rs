#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal client for Urbis, the GTA urban growth analyzer.
//!
//! ```text
//! urbis analyze [LOCATION] [--json]
//! urbis ask <QUESTION>
//! urbis map <LOCATION>
//! urbis serve
//! ```
//!
//! Running `urbis` with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`urbis_cli_utils::init_logger`]) so
//! that log lines and the request spinner never fight for the terminal.

mod interactive;
mod render;

use clap::{Parser, Subcommand};
use urbis_ai::UrbisAi;
use urbis_app::navigation::Page;
use urbis_app::views::MapView;
use urbis_app::{Action, Effect, Session, run_effect};
use urbis_cli_utils::{MultiProgress, Spinner};
use urbis_geography::CityRegistry;

#[derive(Parser)]
#[command(name = "urbis", about = "AI-powered urban growth analysis for the GTA")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze growth for a location (defaults to the whole GTA)
    Analyze {
        /// City, neighbourhood or address
        location: Option<String>,
        /// Print the raw analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask Urbo a one-off question about GTA growth
    Ask {
        /// The question
        question: String,
    },
    /// Show the map view for a location without calling the AI
    Map {
        /// City, neighbourhood or address
        location: String,
    },
    /// Start the API server
    Serve,
}

/// Dispatches `action` and, if it needs the AI, runs the call behind a
/// spinner and commits the outcome.
async fn perform(multi: &MultiProgress, ai: &UrbisAi, session: &mut Session, action: Action) {
    let Some(effect) = session.dispatch(action) else {
        return;
    };

    let message = match &effect {
        Effect::Fetch(ticket) => format!("Analyzing {}...", ticket.location()),
        Effect::Chat(_) => "Urbo is thinking...".to_string(),
    };
    let spinner = Spinner::start(multi, &message);
    let outcome = run_effect(ai, effect).await;
    spinner.finish();

    session.apply(outcome);
}

/// Loads the analysis page for `location`, or for the region when none is
/// given.
///
/// # Errors
///
/// Returns the user-facing message of the first fetch that fails. A failed
/// search is reported as is rather than falling back to the region.
async fn load_analysis(
    multi: &MultiProgress,
    ai: &UrbisAi,
    location: Option<String>,
) -> Result<Session, String> {
    let mut session = Session::new();

    // Selecting the location first makes the page switch reuse its fetch
    // instead of loading the default region.
    if let Some(location) = location {
        perform(multi, ai, &mut session, Action::Search { location }).await;
        if let Some(message) = session.navigator().error() {
            return Err(message.to_string());
        }
    }
    perform(
        multi,
        ai,
        &mut session,
        Action::SetPage {
            page: Page::Analysis,
        },
    )
    .await;

    match session.navigator().error() {
        Some(message) => Err(message.to_string()),
        None => Ok(session),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = urbis_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Urbis");
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Analyze { location, json } => {
            let ai = UrbisAi::from_env();
            let session = match load_analysis(&multi, &ai, location).await {
                Ok(session) => session,
                Err(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&session.navigator().result())?
                );
            } else {
                print!("{}", render::page(&session.view()));
            }
        }
        Commands::Ask { question } => {
            let ai = UrbisAi::from_env();
            let mut session = Session::new();
            perform(
                &multi,
                &ai,
                &mut session,
                Action::SendMessage { text: question },
            )
            .await;

            match session.conversation().turns() {
                [_, reply] => println!("{}", reply.text),
                _ => {
                    eprintln!("Question must not be empty.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Map { location } => {
            let view = MapView::build(location.trim(), None, CityRegistry::gta());
            print!("{}", render::map(&view));
        }
        Commands::Serve => {
            log::info!("Starting API server...");
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(urbis_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}
