#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Urbis app.
//!
//! Exposes a single shared [`Session`] over JSON. Every mutating endpoint
//! dispatches an [`urbis_app::Action`], runs the resulting AI call without
//! holding the session lock, commits the outcome and returns the rendered
//! [`urbis_app::views::PageView`]. A front-end can poll `GET /api/view` to
//! observe loading and pending-chat states while another request waits on
//! the AI.

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use tokio::sync::Mutex;
use urbis_ai::UrbisAi;
use urbis_app::Session;

/// Shared application state.
pub struct AppState {
    /// The app session. Held only while dispatching, applying or
    /// rendering, never across an AI call.
    pub session: Mutex<Session>,
    /// AI backend.
    pub ai: UrbisAi,
}

impl AppState {
    /// Creates state with a fresh GTA session.
    #[must_use]
    pub fn new(ai: UrbisAi) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            ai,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/view", web::get().to(handlers::view))
            .route("/map", web::get().to(handlers::map))
            .route("/page", web::post().to(handlers::set_page))
            .route("/location", web::post().to(handlers::set_location))
            .route("/hotspot", web::post().to(handlers::select_hotspot))
            .route("/retry", web::post().to(handlers::retry))
            .route("/chat/open", web::post().to(handlers::open_chat))
            .route("/chat/close", web::post().to(handlers::close_chat))
            .route("/chat", web::post().to(handlers::send_chat)),
    );
}

/// Starts the Urbis API server.
///
/// Builds the AI client from the environment and starts the Actix-Web
/// HTTP server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    if pretty_env_logger::try_init_custom_env("RUST_LOG").is_err() {
        log::debug!("Logger already initialized");
    }

    log::info!("Configuring AI client...");
    let state = web::Data::new(AppState::new(UrbisAi::from_env()));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
