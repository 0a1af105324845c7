//! HTTP handler functions for the Urbis API.

use actix_web::{HttpResponse, web};
use urbis_app::views::{MapView, PageView};
use urbis_app::{Action, run_effect};
use urbis_server_models::{
    ApiError, ApiHealth, ChatRequest, HotspotRequest, LocationRequest, MapQuery, PageRequest,
};

use crate::AppState;

/// Dispatches `action`, runs its effect with the session unlocked, and
/// renders the resulting state.
async fn perform(state: &AppState, action: Action) -> PageView {
    let effect = state.session.lock().await.dispatch(action);

    if let Some(effect) = effect {
        let outcome = run_effect(&state.ai, effect).await;
        state.session.lock().await.apply(outcome);
    }

    state.session.lock().await.view()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/view`
///
/// Returns the current screen without changing anything.
pub async fn view(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.session.lock().await.view())
}

/// `GET /api/map`
///
/// Builds a map view for an arbitrary location. The selected hotspot or a
/// hotspot of the loaded analysis drives the overlay. The session is not
/// modified.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQuery>) -> HttpResponse {
    let location = params.location.trim();
    if location.is_empty() {
        return HttpResponse::BadRequest().json(ApiError {
            error: "location must not be empty".to_string(),
        });
    }

    let session = state.session.lock().await;
    let hotspot = session.navigator().hotspot_at(location);

    HttpResponse::Ok().json(MapView::build(location, hotspot, session.registry()))
}

/// `POST /api/page`
pub async fn set_page(state: web::Data<AppState>, body: web::Json<PageRequest>) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, body.into_inner().into()).await)
}

/// `POST /api/location`
///
/// Used by both the search box and the quick-select buttons.
pub async fn set_location(
    state: web::Data<AppState>,
    body: web::Json<LocationRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, body.into_inner().into()).await)
}

/// `POST /api/hotspot`
pub async fn select_hotspot(
    state: web::Data<AppState>,
    body: web::Json<HotspotRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, body.into_inner().into()).await)
}

/// `POST /api/retry`
pub async fn retry(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, Action::Retry).await)
}

/// `POST /api/chat/open`
pub async fn open_chat(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, Action::OpenChat).await)
}

/// `POST /api/chat/close`
pub async fn close_chat(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, Action::CloseChat).await)
}

/// `POST /api/chat`
///
/// Responds once the assistant's reply (or the error turn) is recorded.
pub async fn send_chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> HttpResponse {
    HttpResponse::Ok().json(perform(&state, body.into_inner().into()).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use serde_json::Value;
    use urbis_ai::test_support::{ScriptedProvider, analysis_json};
    use urbis_ai::{AiError, UrbisAi};

    use crate::{AppState, configure};

    fn state(responses: Vec<Result<String, AiError>>) -> web::Data<AppState> {
        web::Data::new(AppState::new(UrbisAi::new(Arc::new(
            ScriptedProvider::new(responses),
        ))))
    }

    #[actix_rt::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state(vec![])).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_rt::test]
    async fn analysis_page_then_hotspot() {
        let app = test::init_service(
            App::new()
                .app_data(state(vec![
                    Ok(analysis_json("Greater Toronto Area")),
                    Ok(analysis_json("Lakeside, Greater Toronto Area")),
                ]))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/page")
            .set_json(serde_json::json!({"page": "analysis"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["header"], "Growth in Greater Toronto Area");
        assert_eq!(body["body"]["body"]["state"], "ready");
        assert_eq!(body["body"]["body"]["map"]["zoomValue"], 9);

        let req = test::TestRequest::post()
            .uri("/api/hotspot")
            .set_json(serde_json::json!({"locationQuery": "Lakeside, Greater Toronto Area"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"]["location"], "Lakeside, Greater Toronto Area");
        assert_eq!(body["body"]["body"]["map"]["zoomValue"], 15);
        let shown = &body["body"]["body"]["map"]["selectedHotspot"];
        assert_eq!(shown["name"], "Lakeside");
        assert_eq!(shown["reason"], "Redevelopment.");

        let req = test::TestRequest::get()
            .uri("/api/map?location=Lakeside%2C%20Greater%20Toronto%20Area")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["selectedHotspot"]["name"], "Lakeside");
    }

    #[actix_rt::test]
    async fn failed_fetch_offers_retry() {
        let app = test::init_service(
            App::new()
                .app_data(state(vec![
                    Ok("   ".to_string()),
                    Ok(analysis_json("Greater Toronto Area")),
                ]))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/page")
            .set_json(serde_json::json!({"page": "analysis"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"]["body"]["state"], "error");
        assert_eq!(body["body"]["body"]["canRetry"], true);

        let req = test::TestRequest::post().uri("/api/retry").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"]["body"]["state"], "ready");
    }

    #[actix_rt::test]
    async fn chat_round_trip() {
        let app = test::init_service(
            App::new()
                .app_data(state(vec![Ok("Brampton is growing.".to_string())]))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/chat/open").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["chat"]["open"], true);

        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({"message": "Which city is growing?"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let turns = body["chat"]["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1]["role"], "assistant");
        assert_eq!(turns[1]["text"], "Brampton is growing.");
    }

    #[actix_rt::test]
    async fn map_endpoint_is_pure() {
        let app = test::init_service(App::new().app_data(state(vec![])).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/map?location=Markham")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["zoom"], "city");
        assert_eq!(body["title"], "Map of Markham");

        let req = test::TestRequest::get().uri("/api/view").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["body"]["page"], "intro");

        let req = test::TestRequest::get().uri("/api/map?location=%20").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
