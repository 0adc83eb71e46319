mod layout;
mod pages;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::data::DataStore;

/// Shared-cache windows for the JSON endpoints, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub predictions_secs: u64,
    pub goalie_secs: u64,
    pub stale_while_revalidate_secs: u64,
}

impl CachePolicy {
    fn header(&self, fresh_secs: u64) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            fresh_secs, self.stale_while_revalidate_secs
        )
    }

    pub fn predictions_header(&self) -> String {
        self.header(self.predictions_secs)
    }

    pub fn goalie_header(&self) -> String {
        self.header(self.goalie_secs)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            predictions_secs: 60,
            goalie_secs: 300,
            stale_while_revalidate_secs: 300,
        }
    }
}

pub struct AppState {
    pub store: DataStore,
    pub cache: CachePolicy,
}

/// Build the site router: pages, JSON endpoints and optional static assets.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/", get(pages::home))
        .route("/predictions", get(pages::predictions))
        .route("/goalies", get(pages::goalies))
        .route("/performance", get(pages::performance))
        .route("/leaderboards", get(pages::leaderboards))
        .route("/betting", get(pages::betting))
        .route("/healthz", get(healthz))
        .route("/api/predictions", get(predictions_handler))
        .route("/api/goalie-pulse", get(goalie_pulse_handler));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn healthz() -> &'static str {
    "ok"
}

/// GET /api/predictions: the predictions artifact exactly as loaded
async fn predictions_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.store.snapshot();
    (
        [(header::CACHE_CONTROL, state.cache.predictions_header())],
        Json(snap.predictions.clone()),
    )
}

/// GET /api/goalie-pulse
async fn goalie_pulse_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.store.snapshot();
    (
        [(header::CACHE_CONTROL, state.cache.goalie_header())],
        Json(snap.goalie_pulse.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, Artifacts};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        app_with(fixtures::artifacts())
    }

    fn app_with(artifacts: Artifacts) -> Router {
        let state = AppState {
            store: DataStore::from_artifacts("unused", artifacts),
            cache: CachePolicy::default(),
        };
        router(state, None)
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let cache = resp
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, cache, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_cache_headers() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.predictions_header(),
            "public, s-maxage=60, stale-while-revalidate=300"
        );
        assert_eq!(
            policy.goalie_header(),
            "public, s-maxage=300, stale-while-revalidate=300"
        );
    }

    #[tokio::test]
    async fn test_api_predictions() {
        let (status, cache, body) = fetch(app(), "/api/predictions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache.as_deref(),
            Some("public, s-maxage=60, stale-while-revalidate=300")
        );
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let games = json["games"].as_array().unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(games[0]["homeTeam"]["abbrev"], "TOR");
        assert_eq!(games[0]["homeWinProb"], 0.62);
    }

    #[tokio::test]
    async fn test_api_goalie_pulse() {
        let (status, cache, body) = fetch(app(), "/api/goalie-pulse").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache.as_deref(),
            Some("public, s-maxage=300, stale-while-revalidate=300")
        );
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["goalies"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_api_on_empty_store() {
        let (status, _, body) = fetch(app_with(Artifacts::default()), "/api/predictions").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["games"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_healthz() {
        let (status, _, body) = fetch(app(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_home_shows_current_slate_only() {
        let (status, _, body) = fetch(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Boston Bruins @ Toronto Maple Leafs"));
        assert!(body.contains("Colorado Avalanche @ Seattle Kraken"));
        // Next-day game is not on the slate
        assert!(!body.contains("Toronto Maple Leafs @ New York Rangers"));
        assert!(body.contains("Games on Slate"));
    }

    #[tokio::test]
    async fn test_predictions_page_groups_by_date() {
        let (status, _, body) = fetch(app(), "/predictions").await;
        assert_eq!(status, StatusCode::OK);
        let first = body.find("Friday, November 14").unwrap();
        let second = body.find("Saturday, November 15").unwrap();
        assert!(first < second);
        assert!(body.contains(crate::data::models::TBD));
    }

    #[tokio::test]
    async fn test_goalies_page() {
        let (status, _, body) = fetch(app(), "/goalies").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Joseph Woll"));
        assert!(body.contains("trend-surging"));
    }

    #[tokio::test]
    async fn test_empty_pages_render_empty_states() {
        for (uri, message) in [
            ("/predictions", "No games listed"),
            ("/goalies", "No goalie reports yet"),
            ("/performance", "No bankroll history"),
            ("/betting", "No strategy backtests published"),
        ] {
            let (status, _, body) = fetch(app_with(Artifacts::default()), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(body.contains(message), "{} missing '{}'", uri, message);
        }
    }

    #[tokio::test]
    async fn test_performance_page() {
        let (status, _, body) = fetch(app(), "/performance").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("60.4%"));
        assert!(body.contains("<svg class=\"spark\""));
    }

    #[tokio::test]
    async fn test_leaderboards_page() {
        let (status, _, body) = fetch(app(), "/leaderboards").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Power Rankings"));
        assert!(body.contains("Team outlook for the slate"));
    }

    #[tokio::test]
    async fn test_betting_threshold_selection() {
        let (_, _, body) = fetch(app(), "/betting?threshold=10").await;
        assert!(body.contains(r#"<a href="/betting?threshold=10" class="active">"#));

        // Unknown gate snaps to the nearest published one
        let (_, _, body) = fetch(app(), "/betting?threshold=12").await;
        assert!(body.contains("showing the nearest gate (10 pts)"));

        // Garbage falls back to the default gate
        let (status, _, body) = fetch(app(), "/betting?threshold=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<a href="/betting?threshold=0" class="active">"#));
    }
}
