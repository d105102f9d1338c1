//! Browser `fetch` backends for the leaderboard and session telemetry
//!
//! Requests run on the microtask queue via `spawn_local`. Responses only
//! write into shared caches; nothing here blocks a frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::leaderboard::{LeaderboardEntry, LeaderboardService, ScoreSubmission, compare_entries};
use super::telemetry::SessionTelemetry;
use crate::error::ServiceError;

fn js_error(err: JsValue) -> ServiceError {
    ServiceError::Request(format!("{:?}", err))
}

fn build_request(method: &str, url: &str, body: Option<&str>) -> Result<Request, ServiceError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        opts.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_error)?;
    Ok(request)
}

async fn fetch_text(request: Request) -> Result<String, ServiceError> {
    let window = web_sys::window().ok_or(ServiceError::NotConfigured)?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: Response = value.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(ServiceError::Status(response.status()));
    }
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(text.as_string().unwrap_or_default())
}

/// Send a request and ignore the body; failures are logged
fn fire_and_forget(request: Request, what: &'static str) {
    spawn_local(async move {
        if let Err(e) = fetch_text(request).await {
            log::warn!("{} failed: {}", what, e);
        }
    });
}

/// Fetch the top list and replace `cache` with it
async fn refresh_top_scores(
    url: String,
    limit: usize,
    cache: Rc<RefCell<Vec<LeaderboardEntry>>>,
) {
    let result = match build_request("GET", &url, None) {
        Ok(request) => fetch_text(request).await.and_then(|text| {
            serde_json::from_str::<Vec<LeaderboardEntry>>(&text).map_err(ServiceError::from)
        }),
        Err(e) => Err(e),
    };
    match result {
        Ok(mut entries) => {
            entries.sort_by(compare_entries);
            entries.truncate(limit);
            log::info!("Fetched {} leaderboard entries", entries.len());
            // A frame may be reading the cache; skip this update if so
            if let Ok(mut c) = cache.try_borrow_mut() {
                *c = entries;
            }
        }
        Err(e) => log::warn!("Leaderboard fetch failed: {}", e),
    }
}

/// Leaderboard backed by a JSON HTTP API
pub struct HttpLeaderboard {
    base_url: String,
    limit: usize,
    cache: Rc<RefCell<Vec<LeaderboardEntry>>>,
}

impl HttpLeaderboard {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit: 10,
            cache: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn top_url(&self) -> String {
        format!("{}/scores?limit={}", self.base_url, self.limit)
    }
}

impl LeaderboardService for HttpLeaderboard {
    fn submit_score(&mut self, submission: &ScoreSubmission) -> Result<bool, ServiceError> {
        let body = serde_json::to_string(submission)?;
        let url = format!("{}/scores", self.base_url);
        let request = build_request("POST", &url, Some(&body))?;
        let (top_url, limit, cache) = (self.top_url(), self.limit, self.cache.clone());
        // Refresh only after the POST lands so the new score is in the list
        spawn_local(async move {
            match fetch_text(request).await {
                Ok(_) => refresh_top_scores(top_url, limit, cache).await,
                Err(e) => log::warn!("Score submission failed: {}", e),
            }
        });
        Ok(true)
    }

    fn request_top_scores(&mut self, limit: usize) -> Result<(), ServiceError> {
        self.limit = limit;
        spawn_local(refresh_top_scores(self.top_url(), limit, self.cache.clone()));
        Ok(())
    }

    fn cached_top_scores(&self) -> Vec<LeaderboardEntry> {
        self.cache
            .try_borrow()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

/// Session hooks posted as small JSON bodies
pub struct HttpTelemetry {
    base_url: String,
    active_players: Rc<Cell<Option<u32>>>,
}

impl HttpTelemetry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            active_players: Rc::new(Cell::new(None)),
        }
    }

    fn post(&self, path: &str, session_id: &str) -> Result<Request, ServiceError> {
        let body = serde_json::json!({ "sessionId": session_id }).to_string();
        build_request("POST", &format!("{}/{}", self.base_url, path), Some(&body))
    }
}

impl SessionTelemetry for HttpTelemetry {
    fn start_session(&mut self, session_id: &str) -> Result<(), ServiceError> {
        fire_and_forget(self.post("session/start", session_id)?, "Session start");
        Ok(())
    }

    fn heartbeat(&mut self, session_id: &str) -> Result<(), ServiceError> {
        let request = self.post("session/heartbeat", session_id)?;
        let players = self.active_players.clone();
        spawn_local(async move {
            match fetch_text(request).await {
                Ok(text) => {
                    let count = serde_json::from_str::<serde_json::Value>(&text)
                        .ok()
                        .and_then(|v| v.get("activePlayers").and_then(|n| n.as_u64()))
                        .map(|n| n as u32);
                    players.set(count);
                }
                Err(e) => {
                    log::warn!("Heartbeat failed: {}", e);
                    players.set(None);
                }
            }
        });
        Ok(())
    }

    fn end_session(&mut self, session_id: &str) -> Result<(), ServiceError> {
        fire_and_forget(self.post("session/end", session_id)?, "Session end");
        Ok(())
    }

    fn active_players(&self) -> Option<u32> {
        self.active_players.get()
    }
}
