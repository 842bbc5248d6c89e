//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for the studio endpoints.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/studio{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_empty(&self, path: &str) -> Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// POST /v1/studio/analysis
    pub async fn analyze(&self, idea: &str) -> Response {
        self.post_json("/analysis", json!({ "idea": idea })).await
    }

    /// POST /v1/studio/analysis with details and language
    pub async fn analyze_with(&self, idea: &str, details: Value, language: &str) -> Response {
        self.post_json(
            "/analysis",
            json!({ "idea": idea, "ideaDetails": details, "language": language }),
        )
        .await
    }

    /// GET /v1/studio/analysis
    pub async fn get_analysis(&self) -> Response {
        self.get("/analysis").await
    }

    /// POST /v1/studio/analysis/elements/{name}/details
    pub async fn element_details(&self, name: &str) -> Response {
        self.post_empty(&format!("/analysis/elements/{}/details", name))
            .await
    }

    /// POST /v1/studio/analysis/elements/{name}/further-reading
    pub async fn element_further_reading(&self, name: &str) -> Response {
        self.post_empty(&format!("/analysis/elements/{}/further-reading", name))
            .await
    }

    /// POST /v1/studio/analysis/brief
    pub async fn production_brief(&self) -> Response {
        self.post_empty("/analysis/brief").await
    }

    /// POST /v1/studio/analysis/costs
    pub async fn production_costs(&self) -> Response {
        self.post_empty("/analysis/costs").await
    }

    /// POST /v1/studio/analysis/producers
    pub async fn producers(&self, max_results: usize) -> Response {
        self.post_empty(&format!("/analysis/producers?maxResults={}", max_results))
            .await
    }

    // ========================================================================
    // Generators
    // ========================================================================

    /// POST /v1/studio/song-idea
    pub async fn song_idea(&self, description: &str) -> Response {
        self.post_json("/song-idea", json!({ "description": description }))
            .await
    }

    /// POST /v1/studio/sheet-music
    pub async fn sheet_music(&self, description: &str, engine: &str) -> Response {
        self.post_json(
            "/sheet-music",
            json!({ "description": description, "engine": engine }),
        )
        .await
    }

    // ========================================================================
    // Market trends
    // ========================================================================

    /// POST /v1/studio/market-trends
    pub async fn market_trends(&self, query: &str, mode: &str) -> Response {
        self.post_json("/market-trends", json!({ "query": query, "mode": mode }))
            .await
    }

    /// POST /v1/studio/market-trends/speech
    pub async fn market_speech(&self) -> Response {
        self.post_empty("/market-trends/speech").await
    }

    // ========================================================================
    // Providers and search
    // ========================================================================

    /// POST /v1/studio/providers
    pub async fn providers(&self, query: &str, category: &str) -> Response {
        self.post_json(
            "/providers",
            json!({ "query": query, "category": category, "location": { "lat": 35.7, "lon": 51.4 } }),
        )
        .await
    }

    /// POST /v1/studio/search
    pub async fn search(&self, query: &str) -> Response {
        self.post_json("/search", json!({ "query": query })).await
    }

    // ========================================================================
    // Quota, state, tutor, projects
    // ========================================================================

    /// GET /v1/studio/quota
    pub async fn quota(&self) -> Response {
        self.get("/quota").await
    }

    /// DELETE /v1/studio/quota
    pub async fn dismiss_quota(&self) -> Response {
        self.client
            .delete(self.url("/quota"))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET /v1/studio/state
    pub async fn state(&self) -> Response {
        self.get("/state").await
    }

    /// POST /v1/studio/tutor/setup
    pub async fn tutor_setup(&self, language: &str) -> Response {
        self.post_empty(&format!("/tutor/setup?language={}", language))
            .await
    }

    /// POST /v1/studio/tutor/events
    pub async fn tutor_event(&self, event: Value) -> Response {
        self.post_json("/tutor/events", event).await
    }

    /// POST /v1/studio/projects/snapshot
    pub async fn snapshot_project(&self, name: Option<&str>) -> Response {
        self.post_json("/projects/snapshot", json!({ "name": name }))
            .await
    }

    /// POST /v1/studio/projects/restore
    pub async fn restore_project(&self, project: Value) -> Response {
        self.post_json("/projects/restore", project).await
    }
}
