//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all gallery endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
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

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Painting Endpoints
    // ========================================================================

    /// GET /paintings with raw query pairs, e.g. `&[("page", "2")]`
    pub async fn list_paintings(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/paintings", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List paintings request failed")
    }

    /// GET /paintings/{id}
    pub async fn get_painting(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/paintings/{}", self.base_url, id))
            .send()
            .await
            .expect("Get painting request failed")
    }

    /// POST /paintings
    pub async fn create_painting(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/paintings", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create painting request failed")
    }

    /// PUT /paintings/{id}
    pub async fn update_painting(&self, id: i64, body: &Value) -> Response {
        self.client
            .put(format!("{}/paintings/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("Update painting request failed")
    }

    /// DELETE /paintings/{id}
    pub async fn delete_painting(&self, id: i64) -> Response {
        self.client
            .delete(format!("{}/paintings/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete painting request failed")
    }

    /// Creates a painting and returns its JSON representation
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer 201.
    pub async fn create_painting_ok(
        &self,
        title: &str,
        year: Option<i32>,
        artist_id: i64,
        museum_id: i64,
    ) -> Value {
        let response = self
            .create_painting(&json!({
                "title": title,
                "year": year,
                "artist_id": artist_id,
                "museum_id": museum_id,
            }))
            .await;
        let status = response.status();
        let body: Value = response.json().await.expect("Invalid painting JSON");
        assert_eq!(status, StatusCode::CREATED, "Creation failed: {}", body);
        body
    }

    // ========================================================================
    // Artist and Museum Endpoints
    // ========================================================================

    /// GET /artists/{id}
    pub async fn get_artist(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/artists/{}", self.base_url, id))
            .send()
            .await
            .expect("Get artist request failed")
    }

    /// POST /artists
    pub async fn create_artist(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/artists", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create artist request failed")
    }

    /// GET /museums/{id}
    pub async fn get_museum(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/museums/{}", self.base_url, id))
            .send()
            .await
            .expect("Get museum request failed")
    }

    /// POST /museums
    pub async fn create_museum(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/museums", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create museum request failed")
    }
}
