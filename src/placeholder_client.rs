//! placeholder_client.rs
//!
//! HTTP client for the public placeholder REST API that backs the dashboard
//! (posts) and reports (users) resources.
//!
//! Every call goes through a [`CircuitBreaker`]: transport errors and 5xx
//! responses count as failures, and once the threshold is reached requests are
//! refused locally until the breaker's timeout elapses. A 404 is an answer,
//! not a failure, and is reported as such.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::{CircuitBreakerConfig, PlaceholderApiConfig};
use crate::models::{CreatePost, Post, UpdatePost, User};
use crate::services::circuit_breaker::CircuitBreaker;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Placeholder API temporarily unavailable")]
    CircuitOpen,

    #[error("Placeholder API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Placeholder API returned {status} for {path}")]
    Status { status: StatusCode, path: String },

    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Clone)]
pub struct PlaceholderClient {
    base_url: String,
    http: Client,
    breaker: Arc<CircuitBreaker>,
}

impl PlaceholderClient {
    pub fn new(
        api: &PlaceholderApiConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .build()?;
        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            http,
            breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                Duration::from_secs(breaker.timeout_seconds),
            )),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request through the circuit breaker and checks the status.
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Response, UpstreamError> {
        if !self.breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking request to {}", path);
            return Err(UpstreamError::CircuitOpen);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Placeholder API request to {} failed: {:?}", path, e);
                self.breaker.record_failure();
                return Err(UpstreamError::Http(e));
            }
        };

        let status = response.status();
        if status.is_server_error() {
            error!("Placeholder API returned {} for {}", status, path);
            self.breaker.record_failure();
            return Err(UpstreamError::Status { status, path: path.to_string() });
        }

        self.breaker.record_success();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(path.trim_start_matches('/').to_string()));
        }
        if !status.is_success() {
            return Err(UpstreamError::Status { status, path: path.to_string() });
        }
        debug!("Placeholder API {} -> {}", path, status);
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let response = self.execute(self.http.get(self.url(path)), path).await?;
        Ok(response.json().await?)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, UpstreamError> {
        self.fetch("/posts").await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, UpstreamError> {
        self.fetch(&format!("/posts/{id}")).await
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Post, UpstreamError> {
        let path = "/posts";
        let response = self
            .execute(self.http.post(self.url(path)).json(post), path)
            .await?;
        Ok(response.json().await?)
    }

    pub async fn update_post(&self, id: i64, update: &UpdatePost) -> Result<Post, UpstreamError> {
        let path = format!("/posts/{id}");
        let response = self
            .execute(self.http.put(self.url(&path)).json(update), &path)
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), UpstreamError> {
        let path = format!("/posts/{id}");
        self.execute(self.http.delete(self.url(&path)), &path).await?;
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UpstreamError> {
        self.fetch("/users").await
    }

    pub async fn get_user(&self, id: i64) -> Result<User, UpstreamError> {
        self.fetch(&format!("/users/{id}")).await
    }
}
