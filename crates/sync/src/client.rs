//! HTTP client for the Hightouch REST API.
//!
//! The client performs no retries. Re-requesting a run's status is the poll
//! loop's job, not error recovery.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientOptions;
use crate::error::{HightouchError, Result};
use crate::types::{RunListResponse, RunTrigger, SyncDetails, TriggerRunRequest};

/// A deserialized response with its status code and headers.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: T,
}

/// The three calls the run orchestrator needs from the API.
#[async_trait]
pub trait HightouchApi: Send + Sync {
    /// GET /api/v1/syncs/{syncId}
    async fn get_sync(&self, sync_id: i64) -> Result<SyncDetails>;

    /// POST /api/v1/syncs/{syncId}/trigger
    async fn trigger_run(&self, sync_id: i64, full_resync: bool) -> Result<RunTrigger>;

    /// GET /api/v1/syncs/{syncId}/runs?runId={runId}
    async fn list_runs(&self, sync_id: i64, run_id: i64) -> Result<RunListResponse>;
}

/// Client for the Hightouch API, authenticated with a bearer token.
///
/// # Example
///
/// ```ignore
/// let client = HightouchClient::new("your-token", &ClientOptions::default())?;
/// let sync = client.get_sync(1127166).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HightouchClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
}

impl HightouchClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the token is empty or not header-safe, if
    /// the base URL does not parse, or if the HTTP client cannot be built.
    pub fn new(token: &str, options: &ClientOptions) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(HightouchError::config("API token is required"));
        }

        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| HightouchError::config("Invalid API token format"))?;
        auth_header.set_sensitive(true);

        let base_url = options.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            HightouchError::config(format!("Invalid base URL '{}': {}", options.base_url, e))
        })?;

        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build().map_err(|e| {
            HightouchError::config(format!("Failed to initialize HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            auth_header,
        })
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    /// Perform a call and deserialize the JSON body.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Hightouch] {} {}", method, url);

        let mut request = self.client.request(method, &url).headers(self.headers());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Parse an HTTP response, keeping the raw body for diagnostics.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!("[Hightouch] response ({}): {}", status, body);

        if !status.is_success() {
            return Err(HightouchError::remote(status.as_u16(), body));
        }

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(ApiResponse {
                status: status.as_u16(),
                headers,
                body: parsed,
            }),
            Err(source) => {
                error!(
                    "[Hightouch] Failed to deserialize response. Body: {}, Error: {}",
                    body, source
                );
                Err(HightouchError::Decode { source, body })
            }
        }
    }
}

#[async_trait]
impl HightouchApi for HightouchClient {
    async fn get_sync(&self, sync_id: i64) -> Result<SyncDetails> {
        let response = self
            .request::<SyncDetails, ()>(Method::GET, &format!("/api/v1/syncs/{}", sync_id), None)
            .await?;
        Ok(response.body)
    }

    async fn trigger_run(&self, sync_id: i64, full_resync: bool) -> Result<RunTrigger> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/syncs/{}/trigger", sync_id),
                Some(&TriggerRunRequest { full_resync }),
            )
            .await?;
        Ok(response.body)
    }

    async fn list_runs(&self, sync_id: i64, run_id: i64) -> Result<RunListResponse> {
        let response = self
            .request::<RunListResponse, ()>(
                Method::GET,
                &format!("/api/v1/syncs/{}/runs?runId={}", sync_id, run_id),
                None,
            )
            .await?;
        Ok(response.body)
    }
}
