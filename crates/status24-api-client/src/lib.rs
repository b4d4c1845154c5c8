//! Shared HTTP client for the Status24 API.
//!
//! Provides a minimal client with optional bearer auth, generic JSON helpers,
//! and domain methods (status pages, tenant mutations, admin actions). On top
//! of it sit the console workflows, the live status feed and session
//! resolution. The CLI uses this crate directly.

pub mod api;
pub mod console;
pub mod error;
pub mod feed;
pub mod session;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub use api::UserOrgResponse;
pub use console::{
    AdminConsole, IncidentDraft, IncidentEdit, Notification, Notifier, ServiceDraft, TenantConsole,
    TracingNotifier,
};
pub use error::{ClientError, Result};
pub use feed::{FeedEvent, StatusFeed};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// HTTP client for the Status24 API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    publishable_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            publishable_key: None,
        })
    }

    /// Create client from environment: STATUS24_API_URL (or VITE_API_URL, API_URL),
    /// STATUS24_TOKEN for bearer auth, STATUS24_PUBLISHABLE_KEY for the identity frontend key.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STATUS24_API_URL")
            .or_else(|_| std::env::var("VITE_API_URL"))
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let mut client = Self::new(base_url, std::env::var("STATUS24_TOKEN").ok())?;
        client.publishable_key = std::env::var("STATUS24_PUBLISHABLE_KEY").ok();
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn publishable_key(&self) -> Option<&str> {
        self.publishable_key.as_deref()
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.build_url(path))
            .timeout(Duration::from_secs(60));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Raw request without the overall timeout, for long-lived streams.
    pub(crate) fn stream_request(&self, path: &str) -> RequestBuilder {
        let request = self
            .client
            .get(self.build_url(path))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self.request(Method::GET, path);
        if !query.is_empty() {
            request = request.query(query);
        }
        decode(check(request.send().await?).await?).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::POST, path, body).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::PUT, path, body).await
    }

    /// DELETE with a JSON body (the API identifies targets in the body).
    pub async fn delete_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::DELETE, path, body).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, path).json(body).send().await?;
        decode(check(response).await?).await
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    error: Option<String>,
}

/// Turns a non-2xx response into [`ClientError::Api`], keeping the server's `detail`.
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.detail.or(body.error).unwrap_or_default(),
        Err(_) => text.trim().to_string(),
    };
    tracing::debug!(status = status.as_u16(), detail = %detail, "API request failed");

    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
