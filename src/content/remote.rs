//! Remote Content Store
//!
//! The hosted table that holds the authoritative copy of the document when
//! one is configured. The table has a single row (`id = 1`) whose `content`
//! column is the whole document as JSON.
//!
//! - [`RemoteStore`]: the seam the engine talks to
//! - [`HostedTableClient`]: REST client for a PostgREST-style endpoint
//! - [`MemoryRemote`]: in-process stand-in with failure injection

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// URL shipped in unconfigured deployments; treated as "no remote"
pub const PLACEHOLDER_URL: &str = "https://your-project-url.supabase.co";

/// Errors that can occur when talking to the remote store
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote store not configured")]
    NotConfigured,

    #[error("Remote store unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if e.is_connect() {
            RemoteError::Unavailable
        } else {
            RemoteError::Request(e)
        }
    }
}

/// Storage for the single content row
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the stored document. `None` when the row or its content is absent.
    async fn fetch(&self) -> Result<Option<Value>, RemoteError>;

    /// Insert or replace the stored document
    async fn upsert(&self, content: &Value) -> Result<(), RemoteError>;

    /// Check connectivity without reading the document
    async fn ping(&self) -> Result<(), RemoteError>;

    /// Short human-readable location for logs and status output
    fn describe(&self) -> String;
}

/// Configuration for the hosted table client
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://abcd.supabase.co`
    pub url: String,
    /// Public anon key sent with every request
    pub anon_key: String,
    /// Table holding the content row
    pub table: String,
    /// Primary key of the content row
    pub row_id: i64,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts for writes
    pub max_retries: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            anon_key: String::new(),
            table: "site_content".to_string(),
            row_id: 1,
            request_timeout_ms: 5000,
            max_retries: 3,
        }
    }
}

impl RemoteConfig {
    /// Whether the URL points at a real project
    pub fn is_configured(&self) -> bool {
        let url = self.url.trim();
        !url.is_empty() && url.trim_end_matches('/') != PLACEHOLDER_URL
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.url.trim_end_matches('/'),
            urlencoding::encode(&self.table)
        )
    }
}

/// REST client for the hosted content table
pub struct HostedTableClient {
    client: Client,
    config: RemoteConfig,
}

impl HostedTableClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    async fn api_error(response: reqwest::Response) -> RemoteError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        RemoteError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RemoteStore for HostedTableClient {
    async fn fetch(&self) -> Result<Option<Value>, RemoteError> {
        let url = format!(
            "{}?select=content&id=eq.{}",
            self.config.table_url(),
            self.config.row_id
        );

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(RemoteError::from_transport)?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let rows: Vec<ContentRow> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(rows.into_iter().next().and_then(|row| row.content))
    }

    async fn upsert(&self, content: &Value) -> Result<(), RemoteError> {
        let url = self.config.table_url();
        let body = [UpsertRow {
            id: self.config.row_id,
            content,
        }];
        let mut last_error = RemoteError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                // Backoff: 1s, 4s, 9s...
                let delay = std::time::Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            let request = self
                .authorized(self.client.post(&url))
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&body);

            match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) if response.status().as_u16() == 429 => {
                    if let Some(secs) = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                    {
                        tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
                    }
                    last_error = Self::api_error(response).await;
                }
                Ok(response) => return Err(Self::api_error(response).await),
                Err(e) => {
                    last_error = RemoteError::from_transport(e);
                    tracing::debug!(attempt, error = %last_error, "Remote upsert attempt failed");
                }
            }
        }

        Err(last_error)
    }

    async fn ping(&self) -> Result<(), RemoteError> {
        let url = format!("{}?select=id&limit=1", self.config.table_url());
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(RemoteError::from_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.config.url, self.config.table)
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct ContentRow {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    id: i64,
    content: &'a Value,
}

// ============================================
// In-memory remote
// ============================================

/// Remote store held in memory.
///
/// `set_available(false)` makes every call fail with
/// [`RemoteError::Unavailable`].
#[derive(Default)]
pub struct MemoryRemote {
    content: RwLock<Option<Value>>,
    unavailable: AtomicBool,
    upserts: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored document
    pub fn with_content(content: Value) -> Self {
        Self {
            content: RwLock::new(Some(content)),
            ..Self::default()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of successful upserts so far
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Replace the stored document directly, as another device would
    pub async fn replace(&self, content: Option<Value>) {
        *self.content.write().await = content;
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch(&self) -> Result<Option<Value>, RemoteError> {
        self.check()?;
        Ok(self.content.read().await.clone())
    }

    async fn upsert(&self, content: &Value) -> Result<(), RemoteError> {
        self.check()?;
        *self.content.write().await = Some(content.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RemoteError> {
        self.check()
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
