//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Document sections themselves are serialized as stored (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ContentDocument, LoadSource, SaveReport, StoreStatus, Testimonial};

// ============================================
// CONTENT DTOs
// ============================================

/// Current site content and where it came from
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: ContentDocument,
    pub source: LoadSource,
    /// Upgrades applied while loading
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub migrations: Vec<String>,
}

/// Published testimonials
#[derive(Debug, Serialize)]
pub struct TestimonialListResponse {
    pub testimonials: Vec<Testimonial>,
    pub total: usize,
}

/// Result of a visitor review submission
#[derive(Debug, Serialize)]
pub struct ReviewSubmittedResponse {
    pub status: String,
    pub message: String,
}

// ============================================
// ADMIN DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Store status plus server details
#[derive(Debug, Serialize)]
pub struct AdminStatusResponse {
    pub store: StoreStatus,
    pub active_sessions: usize,
    pub ws_connections: usize,
    pub uptime_seconds: u64,
}

/// Testimonial with its current position, for moderation
#[derive(Debug, Serialize)]
pub struct IndexedTestimonial {
    pub index: usize,
    #[serde(flatten)]
    pub testimonial: Testimonial,
}

#[derive(Debug, Serialize)]
pub struct AdminTestimonialsResponse {
    pub testimonials: Vec<IndexedTestimonial>,
    pub total: usize,
    pub pending: usize,
}

/// Image given by URL (plain or `data:`)
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub url: String,
}

/// Outcome of an edit that was saved
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// "ok", or "partial" when the remote write failed
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub save: SaveReport,
}

impl SaveResponse {
    pub fn new(save: SaveReport) -> Self {
        let status = if save.remote.is_failed() || save.local.is_failed() {
            "partial"
        } else {
            "ok"
        };
        Self {
            status: status.to_string(),
            id: None,
            index: None,
            save,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ResyncResponse {
    /// Whether a local copy was dropped
    pub cleared_local: bool,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", "unhealthy"
    pub status: String,
    /// Local store status
    pub local: String,
    /// Remote store status: "ok", "error" or "disabled"
    pub remote: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Service version
    pub version: String,
}
