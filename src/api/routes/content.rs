//! Public Content Routes
//!
//! - GET /api/v1/content - Reconciled site document
//! - GET /api/v1/testimonials - Approved testimonials only
//! - GET /api/v1/albums/:id - A single gallery album

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::admin::ops::find_album;
use crate::api::dto::{ContentResponse, TestimonialListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::content::Album;

/// GET /api/v1/content
///
/// Never fails: with nothing stored anywhere this is the default document.
pub async fn get_content(State(state): State<Arc<AppState>>) -> Json<ContentResponse> {
    let outcome = state.store.load_with_source().await;

    Json(ContentResponse {
        content: outcome.document,
        source: outcome.source,
        migrations: outcome.migrations.iter().map(ToString::to_string).collect(),
    })
}

/// GET /api/v1/testimonials
pub async fn list_testimonials(
    State(state): State<Arc<AppState>>,
) -> Json<TestimonialListResponse> {
    let document = state.store.load().await;
    let testimonials: Vec<_> = document.approved_testimonials().cloned().collect();

    Json(TestimonialListResponse {
        total: testimonials.len(),
        testimonials,
    })
}

/// GET /api/v1/albums/:id
pub async fn get_album(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Album>> {
    let document = state.store.load().await;

    find_album(&document, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Album '{}' not found", id)))
}
