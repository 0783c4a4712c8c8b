//! Review Routes
//!
//! - POST /api/v1/reviews - Visitor review, queued for moderation

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::admin::{ops, ReviewInput};
use crate::api::dto::ReviewSubmittedResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// POST /api/v1/reviews
///
/// Validated reviews are stored as pending; they stay off the public
/// testimonial list until an operator approves them.
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ReviewInput>,
) -> ApiResult<(StatusCode, Json<ReviewSubmittedResponse>)> {
    let now = Utc::now();
    let ((), report) = state
        .store
        .update(|doc| ops::submit_review(doc, &input, now))
        .await?;

    if let Some(error) = report.remote_error() {
        tracing::warn!(error = %error, "Review saved locally only");
    }
    tracing::info!("Review submitted for moderation");

    Ok((
        StatusCode::CREATED,
        Json(ReviewSubmittedResponse {
            status: "pending".to_string(),
            message: "Thank you! Your review will appear once it has been approved.".to_string(),
        }),
    ))
}
