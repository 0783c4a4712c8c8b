//! Admin session extractor
//!
//! Handlers that take an [`AdminSession`] only run for requests carrying
//! `Authorization: Bearer <token>` with a live session token.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::admin::parse_bearer;
use crate::api::error::ApiError;
use crate::api::state::AppState;

/// A verified admin session token
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        if !state.gate.verify(token).await {
            return Err(ApiError::Unauthorized(
                "Session expired or invalid".to_string(),
            ));
        }

        Ok(AdminSession {
            token: token.to_string(),
        })
    }
}
