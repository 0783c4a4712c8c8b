//! Admin Routes
//!
//! Everything under `/api/v1/admin` except `login` requires a session
//! token. Each edit runs as one load/edit/save cycle; the response carries
//! the save report so a failed remote write is visible to the operator
//! even though the request succeeds.
//!
//! - POST /admin/login, POST /admin/logout, GET /admin/status
//! - PUT /admin/content - Replace the whole document
//! - PUT /admin/hero/stats, POST /admin/hero/slides, DELETE /admin/hero/slides/:index
//! - PUT /admin/certification, PUT /admin/about, PUT /admin/contact, PUT /admin/footer
//! - GET|POST /admin/testimonials, POST /admin/testimonials/:index/approve,
//!   DELETE /admin/testimonials/:index
//! - POST /admin/albums, DELETE /admin/albums/:id,
//!   POST /admin/albums/:id/images, DELETE /admin/albums/:id/images/:index
//! - POST /admin/gallery/recent, DELETE /admin/gallery/recent/:index,
//!   POST /admin/gallery/reset
//! - POST /admin/sync/force

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::admin::{
    ops, AboutUpdate, ContactUpdate, FooterUpdate, ImageSource, NewAlbum, NewTestimonial,
};
use crate::api::auth::AdminSession;
use crate::api::dto::{
    AdminStatusResponse, AdminTestimonialsResponse, ImageRequest, IndexedTestimonial,
    LoginRequest, LoginResponse, ResyncResponse, SaveResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::content::{reconcile, Certification, HeroSlide, HeroStats, SaveReport};

fn saved(report: SaveReport) -> Json<SaveResponse> {
    Json(SaveResponse::new(report))
}

fn created(response: SaveResponse) -> (StatusCode, Json<SaveResponse>) {
    (StatusCode::CREATED, Json(response))
}

// ============================================
// Session
// ============================================

/// POST /api/v1/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state
        .gate
        .login(&req.password)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Incorrect password".to_string()))?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// POST /api/v1/admin/logout
pub async fn logout(State(state): State<Arc<AppState>>, session: AdminSession) -> StatusCode {
    state.gate.logout(&session.token).await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/admin/status
pub async fn status(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Json<AdminStatusResponse> {
    Json(AdminStatusResponse {
        store: state.store.status().await,
        active_sessions: state.gate.active_sessions().await,
        ws_connections: state.ws_connection_count(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ============================================
// Whole document
// ============================================

/// PUT /api/v1/admin/content
///
/// Accepts any stored shape; older layouts are upgraded and missing
/// sections filled from defaults before saving.
pub async fn replace_content(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(body): Json<Value>,
) -> ApiResult<Json<SaveResponse>> {
    let (document, migrations) = reconcile(body)?;
    if !migrations.is_empty() {
        tracing::info!(?migrations, "Upgraded replacement document");
    }
    Ok(saved(state.store.save(&document).await))
}

// ============================================
// Hero and sections
// ============================================

/// PUT /api/v1/admin/hero/stats
pub async fn set_stats(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(stats): Json<HeroStats>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| {
            ops::set_stats(doc, stats);
            Ok::<_, ApiError>(())
        })
        .await?;
    Ok(saved(report))
}

/// POST /api/v1/admin/hero/slides
pub async fn add_slide(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(slide): Json<HeroSlide>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let image = ImageSource::Url(slide.image.clone()).resolve().await?;
    let slide = HeroSlide { image, ..slide };

    let (index, report) = state
        .store
        .update(|doc| ops::add_slide(doc, slide))
        .await?;
    Ok(created(SaveResponse::new(report).with_index(index)))
}

/// DELETE /api/v1/admin/hero/slides/:index
pub async fn remove_slide(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
) -> ApiResult<Json<SaveResponse>> {
    let (_, report) = state
        .store
        .update(|doc| ops::remove_slide(doc, index))
        .await?;
    Ok(saved(report))
}

/// PUT /api/v1/admin/certification
pub async fn set_certification(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(certification): Json<Certification>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| {
            ops::set_certification(doc, certification);
            Ok::<_, ApiError>(())
        })
        .await?;
    Ok(saved(report))
}

/// PUT /api/v1/admin/about
pub async fn update_about(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(update): Json<AboutUpdate>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| ops::update_about(doc, update))
        .await?;
    Ok(saved(report))
}

/// PUT /api/v1/admin/contact
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(update): Json<ContactUpdate>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| {
            ops::update_contact(doc, update);
            Ok::<_, ApiError>(())
        })
        .await?;
    Ok(saved(report))
}

/// PUT /api/v1/admin/footer
pub async fn update_footer(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(update): Json<FooterUpdate>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| {
            ops::update_footer(doc, update);
            Ok::<_, ApiError>(())
        })
        .await?;
    Ok(saved(report))
}

// ============================================
// Testimonials
// ============================================

/// GET /api/v1/admin/testimonials
///
/// All testimonials, pending included, with their current index.
pub async fn list_testimonials(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Json<AdminTestimonialsResponse> {
    let document = state.store.load().await;
    let pending = document.pending_testimonials().count();
    let testimonials: Vec<_> = document
        .testimonials
        .into_iter()
        .enumerate()
        .map(|(index, testimonial)| IndexedTestimonial { index, testimonial })
        .collect();

    Json(AdminTestimonialsResponse {
        total: testimonials.len(),
        pending,
        testimonials,
    })
}

/// POST /api/v1/admin/testimonials
pub async fn add_testimonial(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(input): Json<NewTestimonial>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let now = Utc::now();
    let ((), report) = state
        .store
        .update(|doc| ops::add_testimonial(doc, input, now))
        .await?;
    Ok(created(SaveResponse::new(report).with_index(0)))
}

/// POST /api/v1/admin/testimonials/:index/approve
pub async fn approve_testimonial(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| ops::approve_testimonial(doc, index))
        .await?;
    tracing::info!(index, "Testimonial approved");
    Ok(saved(report))
}

/// DELETE /api/v1/admin/testimonials/:index
///
/// Rejecting a pending review and deleting a published testimonial are
/// the same removal.
pub async fn remove_testimonial(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
) -> ApiResult<Json<SaveResponse>> {
    let (removed, report) = state
        .store
        .update(|doc| ops::remove_testimonial(doc, index))
        .await?;
    tracing::info!(index, pending = !removed.is_approved(), "Testimonial removed");
    Ok(saved(report))
}

// ============================================
// Gallery
// ============================================

/// POST /api/v1/admin/albums
pub async fn create_album(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(input): Json<NewAlbum>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let cover_url = ImageSource::Url(input.cover_url.clone()).resolve().await?;
    let input = NewAlbum { cover_url, ..input };
    let now = Utc::now();

    let (id, report) = state
        .store
        .update(|doc| ops::create_album(doc, input, now))
        .await?;
    tracing::info!(album_id = %id, "Album created");
    Ok(created(SaveResponse::new(report).with_id(id)))
}

/// DELETE /api/v1/admin/albums/:id
pub async fn remove_album(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<SaveResponse>> {
    let (_, report) = state
        .store
        .update(|doc| ops::remove_album_by_id(doc, &id))
        .await?;
    tracing::info!(album_id = %id, "Album removed");
    Ok(saved(report))
}

/// POST /api/v1/admin/albums/:id/images
pub async fn add_album_image(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(req): Json<ImageRequest>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let url = ImageSource::Url(req.url).resolve().await?;
    let (index, report) = state
        .store
        .update(|doc| ops::add_album_image(doc, &id, &url))
        .await?;
    Ok(created(SaveResponse::new(report).with_id(id).with_index(index)))
}

/// DELETE /api/v1/admin/albums/:id/images/:index
pub async fn remove_album_image(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path((id, index)): Path<(String, usize)>,
) -> ApiResult<Json<SaveResponse>> {
    let (_, report) = state
        .store
        .update(|doc| ops::remove_album_image(doc, &id, index))
        .await?;
    Ok(saved(report))
}

/// POST /api/v1/admin/gallery/recent
pub async fn add_recent(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(req): Json<ImageRequest>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let url = ImageSource::Url(req.url).resolve().await?;
    let ((), report) = state
        .store
        .update(|doc| ops::add_recent(doc, &url))
        .await?;
    Ok(created(SaveResponse::new(report).with_index(0)))
}

/// DELETE /api/v1/admin/gallery/recent/:index
pub async fn remove_recent(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
) -> ApiResult<Json<SaveResponse>> {
    let (_, report) = state
        .store
        .update(|doc| ops::remove_recent(doc, index))
        .await?;
    Ok(saved(report))
}

/// POST /api/v1/admin/gallery/reset
pub async fn reset_gallery(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> ApiResult<Json<SaveResponse>> {
    let ((), report) = state
        .store
        .update(|doc| {
            ops::reset_gallery(doc);
            Ok::<_, ApiError>(())
        })
        .await?;
    tracing::info!("Recent highlights reset to defaults");
    Ok(saved(report))
}

// ============================================
// Sync
// ============================================

/// POST /api/v1/admin/sync/force
///
/// Drops the local copy so the next read comes from the remote store.
pub async fn force_sync(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> ApiResult<Json<ResyncResponse>> {
    let cleared_local = state.store.force_resync().await?;
    Ok(Json(ResyncResponse { cleared_local }))
}
