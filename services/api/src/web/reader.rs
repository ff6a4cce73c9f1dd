//! services/api/src/web/reader.rs
//!
//! Handlers used by the reader client: the token stream, playback progress
//! and the reading history.

use crate::error::service_error_response;
use crate::web::rest::DocumentResponse;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use wordflow_core::{PageBoundary, ProgressUpdate, ReadingActivity, ReadingProgress};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ProgressResponse {
    pub last_word_index: usize,
    pub wpm: i32,
    pub font_size: i32,
}

impl From<ReadingProgress> for ProgressResponse {
    fn from(progress: ReadingProgress) -> Self {
        Self {
            last_word_index: progress.last_word_index,
            wpm: progress.words_per_minute,
            font_size: progress.font_size,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ReaderViewResponse {
    pub document: DocumentResponse,
    pub progress: ProgressResponse,
    pub wpm_min: i32,
    pub wpm_max: i32,
}

/// The token range of one source page.
#[derive(Serialize, ToSchema)]
pub struct PageBoundaryResponse {
    pub page: usize,
    pub start: usize,
    pub end: usize,
    pub count: usize,
}

impl From<PageBoundary> for PageBoundaryResponse {
    fn from(boundary: PageBoundary) -> Self {
        Self {
            page: boundary.page,
            start: boundary.start,
            end: boundary.end,
            count: boundary.count,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct WordsResponse {
    pub words: Vec<String>,
    pub total: usize,
    pub document_name: String,
    pub pages: Vec<PageBoundaryResponse>,
}

/// A partial progress save; omitted fields keep their stored value.
#[derive(Deserialize, ToSchema, Default)]
pub struct SaveProgressRequest {
    pub last_word_index: Option<i64>,
    #[serde(alias = "words_per_minute")]
    pub wpm: Option<i64>,
    pub font_size: Option<i64>,
}

impl From<SaveProgressRequest> for ProgressUpdate {
    fn from(req: SaveProgressRequest) -> Self {
        Self {
            last_word_index: req.last_word_index,
            words_per_minute: req.wpm,
            font_size: req.font_size,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ActivityResponse {
    pub document_id: Uuid,
    pub document_name: String,
    pub date: NaiveDate,
    pub words_read: usize,
}

impl From<ReadingActivity> for ActivityResponse {
    fn from(activity: ReadingActivity) -> Self {
        Self {
            document_id: activity.document_id,
            document_name: activity.document_name,
            date: activity.date,
            words_read: activity.words_read,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Open a document in the reader, creating its progress record on first access.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document and playback state", body = ReaderViewResponse),
        (status = 404, description = "Document not found")
    )
)]
pub async fn open_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = app_state
        .reader
        .open(user_id, document_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ReaderViewResponse {
        document: view.document.into(),
        progress: view.progress.into(),
        wpm_min: view.wpm_min,
        wpm_max: view.wpm_max,
    }))
}

/// Get all words of a document with its page boundaries.
#[utoipa::path(
    get,
    path = "/documents/{id}/words",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "The token stream", body = WordsResponse),
        (status = 404, description = "Document not found")
    )
)]
pub async fn words_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let text = app_state
        .reader
        .words(user_id, document_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(WordsResponse {
        total: text.total(),
        words: text.words,
        document_name: text.document_name,
        pages: text.pages.into_iter().map(Into::into).collect(),
    }))
}

/// Get reading progress for a document, or the defaults if none is stored.
#[utoipa::path(
    get,
    path = "/documents/{id}/progress",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Current playback state", body = ProgressResponse),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let progress = app_state
        .reader
        .progress(user_id, document_id)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ProgressResponse::from(progress)))
}

/// Save reading progress for a document.
#[utoipa::path(
    post,
    path = "/documents/{id}/progress",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = SaveProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = ProgressResponse),
        (status = 404, description = "Document not found")
    )
)]
pub async fn save_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
    Json(req): Json<SaveProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let update = ProgressUpdate::from(req);
    let change = app_state
        .reader
        .save_progress(user_id, document_id, &update, today)
        .await
        .map_err(service_error_response)?;

    Ok(Json(ProgressResponse::from(change.progress)))
}

/// The user's reading history, newest day first.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Words read per document and day", body = [ActivityResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let activity = app_state
        .library
        .history(user_id)
        .await
        .map_err(service_error_response)?;

    let response: Vec<ActivityResponse> = activity.into_iter().map(Into::into).collect();
    Ok(Json(response))
}
