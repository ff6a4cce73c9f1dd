//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the document library endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::service_error_response;
use crate::web::state::AppState;
use crate::web::{auth, reader};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use wordflow_core::{DocumentSummary, LibraryEntry};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::delete_account_handler,
        upload_document_handler,
        list_documents_handler,
        delete_document_handler,
        reader::open_document_handler,
        reader::words_handler,
        reader::get_progress_handler,
        reader::save_progress_handler,
        reader::history_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            DocumentResponse,
            UploadResponse,
            LibraryEntryResponse,
            MessageResponse,
            reader::ReaderViewResponse,
            reader::WordsResponse,
            reader::PageBoundaryResponse,
            reader::ProgressResponse,
            reader::SaveProgressRequest,
            reader::ActivityResponse,
        )
    ),
    tags(
        (name = "Wordflow API", description = "API endpoints for the word-by-word PDF reader.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A document as shown in listings.
#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub original_name: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentSummary> for DocumentResponse {
    fn from(document: DocumentSummary) -> Self {
        Self {
            id: document.id,
            original_name: document.original_name,
            word_count: document.word_count,
            created_at: document.created_at,
        }
    }
}

/// The response payload sent after successfully uploading a document.
#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub document: DocumentResponse,
    pub page_count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct LibraryEntryResponse {
    pub document: DocumentResponse,
    pub progress: usize,
    pub percentage: f64,
}

impl From<LibraryEntry> for LibraryEntryResponse {
    fn from(entry: LibraryEntry) -> Self {
        Self {
            document: entry.document.into(),
            progress: entry.last_word_index,
            percentage: entry.percentage,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a PDF document.
///
/// Accepts a multipart/form-data request with a `file` part. The PDF is
/// tokenized immediately; files without readable text are rejected.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The PDF to upload."),
    responses(
        (status = 201, description = "Document created", body = UploadResponse),
        (status = 400, description = "Missing file, not a PDF, unreadable or empty PDF"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (file_name, data) = read_file_field(&mut multipart).await?;

    let receipt = app_state
        .library
        .upload(user_id, &file_name, data)
        .await
        .map_err(service_error_response)?;

    let response = UploadResponse {
        success: true,
        message: receipt.message,
        document: receipt.document.into(),
        page_count: receipt.page_count,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Pulls the `file` part out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_rejection(e, "read multipart data"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        if name.is_empty() {
            break;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_rejection(e, "read file bytes"))?;
        return Ok((name, data));
    }

    Err((StatusCode::BAD_REQUEST, "No file selected.".to_string()))
}

/// Bodies cut off by the upload limit are 413; anything else is malformed.
fn multipart_rejection(err: MultipartError, action: &str) -> (StatusCode, String) {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected oversized upload: {}", err);
        return (StatusCode::PAYLOAD_TOO_LARGE, "File is too large.".to_string());
    }
    (StatusCode::BAD_REQUEST, format!("Failed to {}: {}", action, err))
}

/// List the user's documents with reading progress, newest first.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The user's library", body = [LibraryEntryResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = app_state
        .library
        .library(user_id)
        .await
        .map_err(service_error_response)?;

    let response: Vec<LibraryEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Delete a document together with its progress and history.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted", body = MessageResponse),
        (status = 404, description = "Document not found"),
        (status = 500, description = "Failed to delete document")
    )
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .library
        .delete_document(user_id, document_id)
        .await
        .map_err(|e| {
            let (status, message) = service_error_response(e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                error!(%document_id, "Delete failed");
                (status, "Failed to delete document".to_string())
            } else {
                (status, message)
            }
        })?;

    info!(%user_id, %document_id, "Document removed from library");
    Ok(Json(MessageResponse {
        success: true,
        message: "Document deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    const BOUNDARY: &str = "wordflow-boundary";

    fn multipart_request(file_name: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/documents")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn read(request: Request<Body>) -> Result<(String, Bytes), (StatusCode, String)> {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        read_file_field(&mut multipart).await
    }

    #[tokio::test]
    async fn file_part_is_read() {
        let (name, data) = read(multipart_request("book.pdf", b"%PDF-1.5")).await.unwrap();
        assert_eq!(name, "book.pdf");
        assert_eq!(&data[..], b"%PDF-1.5");
    }

    #[tokio::test]
    async fn missing_file_name_means_no_file() {
        let (status, message) = read(multipart_request("", b"%PDF")).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "No file selected.");
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        // Without a DefaultBodyLimit layer axum caps bodies at 2 MiB.
        let data = vec![b'x'; 3 * 1024 * 1024];
        let (status, _) = read(multipart_request("big.pdf", &data)).await.unwrap_err();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
