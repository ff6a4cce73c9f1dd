//! crates/wordflow_core/src/library.rs
//!
//! The user's document library: ingesting uploads, listing, deleting and the
//! reading history.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::codec::{encode_boundaries, encode_tokens};
use crate::domain::{DocumentSummary, NewDocument, ReadingActivity};
use crate::error::{ServiceError, ServiceResult};
use crate::extract::Extraction;
use crate::pdf::extract_pdf;
use crate::ports::{DatabaseService, FileStorageService};

const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];
const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Returned after a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub document: DocumentSummary,
    pub page_count: usize,
    pub message: String,
}

/// One row of the library listing.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub document: DocumentSummary,
    pub last_word_index: usize,
    /// Share of the document read, in percent with one decimal.
    pub percentage: f64,
}

#[derive(Clone)]
pub struct LibraryService {
    db: Arc<dyn DatabaseService>,
    files: Arc<dyn FileStorageService>,
}

impl LibraryService {
    pub fn new(db: Arc<dyn DatabaseService>, files: Arc<dyn FileStorageService>) -> Self {
        Self { db, files }
    }

    /// Stores an uploaded PDF, extracts its words and creates the document.
    ///
    /// Nothing is left behind on failure: the stored file is removed whenever
    /// extraction fails, yields no words, or the document cannot be saved.
    pub async fn upload(
        &self,
        user_id: Uuid,
        file_name: &str,
        data: Bytes,
    ) -> ServiceResult<UploadReceipt> {
        if !is_allowed_file(file_name) {
            return Err(ServiceError::UnsupportedFileType);
        }

        let original_name = secure_filename(file_name);
        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), original_name);
        let location = self.files.save_upload(user_id, &stored_name, &data).await?;

        let extraction = match run_extraction(data).await {
            Ok(extraction) if extraction.is_empty() => {
                warn!(%user_id, file = %original_name, "Rejected upload without readable text");
                self.discard(&location).await;
                return Err(ServiceError::EmptyDocument);
            }
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(%user_id, file = %original_name, "Rejected unreadable upload: {}", e);
                self.discard(&location).await;
                return Err(e);
            }
        };

        let word_count = extraction.word_count();
        let page_count = extraction.page_count();

        let stored = async {
            let new_document = NewDocument {
                user_id,
                file_path: location.clone(),
                original_name: original_name.clone(),
                word_count,
                extracted_text: encode_tokens(&extraction.tokens)?,
                page_boundaries: encode_boundaries(&extraction.pages)?,
            };
            Ok::<_, ServiceError>(self.db.create_document(new_document).await?)
        }
        .await;

        let document = match stored {
            Ok(document) => document,
            Err(e) => {
                self.discard(&location).await;
                return Err(e);
            }
        };

        info!(
            document_id = %document.id,
            words = word_count,
            pages = page_count,
            "Document uploaded"
        );

        Ok(UploadReceipt {
            message: format!(
                "Successfully uploaded \"{}\" ({} words, {} pages).",
                original_name, word_count, page_count
            ),
            document: document.summary(),
            page_count,
        })
    }

    /// The user's documents, newest first, with how far each has been read.
    pub async fn library(&self, user_id: Uuid) -> ServiceResult<Vec<LibraryEntry>> {
        let documents = self.db.list_documents(user_id).await?;
        let mut entries = Vec::with_capacity(documents.len());

        for document in documents {
            let last_word_index = self
                .db
                .get_progress(user_id, document.id)
                .await?
                .map_or(0, |p| p.last_word_index);
            entries.push(LibraryEntry {
                percentage: percentage_read(last_word_index, document.word_count),
                document,
                last_word_index,
            });
        }

        Ok(entries)
    }

    pub async fn delete_document(&self, user_id: Uuid, document_id: Uuid) -> ServiceResult<()> {
        let document = self.db.delete_document(user_id, document_id).await?;
        self.discard(&document.file_path).await;
        info!(%document_id, "Document deleted");
        Ok(())
    }

    /// Deletes the account along with every document it owns.
    pub async fn delete_account(&self, user_id: Uuid) -> ServiceResult<()> {
        let locations = self.db.delete_user(user_id).await?;
        for location in &locations {
            self.discard(location).await;
        }
        info!(%user_id, documents = locations.len(), "Account deleted");
        Ok(())
    }

    /// Daily reading activity, newest first.
    pub async fn history(&self, user_id: Uuid) -> ServiceResult<Vec<ReadingActivity>> {
        Ok(self.db.list_activity(user_id).await?)
    }

    async fn discard(&self, location: &str) {
        if let Err(e) = self.files.remove(location).await {
            warn!(location, "Failed to remove stored file: {}", e);
        }
    }
}

/// Parsing is CPU bound, so it runs on the blocking pool.
async fn run_extraction(data: Bytes) -> ServiceResult<Extraction> {
    tokio::task::spawn_blocking(move || extract_pdf(&data))
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))?
        .map_err(ServiceError::from)
}

pub fn is_allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Reduces a client-supplied file name to a safe single path component.
///
/// Path separators and whitespace become `_`; anything other than letters,
/// digits, `.`, `-` and `_` is dropped, as are leading and trailing dots and
/// underscores.
pub fn secure_filename(file_name: &str) -> String {
    let joined = file_name
        .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn percentage_read(last_word_index: usize, word_count: usize) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    let percent = last_word_index as f64 / word_count as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}
