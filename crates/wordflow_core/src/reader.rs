//! crates/wordflow_core/src/reader.rs
//!
//! Serves a document to the word-by-word reader and records playback state.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};
use uuid::Uuid;

use crate::codec::{decode_boundaries, decode_tokens};
use crate::domain::{DocumentSummary, ReadingProgress};
use crate::error::ServiceResult;
use crate::extract::PageBoundary;
use crate::ports::DatabaseService;
use crate::progress::{ProgressChange, ProgressUpdate, ReaderSettings};

/// What the reader needs when a document is opened.
#[derive(Debug, Clone)]
pub struct ReaderView {
    pub document: DocumentSummary,
    pub progress: ReadingProgress,
    pub wpm_min: i32,
    pub wpm_max: i32,
}

/// The decoded token stream of one document.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub document_name: String,
    pub words: Vec<String>,
    pub pages: Vec<PageBoundary>,
}

impl DocumentText {
    pub fn total(&self) -> usize {
        self.words.len()
    }
}

#[derive(Clone)]
pub struct ReaderService {
    db: Arc<dyn DatabaseService>,
    settings: ReaderSettings,
}

impl ReaderService {
    pub fn new(db: Arc<dyn DatabaseService>, settings: ReaderSettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Opens a document, creating its progress record on first access.
    pub async fn open(&self, user_id: Uuid, document_id: Uuid) -> ServiceResult<ReaderView> {
        let document = self.db.get_document(user_id, document_id).await?;
        let progress = self
            .db
            .get_or_create_progress(user_id, document_id, &self.settings)
            .await?;

        Ok(ReaderView {
            document: document.summary(),
            progress,
            wpm_min: self.settings.wpm_min,
            wpm_max: self.settings.wpm_max,
        })
    }

    pub async fn words(&self, user_id: Uuid, document_id: Uuid) -> ServiceResult<DocumentText> {
        let document = self.db.get_document(user_id, document_id).await?;

        let decoded = decode_tokens(&document.extracted_text)
            .and_then(|words| Ok((words, decode_boundaries(&document.page_boundaries)?)));
        let (words, pages) = decoded.inspect_err(|e| {
            error!(%document_id, "Stored document failed to decode: {}", e);
        })?;

        Ok(DocumentText {
            document_name: document.original_name,
            words,
            pages,
        })
    }

    /// Current progress, or the defaults when the document was never opened.
    /// The defaults are not persisted.
    pub async fn progress(&self, user_id: Uuid, document_id: Uuid) -> ServiceResult<ReadingProgress> {
        self.db.get_document(user_id, document_id).await?;
        let progress = self.db.get_progress(user_id, document_id).await?;
        Ok(progress.unwrap_or_else(|| self.settings.default_progress(user_id, document_id)))
    }

    pub async fn save_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        update: &ProgressUpdate,
        today: NaiveDate,
    ) -> ServiceResult<ProgressChange> {
        let document = self.db.get_document(user_id, document_id).await?;
        let change = self
            .db
            .save_progress(
                user_id,
                document_id,
                update,
                &self.settings,
                document.word_count,
                today,
            )
            .await?;

        debug!(
            %document_id,
            index = change.progress.last_word_index,
            delta = change.words_delta,
            "Progress saved"
        );
        Ok(change)
    }
}
