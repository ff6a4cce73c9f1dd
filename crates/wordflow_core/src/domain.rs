//! crates/wordflow_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP representation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// An uploaded PDF together with its stored extraction.
///
/// `extracted_text` and `page_boundaries` hold the codec output and are
/// never rewritten once the document exists.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_path: String,
    pub original_name: String,
    pub word_count: usize,
    pub extracted_text: String,
    pub page_boundaries: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            user_id: self.user_id,
            original_name: self.original_name.clone(),
            word_count: self.word_count,
            created_at: self.created_at,
        }
    }
}

/// A document without its stored text, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_name: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a document row.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub file_path: String,
    pub original_name: String,
    pub word_count: usize,
    pub extracted_text: String,
    pub page_boundaries: String,
}

/// Playback state for one (user, document) pair. At most one exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingProgress {
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub last_word_index: usize,
    pub words_per_minute: i32,
    pub font_size: i32,
    pub updated_at: DateTime<Utc>,
}

/// Words read by a user in one document on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingActivity {
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub document_name: String,
    pub date: NaiveDate,
    pub words_read: usize,
    pub created_at: DateTime<Utc>,
}
