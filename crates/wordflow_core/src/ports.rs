//! crates/wordflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or disks.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    Document, DocumentSummary, NewDocument, ReadingActivity, ReadingProgress, User,
    UserCredentials,
};
use crate::progress::{ProgressChange, ProgressUpdate, ReaderSettings};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `PortError::Conflict` if the email is already registered.
    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    /// Deletes the user and everything they own in one transaction.
    /// Returns the file locations of the deleted documents.
    async fn delete_user(&self, user_id: Uuid) -> PortResult<Vec<String>>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Document Management ---
    async fn create_document(&self, document: NewDocument) -> PortResult<Document>;

    /// Fetches a document, treating documents owned by someone else as missing.
    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document>;

    /// Newest first.
    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>>;

    /// Deletes the document with its progress and activity rows in one
    /// transaction and returns the deleted record.
    async fn delete_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document>;

    // --- Reading Progress ---
    async fn get_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Option<ReadingProgress>>;

    async fn get_or_create_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        settings: &ReaderSettings,
    ) -> PortResult<ReadingProgress>;

    /// Read-modify-write of the progress record, atomic per (user, document).
    ///
    /// Implementations create the record with defaults when missing, apply
    /// `progress::apply_update`, persist the result and add a positive
    /// `words_delta` to the activity row for `today`.
    async fn save_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        update: &ProgressUpdate,
        settings: &ReaderSettings,
        word_count: usize,
        today: NaiveDate,
    ) -> PortResult<ProgressChange>;

    // --- Reading Activity ---
    /// Newest day first.
    async fn list_activity(&self, user_id: Uuid) -> PortResult<Vec<ReadingActivity>>;
}

#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Stores an uploaded file and returns its location.
    async fn save_upload(&self, user_id: Uuid, stored_name: &str, data: &[u8])
        -> PortResult<String>;

    /// Removes a stored file. Missing files are not an error.
    async fn remove(&self, location: &str) -> PortResult<()>;
}
