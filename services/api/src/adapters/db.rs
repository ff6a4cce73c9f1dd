//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Relations are deleted explicitly inside transactions; the schema has no
//! `ON DELETE CASCADE`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use wordflow_core::domain::{
    Document, DocumentSummary, NewDocument, ReadingActivity, ReadingProgress, User,
    UserCredentials,
};
use wordflow_core::ports::{DatabaseService, PortError, PortResult};
use wordflow_core::progress::{apply_update, ProgressChange, ProgressUpdate, ReaderSettings};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => unexpected(e),
    }
}

fn to_db_int(value: usize) -> PortResult<i32> {
    i32::try_from(value).map_err(|_| PortError::Unexpected(format!("{} exceeds INTEGER", value)))
}

fn from_db_int(value: i32) -> usize {
    value.max(0) as usize
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: Option<String>,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    file_path: String,
    original_name: String,
    word_count: i32,
    extracted_text: String,
    page_boundaries: String,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            file_path: self.file_path,
            original_name: self.original_name,
            word_count: from_db_int(self.word_count),
            extracted_text: self.extracted_text,
            page_boundaries: self.page_boundaries,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct DocumentSummaryRecord {
    id: Uuid,
    user_id: Uuid,
    original_name: String,
    word_count: i32,
    created_at: DateTime<Utc>,
}
impl DocumentSummaryRecord {
    fn to_domain(self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            user_id: self.user_id,
            original_name: self.original_name,
            word_count: from_db_int(self.word_count),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProgressRecord {
    user_id: Uuid,
    document_id: Uuid,
    last_word_index: i32,
    words_per_minute: i32,
    font_size: i32,
    updated_at: DateTime<Utc>,
}
impl ProgressRecord {
    fn to_domain(self) -> ReadingProgress {
        ReadingProgress {
            user_id: self.user_id,
            document_id: self.document_id,
            last_word_index: from_db_int(self.last_word_index),
            words_per_minute: self.words_per_minute,
            font_size: self.font_size,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ActivityRecord {
    user_id: Uuid,
    document_id: Uuid,
    original_name: String,
    activity_date: NaiveDate,
    words_read: i32,
    created_at: DateTime<Utc>,
}
impl ActivityRecord {
    fn to_domain(self) -> ReadingActivity {
        ReadingActivity {
            user_id: self.user_id,
            document_id: self.document_id,
            document_name: self.original_name,
            date: self.activity_date,
            words_read: from_db_int(self.words_read),
            created_at: self.created_at,
        }
    }
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, file_path, original_name, word_count, extracted_text, page_boundaries, created_at";
const PROGRESS_COLUMNS: &str =
    "user_id, document_id, last_word_index, words_per_minute, font_size, updated_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("Email {} already registered", email))
            }
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", email)))?;

        Ok(record.to_domain())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<Vec<String>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM reading_activity WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM reading_progress WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        let locations: Vec<String> =
            sqlx::query_scalar::<_, String>("DELETE FROM documents WHERE user_id = $1 RETURNING file_path")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(unexpected)?;
        sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(locations)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let query = format!(
            "INSERT INTO documents (id, user_id, file_path, original_name, word_count, extracted_text, page_boundaries) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(document.user_id)
            .bind(&document.file_path)
            .bind(&document.original_name)
            .bind(to_db_int(document.word_count)?)
            .bind(&document.extracted_text)
            .bind(&document.page_boundaries)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let query = format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(document_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Document {} not found", document_id)))?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>> {
        let records = sqlx::query_as::<_, DocumentSummaryRecord>(
            "SELECT id, user_id, original_name, word_count, created_at FROM documents \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Ownership is checked before touching dependent rows.
        let query = format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2 FOR UPDATE",
            DOCUMENT_COLUMNS
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&query)
            .bind(document_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| not_found_or_unexpected(e, format!("Document {} not found", document_id)))?;

        sqlx::query("DELETE FROM reading_activity WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM reading_progress WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Option<ReadingProgress>> {
        let query = format!(
            "SELECT {} FROM reading_progress WHERE user_id = $1 AND document_id = $2",
            PROGRESS_COLUMNS
        );
        let record = sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(user_id)
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn get_or_create_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        settings: &ReaderSettings,
    ) -> PortResult<ReadingProgress> {
        sqlx::query(
            "INSERT INTO reading_progress (user_id, document_id, last_word_index, words_per_minute, font_size) \
             VALUES ($1, $2, 0, $3, $4) ON CONFLICT (user_id, document_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(document_id)
        .bind(settings.wpm_default)
        .bind(settings.font_size_default)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        self.get_progress(user_id, document_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Progress for document {} not found", document_id)))
    }

    async fn save_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        update: &ProgressUpdate,
        settings: &ReaderSettings,
        word_count: usize,
        today: NaiveDate,
    ) -> PortResult<ProgressChange> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO reading_progress (user_id, document_id, last_word_index, words_per_minute, font_size) \
             VALUES ($1, $2, 0, $3, $4) ON CONFLICT (user_id, document_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(document_id)
        .bind(settings.wpm_default)
        .bind(settings.font_size_default)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        // The row lock serialises concurrent saves for the same pair.
        let query = format!(
            "SELECT {} FROM reading_progress WHERE user_id = $1 AND document_id = $2 FOR UPDATE",
            PROGRESS_COLUMNS
        );
        let current = sqlx::query_as::<_, ProgressRecord>(&query)
            .bind(user_id)
            .bind(document_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?
            .to_domain();

        let change = apply_update(&current, update, settings, word_count);
        let progress = &change.progress;

        sqlx::query(
            "UPDATE reading_progress SET last_word_index = $1, words_per_minute = $2, font_size = $3, \
             updated_at = $4 WHERE user_id = $5 AND document_id = $6",
        )
        .bind(to_db_int(progress.last_word_index)?)
        .bind(progress.words_per_minute)
        .bind(progress.font_size)
        .bind(progress.updated_at)
        .bind(user_id)
        .bind(document_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        if change.words_delta > 0 {
            sqlx::query(
                "INSERT INTO reading_activity (user_id, document_id, activity_date, words_read) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (user_id, document_id, activity_date) \
                 DO UPDATE SET words_read = reading_activity.words_read + EXCLUDED.words_read",
            )
            .bind(user_id)
            .bind(document_id)
            .bind(today)
            .bind(to_db_int(change.words_delta)?)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(change)
    }

    async fn list_activity(&self, user_id: Uuid) -> PortResult<Vec<ReadingActivity>> {
        let records = sqlx::query_as::<_, ActivityRecord>(
            "SELECT a.user_id, a.document_id, d.original_name, a.activity_date, a.words_read, a.created_at \
             FROM reading_activity a JOIN documents d ON d.id = a.document_id \
             WHERE a.user_id = $1 ORDER BY a.activity_date DESC, a.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_columns_reject_overflow() {
        assert_eq!(to_db_int(42).unwrap(), 42);
        assert!(to_db_int(usize::MAX).is_err());
    }

    #[test]
    fn negative_integers_read_as_zero() {
        assert_eq!(from_db_int(-5), 0);
        assert_eq!(from_db_int(17), 17);
    }

    #[test]
    fn missing_rows_become_not_found() {
        let err = not_found_or_unexpected(sqlx::Error::RowNotFound, "Document x".to_string());
        assert!(matches!(err, PortError::NotFound(msg) if msg == "Document x"));

        let err = not_found_or_unexpected(sqlx::Error::PoolTimedOut, "Document x".to_string());
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
