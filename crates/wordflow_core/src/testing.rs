//! crates/wordflow_core/src/testing.rs
//!
//! In-memory port implementations and fixtures for the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use uuid::Uuid;

use crate::domain::{
    Document, DocumentSummary, NewDocument, ReadingActivity, ReadingProgress, User,
    UserCredentials,
};
use crate::ports::{DatabaseService, FileStorageService, PortError, PortResult};
use crate::progress::{apply_update, ProgressChange, ProgressUpdate, ReaderSettings};

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    documents: Vec<Document>,
    progress: HashMap<(Uuid, Uuid), ReadingProgress>,
    activity: Vec<ReadingActivity>,
}

/// A `DatabaseService` over plain collections. One mutex makes every
/// operation atomic, which stands in for the transactions of the real store.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
}

impl InMemoryDb {
    pub fn progress_count(&self) -> usize {
        self.tables.lock().unwrap().progress.len()
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!("Email {} already registered", email)));
        }
        let id = Uuid::new_v4();
        tables.users.push(UserCredentials {
            id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        });
        Ok(User {
            id,
            name: Some(name.to_string()),
            email: email.to_string(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| not_found("User", email))
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<Vec<String>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(not_found("User", user_id));
        }
        let locations = tables
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.file_path.clone())
            .collect();
        tables.activity.retain(|a| a.user_id != user_id);
        tables.progress.retain(|(user, _), _| *user != user_id);
        tables.documents.retain(|d| d.user_id != user_id);
        tables.sessions.retain(|_, (user, _)| *user != user_id);
        tables.users.retain(|u| u.id != user_id);
        Ok(locations)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.sessions.insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.lock().unwrap();
        match tables.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            user_id: document.user_id,
            file_path: document.file_path,
            original_name: document.original_name,
            word_count: document.word_count,
            extracted_text: document.extracted_text,
            page_boundaries: document.page_boundaries,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().documents.push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let tables = self.tables.lock().unwrap();
        tables
            .documents
            .iter()
            .find(|d| d.id == document_id && d.user_id == user_id)
            .cloned()
            .ok_or_else(|| not_found("Document", document_id))
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>> {
        let tables = self.tables.lock().unwrap();
        let mut documents: Vec<DocumentSummary> = tables
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(Document::summary)
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete_document(&self, user_id: Uuid, document_id: Uuid) -> PortResult<Document> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables
            .documents
            .iter()
            .position(|d| d.id == document_id && d.user_id == user_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        tables.activity.retain(|a| a.document_id != document_id);
        tables.progress.retain(|(_, doc), _| *doc != document_id);
        Ok(tables.documents.remove(position))
    }

    async fn get_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
    ) -> PortResult<Option<ReadingProgress>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.progress.get(&(user_id, document_id)).cloned())
    }

    async fn get_or_create_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        settings: &ReaderSettings,
    ) -> PortResult<ReadingProgress> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .progress
            .entry((user_id, document_id))
            .or_insert_with(|| settings.default_progress(user_id, document_id))
            .clone())
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
        let mut guard = self.tables.lock().unwrap();
        let tables = &mut *guard;
        let current = tables
            .progress
            .entry((user_id, document_id))
            .or_insert_with(|| settings.default_progress(user_id, document_id));
        let change = apply_update(current, update, settings, word_count);
        *current = change.progress.clone();

        if change.words_delta > 0 {
            let existing = tables
                .activity
                .iter_mut()
                .find(|a| a.user_id == user_id && a.document_id == document_id && a.date == today);
            match existing {
                Some(activity) => activity.words_read += change.words_delta,
                None => {
                    let document_name = tables
                        .documents
                        .iter()
                        .find(|d| d.id == document_id)
                        .map(|d| d.original_name.clone())
                        .unwrap_or_default();
                    tables.activity.push(ReadingActivity {
                        user_id,
                        document_id,
                        document_name,
                        date: today,
                        words_read: change.words_delta,
                        created_at: Utc::now(),
                    });
                }
            }
        }

        Ok(change)
    }

    async fn list_activity(&self, user_id: Uuid) -> PortResult<Vec<ReadingActivity>> {
        let tables = self.tables.lock().unwrap();
        let mut activity: Vec<ReadingActivity> = tables
            .activity
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        activity.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(activity)
    }
}

/// A `FileStorageService` that keeps uploads in a map.
#[derive(Default)]
pub struct InMemoryFiles {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFiles {
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        locations.sort();
        locations
    }
}

#[async_trait]
impl FileStorageService for InMemoryFiles {
    async fn save_upload(&self, user_id: Uuid, stored_name: &str, data: &[u8]) -> PortResult<String> {
        let location = format!("mem://{}/{}", user_id, stored_name);
        self.files.lock().unwrap().insert(location.clone(), data.to_vec());
        Ok(location)
    }

    async fn remove(&self, location: &str) -> PortResult<()> {
        self.files.lock().unwrap().remove(location);
        Ok(())
    }
}

/// Builds a PDF with one page per entry. An empty entry yields a page with
/// no text operators, like a scanned page.
pub fn sample_pdf(pages: &[&str]) -> Bytes {
    let pages = pages
        .iter()
        .map(|text| {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            }
        })
        .collect();
    save(pdf_document(pages))
}

/// Builds a PDF whose pages draw the given content operations with font `F1`.
pub fn pdf_with_content(pages: Vec<Vec<Operation>>) -> Bytes {
    save(pdf_document(pages))
}

/// A one-page PDF whose trailer points at a standard security handler.
pub fn encrypted_pdf() -> Bytes {
    let mut doc = pdf_document(vec![Vec::new()]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

fn pdf_document(pages: Vec<Vec<Operation>>) -> PdfDocument {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: PdfDocument) -> Bytes {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    Bytes::from(buffer)
}
