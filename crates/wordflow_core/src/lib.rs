pub mod codec;
pub mod domain;
pub mod error;
pub mod extract;
pub mod library;
pub mod pdf;
pub mod ports;
pub mod progress;
pub mod reader;
pub mod tokenizer;

#[cfg(test)]
mod testing;

pub use domain::{
    Document, DocumentSummary, NewDocument, ReadingActivity, ReadingProgress, User,
    UserCredentials,
};
pub use error::{ServiceError, ServiceResult};
pub use extract::{extract, Extraction, ExtractionError, PageBoundary, PageSource};
pub use library::{LibraryEntry, LibraryService, UploadReceipt};
pub use ports::{DatabaseService, FileStorageService, PortError, PortResult};
pub use progress::{ProgressChange, ProgressUpdate, ReaderSettings, SettingsError};
pub use reader::{DocumentText, ReaderService, ReaderView};
pub use tokenizer::tokenize;
