pub mod auth;
pub mod middleware;
pub mod reader;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use auth::{delete_account_handler, login_handler, logout_handler, signup_handler};
pub use middleware::require_auth;
pub use reader::{
    get_progress_handler, history_handler, open_document_handler, save_progress_handler,
    words_handler,
};
pub use rest::{delete_document_handler, list_documents_handler, upload_document_handler};
