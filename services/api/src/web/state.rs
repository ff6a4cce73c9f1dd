//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use wordflow_core::ports::{DatabaseService, FileStorageService};
use wordflow_core::{LibraryService, ReaderService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub library: LibraryService,
    pub reader: ReaderService,
}

impl AppState {
    /// Wires the core services to the given adapters.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        files: Arc<dyn FileStorageService>,
    ) -> Self {
        Self {
            library: LibraryService::new(db.clone(), files),
            reader: ReaderService::new(db.clone(), config.reader),
            db,
            config,
        }
    }
}
