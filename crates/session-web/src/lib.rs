//! # session-web
//!
//! REST API over a shared session store.
//!
//! The core engine is synchronous and assumes a single caller at a time.
//! This crate wraps it in a tokio `RwLock` so concurrent HTTP requests are
//! serialized, and writes the backing document through a `SessionStorage`
//! after every mutation. A mutation whose save fails is rolled back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_web::{create_router, ServerConfig, ServerState};
//!
//! let state = ServerState::load(config, Box::new(MemoryStorage::new()))?;
//! let app = create_router(state.into_shared());
//!
//! let listener = TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod routes;

// Re-exports
pub use config::{ConfigError, ServerConfig};
pub use routes::create_router;

use std::sync::Arc;

use session_core::{
    DirectRoot, NamespacedRoot, Session, SessionStorage, SessionStore, StorageError, Tree,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared server state for all route handlers.
pub struct ServerState {
    pub config: ServerConfig,
    store: Box<dyn SessionStore>,
    storage: Arc<dyn SessionStorage>,
}

impl ServerState {
    /// Load the stored document and open a session over it.
    pub fn load(
        config: ServerConfig,
        storage: Box<dyn SessionStorage>,
    ) -> Result<Self, StorageError> {
        let document = storage.load()?;
        info!("Loaded session document with {} top-level keys", document.len());

        Ok(Self {
            store: open_store(document, &config.namespace),
            config,
            storage: Arc::from(storage),
        })
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn SessionStore {
        self.store.as_mut()
    }

    /// Write the current document to storage.
    ///
    /// `previous` is the document as it was before the pending mutation. If
    /// the save fails the session is reopened over it, so memory never holds
    /// a change that storage rejected.
    pub async fn commit(&mut self, previous: Tree) -> Result<(), StorageError> {
        let storage = Arc::clone(&self.storage);
        let document = self.store.document();

        let saved = tokio::task::spawn_blocking(move || storage.save(&document))
            .await
            .unwrap_or_else(|e| Err(StorageError::Unavailable(e.to_string())));

        if let Err(e) = saved {
            warn!("Rolling back session after failed save: {}", e);
            self.store = open_store(previous, &self.config.namespace);
            return Err(e);
        }
        Ok(())
    }

    pub fn into_shared(self) -> AppState {
        Arc::new(RwLock::new(self))
    }
}

/// Open a session over `document`, managing the whole document when
/// `namespace` is empty and the object under that key otherwise.
fn open_store(document: Tree, namespace: &str) -> Box<dyn SessionStore> {
    if namespace.is_empty() {
        Box::new(Session::new(DirectRoot::new(document)))
    } else {
        Box::new(Session::new(NamespacedRoot::new(document, namespace)))
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<RwLock<ServerState>>;
