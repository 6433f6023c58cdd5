//! # session-core
//!
//! Path-addressed access to an in-memory session tree.
//!
//! This crate provides:
//! - Path parsing (`"profile.address.city"` into ordered segments)
//! - Tree walkers for reading, writing and removing by path
//! - The `Session` engine and its `SessionStore` operations
//!   (`get`, `set`, `delete`, `clear`)
//! - A storage abstraction for loading and saving session documents
//!
//! This crate is intentionally runtime-agnostic and contains no async code.
//! Callers that share a session between tasks are responsible for
//! serializing access to it.

pub mod path;
pub mod storage;
pub mod store;
pub mod tree;

pub use path::{is_nested, split_path, SessionPath};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{
    DirectRoot, NamespacedRoot, RootAccess, Session, SessionStore, StorageSession, StoreError,
    UserSession, DEFAULT_NAMESPACE,
};
pub use tree::Tree;
