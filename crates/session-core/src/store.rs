//! Session store.
//!
//! A [`Session`] owns one root mapping and exposes it only through path
//! operations. Where that mapping lives is decided by a [`RootAccess`]:
//! either the whole backing document ([`DirectRoot`]) or one named
//! sub-tree of it ([`NamespacedRoot`], `userSession` by default).

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::path::SessionPath;
use crate::tree::{self, Assigned, Blocked, Tree};

/// Key of the sub-tree managed by [`NamespacedRoot::user_session`].
pub const DEFAULT_NAMESPACE: &str = "userSession";

/// Errors raised by session mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A write would have to descend through a value that is not an object.
    #[error("Path {path} traverses non-object value at {at}")]
    PathConflict { path: String, at: String },
}

/// Trait for path-addressed session stores.
pub trait SessionStore: Send + Sync {
    /// Get the value at a path, or `None` when any segment is absent.
    ///
    /// Never fails: walking into a non-object is reported as absence.
    fn get(&self, path: &str) -> Option<Value>;

    /// Check whether a path currently resolves to a value.
    fn contains(&self, path: &str) -> bool;

    /// Set a value at a path, creating intermediate objects as needed.
    fn set(&mut self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Remove the leaf at a path and return it.
    ///
    /// A path that does not resolve is left alone and yields `None`.
    fn delete(&mut self, path: &str) -> Option<Value>;

    /// Reset the managed tree to an empty object.
    fn clear(&mut self);

    /// Copy of the managed tree.
    fn snapshot(&self) -> Value;

    /// Copy of the full backing document, for persistence.
    fn document(&self) -> Tree;
}

/// Accessor for the mapping a [`Session`] manages.
pub trait RootAccess: Send + Sync {
    /// The managed mapping.
    fn root(&self) -> &Tree;

    /// The managed mapping, mutably.
    fn root_mut(&mut self) -> &mut Tree;

    /// Replace the managed mapping with a fresh empty one.
    fn reset(&mut self);

    /// The whole backing document the managed mapping belongs to.
    fn document(&self) -> Tree;
}

/// The backing document is itself the managed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectRoot(Tree);

impl DirectRoot {
    pub fn new(root: Tree) -> Self {
        Self(root)
    }
}

impl RootAccess for DirectRoot {
    fn root(&self) -> &Tree {
        &self.0
    }

    fn root_mut(&mut self) -> &mut Tree {
        &mut self.0
    }

    fn reset(&mut self) {
        self.0 = Map::new();
    }

    fn document(&self) -> Tree {
        self.0.clone()
    }
}

/// The managed mapping is the object stored under one key of the backing
/// document, e.g. `{ "userSession": { ... }, "other": ... }`.
///
/// Other top-level keys of the document are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespacedRoot {
    key: String,
    session: Tree,
    rest: Tree,
}

impl NamespacedRoot {
    /// Take ownership of `document` and manage the object under `key`.
    ///
    /// A missing key, or one holding a non-object, starts out as an empty
    /// object.
    pub fn new(mut document: Tree, key: &str) -> Self {
        let session = match document.remove(key) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(
                    "Replacing non-object value under '{}' with an empty session: {}",
                    key, other
                );
                Map::new()
            }
            None => Map::new(),
        };

        Self {
            key: key.to_string(),
            session,
            rest: document,
        }
    }

    /// Manage the `userSession` sub-tree of `document`.
    pub fn user_session(document: Tree) -> Self {
        Self::new(document, DEFAULT_NAMESPACE)
    }

    /// The key this root is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl RootAccess for NamespacedRoot {
    fn root(&self) -> &Tree {
        &self.session
    }

    fn root_mut(&mut self) -> &mut Tree {
        &mut self.session
    }

    fn reset(&mut self) {
        self.session = Map::new();
    }

    fn document(&self) -> Tree {
        let mut document = self.rest.clone();
        document.insert(self.key.clone(), Value::Object(self.session.clone()));
        document
    }
}

/// Path-addressed engine over a single owned root mapping.
#[derive(Debug, Clone, Default)]
pub struct Session<R: RootAccess = DirectRoot> {
    root: R,
}

/// Session managing the `userSession` sub-tree of its backing document.
pub type UserSession = Session<NamespacedRoot>;

/// Session managing its backing document directly.
pub type StorageSession = Session<DirectRoot>;

impl<R: RootAccess> Session<R> {
    /// Create a session over the given root.
    pub fn new(root: R) -> Self {
        Self { root }
    }

    /// Resolve a parsed path, borrowing the value in place.
    pub fn lookup(&self, path: &SessionPath) -> Option<&Value> {
        tree::lookup(self.root.root(), path.segments()).found()
    }

    /// Give the root back, ending the session.
    pub fn into_inner(self) -> R {
        self.root
    }
}

impl StorageSession {
    /// Create an empty session.
    pub fn empty() -> Self {
        Self::new(DirectRoot::default())
    }
}

impl UserSession {
    /// Create a session over the `userSession` key of `document`.
    pub fn from_document(document: Tree) -> Self {
        Self::new(NamespacedRoot::user_session(document))
    }
}

impl<R: RootAccess> SessionStore for Session<R> {
    fn get(&self, path: &str) -> Option<Value> {
        self.lookup(&SessionPath::new(path)).cloned()
    }

    fn contains(&self, path: &str) -> bool {
        self.lookup(&SessionPath::new(path)).is_some()
    }

    fn set(&mut self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = SessionPath::new(path);

        match tree::assign(
            self.root.root_mut(),
            path.parent_segments(),
            path.leaf(),
            value,
        ) {
            Ok(Assigned::Created) => debug!("Created {}", path),
            Ok(Assigned::Updated) => debug!("Updated {}", path),
            Err(Blocked { depth }) => {
                let at = path.prefix(depth);
                warn!("Refusing to set {}: {} is not an object", path, at);
                return Err(StoreError::PathConflict {
                    path: path.to_string(),
                    at,
                });
            }
        }

        Ok(())
    }

    fn delete(&mut self, path: &str) -> Option<Value> {
        let path = SessionPath::new(path);

        if self.lookup(&path).is_none() {
            return None;
        }

        let removed = tree::remove(self.root.root_mut(), path.parent_segments(), path.leaf());
        if removed.is_some() {
            debug!("Deleted {}", path);
        }
        removed
    }

    fn clear(&mut self) {
        self.root.reset();
        debug!("Cleared session");
    }

    fn snapshot(&self) -> Value {
        Value::Object(self.root.root().clone())
    }

    fn document(&self) -> Tree {
        self.root.document()
    }
}
