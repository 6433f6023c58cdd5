//! Walkers over the session tree.
//!
//! The tree is a `serde_json::Map` whose values may themselves be objects.
//! Only objects are containers: strings, numbers, booleans, null and arrays
//! are leaves and can never be descended into.
//!
//! All three walkers share the same rule for intermediate segments and
//! differ only in what they do at the leaf:
//! - [`lookup`] stops at the first absent segment and reads the leaf
//! - [`assign`] installs empty objects for absent segments and writes the leaf
//! - [`remove`] walks to the parent of the leaf and removes one key

use serde_json::{Map, Value};

/// A single level of the session tree.
pub type Tree = Map<String, Value>;

/// The walk reached a non-object value before the leaf.
///
/// `depth` is the number of segments consumed when the walk stopped, so the
/// offending value lives at the dot-joined prefix of that length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocked {
    pub depth: usize,
}

/// Outcome of a read walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Every segment resolved; this is the leaf value.
    Found(&'a Value),
    /// Some segment was absent. The walk stopped there.
    Missing,
    /// An intermediate segment held a non-object value.
    Blocked(Blocked),
}

impl<'a> Lookup<'a> {
    /// Collapse to an option, treating a blocked walk as absence.
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing | Lookup::Blocked(_) => None,
        }
    }
}

/// Whether [`assign`] created a new leaf or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assigned {
    Created,
    Updated,
}

/// Resolve `segments` against `root`, strictly by position.
///
/// An empty segment list resolves to nothing.
pub fn lookup<'a>(root: &'a Tree, segments: &[String]) -> Lookup<'a> {
    let Some((leaf, parents)) = segments.split_last() else {
        return Lookup::Missing;
    };

    let mut level = root;
    for (i, segment) in parents.iter().enumerate() {
        match level.get(segment.as_str()) {
            Some(Value::Object(map)) => level = map,
            Some(_) => return Lookup::Blocked(Blocked { depth: i + 1 }),
            None => return Lookup::Missing,
        }
    }

    match level.get(leaf.as_str()) {
        Some(value) => Lookup::Found(value),
        None => Lookup::Missing,
    }
}

/// Write `value` at `parents` + `leaf`, creating missing levels.
///
/// Existing objects along the way are reused, absent ones are created empty.
/// An existing non-object at an intermediate position stops the walk with
/// [`Blocked`]; since every level below a created one is also created, a
/// blocked walk has not modified the tree.
pub fn assign(
    root: &mut Tree,
    parents: &[String],
    leaf: &str,
    value: Value,
) -> Result<Assigned, Blocked> {
    let mut level = root;
    for (i, segment) in parents.iter().enumerate() {
        let slot = level
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        level = match slot {
            Value::Object(map) => map,
            _ => return Err(Blocked { depth: i + 1 }),
        };
    }

    match level.insert(leaf.to_string(), value) {
        Some(_) => Ok(Assigned::Updated),
        None => Ok(Assigned::Created),
    }
}

/// Remove `leaf` from the object found at `parents`.
///
/// Returns the removed value. Siblings and ancestors are left in place,
/// including a parent that becomes empty.
pub fn remove(root: &mut Tree, parents: &[String], leaf: &str) -> Option<Value> {
    let mut level = root;
    for segment in parents {
        level = match level.get_mut(segment.as_str()) {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
    }
    level.remove(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::split_path;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(value: Value) -> Tree {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_lookup_found() {
        let root = tree(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(lookup(&root, &split_path("a.b.c")), Lookup::Found(&json!(1)));
        assert_eq!(
            lookup(&root, &split_path("a.b")),
            Lookup::Found(&json!({"c": 1}))
        );
    }

    #[test]
    fn test_lookup_missing_stops_early() {
        // "b" exists deeper in the tree but must not match at depth 0
        let root = tree(json!({"a": {"b": 1}}));
        assert_eq!(lookup(&root, &split_path("b")), Lookup::Missing);
        assert_eq!(lookup(&root, &split_path("x.b")), Lookup::Missing);
        assert_eq!(lookup(&root, &[]), Lookup::Missing);
    }

    #[test]
    fn test_lookup_blocked() {
        let root = tree(json!({"a": {"b": "text"}}));
        assert_eq!(
            lookup(&root, &split_path("a.b.c")),
            Lookup::Blocked(Blocked { depth: 2 })
        );
        assert_eq!(lookup(&root, &split_path("a.b.c")).found(), None);
    }

    #[test]
    fn test_assign_creates_levels() {
        let mut root = Tree::new();
        let outcome = assign(&mut root, &split_path("a.b"), "c", json!(1)).unwrap();
        assert_eq!(outcome, Assigned::Created);
        assert_eq!(Value::Object(root), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_assign_reuses_levels() {
        let mut root = tree(json!({"a": {"keep": true}}));
        assign(&mut root, &split_path("a"), "new", json!(2)).unwrap();
        let outcome = assign(&mut root, &split_path("a"), "new", json!(3)).unwrap();
        assert_eq!(outcome, Assigned::Updated);
        assert_eq!(Value::Object(root), json!({"a": {"keep": true, "new": 3}}));
    }

    #[test]
    fn test_assign_blocked_leaves_tree_untouched() {
        let mut root = tree(json!({"a": {"b": [1, 2]}}));
        let before = root.clone();
        let err = assign(&mut root, &split_path("a.b.c"), "d", json!(1)).unwrap_err();
        assert_eq!(err, Blocked { depth: 2 });
        assert_eq!(root, before);
    }

    #[test]
    fn test_assign_flat() {
        let mut root = tree(json!({"k": "old"}));
        let outcome = assign(&mut root, &[], "k", json!({"now": "object"})).unwrap();
        assert_eq!(outcome, Assigned::Updated);
        assert_eq!(root["k"], json!({"now": "object"}));
    }

    #[test]
    fn test_remove_single_key() {
        let mut root = tree(json!({"a": {"b": 1, "c": 2}, "b": 9}));
        assert_eq!(remove(&mut root, &split_path("a"), "b"), Some(json!(1)));
        assert_eq!(Value::Object(root), json!({"a": {"c": 2}, "b": 9}));
    }

    #[test]
    fn test_remove_keeps_empty_parent() {
        let mut root = tree(json!({"a": {"b": 1}}));
        remove(&mut root, &split_path("a"), "b");
        assert_eq!(Value::Object(root), json!({"a": {}}));
    }

    #[test]
    fn test_remove_through_scalar() {
        let mut root = tree(json!({"a": 5}));
        assert_eq!(remove(&mut root, &split_path("a"), "b"), None);
        assert_eq!(Value::Object(root), json!({"a": 5}));
    }
}
