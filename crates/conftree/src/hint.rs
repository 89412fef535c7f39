//! Typed representation hints attached to configuration nodes.
//!
//! Hints carry metadata that has no place in the plain value model but that a
//! format codec wants to keep across a load/save cycle: which anchor a node was
//! declared with, how a scalar was quoted, whether a collection was written
//! inline. Hints are scoped to the node they are set on and are never
//! inherited by children.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A typed key for a hint stored on a [`ConfigNode`](crate::ConfigNode).
///
/// Hint keys are usually declared once as constants by the codec that
/// understands them:
///
/// ```rust
/// use conftree::{ConfigNode, RepresentationHint};
///
/// const INDENT: RepresentationHint<usize> = RepresentationHint::of("indent");
///
/// let mut node = ConfigNode::root();
/// node.set_hint(&INDENT, 2);
/// assert_eq!(node.hint(&INDENT), Some(2));
/// ```
pub struct RepresentationHint<T> {
    identifier: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> RepresentationHint<T> {
    /// Create a hint key with the given identifier.
    ///
    /// Identifiers must be unique among the hints stored on one node.
    pub const fn of(identifier: &'static str) -> Self {
        Self {
            identifier,
            _value: PhantomData,
        }
    }

    /// The identifier this hint is stored under.
    pub fn identifier(&self) -> &'static str {
        self.identifier
    }
}

impl<T> Clone for RepresentationHint<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RepresentationHint<T> {}

impl<T> fmt::Debug for RepresentationHint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepresentationHint")
            .field(&self.identifier)
            .finish()
    }
}

/// The hint side-table of a single node.
///
/// Values are stored behind `Arc` so cloning a node (and with it a whole
/// subtree) never deep-copies hint payloads.
#[derive(Clone, Default)]
pub struct Hints {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl Hints {
    /// Create an empty hint table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored for `hint`, if any.
    pub fn get<T>(&self, hint: &RepresentationHint<T>) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.entries
            .get(hint.identifier)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Store `value` for `hint`, replacing any previous value.
    pub fn set<T>(&mut self, hint: &RepresentationHint<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(hint.identifier, Arc::new(value));
    }

    /// Remove the value stored for `hint`, returning whether one was present.
    pub fn remove<T>(&mut self, hint: &RepresentationHint<T>) -> bool {
        self.entries.remove(hint.identifier).is_some()
    }

    /// Whether a value is stored for `hint`.
    pub fn contains<T>(&self, hint: &RepresentationHint<T>) -> bool {
        self.entries.contains_key(hint.identifier)
    }

    /// Copy every entry of `other` into this table.
    pub fn extend_from(&mut self, other: &Hints) {
        for (identifier, value) in &other.entries {
            self.entries.insert(*identifier, Arc::clone(value));
        }
    }

    /// Number of stored hints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no hint is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<&str> = self.entries.keys().copied().collect();
        identifiers.sort_unstable();
        f.debug_set().entries(identifiers).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: RepresentationHint<String> = RepresentationHint::of("name");
    const WIDTH: RepresentationHint<u32> = RepresentationHint::of("width");

    #[test]
    fn test_set_and_get() {
        let mut hints = Hints::new();
        hints.set(&NAME, "anchor".to_string());
        hints.set(&WIDTH, 80);

        assert_eq!(hints.get(&NAME), Some("anchor".to_string()));
        assert_eq!(hints.get(&WIDTH), Some(80));
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut hints = Hints::new();
        hints.set(&WIDTH, 4);
        assert!(hints.remove(&WIDTH));
        assert!(!hints.remove(&WIDTH));
        assert!(hints.get(&WIDTH).is_none());
        assert!(hints.is_empty());
    }

    #[test]
    fn test_type_mismatch_reads_nothing() {
        const SAME_ID: RepresentationHint<u64> = RepresentationHint::of("width");

        let mut hints = Hints::new();
        hints.set(&WIDTH, 4);
        // Same identifier, different payload type
        assert!(hints.get(&SAME_ID).is_none());
        assert!(hints.contains(&SAME_ID));
    }

    #[test]
    fn test_extend_from_overwrites() {
        let mut a = Hints::new();
        a.set(&WIDTH, 1);
        let mut b = Hints::new();
        b.set(&WIDTH, 2);
        b.set(&NAME, "x".to_string());

        a.extend_from(&b);
        assert_eq!(a.get(&WIDTH), Some(2));
        assert_eq!(a.get(&NAME), Some("x".to_string()));
    }

    #[test]
    fn test_debug_lists_identifiers() {
        let mut hints = Hints::new();
        hints.set(&WIDTH, 1);
        hints.set(&NAME, "x".to_string());
        assert_eq!(format!("{:?}", hints), r#"{"name", "width"}"#);
    }
}
