//! Keys and paths addressing nodes inside a configuration tree.

use std::fmt;

/// The key a node is stored under in its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Key of a mapping entry.
    Name(String),

    /// Position of a sequence element.
    Index(usize),
}

impl NodeKey {
    /// The mapping key, if this is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            NodeKey::Name(name) => Some(name),
            NodeKey::Index(_) => None,
        }
    }

    /// The sequence index, if this is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            NodeKey::Name(_) => None,
            NodeKey::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(name: &str) -> Self {
        NodeKey::Name(name.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(name: String) -> Self {
        NodeKey::Name(name)
    }
}

impl From<usize> for NodeKey {
    fn from(index: usize) -> Self {
        NodeKey::Index(index)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Name(name) => f.write_str(name),
            NodeKey::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A path from a root node down to one of its descendants.
///
/// Displayed in dotted form with sequence indices in brackets, e.g.
/// `servers[0].host`. The root path displays as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    keys: Vec<NodeKey>,
}

impl NodePath {
    /// The empty path, addressing the root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from keys.
    pub fn new(keys: Vec<NodeKey>) -> Self {
        Self { keys }
    }

    /// Append a key at the end of the path.
    pub fn push(&mut self, key: impl Into<NodeKey>) {
        self.keys.push(key.into());
    }

    /// Remove the last key of the path.
    pub fn pop(&mut self) -> Option<NodeKey> {
        self.keys.pop()
    }

    /// A copy of this path extended with `key`.
    pub fn child(&self, key: impl Into<NodeKey>) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    /// The keys of this path, outermost first.
    pub fn keys(&self) -> &[NodeKey] {
        &self.keys
    }

    /// Whether this path addresses the root.
    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys in the path.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the path has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            return f.write_str("<root>");
        }
        for (position, key) in self.keys.iter().enumerate() {
            match key {
                NodeKey::Index(index) => write!(f, "[{}]", index)?,
                NodeKey::Name(name) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<NodeKey> for NodePath {
    fn from_iter<I: IntoIterator<Item = NodeKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
