//! The owned configuration node.

use crate::hint::{Hints, RepresentationHint};
use crate::path::{NodeKey, NodePath};
use indexmap::IndexMap;

/// Capabilities of a node, shared by every node created beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOptions {
    comments: bool,
}

impl NodeOptions {
    /// Options for nodes that accept comments.
    pub fn new() -> Self {
        Self { comments: true }
    }

    /// Set whether nodes keep comments.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Whether nodes created with these options keep comments.
    pub fn accepts_comments(&self) -> bool {
        self.comments
    }
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The value held by a [`ConfigNode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodeValue {
    /// No value: the node does not exist in the document.
    #[default]
    Virtual,

    /// Scalar text, exactly as read. Interpretation into typed values is left
    /// to callers.
    Scalar(String),

    /// Mapping entries in insertion order. Order does not take part in
    /// equality.
    Mapping(IndexMap<String, ConfigNode>),

    /// Sequence elements in order.
    Sequence(Vec<ConfigNode>),
}

impl NodeValue {
    /// A short name for the kind of value, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeValue::Virtual => "virtual",
            NodeValue::Scalar(_) => "scalar",
            NodeValue::Mapping(_) => "mapping",
            NodeValue::Sequence(_) => "sequence",
        }
    }
}

/// A node of a configuration tree.
///
/// The tree is owned and acyclic: a node owns its children, and nothing
/// points back up. A node knows the key it is stored under in its parent but
/// not the parent itself; code that needs full paths tracks them while
/// descending (see [`NodePath`]).
///
/// Besides its value, a node carries an optional comment and a table of
/// [hints](RepresentationHint) that format codecs use to keep layout details
/// across a load/save cycle. Two nodes compare equal when their values are
/// equal; keys, comments and hints are not compared.
///
/// ```rust
/// use conftree::ConfigNode;
///
/// let mut root = ConfigNode::root();
/// root.child_mut("name").set_scalar("demo");
/// root.child_mut("ports").append_list_node().set_scalar("8080");
///
/// assert_eq!(root.get("name").and_then(|n| n.as_str()), Some("demo"));
/// assert_eq!(root.get("ports").map(|n| n.len()), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigNode {
    key: Option<NodeKey>,
    value: NodeValue,
    comment: Option<String>,
    hints: Hints,
    options: NodeOptions,
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl ConfigNode {
    /// Create a virtual root node that accepts comments.
    pub fn root() -> Self {
        Self::root_with(NodeOptions::default())
    }

    /// Create a virtual root node with the given options.
    pub fn root_with(options: NodeOptions) -> Self {
        Self {
            key: None,
            value: NodeValue::Virtual,
            comment: None,
            hints: Hints::new(),
            options,
        }
    }

    fn child_of(options: NodeOptions, key: NodeKey) -> Self {
        Self {
            key: Some(key),
            ..Self::root_with(options)
        }
    }

    /// The options this node was created with.
    pub fn options(&self) -> NodeOptions {
        self.options
    }

    /// Whether this node keeps comments.
    pub fn supports_comments(&self) -> bool {
        self.options.accepts_comments()
    }

    /// The key of this node in its parent; `None` for a root.
    pub fn key(&self) -> Option<&NodeKey> {
        self.key.as_ref()
    }

    /// The value of this node.
    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    /// Whether the node has no value.
    pub fn is_virtual(&self) -> bool {
        matches!(self.value, NodeValue::Virtual)
    }

    /// Whether the node holds a mapping.
    pub fn is_map(&self) -> bool {
        matches!(self.value, NodeValue::Mapping(_))
    }

    /// Whether the node holds a sequence.
    pub fn is_list(&self) -> bool {
        matches!(self.value, NodeValue::Sequence(_))
    }

    /// Whether the node holds scalar text.
    pub fn is_scalar(&self) -> bool {
        matches!(self.value, NodeValue::Scalar(_))
    }

    /// The scalar text, if this node holds a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// The mapping entries, if this node holds a mapping.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigNode>> {
        match &self.value {
            NodeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// The sequence elements, if this node holds a sequence.
    pub fn as_sequence(&self) -> Option<&[ConfigNode]> {
        match &self.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Number of children (entries or elements); zero for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            NodeValue::Mapping(entries) => entries.len(),
            NodeValue::Sequence(items) => items.len(),
            NodeValue::Virtual | NodeValue::Scalar(_) => 0,
        }
    }

    /// Whether the node is virtual or an empty collection.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            NodeValue::Virtual => true,
            NodeValue::Scalar(_) => false,
            NodeValue::Mapping(entries) => entries.is_empty(),
            NodeValue::Sequence(items) => items.is_empty(),
        }
    }

    /// Replace the value with scalar text.
    pub fn set_scalar(&mut self, text: impl Into<String>) -> &mut Self {
        self.value = NodeValue::Scalar(text.into());
        self
    }

    /// Replace the value with an empty mapping.
    pub fn set_empty_map(&mut self) -> &mut Self {
        self.value = NodeValue::Mapping(IndexMap::new());
        self
    }

    /// Replace the value with an empty sequence.
    pub fn set_empty_list(&mut self) -> &mut Self {
        self.value = NodeValue::Sequence(Vec::new());
        self
    }

    /// Remove the value, making the node virtual.
    pub fn set_virtual(&mut self) -> &mut Self {
        self.value = NodeValue::Virtual;
        self
    }

    /// Look up a direct child by mapping key or sequence index.
    pub fn get(&self, key: impl Into<NodeKey>) -> Option<&ConfigNode> {
        match (&self.value, key.into()) {
            (NodeValue::Mapping(entries), NodeKey::Name(name)) => entries.get(&name),
            (NodeValue::Sequence(items), NodeKey::Index(index)) => items.get(index),
            _ => None,
        }
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: impl Into<NodeKey>) -> Option<&mut ConfigNode> {
        match (&mut self.value, key.into()) {
            (NodeValue::Mapping(entries), NodeKey::Name(name)) => entries.get_mut(&name),
            (NodeValue::Sequence(items), NodeKey::Index(index)) => items.get_mut(index),
            _ => None,
        }
    }

    /// Look up a descendant by path.
    pub fn at_path(&self, path: &NodePath) -> Option<&ConfigNode> {
        path.keys()
            .iter()
            .try_fold(self, |node, key| node.get(key.clone()))
    }

    /// Whether a non-virtual mapping child exists under `name`.
    pub fn has_child(&self, name: &str) -> bool {
        self.as_mapping()
            .and_then(|entries| entries.get(name))
            .is_some_and(|child| !child.is_virtual())
    }

    /// The mapping child stored under `name`, created virtual if missing.
    ///
    /// A node that does not hold a mapping is turned into an empty one first.
    pub fn child_mut(&mut self, name: &str) -> &mut ConfigNode {
        if !self.is_map() {
            self.set_empty_map();
        }
        let options = self.options;
        match &mut self.value {
            NodeValue::Mapping(entries) => entries
                .entry(name.to_string())
                .or_insert_with(|| ConfigNode::child_of(options, NodeKey::Name(name.to_string()))),
            _ => unreachable!("value was just made a mapping"),
        }
    }

    /// Store `child` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: &str, mut child: ConfigNode) -> &mut ConfigNode {
        child.key = Some(NodeKey::Name(name.to_string()));
        let slot = self.child_mut(name);
        *slot = child;
        slot
    }

    /// Remove the mapping child stored under `name`, keeping the order of
    /// the remaining entries.
    pub fn remove_child(&mut self, name: &str) -> Option<ConfigNode> {
        match &mut self.value {
            NodeValue::Mapping(entries) => entries.shift_remove(name),
            _ => None,
        }
    }

    /// Append a new virtual element and return it.
    ///
    /// A node that does not hold a sequence is turned into an empty one first.
    pub fn append_list_node(&mut self) -> &mut ConfigNode {
        if !self.is_list() {
            self.set_empty_list();
        }
        let options = self.options;
        match &mut self.value {
            NodeValue::Sequence(items) => {
                let index = items.len();
                items.push(ConfigNode::child_of(options, NodeKey::Index(index)));
                &mut items[index]
            }
            _ => unreachable!("value was just made a sequence"),
        }
    }

    /// The comment attached to this node.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Attach a comment. Ignored when the node does not support comments.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        if self.supports_comments() {
            self.comment = Some(comment.into());
        }
        self
    }

    /// Remove and return the comment.
    pub fn take_comment(&mut self) -> Option<String> {
        self.comment.take()
    }

    /// Read a hint stored on this node (hints are never inherited).
    pub fn hint<T>(&self, hint: &RepresentationHint<T>) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.hints.get(hint)
    }

    /// Store a hint on this node.
    pub fn set_hint<T>(&mut self, hint: &RepresentationHint<T>, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.hints.set(hint, value);
        self
    }

    /// Remove a hint from this node.
    pub fn remove_hint<T>(&mut self, hint: &RepresentationHint<T>) -> &mut Self {
        self.hints.remove(hint);
        self
    }

    /// All hints stored on this node.
    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    /// Copy the value and hints of `other` into this node.
    ///
    /// The copy is deep: the two nodes are independent afterwards. This
    /// node keeps its own key, options and comment.
    pub fn copy_from(&mut self, other: &ConfigNode) -> &mut Self {
        self.value = other.value.clone();
        self.hints.extend_from(&other.hints);
        self
    }

    /// Call `f` on this node and every descendant, parents before children.
    pub fn for_each_node_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut ConfigNode),
    {
        f(self);
        match &mut self.value {
            NodeValue::Mapping(entries) => {
                for child in entries.values_mut() {
                    child.for_each_node_mut(f);
                }
            }
            NodeValue::Sequence(items) => {
                for child in items.iter_mut() {
                    child.for_each_node_mut(f);
                }
            }
            NodeValue::Virtual | NodeValue::Scalar(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLE: RepresentationHint<&'static str> = RepresentationHint::of("style");

    #[test]
    fn test_root_is_virtual() {
        let node = ConfigNode::root();
        assert!(node.is_virtual());
        assert!(node.is_empty());
        assert!(node.key().is_none());
        assert!(node.supports_comments());
    }

    #[test]
    fn test_child_mut_creates_virtual_entry() {
        let mut root = ConfigNode::root();
        let child = root.child_mut("a");
        assert!(child.is_virtual());
        assert_eq!(child.key(), Some(&NodeKey::Name("a".into())));

        assert!(root.is_map());
        assert!(!root.has_child("a"));
        root.child_mut("a").set_scalar("1");
        assert!(root.has_child("a"));
    }

    #[test]
    fn test_child_mut_replaces_scalar() {
        let mut root = ConfigNode::root();
        root.set_scalar("text");
        root.child_mut("a").set_scalar("1");
        assert!(root.is_map());
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_append_list_node_indexes() {
        let mut root = ConfigNode::root();
        root.append_list_node().set_scalar("a");
        root.append_list_node().set_scalar("b");

        let items = root.as_sequence().unwrap();
        assert_eq!(items[1].key(), Some(&NodeKey::Index(1)));
        assert_eq!(root.get(1usize).and_then(|n| n.as_str()), Some("b"));
    }

    #[test]
    fn test_equality_ignores_metadata_and_order() {
        let mut a = ConfigNode::root();
        a.child_mut("x").set_scalar("1");
        a.child_mut("y").set_scalar("2");
        a.set_comment("only on a");
        a.set_hint(&STYLE, "flow");

        let mut b = ConfigNode::root();
        b.child_mut("y").set_scalar("2");
        b.child_mut("x").set_scalar("1");

        assert_eq!(a, b);
    }

    #[test]
    fn test_comments_ignored_without_support() {
        let mut node = ConfigNode::root_with(NodeOptions::new().with_comments(false));
        node.set_comment("dropped");
        assert!(node.comment().is_none());

        // Children inherit the capability
        assert!(!node.child_mut("a").supports_comments());
    }

    #[test]
    fn test_copy_from_is_independent() {
        let mut source = ConfigNode::root();
        source.child_mut("list").append_list_node().set_scalar("a");
        source.set_hint(&STYLE, "block");

        let mut target = ConfigNode::root();
        target.set_comment("mine");
        target.copy_from(&source);
        assert_eq!(target, source);
        assert_eq!(target.hint(&STYLE), Some("block"));
        assert_eq!(target.comment(), Some("mine"));

        source.child_mut("list").append_list_node().set_scalar("b");
        assert_eq!(target.get("list").map(|n| n.len()), Some(1));
    }

    #[test]
    fn test_at_path() {
        let mut root = ConfigNode::root();
        root.child_mut("servers")
            .append_list_node()
            .child_mut("host")
            .set_scalar("localhost");

        let path = NodePath::new(vec!["servers".into(), 0usize.into(), "host".into()]);
        assert_eq!(
            root.at_path(&path).and_then(|n| n.as_str()),
            Some("localhost")
        );
        assert!(root.at_path(&NodePath::new(vec!["missing".into()])).is_none());
    }

    #[test]
    fn test_remove_child_keeps_order() {
        let mut root = ConfigNode::root();
        for name in ["a", "b", "c"] {
            root.child_mut(name).set_scalar(name);
        }
        assert!(root.remove_child("b").is_some());
        let keys: Vec<&str> = root.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_for_each_node_mut_visits_all() {
        let mut root = ConfigNode::root();
        root.child_mut("a").append_list_node().set_scalar("1");
        root.child_mut("b").set_scalar("2");

        let mut count = 0;
        root.for_each_node_mut(&mut |_| count += 1);
        // root, a, a[0], b
        assert_eq!(count, 4);
    }
}
