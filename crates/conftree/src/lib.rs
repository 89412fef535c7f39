//! # conftree
//!
//! A generic, format-independent configuration tree.
//!
//! A [`ConfigNode`] is either virtual (absent), a scalar holding raw text, a
//! mapping of string keys to child nodes, or a sequence of child nodes. Nodes
//! own their children, carry an optional comment and a side-table of typed
//! [hints](RepresentationHint) that format codecs use to remember layout
//! details across a load/save cycle.
//!
//! Format codecs read a tree by building it node by node and write it back by
//! implementing [`ConfigVisitor`].
//!
//! ## Example
//!
//! ```rust
//! use conftree::{ConfigNode, NodePath};
//!
//! let mut root = ConfigNode::root();
//! root.child_mut("server").child_mut("port").set_scalar("8080");
//!
//! let path: NodePath = vec!["server".into(), "port".into()].into_iter().collect();
//! assert_eq!(root.at_path(&path).and_then(|n| n.as_str()), Some("8080"));
//! ```

mod hint;
mod node;
mod path;
mod visitor;

pub use hint::{Hints, RepresentationHint};
pub use node::{ConfigNode, NodeOptions, NodeValue};
pub use path::{NodeKey, NodePath};
pub use visitor::ConfigVisitor;
