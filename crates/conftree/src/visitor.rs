//! Pre-order traversal of a configuration tree.

use crate::node::{ConfigNode, NodeValue};

/// Callbacks invoked while walking a tree with [`ConfigNode::visit`].
///
/// For every node the walk first calls [`enter_node`](Self::enter_node), then
/// exactly one of the kind-specific `enter_*` callbacks. Collections are
/// followed by their children and closed with the matching `exit_*` callback.
///
/// Virtual mapping entries are skipped. Virtual sequence elements and a
/// virtual root are visited as scalars so that positions stay stable.
pub trait ConfigVisitor {
    /// Mutable state threaded through the walk.
    type State;
    /// Value produced by [`end_visit`](Self::end_visit).
    type Output;
    /// Error aborting the walk.
    type Error;

    fn begin_visit(&self, state: &mut Self::State, root: &ConfigNode)
    -> Result<(), Self::Error>;

    fn enter_node(&self, state: &mut Self::State, node: &ConfigNode) -> Result<(), Self::Error>;

    fn enter_mapping_node(
        &self,
        state: &mut Self::State,
        node: &ConfigNode,
    ) -> Result<(), Self::Error>;

    fn enter_list_node(&self, state: &mut Self::State, node: &ConfigNode)
    -> Result<(), Self::Error>;

    fn enter_scalar_node(
        &self,
        state: &mut Self::State,
        node: &ConfigNode,
    ) -> Result<(), Self::Error>;

    fn exit_mapping_node(
        &self,
        state: &mut Self::State,
        node: &ConfigNode,
    ) -> Result<(), Self::Error>;

    fn exit_list_node(&self, state: &mut Self::State, node: &ConfigNode)
    -> Result<(), Self::Error>;

    fn end_visit(&self, state: &mut Self::State) -> Result<Self::Output, Self::Error>;
}

impl ConfigNode {
    /// Walk this node and its descendants in pre-order.
    pub fn visit<V>(&self, visitor: &V, state: &mut V::State) -> Result<V::Output, V::Error>
    where
        V: ConfigVisitor + ?Sized,
    {
        visitor.begin_visit(state, self)?;
        walk(self, visitor, state)?;
        visitor.end_visit(state)
    }
}

fn walk<V>(node: &ConfigNode, visitor: &V, state: &mut V::State) -> Result<(), V::Error>
where
    V: ConfigVisitor + ?Sized,
{
    visitor.enter_node(state, node)?;
    match node.value() {
        NodeValue::Mapping(entries) => {
            visitor.enter_mapping_node(state, node)?;
            for child in entries.values().filter(|child| !child.is_virtual()) {
                walk(child, visitor, state)?;
            }
            visitor.exit_mapping_node(state, node)
        }
        NodeValue::Sequence(items) => {
            visitor.enter_list_node(state, node)?;
            for child in items {
                walk(child, visitor, state)?;
            }
            visitor.exit_list_node(state, node)
        }
        NodeValue::Scalar(_) | NodeValue::Virtual => visitor.enter_scalar_node(state, node),
    }
}
