//! Tree construction and traversal through the public API.

use conftree::{ConfigNode, ConfigVisitor, NodeKey, NodeOptions, NodePath, RepresentationHint};

const ORIGIN: RepresentationHint<String> = RepresentationHint::of("origin");

/// Collects the path of every scalar in visit order.
struct ScalarPaths;

struct PathState {
    path: NodePath,
    found: Vec<String>,
}

impl ConfigVisitor for ScalarPaths {
    type State = PathState;
    type Output = Vec<String>;
    type Error = std::convert::Infallible;

    fn begin_visit(&self, _: &mut PathState, _: &ConfigNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_node(&self, state: &mut PathState, node: &ConfigNode) -> Result<(), Self::Error> {
        if let Some(key) = node.key() {
            state.path.push(key.clone());
        }
        Ok(())
    }

    fn enter_mapping_node(&self, _: &mut PathState, _: &ConfigNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_list_node(&self, _: &mut PathState, _: &ConfigNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_scalar_node(&self, state: &mut PathState, node: &ConfigNode) -> Result<(), Self::Error> {
        state.found.push(format!(
            "{}={}",
            state.path,
            node.as_str().unwrap_or_default()
        ));
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn exit_mapping_node(&self, state: &mut PathState, node: &ConfigNode) -> Result<(), Self::Error> {
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn exit_list_node(&self, state: &mut PathState, node: &ConfigNode) -> Result<(), Self::Error> {
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn end_visit(&self, state: &mut PathState) -> Result<Vec<String>, Self::Error> {
        Ok(std::mem::take(&mut state.found))
    }
}

fn sample() -> ConfigNode {
    let mut root = ConfigNode::root();
    root.child_mut("name").set_scalar("demo");
    let servers = root.child_mut("servers");
    let first = servers.append_list_node();
    first.child_mut("host").set_scalar("a.example");
    first.child_mut("port").set_scalar("80");
    servers.append_list_node().set_scalar("b.example");
    root
}

#[test]
fn test_visit_reports_paths() {
    let mut state = PathState {
        path: NodePath::root(),
        found: Vec::new(),
    };
    let found = sample().visit(&ScalarPaths, &mut state).unwrap();
    assert_eq!(
        found,
        vec![
            "name=demo",
            "servers[0].host=a.example",
            "servers[0].port=80",
            "servers[1]=b.example",
        ]
    );
    assert!(state.path.is_root());
}

#[test]
fn test_clone_is_deep() {
    let original = sample();
    let mut copy = original.clone();
    copy.child_mut("name").set_scalar("changed");

    assert_ne!(original, copy);
    assert_eq!(
        original.get("name").and_then(|n| n.as_str()),
        Some("demo")
    );
}

#[test]
fn test_hints_are_not_inherited() {
    let mut root = ConfigNode::root();
    root.set_hint(&ORIGIN, "file".to_string());
    let child = root.child_mut("a");
    assert!(child.hint(&ORIGIN).is_none());
}

#[test]
fn test_insert_sets_key() {
    let mut root = ConfigNode::root_with(NodeOptions::new());
    let mut value = ConfigNode::root();
    value.set_scalar("x");
    root.insert("k", value);

    assert_eq!(
        root.get("k").and_then(|n| n.key()),
        Some(&NodeKey::Name("k".to_string()))
    );
}
