//! Tags command implementation

use anyhow::Result;
use conftree::{ConfigNode, ConfigVisitor, NodePath};
use conftree_yaml::{TagRepository, YamlConfigLoader};
use std::convert::Infallible;
use std::path::Path;

pub fn execute(file: &Path) -> Result<()> {
    let source = super::read_source(file)?;
    let loader = YamlConfigLoader::default();
    let documents = super::load_documents(&loader, file, &source)?;

    for (position, document) in documents.iter().enumerate() {
        if position > 0 {
            println!("---");
        }
        for line in list_tags(loader.tag_repository(), document) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// `path: tag` for every scalar of `root`, in document order.
pub fn list_tags(tags: &TagRepository, root: &ConfigNode) -> Vec<String> {
    let mut state = TagState {
        path: NodePath::root(),
        lines: Vec::new(),
    };
    match root.visit(&TagListing { tags }, &mut state) {
        Ok(lines) => lines,
        Err(never) => match never {},
    }
}

struct TagListing<'a> {
    tags: &'a TagRepository,
}

struct TagState {
    path: NodePath,
    lines: Vec<String>,
}

impl ConfigVisitor for TagListing<'_> {
    type State = TagState;
    type Output = Vec<String>;
    type Error = Infallible;

    fn begin_visit(&self, _: &mut TagState, _: &ConfigNode) -> Result<(), Infallible> {
        Ok(())
    }

    fn enter_node(&self, state: &mut TagState, node: &ConfigNode) -> Result<(), Infallible> {
        if let Some(key) = node.key() {
            state.path.push(key.clone());
        }
        Ok(())
    }

    fn enter_mapping_node(&self, _: &mut TagState, _: &ConfigNode) -> Result<(), Infallible> {
        Ok(())
    }

    fn enter_list_node(&self, _: &mut TagState, _: &ConfigNode) -> Result<(), Infallible> {
        Ok(())
    }

    fn enter_scalar_node(&self, state: &mut TagState, node: &ConfigNode) -> Result<(), Infallible> {
        let value = node.as_str().unwrap_or_default();
        let tag = self
            .tags
            .for_input(value)
            .map_or_else(|| "?".to_string(), |tag| tag.uri().to_string());
        state.lines.push(format!("{}: {}", state.path, tag));
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn exit_mapping_node(&self, state: &mut TagState, node: &ConfigNode) -> Result<(), Infallible> {
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn exit_list_node(&self, state: &mut TagState, node: &ConfigNode) -> Result<(), Infallible> {
        if node.key().is_some() {
            state.path.pop();
        }
        Ok(())
    }

    fn end_visit(&self, state: &mut TagState) -> Result<Vec<String>, Infallible> {
        Ok(std::mem::take(&mut state.lines))
    }
}
