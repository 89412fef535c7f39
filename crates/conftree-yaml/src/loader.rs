//! Entry point wiring text to configuration trees and back.

use crate::emitter::{DEFAULT_INDENT, Emitter};
use crate::error::{Error, Result};
use crate::parser::YamlParser;
use crate::reader::YamlEventReader;
use crate::repository::TagRepository;
use crate::style::NodeStyle;
use crate::visitor::{VisitState, YamlVisitor};
use conftree::{ConfigNode, NodeOptions};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Settings for a [`YamlConfigLoader`].
///
/// ```rust
/// use conftree_yaml::{LoaderOptions, NodeStyle};
///
/// let options: LoaderOptions = serde_json::from_str(r#"{"node-style": "block"}"#).unwrap();
/// assert_eq!(options.node_style, Some(NodeStyle::Block));
/// assert_eq!(options.indent, 4);
/// assert!(options.comments);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderOptions {
    /// Spaces per block nesting level.
    pub indent: usize,
    /// Layout for collections without a style hint. `None` lets the
    /// emitter decide per collection.
    pub node_style: Option<NodeStyle>,
    /// Whether loaded nodes keep comments.
    pub comments: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            node_style: None,
            comments: true,
        }
    }
}

/// Loads and saves configuration trees as YAML.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigLoader {
    options: LoaderOptions,
    tags: TagRepository,
}

impl YamlConfigLoader {
    pub fn builder() -> YamlConfigLoaderBuilder {
        YamlConfigLoaderBuilder::default()
    }

    pub fn from_options(options: LoaderOptions) -> Self {
        Self {
            options,
            tags: TagRepository::default(),
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn tag_repository(&self) -> &TagRepository {
        &self.tags
    }

    fn node_options(&self) -> NodeOptions {
        NodeOptions::new().with_comments(self.options.comments)
    }

    /// An empty root node carrying this loader's node options.
    pub fn create_node(&self) -> ConfigNode {
        ConfigNode::root_with(self.node_options())
    }

    /// Load the single document in `text`.
    ///
    /// An empty stream yields a virtual root.
    pub fn load(&self, text: &str) -> Result<ConfigNode> {
        let mut node = self.create_node();
        YamlParser::new(YamlEventReader::new(text)).single_document_stream(&mut node)?;
        Ok(node)
    }

    /// Load every document in `text`, one at a time.
    ///
    /// Iteration stops after the first error.
    pub fn load_all(&self, text: &str) -> Result<impl Iterator<Item = Result<ConfigNode>>> {
        let options = self.node_options();
        YamlParser::new(YamlEventReader::new(text)).stream(move || ConfigNode::root_with(options))
    }

    /// Write `node` as one YAML document.
    pub fn save<W: Write>(&self, node: &ConfigNode, writer: W) -> Result<()> {
        let visitor = YamlVisitor::new(&self.tags, self.options.node_style);
        let emitter = Emitter::new(writer).with_indent(self.options.indent);
        let mut state = VisitState::new(emitter);
        node.visit(&visitor, &mut state).map_err(Error::from)
    }

    pub fn save_to_string(&self, node: &ConfigNode) -> Result<String> {
        let mut out = Vec::new();
        self.save(node, &mut out)?;
        String::from_utf8(out).map_err(|err| {
            Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
        })
    }
}

/// Builder for [`YamlConfigLoader`].
#[derive(Debug, Default)]
pub struct YamlConfigLoaderBuilder {
    options: LoaderOptions,
    tags: Option<TagRepository>,
}

impl YamlConfigLoaderBuilder {
    pub fn options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.options.indent = indent;
        self
    }

    pub fn node_style(mut self, node_style: Option<NodeStyle>) -> Self {
        self.options.node_style = node_style;
        self
    }

    pub fn comments(mut self, comments: bool) -> Self {
        self.options.comments = comments;
        self
    }

    pub fn tag_repository(mut self, tags: TagRepository) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn build(self) -> YamlConfigLoader {
        YamlConfigLoader {
            options: self.options,
            tags: self.tags.unwrap_or_default(),
        }
    }
}
