//! # conftree-yaml
//!
//! YAML codec for [`conftree`] configuration trees.
//!
//! Text is read by [`YamlEventReader`] (built on `yaml-rust2`) into a stream of
//! [`Event`]s, which [`YamlParser`] turns into [`ConfigNode`]s. Anchors are
//! recorded in the [`ANCHOR_ID`] hint and aliases are resolved to independent
//! copies of the anchored content. Scalar quoting and collection layout are
//! kept in the [`SCALAR_STYLE`] and [`NODE_STYLE`] hints, and comment lines
//! are attached to the node that follows them.
//!
//! Writing goes the other way: [`YamlVisitor`] walks a tree and feeds
//! [`Emitter`], which chooses a quoting that reads back unchanged when the
//! requested one cannot.
//!
//! Most callers only need [`YamlConfigLoader`].
//!
//! ## Example
//!
//! ```rust
//! use conftree_yaml::YamlConfigLoader;
//!
//! let loader = YamlConfigLoader::default();
//! let node = loader.load("# where to listen\nport: 8080\n").unwrap();
//!
//! let port = node.get("port").unwrap();
//! assert_eq!(port.as_str(), Some("8080"));
//! assert_eq!(port.comment(), Some("where to listen"));
//!
//! assert_eq!(
//!     loader.save_to_string(&node).unwrap(),
//!     "# where to listen\nport: 8080\n"
//! );
//! ```
//!
//! [`ConfigNode`]: conftree::ConfigNode

mod diagnostic;
mod emitter;
mod error;
mod event;
mod hints;
mod loader;
mod parser;
mod reader;
mod repository;
mod style;
mod tag;
mod visitor;
pub mod yaml11;

pub use emitter::{DEFAULT_INDENT, Emitter};
pub use error::{EmitError, Error, ParseErrorKind, Result};
pub use event::{Event, EventKind, EventSource, FlowStyle, ImplicitTuple, Mark};
pub use hints::{ANCHOR_ID, NODE_STYLE, SCALAR_STYLE};
pub use loader::{LoaderOptions, YamlConfigLoader, YamlConfigLoaderBuilder};
pub use parser::{Documents, YamlParser};
pub use reader::YamlEventReader;
pub use repository::TagRepository;
pub use style::{NodeStyle, ScalarStyle};
pub use tag::{NativeType, Tag, TagBuilder, TagError};
pub use visitor::{VisitState, YamlVisitor};
pub use yaml_rust2::scanner::TScalarStyle;
