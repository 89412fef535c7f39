//! Turns a configuration tree back into events.

use crate::emitter::Emitter;
use crate::error::EmitError;
use crate::event::{Event, ImplicitTuple};
use crate::hints::{ANCHOR_ID, NODE_STYLE, SCALAR_STYLE};
use crate::repository::TagRepository;
use crate::style::{NodeStyle, ScalarStyle};
use conftree::{ConfigNode, ConfigVisitor, NodeKey};
use std::io::Write;
use std::marker::PhantomData;
use yaml_rust2::scanner::TScalarStyle;

/// State of one visit: the open emitter and the collection depth.
pub struct VisitState<W> {
    emitter: Emitter<W>,
    depth: usize,
}

impl<W: Write> VisitState<W> {
    pub fn new(emitter: Emitter<W>) -> Self {
        Self { emitter, depth: 0 }
    }

    pub fn into_emitter(self) -> Emitter<W> {
        self.emitter
    }

    fn emit(&mut self, event: Event) -> Result<(), EmitError> {
        self.emitter.emit(event)
    }
}

/// Emits the events describing a tree.
///
/// Anchors come from [`ANCHOR_ID`], collection layout from [`NODE_STYLE`]
/// (falling back to the configured default), and scalar quoting from
/// [`SCALAR_STYLE`]. Tags are resolved through the repository and are always
/// implicit. Aliases are never emitted: shared content is written in full.
pub struct YamlVisitor<'a, W> {
    tags: &'a TagRepository,
    default_style: Option<NodeStyle>,
    _sink: PhantomData<fn(W)>,
}

impl<'a, W: Write> YamlVisitor<'a, W> {
    pub fn new(tags: &'a TagRepository, default_style: Option<NodeStyle>) -> Self {
        Self {
            tags,
            default_style,
            _sink: PhantomData,
        }
    }

    fn tag_for(&self, text: &str) -> Option<String> {
        self.tags.for_input(text).map(|tag| tag.uri().to_string())
    }

    fn flow_style(&self, node: &ConfigNode) -> crate::event::FlowStyle {
        NodeStyle::as_flow_style(node.hint(&NODE_STYLE).or(self.default_style))
    }
}

impl<W: Write> ConfigVisitor for YamlVisitor<'_, W> {
    type State = VisitState<W>;
    type Output = ();
    type Error = EmitError;

    fn begin_visit(&self, state: &mut VisitState<W>, root: &ConfigNode) -> Result<(), EmitError> {
        tracing::debug!(kind = root.value().kind_name(), "writing tree");
        state.depth = 0;
        state.emit(Event::StreamStart)?;
        state.emit(Event::DocumentStart)
    }

    fn enter_node(&self, state: &mut VisitState<W>, node: &ConfigNode) -> Result<(), EmitError> {
        if let Some(comment) = node.comment() {
            state.emit(Event::Comment(comment.to_string()))?;
        }
        if state.depth == 0 {
            return Ok(());
        }
        if let Some(NodeKey::Name(key)) = node.key() {
            state.emit(Event::Scalar {
                anchor: None,
                tag: self.tag_for(key),
                implicit: ImplicitTuple::new(true, true),
                value: key.clone(),
                style: TScalarStyle::Plain,
            })?;
        }
        Ok(())
    }

    fn enter_mapping_node(
        &self,
        state: &mut VisitState<W>,
        node: &ConfigNode,
    ) -> Result<(), EmitError> {
        state.depth += 1;
        state.emit(Event::MappingStart {
            anchor: node.hint(&ANCHOR_ID),
            tag: None,
            implicit: true,
            flow_style: self.flow_style(node),
        })
    }

    fn enter_list_node(&self, state: &mut VisitState<W>, node: &ConfigNode) -> Result<(), EmitError> {
        state.depth += 1;
        state.emit(Event::SequenceStart {
            anchor: node.hint(&ANCHOR_ID),
            tag: None,
            implicit: true,
            flow_style: self.flow_style(node),
        })
    }

    fn enter_scalar_node(
        &self,
        state: &mut VisitState<W>,
        node: &ConfigNode,
    ) -> Result<(), EmitError> {
        let value = node.as_str().unwrap_or_default();
        state.emit(Event::Scalar {
            anchor: node.hint(&ANCHOR_ID),
            tag: self.tag_for(value),
            implicit: ImplicitTuple::new(true, true),
            value: value.to_string(),
            style: ScalarStyle::as_event_style(node.hint(&SCALAR_STYLE)),
        })
    }

    fn exit_mapping_node(&self, state: &mut VisitState<W>, _: &ConfigNode) -> Result<(), EmitError> {
        state.depth -= 1;
        state.emit(Event::MappingEnd)
    }

    fn exit_list_node(&self, state: &mut VisitState<W>, _: &ConfigNode) -> Result<(), EmitError> {
        state.depth -= 1;
        state.emit(Event::SequenceEnd)
    }

    fn end_visit(&self, state: &mut VisitState<W>) -> Result<(), EmitError> {
        state.emit(Event::DocumentEnd)?;
        state.emit(Event::StreamEnd)
    }
}
