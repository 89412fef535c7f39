//! Renders an event stream as YAML text.

use crate::error::EmitError;
use crate::event::{Event, FlowStyle, ImplicitTuple};
use crate::yaml11::YAML_ORG_PREFIX;
use std::io::Write;
use std::iter::Peekable;
use yaml_rust2::scanner::TScalarStyle;

/// Default number of spaces per block nesting level.
pub const DEFAULT_INDENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Stream,
    Document,
    End,
}

/// Writes YAML text for a stream of [`Event`]s.
///
/// Events of a document are buffered and the document is written once its
/// end event arrives, so layout decisions can look at whole collections.
///
/// ```rust
/// use conftree_yaml::{Emitter, Event, ImplicitTuple};
/// use yaml_rust2::scanner::TScalarStyle;
///
/// let mut out = Vec::new();
/// let mut emitter = Emitter::new(&mut out);
/// for event in [
///     Event::StreamStart,
///     Event::DocumentStart,
///     Event::Scalar {
///         anchor: None,
///         tag: None,
///         implicit: ImplicitTuple::new(true, true),
///         value: "hello".to_string(),
///         style: TScalarStyle::Plain,
///     },
///     Event::DocumentEnd,
///     Event::StreamEnd,
/// ] {
///     emitter.emit(event).unwrap();
/// }
/// assert_eq!(String::from_utf8(out).unwrap(), "hello\n");
/// ```
pub struct Emitter<W> {
    writer: W,
    indent: usize,
    phase: Phase,
    events: Vec<Event>,
    documents: usize,
}

impl<W: Write> Emitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            indent: DEFAULT_INDENT,
            phase: Phase::Start,
            events: Vec::new(),
            documents: 0,
        }
    }

    /// Set the block indentation. Values below 2 are raised to 2.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(2);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn emit(&mut self, event: Event) -> Result<(), EmitError> {
        match (self.phase, event) {
            (Phase::Start, Event::StreamStart) => {
                self.phase = Phase::Stream;
                Ok(())
            }
            (Phase::Stream, Event::DocumentStart) => {
                self.phase = Phase::Document;
                self.events.clear();
                Ok(())
            }
            (Phase::Stream, Event::StreamEnd) => {
                self.phase = Phase::End;
                self.writer.flush()?;
                Ok(())
            }
            (Phase::Document, Event::DocumentEnd) => {
                self.phase = Phase::Stream;
                let events = std::mem::take(&mut self.events);
                self.write_document(events)
            }
            (Phase::Document, event @ (Event::StreamStart | Event::StreamEnd | Event::DocumentStart)) => {
                Err(EmitError::InvalidEvent(format!(
                    "{} inside a document",
                    event.kind()
                )))
            }
            (Phase::Document, event) => {
                self.events.push(event);
                Ok(())
            }
            (phase, event) => Err(EmitError::InvalidEvent(format!(
                "{} is not allowed {}",
                event.kind(),
                match phase {
                    Phase::Start => "before the stream start",
                    Phase::Stream => "between documents",
                    Phase::Document => "inside a document",
                    Phase::End => "after the stream end",
                }
            ))),
        }
    }

    fn write_document(&mut self, events: Vec<Event>) -> Result<(), EmitError> {
        let mut tree = TreeReader {
            events: events.into_iter().peekable(),
        };
        let comment = tree.comments();
        let root = tree.node()?;
        if let Some(trailing) = tree.comments() {
            tracing::debug!(comment = %trailing, "dropping comment after the root node");
        }
        if let Some(event) = tree.events.next() {
            return Err(EmitError::InvalidEvent(format!(
                "{} after the root node",
                event.kind()
            )));
        }

        let mut renderer = Renderer {
            out: String::new(),
            indent: self.indent,
        };
        if self.documents > 0 {
            renderer.out.push_str("---\n");
        }
        renderer.document(comment.as_deref(), &root);
        self.documents += 1;

        tracing::trace!(bytes = renderer.out.len(), "writing document");
        self.writer.write_all(renderer.out.as_bytes())?;
        Ok(())
    }
}

/// Anchor and explicit tag of a node.
#[derive(Debug, Default)]
struct Properties {
    anchor: Option<String>,
    tag: Option<String>,
}

#[derive(Debug)]
enum Tree {
    Scalar {
        properties: Properties,
        implicit: ImplicitTuple,
        value: String,
        style: TScalarStyle,
    },
    Alias(String),
    Mapping {
        properties: Properties,
        flow_style: FlowStyle,
        entries: Vec<Entry>,
    },
    Sequence {
        properties: Properties,
        flow_style: FlowStyle,
        items: Vec<Item>,
    },
}

#[derive(Debug)]
struct Entry {
    comment: Option<String>,
    key: Tree,
    value: Tree,
}

#[derive(Debug)]
struct Item {
    comment: Option<String>,
    node: Tree,
}

/// Assembles buffered events into a [`Tree`].
struct TreeReader<I: Iterator<Item = Event>> {
    events: Peekable<I>,
}

impl<I: Iterator<Item = Event>> TreeReader<I> {
    fn comments(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        while let Some(Event::Comment(_)) = self.events.peek() {
            if let Some(Event::Comment(text)) = self.events.next() {
                lines.push(text);
            }
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn node(&mut self) -> Result<Tree, EmitError> {
        let event = self
            .events
            .next()
            .ok_or_else(|| EmitError::InvalidEvent("document ended inside a node".into()))?;
        match event {
            Event::Scalar {
                anchor,
                tag,
                implicit,
                value,
                style,
            } => Ok(Tree::Scalar {
                properties: Properties { anchor, tag },
                implicit,
                value,
                style,
            }),
            Event::Alias { anchor } => Ok(Tree::Alias(anchor)),
            Event::MappingStart {
                anchor,
                tag,
                implicit,
                flow_style,
            } => {
                let mut entries = Vec::new();
                loop {
                    let comment = self.comments();
                    if matches!(self.events.peek(), Some(Event::MappingEnd)) {
                        self.events.next();
                        break;
                    }
                    let key = self.node()?;
                    if !matches!(key, Tree::Scalar { .. } | Tree::Alias(_)) {
                        return Err(EmitError::InvalidEvent(
                            "mapping keys must be scalars".into(),
                        ));
                    }
                    let comment = join_comments(comment, self.comments());
                    let value = self.node()?;
                    entries.push(Entry {
                        comment,
                        key,
                        value,
                    });
                }
                Ok(Tree::Mapping {
                    properties: Properties {
                        anchor,
                        tag: tag.filter(|_| !implicit),
                    },
                    flow_style,
                    entries,
                })
            }
            Event::SequenceStart {
                anchor,
                tag,
                implicit,
                flow_style,
            } => {
                let mut items = Vec::new();
                loop {
                    let comment = self.comments();
                    if matches!(self.events.peek(), Some(Event::SequenceEnd)) {
                        self.events.next();
                        break;
                    }
                    let node = self.node()?;
                    items.push(Item { comment, node });
                }
                Ok(Tree::Sequence {
                    properties: Properties {
                        anchor,
                        tag: tag.filter(|_| !implicit),
                    },
                    flow_style,
                    items,
                })
            }
            other => Err(EmitError::InvalidEvent(format!(
                "expected a node, found {}",
                other.kind()
            ))),
        }
    }
}

fn join_comments(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(first), Some(second)) => Some(format!("{}\n{}", first, second)),
        (first, second) => first.or(second),
    }
}

/// Where a scalar is written.
#[derive(Debug, Clone, Copy)]
struct Context {
    flow: bool,
    key: bool,
}

const BLOCK_VALUE: Context = Context {
    flow: false,
    key: false,
};

/// Writes a [`Tree`] as text.
struct Renderer {
    out: String,
    indent: usize,
}

impl Renderer {
    fn document(&mut self, comment: Option<&str>, root: &Tree) {
        if let Some(comment) = comment {
            self.comment_lines(comment, 0);
        }
        match root {
            Tree::Scalar {
                properties,
                implicit,
                value,
                style: TScalarStyle::Plain,
            } if value.is_empty()
                && properties.anchor.is_none()
                && (properties.tag.is_none() || implicit.can_omit_tag_in_plain_scalar()) => {}
            Tree::Mapping {
                properties,
                entries,
                ..
            } if !renders_flow(root) => {
                if self.properties_line(properties) {
                    self.out.push('\n');
                }
                self.block_mapping(entries, 0, false);
            }
            Tree::Sequence {
                properties, items, ..
            } if !renders_flow(root) => {
                if self.properties_line(properties) {
                    self.out.push('\n');
                }
                self.block_sequence(items, 0);
            }
            _ => {
                let text = self.inline(root, BLOCK_VALUE, self.indent);
                self.out.push_str(text.trim_start());
            }
        }
    }

    /// Write anchor and tag without a leading space. Returns whether
    /// anything was written.
    fn properties_line(&mut self, properties: &Properties) -> bool {
        let text = properties_text(properties, None);
        self.out.push_str(&text);
        !text.is_empty()
    }

    fn comment_lines(&mut self, comment: &str, level: usize) {
        for line in comment.split('\n') {
            pad(&mut self.out, level);
            if line.is_empty() {
                self.out.push_str("#\n");
            } else {
                self.out.push_str("# ");
                self.out.push_str(line);
                self.out.push('\n');
            }
        }
    }

    fn block_mapping(&mut self, entries: &[Entry], level: usize, inline_first: bool) {
        for (position, entry) in entries.iter().enumerate() {
            let inline = inline_first && position == 0;
            if !inline {
                if let Some(comment) = &entry.comment {
                    self.comment_lines(comment, level);
                }
                pad(&mut self.out, level);
            }
            let key = self.inline(
                &entry.key,
                Context {
                    flow: false,
                    key: true,
                },
                level,
            );
            self.out.push_str(key.trim_start());
            if matches!(entry.key, Tree::Alias(_)) {
                self.out.push(' ');
            }
            self.out.push(':');
            self.block_value(&entry.value, level + self.indent);
        }
    }

    fn block_sequence(&mut self, items: &[Item], level: usize) {
        for item in items {
            if let Some(comment) = &item.comment {
                self.comment_lines(comment, level);
            }
            pad(&mut self.out, level);
            self.out.push('-');
            match &item.node {
                Tree::Mapping {
                    properties,
                    entries,
                    ..
                } if !renders_flow(&item.node)
                    && properties.anchor.is_none()
                    && properties.tag.is_none()
                    && entries.first().is_some_and(|entry| entry.comment.is_none()) =>
                {
                    self.out.push(' ');
                    self.block_mapping(entries, level + 2, true);
                }
                node => self.block_value(node, level + self.indent),
            }
        }
    }

    /// Write a value following `key:` or `-` on the current line.
    fn block_value(&mut self, node: &Tree, child_level: usize) {
        match node {
            Tree::Mapping {
                properties,
                entries,
                ..
            } if !renders_flow(node) => {
                self.out.push_str(&properties_text(properties, Some(' ')));
                self.out.push('\n');
                self.block_mapping(entries, child_level, false);
            }
            Tree::Sequence {
                properties, items, ..
            } if !renders_flow(node) => {
                self.out.push_str(&properties_text(properties, Some(' ')));
                self.out.push('\n');
                self.block_sequence(items, child_level);
            }
            _ => {
                let text = self.inline(node, BLOCK_VALUE, child_level);
                self.out.push_str(&text);
            }
        }
    }

    /// Text of a node written on the current line, with a leading space
    /// and, for block scalars, the trailing content lines. Keys get no line
    /// break.
    fn inline(&self, node: &Tree, context: Context, child_level: usize) -> String {
        let mut text = String::from(" ");
        match node {
            Tree::Scalar {
                properties,
                implicit,
                value,
                style,
            } => {
                let chosen = choose_style(*style, value, context);
                let omit_tag = if chosen == TScalarStyle::Plain {
                    implicit.can_omit_tag_in_plain_scalar()
                } else {
                    implicit.can_omit_tag_in_non_plain_scalar()
                };
                let shown = Properties {
                    anchor: properties.anchor.clone(),
                    tag: properties.tag.clone().filter(|_| !omit_tag),
                };
                let prefix = properties_text(&shown, None);
                if !prefix.is_empty() {
                    text.push_str(&prefix);
                    text.push(' ');
                }
                if chosen == TScalarStyle::Literal || chosen == TScalarStyle::Folded {
                    write_block_scalar(&mut text, value, chosen, child_level);
                    return text;
                }
                text.push_str(&scalar_text(value, chosen));
            }
            Tree::Alias(anchor) => {
                text.push('*');
                text.push_str(anchor);
            }
            Tree::Mapping { .. } | Tree::Sequence { .. } => {
                flow_text(node, &mut text);
            }
        }
        if !context.key {
            text.push('\n');
        }
        text
    }
}

fn pad(out: &mut String, level: usize) {
    out.extend(std::iter::repeat_n(' ', level));
}

/// `&anchor !tag`, optionally prefixed by `lead` when not empty.
fn properties_text(properties: &Properties, lead: Option<char>) -> String {
    let mut parts = Vec::new();
    if let Some(anchor) = &properties.anchor {
        parts.push(format!("&{}", anchor));
    }
    if let Some(tag) = &properties.tag {
        parts.push(tag_text(tag));
    }
    let text = parts.join(" ");
    match lead {
        Some(lead) if !text.is_empty() => format!("{}{}", lead, text),
        _ => text,
    }
}

fn tag_text(tag: &str) -> String {
    if let Some(suffix) = tag.strip_prefix(YAML_ORG_PREFIX) {
        format!("!!{}", suffix)
    } else if tag.starts_with('!') {
        tag.to_string()
    } else {
        format!("!<{}>", tag)
    }
}

/// Whether a collection is written in flow layout.
fn renders_flow(node: &Tree) -> bool {
    match node {
        Tree::Mapping {
            flow_style,
            entries,
            ..
        } => {
            entries.is_empty()
                || *flow_style == FlowStyle::Flow
                || (*flow_style == FlowStyle::Auto
                    && entries.iter().all(|entry| {
                        entry.comment.is_none() && is_simple(&entry.key) && is_simple(&entry.value)
                    }))
        }
        Tree::Sequence {
            flow_style, items, ..
        } => {
            items.is_empty()
                || *flow_style == FlowStyle::Flow
                || (*flow_style == FlowStyle::Auto
                    && items
                        .iter()
                        .all(|item| item.comment.is_none() && is_simple(&item.node)))
        }
        Tree::Scalar { .. } | Tree::Alias(_) => false,
    }
}

/// A scalar that will be written plain inside a flow collection.
fn is_simple(node: &Tree) -> bool {
    match node {
        Tree::Scalar { value, style, .. } => {
            *style == TScalarStyle::Plain && plain_allowed(value, true)
        }
        _ => false,
    }
}

fn flow_text(node: &Tree, out: &mut String) {
    match node {
        Tree::Scalar {
            properties,
            implicit,
            value,
            style,
        } => {
            let chosen = choose_style(
                *style,
                value,
                Context {
                    flow: true,
                    key: false,
                },
            );
            let omit_tag = if chosen == TScalarStyle::Plain {
                implicit.can_omit_tag_in_plain_scalar()
            } else {
                implicit.can_omit_tag_in_non_plain_scalar()
            };
            let shown = Properties {
                anchor: properties.anchor.clone(),
                tag: properties.tag.clone().filter(|_| !omit_tag),
            };
            let prefix = properties_text(&shown, None);
            if !prefix.is_empty() {
                out.push_str(&prefix);
                out.push(' ');
            }
            out.push_str(&scalar_text(value, chosen));
        }
        Tree::Alias(anchor) => {
            out.push('*');
            out.push_str(anchor);
        }
        Tree::Mapping {
            properties,
            entries,
            ..
        } => {
            let prefix = properties_text(properties, None);
            if !prefix.is_empty() {
                out.push_str(&prefix);
                out.push(' ');
            }
            out.push('{');
            for (position, entry) in entries.iter().enumerate() {
                if let Some(comment) = &entry.comment {
                    tracing::debug!(%comment, "comments are not written inside flow collections");
                }
                if position > 0 {
                    out.push_str(", ");
                }
                flow_text(&entry.key, out);
                if matches!(entry.key, Tree::Alias(_)) {
                    out.push(' ');
                }
                out.push_str(": ");
                flow_text(&entry.value, out);
            }
            out.push('}');
        }
        Tree::Sequence {
            properties, items, ..
        } => {
            let prefix = properties_text(properties, None);
            if !prefix.is_empty() {
                out.push_str(&prefix);
                out.push(' ');
            }
            out.push('[');
            for (position, item) in items.iter().enumerate() {
                if let Some(comment) = &item.comment {
                    tracing::debug!(%comment, "comments are not written inside flow collections");
                }
                if position > 0 {
                    out.push_str(", ");
                }
                flow_text(&item.node, out);
            }
            out.push(']');
        }
    }
}

/// Pick the style a scalar is written with.
///
/// Double quotes are always honored. Plain is used only when the text reads
/// back unchanged. Block styles need block context outside keys. Anything
/// else falls back to single quotes when possible, then double quotes.
fn choose_style(requested: TScalarStyle, value: &str, context: Context) -> TScalarStyle {
    if requested == TScalarStyle::DoubleQuoted {
        return TScalarStyle::DoubleQuoted;
    }
    let multiline = value.contains('\n');
    let plain_requested = requested == TScalarStyle::Plain;

    if plain_requested
        && !(context.key && multiline)
        && plain_allowed(value, context.flow)
    {
        return TScalarStyle::Plain;
    }

    if (requested == TScalarStyle::Literal || requested == TScalarStyle::Folded)
        && !context.flow
        && !context.key
        && block_allowed(value, requested == TScalarStyle::Folded)
    {
        return requested;
    }

    if (plain_requested || requested == TScalarStyle::SingleQuoted)
        && single_quoted_allowed(value)
        && !(context.key && multiline)
    {
        return TScalarStyle::SingleQuoted;
    }

    TScalarStyle::DoubleQuoted
}

fn is_special(c: char) -> bool {
    (c.is_control() && c != '\n' && c != '\t') || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}')
}

/// Whether `value` can be written without quotes and read back unchanged.
fn plain_allowed(value: &str, flow: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    let second = value.chars().nth(1);

    if value.starts_with([' ', '\t']) || value.ends_with([' ', '\t']) {
        return false;
    }
    if value.chars().any(|c| c == '\n' || c == '\r' || is_special(c)) {
        return false;
    }
    if matches!(
        first,
        '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    ) {
        return false;
    }
    if matches!(first, '-' | '?' | ':') && second.is_none_or(|c| c == ' ' || c == '\t') {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.contains(":\t") || value.ends_with(':') {
        return false;
    }
    if value.starts_with("---") || value.starts_with("...") {
        return false;
    }
    if flow && value.contains([',', '[', ']', '{', '}', ':', '#']) {
        return false;
    }
    true
}

fn single_quoted_allowed(value: &str) -> bool {
    !value.chars().any(|c| c == '\n' || c == '\r' || is_special(c))
}

fn block_allowed(value: &str, folded: bool) -> bool {
    if value.is_empty() || value.starts_with([' ', '\t', '\n']) {
        return false;
    }
    if value.chars().any(|c| c == '\r' || is_special(c)) {
        return false;
    }
    let body = value.trim_end_matches('\n');
    if body
        .split('\n')
        .any(|line| line.ends_with([' ', '\t']) || (folded && line.starts_with([' ', '\t'])))
    {
        return false;
    }
    true
}

fn scalar_text(value: &str, style: TScalarStyle) -> String {
    if style == TScalarStyle::Plain {
        value.to_string()
    } else if style == TScalarStyle::SingleQuoted {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        double_quoted(value)
    }
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if is_special(c) => {
                let code = u32::from(c);
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02X}", code));
                } else {
                    out.push_str(&format!("\\u{:04X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Append a `|` or `>` header and the indented content lines.
fn write_block_scalar(out: &mut String, value: &str, style: TScalarStyle, level: usize) {
    let body = value.trim_end_matches('\n');
    let trailing = value.len() - body.len();
    out.push(if style == TScalarStyle::Folded { '>' } else { '|' });
    out.push_str(match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    });
    out.push('\n');

    let lines: Vec<&str> = if style == TScalarStyle::Folded {
        // A single break folds into a space, so each run of n breaks is
        // written as n + 1.
        let mut lines = Vec::new();
        for (position, segment) in body.split('\n').enumerate() {
            if position > 0 && !segment.is_empty() {
                lines.push("");
            }
            lines.push(segment);
        }
        lines
    } else {
        body.split('\n').collect()
    };

    for line in lines
        .into_iter()
        .chain(std::iter::repeat_n("", trailing.saturating_sub(1)))
    {
        if !line.is_empty() {
            pad(out, level);
            out.push_str(line);
        }
        out.push('\n');
    }
}
