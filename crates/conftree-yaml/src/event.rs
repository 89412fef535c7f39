//! The event model shared by the reader, the tree builder and the emitter.

use crate::error::Result;
use std::fmt;
use yaml_rust2::scanner::TScalarStyle;

/// A position in the source text.
///
/// Lines and columns are 1-based; `index` is the 0-based character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mark {
    index: usize,
    line: usize,
    column: usize,
}

impl Mark {
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Layout of a collection at the event level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStyle {
    /// Inline: `[a, b]`, `{k: v}`.
    Flow,
    /// Indented, one entry per line.
    Block,
    /// Let the emitter decide.
    Auto,
}

/// Whether a scalar's tag may be omitted when written plain or non-plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitTuple {
    plain: bool,
    non_plain: bool,
}

impl ImplicitTuple {
    pub fn new(plain: bool, non_plain: bool) -> Self {
        Self { plain, non_plain }
    }

    /// The tag can be dropped if the scalar is written plain.
    pub fn can_omit_tag_in_plain_scalar(&self) -> bool {
        self.plain
    }

    /// The tag can be dropped if the scalar is written quoted or as a block.
    pub fn can_omit_tag_in_non_plain_scalar(&self) -> bool {
        self.non_plain
    }

    pub fn both_false(&self) -> bool {
        !self.plain && !self.non_plain
    }
}

/// A YAML serialization event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow_style: FlowStyle,
    },
    MappingEnd,
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow_style: FlowStyle,
    },
    SequenceEnd,
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: ImplicitTuple,
        value: String,
        style: TScalarStyle,
    },
    Alias {
        anchor: String,
    },
    /// A comment line block. Only produced on the writing side; readers
    /// deliver comments through [`EventSource::comments_before`].
    Comment(String),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StreamStart => EventKind::StreamStart,
            Event::StreamEnd => EventKind::StreamEnd,
            Event::DocumentStart => EventKind::DocumentStart,
            Event::DocumentEnd => EventKind::DocumentEnd,
            Event::MappingStart { .. } => EventKind::MappingStart,
            Event::MappingEnd => EventKind::MappingEnd,
            Event::SequenceStart { .. } => EventKind::SequenceStart,
            Event::SequenceEnd => EventKind::SequenceEnd,
            Event::Scalar { .. } => EventKind::Scalar,
            Event::Alias { .. } => EventKind::Alias,
            Event::Comment(_) => EventKind::Comment,
        }
    }

    /// The anchor declared on a node event.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Event::MappingStart { anchor, .. }
            | Event::SequenceStart { anchor, .. }
            | Event::Scalar { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }
}

/// The kind of an [`Event`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart,
    MappingEnd,
    SequenceStart,
    SequenceEnd,
    Scalar,
    Alias,
    Comment,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::StreamStart => "stream start",
            EventKind::StreamEnd => "stream end",
            EventKind::DocumentStart => "document start",
            EventKind::DocumentEnd => "document end",
            EventKind::MappingStart => "mapping start",
            EventKind::MappingEnd => "mapping end",
            EventKind::SequenceStart => "sequence start",
            EventKind::SequenceEnd => "sequence end",
            EventKind::Scalar => "scalar",
            EventKind::Alias => "alias",
            EventKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// A pull source of events, with comments delivered on a side channel.
pub trait EventSource {
    /// Look at the next event without consuming it.
    fn peek(&mut self) -> Result<&Event>;

    /// Position of the next event.
    fn mark(&mut self) -> Result<Mark>;

    /// Consume the next event.
    fn next_event(&mut self) -> Result<(Event, Mark)>;

    /// Turn comment collection on or off.
    fn set_capture_comments(&mut self, capture: bool);

    /// Take every pending comment located on a line before `mark`, joined
    /// with `\n`. Returns `None` when there are none or capture is off.
    fn comments_before(&mut self, mark: Mark) -> Option<String>;
}
