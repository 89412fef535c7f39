//! Event source over YAML text.
//!
//! `yaml-rust2` reports anchors as numeric ids, does not say whether a
//! collection was written in flow or block layout, and drops comments.
//! Anchor and alias names come from a second pass over the scanner tokens;
//! layout and comments are recovered from the source text.

use crate::error::{Error, ParseErrorKind, Result};
use crate::event::{Event, EventSource, FlowStyle, ImplicitTuple, Mark};
use crate::yaml11::YAML_ORG_PREFIX;
use std::collections::{HashMap, HashSet, VecDeque};
use yaml_rust2::parser::{Event as YamlEvent, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, Scanner, TScalarStyle, Token, TokenType};

/// Reads events from a YAML string.
///
/// The whole input is scanned up front; events are then handed out one by
/// one. A scanner failure is reported once every event before it has been
/// consumed.
pub struct YamlEventReader {
    events: VecDeque<(Event, Mark)>,
    failure: Option<(ParseErrorKind, Mark)>,
    end_mark: Mark,
    comments: VecDeque<LineComment>,
    capture: bool,
}

#[derive(Debug)]
struct LineComment {
    line: usize,
    text: String,
}

#[derive(Default)]
struct Collector {
    events: Vec<(YamlEvent, Marker)>,
}

impl MarkedEventReceiver for Collector {
    fn on_event(&mut self, ev: YamlEvent, marker: Marker) {
        self.events.push((ev, marker));
    }
}

impl YamlEventReader {
    pub fn new(source: &str) -> Self {
        let text = SourceText::new(source);
        let mut collector = Collector::default();
        let mut parser = Parser::new_from_str(source);
        let outcome = parser.load(&mut collector, true);

        // Marker lines are 1-based in current yaml-rust2 releases; take the
        // base from the stream start so either convention works.
        let line_base = collector
            .events
            .first()
            .map_or(1, |(_, marker)| marker.line().min(1));
        let to_mark = |marker: &Marker| text.mark(marker.line().saturating_sub(line_base), marker.col());

        let mut converter = Converter {
            text: &text,
            tokens: NameTokens::scan(source),
            names: HashMap::new(),
            not_comments: HashSet::new(),
        };
        let mut events = VecDeque::with_capacity(collector.events.len());
        for (ev, marker) in collector.events {
            let mark = to_mark(&marker);
            if let Some(event) = converter.convert(ev, mark) {
                events.push_back((event, mark));
            }
        }

        let failure = outcome.err().map(|err| {
            let mark = to_mark(err.marker());
            // The parser stops on an alias it cannot resolve, so that alias
            // is the first one no event consumed.
            let kind = match converter.tokens.aliases.front() {
                Some((marker, name)) if marker == err.marker() => {
                    ParseErrorKind::UnknownAnchor(name.clone())
                }
                _ => ParseErrorKind::Syntax(err.info().to_string()),
            };
            (kind, mark)
        });

        let comments = text.comments(&converter.not_comments);
        tracing::debug!(
            events = events.len(),
            comments = comments.len(),
            failed = failure.is_some(),
            "scanned YAML source"
        );

        Self {
            events,
            failure,
            end_mark: text.end_mark(),
            comments,
            capture: false,
        }
    }

    fn exhausted(&self) -> Error {
        match &self.failure {
            Some((kind, mark)) => Error::parse(kind.clone(), *mark),
            None => Error::parse(
                ParseErrorKind::Syntax("unexpected end of input".to_string()),
                self.end_mark,
            ),
        }
    }
}

impl EventSource for YamlEventReader {
    fn peek(&mut self) -> Result<&Event> {
        match self.events.front() {
            Some((event, _)) => Ok(event),
            None => Err(self.exhausted()),
        }
    }

    fn mark(&mut self) -> Result<Mark> {
        match self.events.front() {
            Some((_, mark)) => Ok(*mark),
            None => Err(self.exhausted()),
        }
    }

    fn next_event(&mut self) -> Result<(Event, Mark)> {
        match self.events.pop_front() {
            Some(entry) => {
                tracing::trace!(event = %entry.0.kind(), mark = %entry.1, "read event");
                Ok(entry)
            }
            None => Err(self.exhausted()),
        }
    }

    fn set_capture_comments(&mut self, capture: bool) {
        self.capture = capture;
    }

    fn comments_before(&mut self, mark: Mark) -> Option<String> {
        let mut taken = Vec::new();
        while self
            .comments
            .front()
            .is_some_and(|comment| comment.line < mark.line())
        {
            if let Some(comment) = self.comments.pop_front() {
                taken.push(comment.text);
            }
        }
        if !self.capture || taken.is_empty() {
            return None;
        }
        Some(taken.join("\n"))
    }
}

/// Anchor and alias names in source order.
///
/// The parser registers an anchor, or resolves an alias, right before the
/// event that carries it, so the n-th anchored event belongs to the n-th
/// anchor token and likewise for aliases.
#[derive(Debug, Default)]
struct NameTokens {
    anchors: VecDeque<String>,
    aliases: VecDeque<(Marker, String)>,
}

impl NameTokens {
    fn scan(source: &str) -> Self {
        let mut tokens = Self::default();
        // Stops at the first scanner error, like the parser does
        for Token(marker, token) in Scanner::new(source.chars()) {
            match token {
                TokenType::Anchor(name) => tokens.anchors.push_back(name),
                TokenType::Alias(name) => tokens.aliases.push_back((marker, name)),
                _ => {}
            }
        }
        tokens
    }
}

/// Turns `yaml-rust2` events into [`Event`]s.
struct Converter<'a> {
    text: &'a SourceText,
    tokens: NameTokens,
    /// Anchor id to name, for aliases left without a token.
    names: HashMap<usize, String>,
    /// 0-based lines that belong to a quoted or block scalar.
    not_comments: HashSet<usize>,
}

impl Converter<'_> {
    fn convert(&mut self, ev: YamlEvent, mark: Mark) -> Option<Event> {
        let event = match ev {
            YamlEvent::Nothing => return None,
            YamlEvent::StreamStart => Event::StreamStart,
            YamlEvent::StreamEnd => Event::StreamEnd,
            YamlEvent::DocumentStart => Event::DocumentStart,
            YamlEvent::DocumentEnd => Event::DocumentEnd,
            YamlEvent::Alias(id) => {
                let anchor = self
                    .tokens
                    .aliases
                    .pop_front()
                    .map(|(_, name)| name)
                    .or_else(|| self.names.get(&id).cloned())
                    .unwrap_or_else(|| synthetic_anchor(id));
                Event::Alias { anchor }
            }
            YamlEvent::Scalar(value, style, id, tag) => {
                self.exclude_scalar_lines(mark, style, &value);
                let tag = tag.map(|tag| tag_uri(&tag.handle, &tag.suffix));
                let implicit = ImplicitTuple::new(tag.is_none(), tag.is_none());
                Event::Scalar {
                    anchor: self.anchor(id),
                    tag,
                    implicit,
                    value,
                    style,
                }
            }
            YamlEvent::SequenceStart(id, tag) => Event::SequenceStart {
                anchor: self.anchor(id),
                implicit: tag.is_none(),
                tag: tag.map(|tag| tag_uri(&tag.handle, &tag.suffix)),
                flow_style: self.text.layout(mark, '['),
            },
            YamlEvent::SequenceEnd => Event::SequenceEnd,
            YamlEvent::MappingStart(id, tag) => Event::MappingStart {
                anchor: self.anchor(id),
                implicit: tag.is_none(),
                tag: tag.map(|tag| tag_uri(&tag.handle, &tag.suffix)),
                flow_style: self.text.layout(mark, '{'),
            },
            YamlEvent::MappingEnd => Event::MappingEnd,
        };
        Some(event)
    }

    fn anchor(&mut self, id: usize) -> Option<String> {
        if id == 0 {
            return None;
        }
        let name = match self.tokens.anchors.pop_front() {
            Some(name) => name,
            None => {
                tracing::warn!(id, "no anchor token left for anchored node");
                synthetic_anchor(id)
            }
        };
        self.names.insert(id, name.clone());
        Some(name)
    }

    fn exclude_scalar_lines(&mut self, mark: Mark, style: TScalarStyle, value: &str) {
        let line = mark.line() - 1;
        let column = mark.column() - 1;
        if style == TScalarStyle::SingleQuoted || style == TScalarStyle::DoubleQuoted {
            if let Some(end) = self.text.closing_quote_line(line, column) {
                self.not_comments.extend(line + 1..=end);
            }
        } else if (style == TScalarStyle::Literal || style == TScalarStyle::Folded)
            && !value.is_empty()
        {
            match self.text.block_scalar_header(line) {
                Some(header) => self.not_comments.extend(self.text.block_scalar_lines(header)),
                None => tracing::warn!(%mark, "block scalar header not found"),
            }
        }
    }
}

fn synthetic_anchor(id: usize) -> String {
    format!("anchor{}", id)
}

fn tag_uri(handle: &str, suffix: &str) -> String {
    if handle == "!!" {
        format!("{}{}", YAML_ORG_PREFIX, suffix)
    } else {
        format!("{}{}", handle, suffix)
    }
}

/// The source split into lines of characters.
struct SourceText {
    lines: Vec<Vec<char>>,
    /// Character offset of the start of each line.
    line_starts: Vec<usize>,
}

impl SourceText {
    fn new(source: &str) -> Self {
        let mut lines = Vec::new();
        let mut line_starts = Vec::new();
        let mut start = 0;
        for raw in source.split('\n') {
            line_starts.push(start);
            start += raw.chars().count() + 1;
            lines.push(raw.strip_suffix('\r').unwrap_or(raw).chars().collect());
        }
        Self { lines, line_starts }
    }

    /// A mark for a 0-based line and column.
    fn mark(&self, line: usize, column: usize) -> Mark {
        let start = self
            .line_starts
            .get(line)
            .or_else(|| self.line_starts.last())
            .copied()
            .unwrap_or(0);
        Mark::new(start + column, line + 1, column + 1)
    }

    fn end_mark(&self) -> Mark {
        let line = self.lines.len().saturating_sub(1);
        let column = self.lines.get(line).map_or(0, Vec::len);
        self.mark(line, column)
    }

    fn char_at(&self, mark: Mark) -> Option<char> {
        self.lines
            .get(mark.line() - 1)
            .and_then(|line| line.get(mark.column() - 1))
            .copied()
    }

    fn layout(&self, mark: Mark, flow_open: char) -> FlowStyle {
        if self.char_at(mark) == Some(flow_open) {
            FlowStyle::Flow
        } else {
            FlowStyle::Block
        }
    }

    /// The 0-based line holding the closing quote of the quoted scalar
    /// opening at `line`/`column`.
    fn closing_quote_line(&self, line: usize, column: usize) -> Option<usize> {
        let quote = *self.lines.get(line)?.get(column)?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let mut skip_next = false;
        let mut start = column + 1;
        for (number, chars) in self.lines.iter().enumerate().skip(line) {
            let mut position = start;
            while position < chars.len() {
                let c = chars[position];
                if skip_next {
                    skip_next = false;
                } else if quote == '"' && c == '\\' {
                    skip_next = true;
                } else if c == quote {
                    if quote == '\'' && chars.get(position + 1) == Some(&'\'') {
                        position += 1;
                    } else {
                        return Some(number);
                    }
                }
                position += 1;
            }
            // An escaped line break
            skip_next = false;
            start = 0;
        }
        None
    }

    /// The 0-based line of the `|` or `>` header of a block scalar whose
    /// marker sits on `line`.
    ///
    /// The marker may point past the header, so lines are searched upwards.
    /// Content lines never look like a header once comments are stripped,
    /// except for a content line that itself ends in `|` or `>`.
    fn block_scalar_header(&self, line: usize) -> Option<usize> {
        let last = line.min(self.lines.len().checked_sub(1)?);
        (0..=last).rev().find(|&number| {
            let chars = strip_comment(&self.lines[number]);
            let text: String = chars.iter().collect();
            text.split_whitespace()
                .next_back()
                .is_some_and(is_block_scalar_indicator)
        })
    }

    /// 0-based lines holding the content of the block scalar whose indicator
    /// sits on `line`.
    fn block_scalar_lines(&self, line: usize) -> Vec<usize> {
        let header = &self.lines[line];
        let header_indent = indentation(header);
        let document_level = header.starts_with(&['-', '-', '-']);

        let mut content = Vec::new();
        let mut content_indent = None;
        for (number, chars) in self.lines.iter().enumerate().skip(line + 1) {
            if chars.iter().all(|c| c.is_whitespace()) {
                content.push(number);
                continue;
            }
            let indent = indentation(chars);
            let required = *content_indent.get_or_insert(indent);
            let nested = document_level || required > header_indent;
            if !nested || indent < required {
                break;
            }
            content.push(number);
        }
        content
    }

    /// Full-line comments, in line order, skipping excluded lines.
    fn comments(&self, excluded: &HashSet<usize>) -> VecDeque<LineComment> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(number, _)| !excluded.contains(number))
            .filter_map(|(number, chars)| {
                let start = chars.iter().position(|c| !c.is_whitespace())?;
                if chars[start] != '#' {
                    return None;
                }
                let body: String = chars[start + 1..].iter().collect();
                let body = body.strip_prefix(' ').unwrap_or(body.as_str()).trim_end();
                Some(LineComment {
                    line: number + 1,
                    text: body.to_string(),
                })
            })
            .collect()
    }
}

/// `|` or `>` with optional chomping and indentation indicators.
fn is_block_scalar_indicator(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some('|' | '>'))
        && word.len() <= 3
        && chars.all(|c| c == '+' || c == '-' || c.is_ascii_digit())
}

fn indentation(chars: &[char]) -> usize {
    chars.iter().take_while(|c| **c == ' ').count()
}

/// The line up to its first comment marker.
fn strip_comment(chars: &[char]) -> Vec<char> {
    let end = chars
        .iter()
        .enumerate()
        .position(|(position, c)| {
            *c == '#' && (position == 0 || chars[position - 1].is_whitespace())
        })
        .unwrap_or(chars.len());
    chars[..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(source: &str) -> Vec<Event> {
        let mut reader = YamlEventReader::new(source);
        let mut events = Vec::new();
        loop {
            let (event, _) = reader.next_event().unwrap();
            let done = event == Event::StreamEnd;
            events.push(event);
            if done {
                return events;
            }
        }
    }

    fn anchors(source: &str) -> Vec<String> {
        read_all(source)
            .iter()
            .filter_map(|event| event.anchor().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(read_all(""), vec![Event::StreamStart, Event::StreamEnd]);
    }

    #[test]
    fn test_anchor_names_recovered() {
        assert_eq!(anchors("a: &first 1\nb: &second [x]\n"), vec!["first", "second"]);
        assert_eq!(anchors("base: &base\n  k: v\n"), vec!["base"]);
        assert_eq!(anchors("- &tagged !!str 5\n"), vec!["tagged"]);
        assert_eq!(anchors("- !!str &other 5\n"), vec!["other"]);
        assert_eq!(anchors("- &item\n  k: v\n- &next x\n"), vec!["item", "next"]);
        assert_eq!(anchors("x: !!map &m\n  k: v\n"), vec!["m"]);
    }

    #[test]
    fn test_anchor_names_across_documents() {
        assert_eq!(anchors("a: &one 1\n---\nb: &two\n  k: v\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_alias_name() {
        let events = read_all("a: &x 1\nb: *x\n");
        assert!(events.contains(&Event::Alias {
            anchor: "x".to_string()
        }));
    }

    #[test]
    fn test_flow_layout() {
        let events = read_all("a: [1, 2]\nb:\n  - 3\nc: {k: v}\n");
        let layouts: Vec<FlowStyle> = events
            .iter()
            .filter_map(|event| match event {
                Event::MappingStart { flow_style, .. } | Event::SequenceStart { flow_style, .. } => {
                    Some(*flow_style)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            layouts,
            vec![FlowStyle::Block, FlowStyle::Flow, FlowStyle::Block, FlowStyle::Flow]
        );
    }

    #[test]
    fn test_yaml_org_tags_expanded() {
        let events = read_all("a: !!str 5\n");
        let tag = events.iter().find_map(|event| match event {
            Event::Scalar { value, tag, .. } if value == "5" => tag.clone(),
            _ => None,
        });
        assert_eq!(tag.as_deref(), Some("tag:yaml.org,2002:str"));
    }

    #[test]
    fn test_marks_are_one_based() {
        let mut reader = YamlEventReader::new("a: 1\nb: 2\n");
        let mut marks = Vec::new();
        while let Ok((event, mark)) = reader.next_event() {
            if let Event::Scalar { value, .. } = &event {
                marks.push((value.clone(), mark.line(), mark.column()));
            }
        }
        assert_eq!(
            marks,
            vec![
                ("a".to_string(), 1, 1),
                ("1".to_string(), 1, 4),
                ("b".to_string(), 2, 1),
                ("2".to_string(), 2, 4),
            ]
        );
    }

    #[test]
    fn test_comments_before() {
        let mut reader = YamlEventReader::new("# one\n# two\na: 1\n  # three\nb: 2\n");
        reader.set_capture_comments(true);
        assert_eq!(
            reader.comments_before(Mark::new(0, 3, 1)),
            Some("one\ntwo".to_string())
        );
        assert_eq!(reader.comments_before(Mark::new(0, 3, 1)), None);
        assert_eq!(
            reader.comments_before(Mark::new(0, 5, 1)),
            Some("three".to_string())
        );
    }

    #[test]
    fn test_comments_dropped_when_not_captured() {
        let mut reader = YamlEventReader::new("# one\na: 1\n");
        assert_eq!(reader.comments_before(Mark::new(0, 2, 1)), None);
        reader.set_capture_comments(true);
        // Already drained
        assert_eq!(reader.comments_before(Mark::new(0, 2, 1)), None);
    }

    #[test]
    fn test_hash_lines_inside_scalars_are_not_comments() {
        let source = "a: |\n  # kept\n  text\nb: \"x\n  # also kept\"\n# real\nc: 1\n";
        let mut reader = YamlEventReader::new(source);
        reader.set_capture_comments(true);
        assert_eq!(
            reader.comments_before(Mark::new(0, 7, 1)),
            Some("real".to_string())
        );
    }

    #[test]
    fn test_literal_scalar_hash_lines() {
        let source = "script: |\n  # not a comment\n  run\nnext: 1\n";
        let mut reader = YamlEventReader::new(source);
        reader.set_capture_comments(true);
        assert_eq!(reader.comments_before(Mark::new(0, 4, 1)), None);

        let source = "a: >-\n  # folded\n\n  # still folded\n# real\nb: 2\n";
        let mut reader = YamlEventReader::new(source);
        reader.set_capture_comments(true);
        assert_eq!(
            reader.comments_before(Mark::new(0, 6, 1)),
            Some("real".to_string())
        );
    }

    #[test]
    fn test_block_scalar_indicator() {
        assert!(is_block_scalar_indicator("|"));
        assert!(is_block_scalar_indicator(">-"));
        assert!(is_block_scalar_indicator("|2+"));
        assert!(!is_block_scalar_indicator("|x"));
        assert!(!is_block_scalar_indicator("a|"));
    }

    #[test]
    fn test_unknown_anchor_after_resolved_alias() {
        let mut reader = YamlEventReader::new("a: &x 1\nb: *x\nc: *y\n");
        let mut aliases = Vec::new();
        let err = loop {
            match reader.next_event() {
                Ok((Event::Alias { anchor }, _)) => aliases.push(anchor),
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert_eq!(aliases, vec!["x"]);
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnknownAnchor("y".to_string()))
        );
    }

    #[test]
    fn test_unknown_anchor() {
        let mut reader = YamlEventReader::new("a: *missing\n");
        let err = loop {
            match reader.next_event() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnknownAnchor("missing".to_string()))
        );
    }

    #[test]
    fn test_syntax_error_after_valid_events() {
        let mut reader = YamlEventReader::new("a: 1\nb: [\n");
        let mut seen = 0;
        let err = loop {
            match reader.next_event() {
                Ok(_) => seen += 1,
                Err(err) => break err,
            }
        };
        assert!(seen > 0);
        assert!(matches!(err.kind(), Some(ParseErrorKind::Syntax(_))));
        // The failure is sticky
        assert!(reader.peek().is_err());
    }
}
