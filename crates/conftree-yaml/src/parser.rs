//! Builds configuration trees from an event stream.

use crate::error::{Error, ParseErrorKind, Result};
use crate::event::{Event, EventKind, EventSource, FlowStyle, Mark};
use crate::hints::{ANCHOR_ID, NODE_STYLE, SCALAR_STYLE};
use crate::style::{NodeStyle, ScalarStyle};
use conftree::{ConfigNode, NodePath};
use std::collections::HashMap;
use std::iter::FusedIterator;

/// Whether comments found before a value are attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comments {
    Capture,
    Suppress,
}

/// An anchor declared in the current document.
enum Anchor {
    /// The anchored node is still being built.
    Open,
    /// Snapshot of the anchored node at completion.
    Bound(ConfigNode),
}

/// State that lives for one document.
#[derive(Default)]
struct DocumentState {
    /// Latest declaration of each anchor name, with its declaration number.
    anchors: HashMap<String, (usize, Anchor)>,
    declarations: usize,
    path: NodePath,
}

impl DocumentState {
    fn open(&mut self, name: &str) -> usize {
        self.declarations += 1;
        self.anchors
            .insert(name.to_string(), (self.declarations, Anchor::Open));
        self.declarations
    }

    /// Bind the snapshot unless the name was declared again meanwhile.
    fn bind(&mut self, name: &str, declaration: usize, node: &ConfigNode) {
        if let Some(entry) = self.anchors.get_mut(name) {
            if entry.0 == declaration {
                entry.1 = Anchor::Bound(node.clone());
            }
        }
    }
}

/// A recursive-descent tree builder over an [`EventSource`].
///
/// Values are read into caller-supplied nodes. Per-node metadata is kept as
/// hints: the anchor a node was declared with ([`ANCHOR_ID`]), the quoting
/// of scalars ([`SCALAR_STYLE`]) and the layout of collections
/// ([`NODE_STYLE`]). Comment lines are attached to the node that follows
/// them when the target node supports comments.
///
/// Aliases are resolved to independent copies of the anchored node. The
/// first error aborts the document.
pub struct YamlParser<S> {
    source: S,
}

impl<S: EventSource> YamlParser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Read a stream holding at most one document into `node`.
    ///
    /// An empty stream leaves `node` untouched.
    pub fn single_document_stream(&mut self, node: &mut ConfigNode) -> Result<()> {
        self.expect(EventKind::StreamStart)?;
        if self.source.peek()?.kind() == EventKind::StreamEnd {
            self.source.next_event()?;
            return Ok(());
        }
        self.document(node)?;
        self.expect(EventKind::StreamEnd)?;
        Ok(())
    }

    /// Read every document of the stream lazily, one node per document.
    ///
    /// The stream start is checked immediately. The iterator ends at the end
    /// of the stream, or right after yielding the first error.
    pub fn stream<F>(mut self, factory: F) -> Result<Documents<S, F>>
    where
        F: FnMut() -> ConfigNode,
    {
        self.expect(EventKind::StreamStart)?;
        Ok(Documents {
            parser: self,
            factory,
            finished: false,
        })
    }

    /// Read one document into `node`.
    pub fn document(&mut self, node: &mut ConfigNode) -> Result<()> {
        let (_, start) = self.expect(EventKind::DocumentStart)?;
        tracing::debug!(mark = %start, "reading document");
        self.source.set_capture_comments(node.supports_comments());

        let mut state = DocumentState::default();
        let result = self
            .value(node, None, &mut state, Comments::Capture)
            .and_then(|()| self.expect(EventKind::DocumentEnd));
        drop(state);

        let (_, end) = result.map_err(|err| err.with_path_if_missing(&NodePath::root()))?;
        if let Some(trailing) = self.source.comments_before(end) {
            tracing::debug!(comment = %trailing, "dropping comment after last node");
        }
        Ok(())
    }

    fn expect(&mut self, kind: EventKind) -> Result<(Event, Mark)> {
        let (event, mark) = self.source.next_event()?;
        if event.kind() != kind {
            return Err(unexpected(kind.to_string(), &event, mark));
        }
        Ok((event, mark))
    }

    /// Read any node into `node`.
    ///
    /// `entry` is the position of the mapping key owning this value, if any.
    /// A block collection's first event sits on its first entry, so the
    /// comments meant for the collection itself are those before `entry`.
    fn value(
        &mut self,
        node: &mut ConfigNode,
        entry: Option<Mark>,
        state: &mut DocumentState,
        comments: Comments,
    ) -> Result<()> {
        let mark = self.source.mark()?;
        let (kind, anchor, layout) = {
            let event = self.source.peek()?;
            let layout = match event {
                Event::MappingStart { flow_style, .. } | Event::SequenceStart { flow_style, .. } => {
                    Some(*flow_style)
                }
                _ => None,
            };
            (event.kind(), event.anchor().map(str::to_string), layout)
        };

        if comments == Comments::Capture {
            let before = match layout {
                Some(FlowStyle::Block) => entry,
                _ => Some(mark),
            };
            if let Some(text) = before.and_then(|before| self.source.comments_before(before)) {
                node.set_comment(text);
            }
        }

        let declaration = anchor.as_deref().map(|name| {
            node.set_hint(&ANCHOR_ID, name.to_string());
            state.open(name)
        });
        if let Some(layout) = layout {
            node.set_hint(&NODE_STYLE, NodeStyle::from_flow_style(layout));
        }

        let result = match kind {
            EventKind::Scalar => self.scalar(node),
            EventKind::MappingStart => self.mapping(node, state),
            EventKind::SequenceStart => self.sequence(node, state),
            EventKind::Alias => self.alias(node, state),
            EventKind::StreamStart
            | EventKind::StreamEnd
            | EventKind::DocumentStart
            | EventKind::DocumentEnd
            | EventKind::MappingEnd
            | EventKind::SequenceEnd
            | EventKind::Comment => Err(Error::parse(
                ParseErrorKind::UnexpectedEvent {
                    expected: "a node".to_string(),
                    found: kind,
                },
                mark,
            )),
        };
        result.map_err(|err| err.with_path_if_missing(&state.path))?;

        if let (Some(name), Some(declaration)) = (anchor, declaration) {
            tracing::trace!(anchor = %name, path = %state.path, "bound anchor");
            state.bind(&name, declaration, node);
        }
        Ok(())
    }

    fn scalar(&mut self, node: &mut ConfigNode) -> Result<()> {
        match self.source.next_event()? {
            (Event::Scalar { value, style, .. }, _) => {
                node.set_hint(&SCALAR_STYLE, ScalarStyle::from_event_style(style));
                node.set_scalar(value);
                Ok(())
            }
            (other, mark) => Err(unexpected("scalar", &other, mark)),
        }
    }

    fn mapping(&mut self, node: &mut ConfigNode, state: &mut DocumentState) -> Result<()> {
        self.expect(EventKind::MappingStart)?;
        node.set_empty_map();

        while self.source.peek()?.kind() != EventKind::MappingEnd {
            let key_mark = self.source.mark()?;
            let key_kind = self.source.peek()?.kind();
            if matches!(key_kind, EventKind::MappingStart | EventKind::SequenceStart) {
                return Err(non_scalar_key(key_kind, key_mark, &state.path));
            }

            let mut key_node = ConfigNode::root_with(node.options());
            self.value(&mut key_node, None, state, Comments::Suppress)?;
            let key = match key_node.as_str() {
                Some(key) => key.to_string(),
                None => return Err(non_scalar_key(key_kind, key_mark, &state.path)),
            };

            if node.has_child(&key) {
                return Err(Error::Parse {
                    kind: ParseErrorKind::DuplicateKey(key),
                    mark: key_mark,
                    path: Some(state.path.clone()),
                });
            }

            state.path.push(key.as_str());
            self.value(node.child_mut(&key), Some(key_mark), state, Comments::Capture)?;
            state.path.pop();
        }

        self.expect(EventKind::MappingEnd)?;
        Ok(())
    }

    fn sequence(&mut self, node: &mut ConfigNode, state: &mut DocumentState) -> Result<()> {
        self.expect(EventKind::SequenceStart)?;
        node.set_empty_list();

        while self.source.peek()?.kind() != EventKind::SequenceEnd {
            state.path.push(node.len());
            self.value(node.append_list_node(), None, state, Comments::Capture)?;
            state.path.pop();
        }

        self.expect(EventKind::SequenceEnd)?;
        Ok(())
    }

    fn alias(&mut self, node: &mut ConfigNode, state: &mut DocumentState) -> Result<()> {
        let (name, mark) = match self.source.next_event()? {
            (Event::Alias { anchor }, mark) => (anchor, mark),
            (other, mark) => return Err(unexpected("alias", &other, mark)),
        };

        let target = match state.anchors.get(&name) {
            None => return Err(Error::parse(ParseErrorKind::UnknownAnchor(name), mark)),
            Some((_, Anchor::Open)) => {
                return Err(Error::parse(ParseErrorKind::RecursiveAlias(name), mark));
            }
            Some((_, Anchor::Bound(target))) => target,
        };

        tracing::trace!(anchor = %name, path = %state.path, "resolved alias");
        node.copy_from(target);
        node.for_each_node_mut(&mut |copied| {
            copied.remove_hint(&ANCHOR_ID);
        });
        Ok(())
    }
}

fn unexpected(expected: impl Into<String>, found: &Event, mark: Mark) -> Error {
    Error::parse(
        ParseErrorKind::UnexpectedEvent {
            expected: expected.into(),
            found: found.kind(),
        },
        mark,
    )
}

fn non_scalar_key(kind: EventKind, mark: Mark, path: &NodePath) -> Error {
    Error::Parse {
        kind: ParseErrorKind::NonScalarKey(kind),
        mark,
        path: Some(path.clone()),
    }
}

/// Lazy iterator over the documents of a stream.
///
/// Created by [`YamlParser::stream`].
pub struct Documents<S, F> {
    parser: YamlParser<S>,
    factory: F,
    finished: bool,
}

impl<S, F> Iterator for Documents<S, F>
where
    S: EventSource,
    F: FnMut() -> ConfigNode,
{
    type Item = Result<ConfigNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.parser.source.peek().map(Event::kind) {
            Ok(EventKind::StreamEnd) => {
                self.finished = true;
                return None;
            }
            Ok(_) => {}
            Err(err) => {
                self.finished = true;
                return Some(Err(err));
            }
        }

        let mut node = (self.factory)();
        match self.parser.document(&mut node) {
            Ok(()) => Some(Ok(node)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<S, F> FusedIterator for Documents<S, F>
where
    S: EventSource,
    F: FnMut() -> ConfigNode,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::YamlEventReader;
    use std::collections::VecDeque;

    fn parse(source: &str) -> Result<ConfigNode> {
        let mut node = ConfigNode::root();
        YamlParser::new(YamlEventReader::new(source)).single_document_stream(&mut node)?;
        Ok(node)
    }

    fn text<'a>(node: &'a ConfigNode, key: &str) -> Option<&'a str> {
        node.get(key).and_then(ConfigNode::as_str)
    }

    /// Replays a fixed list of events.
    struct Replay(VecDeque<Event>);

    impl EventSource for Replay {
        fn peek(&mut self) -> Result<&Event> {
            match self.0.front() {
                Some(event) => Ok(event),
                None => Err(Error::parse(
                    ParseErrorKind::Syntax("end".into()),
                    Mark::default(),
                )),
            }
        }

        fn mark(&mut self) -> Result<Mark> {
            Ok(Mark::default())
        }

        fn next_event(&mut self) -> Result<(Event, Mark)> {
            self.peek()?;
            Ok((self.0.pop_front().unwrap(), Mark::default()))
        }

        fn set_capture_comments(&mut self, _: bool) {}

        fn comments_before(&mut self, _: Mark) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_nested_values() {
        let root = parse("name: demo\nports: [80, 443]\nowner:\n  id: 7\n").unwrap();
        assert_eq!(text(&root, "name"), Some("demo"));
        assert_eq!(root.get("ports").map(ConfigNode::len), Some(2));
        assert_eq!(
            root.get("owner").and_then(|owner| text(owner, "id")),
            Some("7")
        );
    }

    #[test]
    fn test_empty_stream_leaves_node_virtual() {
        let root = parse("").unwrap();
        assert!(root.is_virtual());
    }

    #[test]
    fn test_duplicate_key() {
        let err = parse("{a: 1, a: 2}").unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::DuplicateKey("a".to_string()))
        );
        assert!(err.to_string().contains("duplicate key 'a'"));
    }

    #[test]
    fn test_duplicate_key_path() {
        let err = parse("outer:\n  inner: 1\n  inner: 2\n").unwrap_err();
        assert_eq!(err.path().map(ToString::to_string), Some("outer".to_string()));
        assert_eq!(err.mark().map(|mark| mark.line()), Some(3));
    }

    #[test]
    fn test_non_scalar_key() {
        let err = parse("? [a, b]\n: value\n").unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::NonScalarKey(EventKind::SequenceStart))
        );
    }

    #[test]
    fn test_recursive_alias() {
        let err = parse("&x [1, *x]").unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::RecursiveAlias("x".to_string()))
        );
        assert_eq!(err.path().map(ToString::to_string), Some("[1]".to_string()));
    }

    #[test]
    fn test_alias_copies_are_independent() {
        let mut root = parse("base: &b {k: v}\ncopy: *b\n").unwrap();
        assert_eq!(root.get("base"), root.get("copy"));
        assert_eq!(
            root.get("base").and_then(|n| n.hint(&ANCHOR_ID)),
            Some("b".to_string())
        );
        assert!(root.get("copy").and_then(|n| n.hint(&ANCHOR_ID)).is_none());

        root.child_mut("copy").child_mut("k").set_scalar("changed");
        assert_eq!(
            root.get("base").and_then(|base| text(base, "k")),
            Some("v")
        );
    }

    #[test]
    fn test_alias_strips_nested_anchors() {
        let root = parse("base: &b\n  inner: &i [1]\ncopy: *b\n").unwrap();
        let inner = root.get("copy").and_then(|copy| copy.get("inner"));
        assert!(inner.is_some_and(|inner| inner.hint(&ANCHOR_ID).is_none()));
    }

    #[test]
    fn test_redefined_anchor_uses_latest() {
        let root = parse("a: &x 1\nb: &x 2\nc: *x\n").unwrap();
        assert_eq!(text(&root, "c"), Some("2"));
    }

    #[test]
    fn test_inner_redefinition_is_complete() {
        let root = parse("- &x [1, &x 2, *x]\n").unwrap();
        let inner = root.get(0usize).and_then(|list| list.get(2usize));
        assert_eq!(inner.and_then(ConfigNode::as_str), Some("2"));
    }

    #[test]
    fn test_style_hints() {
        let root = parse("a: 'one'\nb: [x]\nc:\n  - y\n").unwrap();
        assert_eq!(
            root.get("a").and_then(|n| n.hint(&SCALAR_STYLE)),
            Some(ScalarStyle::SingleQuoted)
        );
        assert_eq!(
            root.get("b").and_then(|n| n.hint(&NODE_STYLE)),
            Some(NodeStyle::Flow)
        );
        assert_eq!(
            root.get("c").and_then(|n| n.hint(&NODE_STYLE)),
            Some(NodeStyle::Block)
        );
    }

    #[test]
    fn test_comment_goes_to_value_not_previous_sibling() {
        let root = parse("a: 1\n# about b\nb: 2\n").unwrap();
        assert!(root.get("a").and_then(ConfigNode::comment).is_none());
        assert_eq!(
            root.get("b").and_then(ConfigNode::comment),
            Some("about b")
        );
    }

    #[test]
    fn test_comment_inside_block_mapping_goes_to_first_entry() {
        let root = parse("test:\n  # meow\n  cat: purrs\n").unwrap();
        let test = root.get("test").unwrap();
        assert!(test.comment().is_none());
        assert_eq!(test.get("cat").and_then(ConfigNode::comment), Some("meow"));
    }

    #[test]
    fn test_comment_before_block_collection_entry() {
        let root = parse("# lead\nservers:\n  - a\n").unwrap();
        assert_eq!(
            root.get("servers").and_then(ConfigNode::comment),
            Some("lead")
        );
    }

    #[test]
    fn test_comments_ignored_without_support() {
        let mut node = ConfigNode::root_with(conftree::NodeOptions::new().with_comments(false));
        YamlParser::new(YamlEventReader::new("# c\na: 1\n"))
            .single_document_stream(&mut node)
            .unwrap();
        assert!(node.get("a").and_then(ConfigNode::comment).is_none());
    }

    #[test]
    fn test_multiple_documents_rejected_by_single_stream() {
        let err = parse("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(matches!(
            err.kind(),
            Some(ParseErrorKind::UnexpectedEvent {
                found: EventKind::DocumentStart,
                ..
            })
        ));
    }

    #[test]
    fn test_stream_is_lazy_and_stops_after_error() {
        let source = YamlEventReader::new("a: 1\n---\n{b: 1, b: 2}\n---\nc: 3\n");
        let mut documents = YamlParser::new(source).stream(ConfigNode::root).unwrap();

        let first = documents.next().unwrap().unwrap();
        assert_eq!(text(&first, "a"), Some("1"));
        assert!(documents.next().unwrap().is_err());
        assert!(documents.next().is_none());
    }

    #[test]
    fn test_stream_of_documents() {
        let source = YamlEventReader::new("--- 1\n--- 2\n--- 3\n");
        let values: Vec<String> = YamlParser::new(source)
            .stream(ConfigNode::root)
            .unwrap()
            .map(|doc| doc.unwrap().as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unexpected_event_in_value_position() {
        let events = VecDeque::from(vec![
            Event::StreamStart,
            Event::DocumentStart,
            Event::Comment("stray".into()),
        ]);
        let mut node = ConfigNode::root();
        let err = YamlParser::new(Replay(events))
            .single_document_stream(&mut node)
            .unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&ParseErrorKind::UnexpectedEvent {
                expected: "a node".into(),
                found: EventKind::Comment,
            })
        );
        assert_eq!(err.path(), Some(&NodePath::root()));
    }
}
