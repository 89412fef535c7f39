//! Rejected documents and what their errors report.

use conftree::NodePath;
use conftree_yaml::{Error, EventKind, ParseErrorKind, YamlConfigLoader};

fn load_error(text: &str) -> Error {
    match YamlConfigLoader::default().load(text) {
        Ok(node) => panic!("expected an error, loaded {:?}", node),
        Err(err) => err,
    }
}

#[test]
fn test_duplicate_key_in_flow_mapping() {
    let err = load_error("{a: 1, a: 2}");
    assert_eq!(err.kind(), Some(&ParseErrorKind::DuplicateKey("a".to_string())));
    assert_eq!(err.path(), Some(&NodePath::root()));
    assert_eq!(err.mark().map(|mark| (mark.line(), mark.column())), Some((1, 8)));
}

#[test]
fn test_duplicate_key_reports_mapping_path() {
    let err = load_error("server:\n  port: 1\n  port: 2\n");
    assert_eq!(
        err.kind(),
        Some(&ParseErrorKind::DuplicateKey("port".to_string()))
    );
    assert_eq!(err.path().map(|path| path.to_string()), Some("server".to_string()));
    assert_eq!(err.mark().map(|mark| mark.line()), Some(3));
    assert_eq!(
        err.to_string(),
        "duplicate key 'port' at line 3, column 3 (at server)"
    );
}

#[test]
fn test_unknown_anchor() {
    let err = load_error("a: *missing\n");
    assert_eq!(
        err.kind(),
        Some(&ParseErrorKind::UnknownAnchor("missing".to_string()))
    );
}

#[test]
fn test_self_reference_is_rejected() {
    let err = load_error("&x [1, *x]\n");
    assert_eq!(
        err.kind(),
        Some(&ParseErrorKind::RecursiveAlias("x".to_string()))
    );
    assert_eq!(err.path().map(|path| path.to_string()), Some("[1]".to_string()));
}

#[test]
fn test_ancestor_reference_is_rejected() {
    let err = load_error("top: &t\n  child:\n    back: *t\n");
    assert_eq!(
        err.kind(),
        Some(&ParseErrorKind::RecursiveAlias("t".to_string()))
    );
    assert_eq!(
        err.path().map(|path| path.to_string()),
        Some("top.child.back".to_string())
    );
}

#[test]
fn test_collection_keys_are_rejected() {
    let err = load_error("? [a, b]\n: value\n");
    assert_eq!(
        err.kind(),
        Some(&ParseErrorKind::NonScalarKey(EventKind::SequenceStart))
    );
}

#[test]
fn test_alias_to_collection_as_key_is_rejected() {
    let err = load_error("a: &m {k: v}\n? *m\n: value\n");
    assert!(matches!(err.kind(), Some(ParseErrorKind::NonScalarKey(_))));
}

#[test]
fn test_syntax_error() {
    let err = load_error("a: [1, 2\n");
    assert!(matches!(err.kind(), Some(ParseErrorKind::Syntax(_))));
    assert!(err.mark().is_some());
}

#[test]
fn test_single_document_rejects_second_document() {
    let err = load_error("a: 1\n---\nb: 2\n");
    assert!(matches!(
        err.kind(),
        Some(ParseErrorKind::UnexpectedEvent {
            found: EventKind::DocumentStart,
            ..
        })
    ));
}

#[test]
fn test_render_points_at_source() {
    let source = "name: a\nname: b\n";
    let err = load_error(source);
    let rendered = err.render("settings.yml", source);
    assert!(rendered.contains("duplicate key 'name'"));
    assert!(rendered.contains("settings.yml"));
    assert!(rendered.contains("name: b"));
}
