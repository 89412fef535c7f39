//! Error types for reading and writing YAML configuration trees.

use crate::event::{EventKind, Mark};
use conftree::NodePath;
use thiserror::Error;

/// Result type alias for conftree-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedEvent { expected: String, found: EventKind },

    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("unknown anchor '{0}'")]
    UnknownAnchor(String),

    #[error("recursive alias '{0}': the anchored node is still being built")]
    RecursiveAlias(String),

    #[error("mapping keys must be scalars, found {0}")]
    NonScalarKey(EventKind),

    #[error("{0}")]
    Syntax(String),
}

/// Failures while writing events as text.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid event sequence: {0}")]
    InvalidEvent(String),
}

/// Errors raised by the codec.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a valid document for the tree model. Fatal for the
    /// current document.
    #[error("{kind} at {mark}{}", describe_path(.path))]
    Parse {
        kind: ParseErrorKind,
        mark: Mark,
        path: Option<NodePath>,
    },

    /// Writing failed.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

fn describe_path(path: &Option<NodePath>) -> String {
    match path {
        Some(path) => format!(" (at {})", path),
        None => String::new(),
    }
}

impl Error {
    pub fn parse(kind: ParseErrorKind, mark: Mark) -> Self {
        Error::Parse {
            kind,
            mark,
            path: None,
        }
    }

    /// The parse error kind, if this is a parse error.
    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Parse { kind, .. } => Some(kind),
            Error::Emit(_) => None,
        }
    }

    /// Source position of a parse error.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Error::Parse { mark, .. } => Some(*mark),
            Error::Emit(_) => None,
        }
    }

    /// Path of the node being built when a parse error was raised.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Error::Parse { path, .. } => path.as_ref(),
            Error::Emit(_) => None,
        }
    }

    /// Attach `path` to a parse error that has none yet.
    pub fn with_path_if_missing(mut self, node_path: &NodePath) -> Self {
        if let Error::Parse { path, .. } = &mut self {
            if path.is_none() {
                *path = Some(node_path.clone());
            }
        }
        self
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Emit(EmitError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_path() {
        let path: NodePath = vec!["servers".into(), 0usize.into()].into_iter().collect();
        let err = Error::parse(ParseErrorKind::DuplicateKey("host".into()), Mark::new(20, 3, 5))
            .with_path_if_missing(&path);
        assert_eq!(
            err.to_string(),
            "duplicate key 'host' at line 3, column 5 (at servers[0])"
        );
    }

    #[test]
    fn test_existing_path_kept() {
        let inner: NodePath = vec!["a".into()].into_iter().collect();
        let err = Error::parse(ParseErrorKind::Syntax("bad".into()), Mark::default())
            .with_path_if_missing(&inner)
            .with_path_if_missing(&NodePath::root());
        assert_eq!(err.path(), Some(&inner));
    }

    #[test]
    fn test_unexpected_event_message() {
        let kind = ParseErrorKind::UnexpectedEvent {
            expected: "stream end".into(),
            found: EventKind::DocumentStart,
        };
        assert_eq!(kind.to_string(), "expected stream end, found document start");
    }
}
