//! Tags: type classifications for scalar text.

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// The native type a tag resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Null,
    Bool,
    Int,
    Float,
    Timestamp,
    Str,
}

/// Errors building a [`Tag`].
#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag has no URI")]
    MissingUri,

    #[error("tag '{0}' has no native type")]
    MissingNativeType(String),

    #[error("tag '{0}' has no target pattern")]
    MissingPattern(String),

    #[error("tag '{uri}' has an invalid target pattern: {source}")]
    InvalidPattern {
        uri: String,
        #[source]
        source: regex::Error,
    },
}

/// A tag: canonical URI, native type and the pattern of scalar text it
/// matches implicitly.
///
/// The pattern always matches the whole scalar.
#[derive(Debug, Clone)]
pub struct Tag {
    uri: String,
    native_type: NativeType,
    pattern: Regex,
}

impl Tag {
    pub fn builder() -> TagBuilder {
        TagBuilder::default()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    /// The anchored target pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Whether `text` is implicitly of this tag.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Whether the URI uses the `tag:` scheme.
    pub fn global(&self) -> bool {
        self.uri
            .split_once(':')
            .is_some_and(|(scheme, _)| scheme == "tag")
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.native_type == other.native_type
            && self.pattern.as_str() == other.pattern.as_str()
    }
}

impl Eq for Tag {}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Builder for [`Tag`].
#[derive(Debug, Default)]
pub struct TagBuilder {
    uri: Option<String>,
    native_type: Option<NativeType>,
    pattern: Option<String>,
}

impl TagBuilder {
    /// Set the URI. A leading `!` is stripped.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.uri = Some(match uri.strip_prefix('!') {
            Some(stripped) => stripped.to_string(),
            None => uri,
        });
        self
    }

    pub fn native_type(mut self, native_type: NativeType) -> Self {
        self.native_type = Some(native_type);
        self
    }

    /// Set the target pattern. It is matched against the whole scalar.
    pub fn target_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn build(self) -> Result<Tag, TagError> {
        let uri = self.uri.ok_or(TagError::MissingUri)?;
        let native_type = self
            .native_type
            .ok_or_else(|| TagError::MissingNativeType(uri.clone()))?;
        let pattern = self
            .pattern
            .ok_or_else(|| TagError::MissingPattern(uri.clone()))?;
        let pattern = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            TagError::InvalidPattern {
                uri: uri.clone(),
                source,
            }
        })?;
        Ok(Tag {
            uri,
            native_type,
            pattern,
        })
    }
}
