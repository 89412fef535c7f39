//! Ordered catalogs of implicit tags.

use crate::tag::{NativeType, Tag};
use std::collections::HashMap;

/// An ordered list of tags used to resolve untyped scalars.
///
/// Resolution tries tags in registration order and the first whose pattern
/// matches wins, so a catch-all tag belongs at the end. The lookup indices
/// by native type and by URI also keep the first tag registered for a key.
#[derive(Debug, Clone)]
pub struct TagRepository {
    tags: Vec<Tag>,
    by_native_type: HashMap<NativeType, usize>,
    by_uri: HashMap<String, usize>,
}

impl TagRepository {
    /// Build a repository from tags in resolution order.
    pub fn of(tags: impl IntoIterator<Item = Tag>) -> Self {
        let tags: Vec<Tag> = tags.into_iter().collect();
        let mut by_native_type = HashMap::new();
        let mut by_uri = HashMap::new();
        for (position, tag) in tags.iter().enumerate() {
            by_native_type.entry(tag.native_type()).or_insert(position);
            by_uri.entry(tag.uri().to_string()).or_insert(position);
        }
        Self {
            tags,
            by_native_type,
            by_uri,
        }
    }

    /// The shared YAML 1.1 catalog.
    pub fn yaml11() -> &'static TagRepository {
        &crate::yaml11::YAML11
    }

    /// The first tag whose pattern matches the whole of `scalar`.
    pub fn for_input(&self, scalar: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.matches(scalar))
    }

    pub fn by_native_type(&self, native_type: NativeType) -> Option<&Tag> {
        self.by_native_type
            .get(&native_type)
            .map(|position| &self.tags[*position])
    }

    pub fn by_uri(&self, uri: &str) -> Option<&Tag> {
        self.by_uri.get(uri).map(|position| &self.tags[*position])
    }

    /// All tags in resolution order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl Default for TagRepository {
    fn default() -> Self {
        Self::yaml11().clone()
    }
}
