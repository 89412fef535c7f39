//! The standard YAML 1.1 implicit tag catalog.
//!
//! Merge keys and binary scalars are not resolved.

use crate::repository::TagRepository;
use crate::tag::{NativeType, Tag};
use once_cell::sync::Lazy;

/// URI prefix of the YAML core tags.
pub const YAML_ORG_PREFIX: &str = "tag:yaml.org,2002:";

pub const NULL: &str = "tag:yaml.org,2002:null";
pub const BOOL: &str = "tag:yaml.org,2002:bool";
pub const INT: &str = "tag:yaml.org,2002:int";
pub const FLOAT: &str = "tag:yaml.org,2002:float";
pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
pub const STR: &str = "tag:yaml.org,2002:str";

const NULL_PATTERN: &str = "~|null|Null|NULL|";

const BOOL_PATTERN: &str = concat!(
    "y|Y|yes|Yes|YES|n|N|no|No|NO",
    "|true|True|TRUE|false|False|FALSE",
    "|on|On|ON|off|Off|OFF",
);

const INT_PATTERN: &str = concat!(
    "[-+]?0b[0-1_]+",                   // base 2
    "|[-+]?0[0-7_]+",                   // base 8
    "|[-+]?(0|[1-9][0-9_]*)",           // base 10
    "|[-+]?0x[0-9a-fA-F_]+",            // base 16
    "|[-+]?[1-9][0-9_]*(:[0-5]?[0-9])+", // base 60
);

const FLOAT_PATTERN: &str = concat!(
    r"[-+]?([0-9][0-9_]*)?\.[0-9.]*([eE][-+][0-9]+)?",
    r"|[-+]?[0-9][0-9_]*(:[0-5]?[0-9])+\.[0-9]*",
    r"|[-+]?\.(inf|Inf|INF)",
    r"|\.(nan|NaN|NAN)",
);

const TIMESTAMP_PATTERN: &str = concat!(
    "[0-9]{4}-[0-9]{2}-[0-9]{2}",
    "|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
    r"([Tt]|[ \t]+)[0-9]{1,2}:[0-9]{1,2}:[0-9]{2}",
    r"(\.[0-9]*)?",
    r"(([ \t]*)Z|[-+][0-9]{1,2}(:[0-9]{2})?)?",
);

const STR_PATTERN: &str = ".+";

/// The catalog, in resolution order. The catch-all string tag is last.
///
/// # Panics
///
/// Panics on first use if one of the built-in patterns does not compile,
/// which would be a bug in this module.
pub(crate) static YAML11: Lazy<TagRepository> = Lazy::new(|| {
    let definitions = [
        (NULL, NativeType::Null, NULL_PATTERN),
        (BOOL, NativeType::Bool, BOOL_PATTERN),
        (INT, NativeType::Int, INT_PATTERN),
        (FLOAT, NativeType::Float, FLOAT_PATTERN),
        (TIMESTAMP, NativeType::Timestamp, TIMESTAMP_PATTERN),
        (STR, NativeType::Str, STR_PATTERN),
    ];
    TagRepository::of(definitions.into_iter().map(|(uri, native_type, pattern)| {
        Tag::builder()
            .uri(uri)
            .native_type(native_type)
            .target_pattern(pattern)
            .build()
            .expect("Invalid YAML 1.1 tag pattern - this is a bug in conftree-yaml")
    }))
});

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> Option<NativeType> {
        TagRepository::yaml11().for_input(text).map(Tag::native_type)
    }

    #[test]
    fn test_core_scalars() {
        assert_eq!(resolve("true"), Some(NativeType::Bool));
        assert_eq!(resolve("42"), Some(NativeType::Int));
        assert_eq!(resolve("3.14"), Some(NativeType::Float));
        assert_eq!(resolve(""), Some(NativeType::Null));
        assert_eq!(resolve("hello"), Some(NativeType::Str));
    }

    #[test]
    fn test_yaml11_specifics() {
        assert_eq!(resolve("~"), Some(NativeType::Null));
        assert_eq!(resolve("NULL"), Some(NativeType::Null));
        assert_eq!(resolve("off"), Some(NativeType::Bool));
        assert_eq!(resolve("0x1F"), Some(NativeType::Int));
        assert_eq!(resolve("0b101"), Some(NativeType::Int));
        assert_eq!(resolve("017"), Some(NativeType::Int));
        assert_eq!(resolve("1:30"), Some(NativeType::Int));
        assert_eq!(resolve("-.inf"), Some(NativeType::Float));
        assert_eq!(resolve(".NaN"), Some(NativeType::Float));
        assert_eq!(resolve("1.5e+3"), Some(NativeType::Float));
        assert_eq!(resolve("2024-01-15"), Some(NativeType::Timestamp));
        assert_eq!(
            resolve("2001-12-14t21:59:43.10-05:00"),
            Some(NativeType::Timestamp)
        );
        assert_eq!(resolve("nullable"), Some(NativeType::Str));
        assert_eq!(resolve("yes please"), Some(NativeType::Str));
    }

    #[test]
    fn test_catalog_order_and_uris() {
        let repository = TagRepository::yaml11();
        let uris: Vec<&str> = repository.tags().iter().map(Tag::uri).collect();
        assert_eq!(uris, vec![NULL, BOOL, INT, FLOAT, TIMESTAMP, STR]);
        assert!(repository.tags().iter().all(Tag::global));
        assert_eq!(repository.by_uri(STR).map(Tag::native_type), Some(NativeType::Str));
    }
}
