//! Representation hints the YAML codec reads and writes.

use crate::style::{NodeStyle, ScalarStyle};
use conftree::RepresentationHint;

/// Anchor declared on a node.
pub const ANCHOR_ID: RepresentationHint<String> = RepresentationHint::of("anchor-id");

/// Quoting a scalar was read with, and should be written with.
pub const SCALAR_STYLE: RepresentationHint<ScalarStyle> = RepresentationHint::of("scalar-style");

/// Layout of a collection. Absent means auto.
pub const NODE_STYLE: RepresentationHint<NodeStyle> = RepresentationHint::of("node-style");
