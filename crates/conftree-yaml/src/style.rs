//! Style enumerations and their mapping to event-level constants.

use crate::event::FlowStyle;
use serde::{Deserialize, Serialize};
use yaml_rust2::scanner::TScalarStyle;

/// How a scalar is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarStyle {
    /// `"hello world"`
    DoubleQuoted,
    /// `'hello world'`
    SingleQuoted,
    /// `hello world`
    Unquoted,
    /// `>` block scalar; line breaks fold to spaces.
    Folded,
    /// `|` block scalar; line breaks are kept.
    Literal,
}

impl ScalarStyle {
    pub const ALL: [ScalarStyle; 5] = [
        ScalarStyle::DoubleQuoted,
        ScalarStyle::SingleQuoted,
        ScalarStyle::Unquoted,
        ScalarStyle::Folded,
        ScalarStyle::Literal,
    ];

    /// The event-level constant for `style`; unquoted when absent.
    pub fn as_event_style(style: Option<ScalarStyle>) -> TScalarStyle {
        match style {
            None | Some(ScalarStyle::Unquoted) => TScalarStyle::Plain,
            Some(ScalarStyle::DoubleQuoted) => TScalarStyle::DoubleQuoted,
            Some(ScalarStyle::SingleQuoted) => TScalarStyle::SingleQuoted,
            Some(ScalarStyle::Folded) => TScalarStyle::Folded,
            Some(ScalarStyle::Literal) => TScalarStyle::Literal,
        }
    }

    /// The style for an event-level constant; unquoted for constants with
    /// no counterpart.
    pub fn from_event_style(style: TScalarStyle) -> ScalarStyle {
        Self::ALL
            .into_iter()
            .find(|candidate| Self::as_event_style(Some(*candidate)) == style)
            .unwrap_or(ScalarStyle::Unquoted)
    }
}

/// Layout of a collection. Absence of a style means "auto".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStyle {
    Flow,
    Block,
}

impl NodeStyle {
    pub const ALL: [NodeStyle; 2] = [NodeStyle::Flow, NodeStyle::Block];

    pub fn as_flow_style(style: Option<NodeStyle>) -> FlowStyle {
        match style {
            None => FlowStyle::Auto,
            Some(NodeStyle::Flow) => FlowStyle::Flow,
            Some(NodeStyle::Block) => FlowStyle::Block,
        }
    }

    /// The style for an event-level layout; block for `Auto`.
    pub fn from_flow_style(style: FlowStyle) -> NodeStyle {
        Self::ALL
            .into_iter()
            .find(|candidate| Self::as_flow_style(Some(*candidate)) == style)
            .unwrap_or(NodeStyle::Block)
    }
}
