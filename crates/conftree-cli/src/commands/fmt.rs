//! Fmt command implementation

use crate::StyleArg;
use anyhow::{Context, Result, bail};
use conftree::ConfigNode;
use conftree_yaml::{NODE_STYLE, NodeStyle, YamlConfigLoader};
use std::path::PathBuf;

pub struct FmtArgs {
    pub file: PathBuf,
    pub indent: usize,
    pub style: Option<StyleArg>,
    pub check: bool,
    pub write: bool,
}

pub fn execute(args: &FmtArgs) -> Result<()> {
    let source = super::read_source(&args.file)?;
    let formatted = format_source(&args.file, &source, args.indent, args.style)?;

    if args.check {
        if formatted != source {
            bail!("{} is not formatted", args.file.display());
        }
        tracing::info!(file = %args.file.display(), "already formatted");
        return Ok(());
    }

    if args.write {
        if formatted != source {
            std::fs::write(&args.file, &formatted)
                .with_context(|| format!("Failed to write {}", args.file.display()))?;
            tracing::info!(file = %args.file.display(), "formatted");
        }
        return Ok(());
    }

    print!("{}", formatted);
    Ok(())
}

/// Reformat every document of `source`.
///
/// With a style, layout hints read from the input are dropped so every
/// collection uses that style.
pub fn format_source(
    file: &std::path::Path,
    source: &str,
    indent: usize,
    style: Option<StyleArg>,
) -> Result<String> {
    let node_style = match style {
        Some(StyleArg::Flow) => Some(NodeStyle::Flow),
        Some(StyleArg::Block) => Some(NodeStyle::Block),
        Some(StyleArg::Auto) | None => None,
    };
    let loader = YamlConfigLoader::builder()
        .indent(indent)
        .node_style(node_style)
        .build();

    let mut documents = super::load_documents(&loader, file, source)?;
    if style.is_some() {
        for document in &mut documents {
            clear_layout(document);
        }
    }

    let mut out = String::new();
    for (position, document) in documents.iter().enumerate() {
        if position > 0 {
            out.push_str("---\n");
        }
        out.push_str(&loader.save_to_string(document)?);
    }
    Ok(out)
}

fn clear_layout(node: &mut ConfigNode) {
    node.for_each_node_mut(&mut |node| {
        node.remove_hint(&NODE_STYLE);
    });
}
