//! Command implementations

pub mod check;
pub mod fmt;
pub mod tags;

use anyhow::{Context, Result};
use conftree::ConfigNode;
use conftree_yaml::YamlConfigLoader;
use std::path::Path;

pub(crate) fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Load every document of `source`, rendering the first error against it.
pub(crate) fn load_documents(
    loader: &YamlConfigLoader,
    file: &Path,
    source: &str,
) -> Result<Vec<ConfigNode>> {
    let name = file.display().to_string();
    let documents = loader
        .load_all(source)
        .and_then(|documents| documents.collect::<conftree_yaml::Result<Vec<_>>>());
    documents.map_err(|err| {
        eprint!("{}", err.render(&name, source));
        anyhow::anyhow!("{}: {}", name, err)
    })
}
