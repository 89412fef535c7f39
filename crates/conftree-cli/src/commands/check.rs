//! Check command implementation

use anyhow::Result;
use conftree_yaml::YamlConfigLoader;
use std::path::Path;

pub fn execute(file: &Path) -> Result<()> {
    let source = super::read_source(file)?;
    let documents = super::load_documents(&YamlConfigLoader::default(), file, &source)?;
    tracing::info!(file = %file.display(), documents = documents.len(), "no errors found");
    println!("{}: ok", file.display());
    Ok(())
}
