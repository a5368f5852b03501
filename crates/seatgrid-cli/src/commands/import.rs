use std::path::Path;

use anyhow::Context;
use seatgrid_state::{TermDataset, TermStore};

pub fn import(store: &TermStore, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let dataset: TermDataset = toml::from_str(&content)
        .with_context(|| format!("parsing {}", file.display()))?;

    let (courses, selections) = store.import_dataset(&dataset)?;
    println!(
        "✓ Imported term {} ({courses} courses, {selections} selections)",
        dataset.term.id
    );
    Ok(())
}
