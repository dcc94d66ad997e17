//! Mapping cache commands: list, set, export, import, clear.

use anyhow::{Context, Result};
use catlens_core::background::Background;
use catlens_core::cache::{ImportMode, MappingCache};
use std::path::Path;

pub fn run_mappings_list(bg: &Background) -> Result<()> {
    let mappings = bg.get_state()?.mappings;
    if mappings.is_empty() {
        println!("No mappings cached.");
        return Ok(());
    }
    for (id, label) in mappings.iter() {
        println!("{:<24} {}", id, label);
    }
    Ok(())
}

/// Replace the cache with the object in `file`.
pub fn run_mappings_set(bg: &Background, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("read mappings: {}", file.display()))?;
    let mappings = MappingCache::parse_import(&json)?;
    bg.set_mappings(&mappings)?;
    println!("Stored {} mapping(s).", mappings.len());
    Ok(())
}

pub fn run_export(bg: &Background, file: Option<&Path>) -> Result<()> {
    let json = bg.export_mappings()?;
    match file {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("write export: {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn run_import(bg: &Background, file: &Path, overwrite: bool) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("read import: {}", file.display()))?;
    let mode = if overwrite {
        ImportMode::Overwrite
    } else {
        ImportMode::Merge
    };
    let total = bg.import_mappings(&json, mode)?;
    println!("Imported; {} mapping(s) cached.", total);
    Ok(())
}

pub fn run_clear(bg: &Background) -> Result<()> {
    bg.clear_mappings()?;
    println!("Mappings cleared.");
    Ok(())
}
