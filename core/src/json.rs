use crate::index::InvertedIndex;
use crate::search::ResultMap;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the nested word -> location -> positions structure as pretty
/// JSON. BTreeMap iteration keeps keys sorted in the output.
pub fn write_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    write_pretty(path, index.entries())
}

/// Writes location -> word count as pretty JSON.
pub fn write_counts(counts: &BTreeMap<String, usize>, path: &Path) -> Result<()> {
    write_pretty(path, counts)
}

/// Writes the search-result collection as pretty JSON, one array of
/// `{where, count, score}` objects per normalized query.
pub fn write_results(results: &ResultMap, path: &Path) -> Result<()> {
    write_pretty(path, results)
}

fn write_pretty<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
