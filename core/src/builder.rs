use crate::concurrent::ConcurrentIndex;
use crate::index::InvertedIndex;
use crate::queue::WorkQueue;
use crate::tokenizer::stem_line;
use anyhow::{bail, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Text files under `path` (or `path` itself when it is a file), sorted for
/// a stable submission order. Only `.txt` and `.text` extensions count as
/// text.
pub fn text_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|ext| ext.to_str()),
                Some("txt") | Some("text")
            )
        })
        .collect();
    files.sort();
    files
}

/// Builds the shared index from every text file under `path`, one pool task
/// per file. Each task scans its file into a private index and merges it in
/// with a single exclusive-lock acquisition; two files being processed at
/// once never see each other's partial state. Returns once the pool drains.
///
/// A file that fails to open or read is logged and skipped; only a missing
/// root path fails the build.
pub fn build(path: &Path, index: &Arc<ConcurrentIndex>, queue: &WorkQueue) -> Result<()> {
    if !path.exists() {
        bail!("build path does not exist: {}", path.display());
    }

    let files = text_files(path);
    tracing::debug!(files = files.len(), path = %path.display(), "building index");

    for file in files {
        let index = index.clone();
        queue.execute(move || {
            match index_file(&file) {
                Ok(local) => index.merge_from(local),
                Err(err) => tracing::warn!(file = %file.display(), %err, "skipping file"),
            }
        });
    }

    queue.finish();
    Ok(())
}

/// Scans one file into a private index, positions numbered from 1 across
/// the whole file.
pub fn index_file(file: &Path) -> Result<InvertedIndex> {
    let location = file.display().to_string();
    let reader = BufReader::new(File::open(file)?);

    let mut local = InvertedIndex::new();
    let mut position = 1;
    for line in reader.lines() {
        for stem in stem_line(&line?) {
            local.add(&stem, &location, position);
            position += 1;
        }
    }
    Ok(local)
}
