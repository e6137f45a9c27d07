//! Corpus mutator: append-only writes of validated blocks

use crate::corpus::Document;
use crate::error::StorageError;
use crate::extraction::Block;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Appends playground blocks to documents, at most once per document per run.
#[derive(Debug, Default)]
pub struct CorpusMutator {
    mutated: HashSet<PathBuf>,
}

impl CorpusMutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `block` to the end of the document file.
    ///
    /// The file is opened in append mode; existing bytes are never rewritten.
    /// Exactly one blank line separates the previous content from the block and
    /// the appended text ends with a newline. Returns the appended text.
    pub fn append(&mut self, document: &mut Document, block: &Block) -> Result<String, StorageError> {
        let path = document.path().to_path_buf();
        if self.mutated.contains(&path) || document.is_appended() {
            return Err(StorageError::AlreadyMutated(path));
        }

        let appended = Self::appended_text(document.content(), block);

        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::DocumentWrite {
                path: path.clone(),
                source,
            })?;
        file.write_all(appended.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| StorageError::DocumentWrite {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = appended.len(), "Appended playground block");
        info!(document = document.name(), "Document updated");

        document.record_append(&appended);
        self.mutated.insert(path);
        Ok(appended)
    }

    /// Number of documents mutated so far
    pub fn mutated_count(&self) -> usize {
        self.mutated.len()
    }

    /// Text to append after `existing` so one blank line precedes the block.
    fn appended_text(existing: &str, block: &Block) -> String {
        let trailing_newlines = existing
            .bytes()
            .rev()
            .take_while(|b| *b == b'\n')
            .count()
            .min(2);
        // An empty file needs no separator at all.
        let skip = if existing.is_empty() { 2 } else { trailing_newlines };
        let text = block.text();
        let mut appended = String::with_capacity(text.len() + 1);
        appended.push_str(&text[skip..]);
        appended.push('\n');
        appended
    }
}
