//! Corpus documents

use crate::error::StorageError;
use crate::extraction::BlockFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Title used when a document has no heading
pub const FALLBACK_TITLE: &str = "lesson";

/// One lesson file
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    path: PathBuf,
    name: String,
    content: String,
    title: String,
    has_example: bool,
    #[serde(skip)]
    appended: bool,
}

impl Document {
    /// Build a document from already-loaded content.
    pub fn new(path: PathBuf, content: String, format: &BlockFormat) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let title = derive_title(&content)
            .unwrap_or(FALLBACK_TITLE)
            .to_string();
        let has_example = format.is_present_in(&content);
        Self {
            path,
            name,
            content,
            title,
            has_example,
            appended: false,
        }
    }

    /// Read a document from disk as UTF-8.
    pub fn load(path: &Path, format: &BlockFormat) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path).map_err(|source| StorageError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.to_path_buf(), content, format))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, used in progress output
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the document already carries an embedded example
    pub fn has_example(&self) -> bool {
        self.has_example
    }

    /// Whether a block was appended during this run
    pub fn is_appended(&self) -> bool {
        self.appended
    }

    /// Record an append; only the mutator calls this after a successful write.
    pub(crate) fn record_append(&mut self, appended: &str) {
        self.content.push_str(appended);
        self.has_example = true;
        self.appended = true;
    }
}

/// First markdown heading text (`^#+ (.+)$`), if any.
pub fn derive_title(content: &str) -> Option<&str> {
    content.lines().find_map(|line| {
        let rest = line.trim_start_matches('#');
        if rest.len() == line.len() {
            return None;
        }
        let text = rest.strip_prefix(' ')?;
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}
