//! Corpus scanner: selects the documents of one section that still need a playground

use crate::category::ContentCategory;
use crate::corpus::Document;
use crate::error::{ApiError, StorageError};
use crate::extraction::BlockFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory under the corpus root holding one subdirectory per section
    pub pages_dir: PathBuf,
    /// Document file extension, without the dot
    pub extension: String,
    /// Files starting with this prefix are index/meta files, not lessons
    pub reserved_prefix: String,
    /// Maximum number of eligible documents returned (0 = unlimited)
    pub limit: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            pages_dir: PathBuf::from("pages"),
            extension: "mdx".to_string(),
            reserved_prefix: "_".to_string(),
            limit: 0,
        }
    }
}

/// Outcome of scanning one section
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Section directory that was scanned
    pub directory: PathBuf,
    /// Number of lesson files seen, with or without a playground
    pub total_documents: usize,
    /// Documents without a playground, in filename order, capped by the limit
    pub eligible: Vec<Document>,
    /// Lesson files that could not be read; they count towards the total
    pub unreadable: Vec<UnreadableDocument>,
}

/// A lesson file the scanner had to leave out
#[derive(Debug, Clone)]
pub struct UnreadableDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Corpus scanner
pub struct CorpusScanner {
    root: PathBuf,
    options: ScanOptions,
    format: BlockFormat,
}

impl CorpusScanner {
    pub fn new(root: PathBuf, format: BlockFormat) -> Self {
        Self {
            root,
            options: ScanOptions::default(),
            format,
        }
    }

    pub fn with_options(root: PathBuf, format: BlockFormat, options: ScanOptions) -> Self {
        Self {
            root,
            options,
            format,
        }
    }

    /// Content directory for a section
    pub fn section_dir(&self, category: ContentCategory) -> PathBuf {
        self.root
            .join(&self.options.pages_dir)
            .join(category.as_str())
    }

    /// Scan a section
    ///
    /// Lesson files are read in lexicographic filename order; documents that
    /// already carry an example are skipped before the limit is applied.
    pub fn scan(&self, category: ContentCategory) -> Result<ScanResult, ApiError> {
        let directory = self.section_dir(category);
        if !directory.is_dir() {
            return Err(ApiError::CategoryNotFound(directory));
        }

        let lesson_paths = self.lesson_paths(&directory)?;
        let total_documents = lesson_paths.len();

        let mut eligible = Vec::new();
        let mut unreadable = Vec::new();
        for path in lesson_paths {
            let document = match Document::load(&path, &self.format) {
                Ok(document) => document,
                Err(err @ StorageError::DocumentRead { .. }) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable document");
                    unreadable.push(UnreadableDocument {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if document.has_example() {
                debug!(path = %path.display(), "Skipping document with existing playground");
                continue;
            }
            eligible.push(document);
        }

        if self.options.limit > 0 {
            eligible.truncate(self.options.limit);
        }

        Ok(ScanResult {
            directory,
            total_documents,
            eligible,
            unreadable,
        })
    }

    /// Lesson files directly inside the section directory, sorted by filename
    fn lesson_paths(&self, directory: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk directory: {}", e),
                ))
            })?;

            if !entry.file_type().is_file() || !self.is_lesson_file(entry.path()) {
                continue;
            }
            paths.push(entry.into_path());
        }

        Ok(paths)
    }

    fn is_lesson_file(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .map(|ext| ext.to_string_lossy() == self.options.extension.as_str())
            .unwrap_or(false);
        let reserved = !self.options.reserved_prefix.is_empty()
            && path
                .file_name()
                .map(|name| {
                    name.to_string_lossy()
                        .starts_with(self.options.reserved_prefix.as_str())
                })
                .unwrap_or(false);
        has_extension && !reserved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pages").join("javascript");
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        temp
    }

    fn names(result: &ScanResult) -> Vec<String> {
        result.eligible.iter().map(|d| d.name().to_string()).collect()
    }

    #[test]
    fn test_scanner_orders_by_filename() {
        let temp = corpus(&[
            ("z-last.mdx", "# Z"),
            ("a-first.mdx", "# A"),
            ("m-middle.mdx", "# M"),
        ]);
        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["a-first", "m-middle", "z-last"]);
        assert_eq!(result.total_documents, 3);
    }

    #[test]
    fn test_scanner_skips_reserved_and_foreign_files() {
        let temp = corpus(&[
            ("_meta.mdx", "# Meta"),
            ("_app.mdx", "# App"),
            ("notes.txt", "# Notes"),
            ("lesson.mdx", "# Lesson"),
        ]);
        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["lesson"]);
        assert_eq!(result.total_documents, 1);
    }

    #[test]
    fn test_scanner_excludes_documents_with_examples() {
        let temp = corpus(&[
            ("a.mdx", "# A\n\n<Sandpack template=\"vanilla\" files={{}} />"),
            ("b.mdx", "# B\n\n## Интерактивный пример\n"),
            ("c.mdx", "# C"),
        ]);
        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["c"]);
        assert_eq!(result.total_documents, 3);
    }

    #[test]
    fn test_scanner_does_not_recurse() {
        let temp = corpus(&[("top.mdx", "# Top")]);
        let nested = temp.path().join("pages").join("javascript").join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.mdx"), "# Deep").unwrap();

        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["top"]);
    }

    #[test]
    fn test_scanner_limit_applies_after_filtering() {
        let temp = corpus(&[
            ("a.mdx", "# A\n<Sandpack />"),
            ("b.mdx", "# B"),
            ("c.mdx", "# C"),
            ("d.mdx", "# D"),
        ]);
        let options = ScanOptions {
            limit: 2,
            ..ScanOptions::default()
        };
        let scanner =
            CorpusScanner::with_options(temp.path().to_path_buf(), BlockFormat::default(), options);
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["b", "c"]);
    }

    #[test]
    fn test_scanner_zero_limit_is_unlimited() {
        let temp = corpus(&[("a.mdx", "# A"), ("b.mdx", "# B")]);
        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(result.eligible.len(), 2);
    }

    #[test]
    fn test_scanner_keeps_going_past_unreadable_lesson() {
        let temp = corpus(&[("a.mdx", "# A"), ("c.mdx", "# C")]);
        let dir = temp.path().join("pages").join("javascript");
        fs::write(dir.join("b.mdx"), [0xff, 0xfe]).unwrap();

        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let result = scanner.scan(ContentCategory::Javascript).unwrap();
        assert_eq!(names(&result), vec!["a", "c"]);
        assert_eq!(result.total_documents, 3);
        assert_eq!(result.unreadable.len(), 1);
        assert!(result.unreadable[0].path.ends_with("b.mdx"));
    }

    #[test]
    fn test_scanner_missing_section_is_category_not_found() {
        let temp = corpus(&[]);
        let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
        let err = scanner.scan(ContentCategory::React).unwrap_err();
        match err {
            ApiError::CategoryNotFound(path) => assert!(path.ends_with("pages/react")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
