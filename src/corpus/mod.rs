//! Lesson corpus
//!
//! Documents live under `<root>/<pages_dir>/<section>/` as flat text files. The
//! scanner selects the ones without a playground; the mutator appends validated
//! blocks to them. Nothing else in a document is ever rewritten.

pub mod document;
pub mod mutator;
pub mod scanner;

pub use document::Document;
pub use mutator::CorpusMutator;
pub use scanner::{CorpusScanner, ScanOptions, ScanResult, UnreadableDocument};
