//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to the message printed on stderr before exiting 1.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::UnknownCategory { name, available } => {
            format!("Unknown section: {}\nAvailable: {}", name, available)
        }
        ApiError::CategoryNotFound(path) => {
            format!("Section directory not found: {}", path.display())
        }
        ApiError::MissingCredential(var) => {
            format!("{} not set\nExport it or pass --dry-run to preview without calling the model", var)
        }
        other => other.to_string(),
    }
}
