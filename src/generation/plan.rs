use crate::category::ContentCategory;
use crate::corpus::Document;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Documents selected for one run, in scanner order
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub category: ContentCategory,
    /// Lesson files seen in the section directory, eligible or not
    pub total_documents: usize,
    pub documents: Vec<Document>,
    /// Lesson files that could not be read; reported as failed without any attempt
    pub unreadable: Vec<DocumentFailure>,
}

impl GenerationPlan {
    pub fn new(category: ContentCategory, total_documents: usize, documents: Vec<Document>) -> Self {
        Self {
            category,
            total_documents,
            documents,
            unreadable: Vec::new(),
        }
    }

    pub fn with_unreadable(mut self, unreadable: Vec<DocumentFailure>) -> Self {
        self.unreadable = unreadable;
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let listed = self.documents.len() + self.unreadable.len();
        if listed > self.total_documents {
            return Err(ApiError::GenerationFailed(format!(
                "Generation plan has {} documents but the section only holds {}",
                listed, self.total_documents
            )));
        }
        let mut seen = HashSet::new();
        for document in &self.documents {
            if !seen.insert(document.path()) {
                return Err(ApiError::GenerationFailed(format!(
                    "Generation plan lists {:?} more than once",
                    document.path()
                )));
            }
            if document.has_example() {
                return Err(ApiError::GenerationFailed(format!(
                    "Generation plan includes {:?}, which already has a playground",
                    document.path()
                )));
            }
        }
        Ok(())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.documents
            .iter()
            .map(|document| document.path().to_path_buf())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub name: String,
    pub attempts: u32,
    pub reason: String,
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub category: ContentCategory,
    pub provider: String,
    pub model: String,
    pub total_documents: usize,
    pub eligible: usize,
    /// Eligible documents in processing order
    pub documents: Vec<PathBuf>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<DocumentFailure>,
    pub appended: Vec<PathBuf>,
    pub cancelled: bool,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(plan: &GenerationPlan, provider: &str, model: &str) -> Self {
        Self {
            category: plan.category,
            provider: provider.to_string(),
            model: model.to_string(),
            total_documents: plan.total_documents,
            eligible: plan.documents.len(),
            documents: plan.paths(),
            succeeded: 0,
            failed: plan.unreadable.len(),
            skipped: 0,
            failures: plan.unreadable.clone(),
            appended: Vec::new(),
            cancelled: false,
            dry_run: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Report for a dry run: nothing was sent and nothing was written.
    pub fn dry_run(plan: &GenerationPlan, provider: &str, model: &str) -> Self {
        let mut report = Self::new(plan, provider, model);
        report.dry_run = true;
        report.skipped = report.eligible;
        report.finish();
        report
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}
