//! Pipeline executor: runs a generation plan document by document.
//! Owns pacing, cancellation and corpus mutation; the orchestrator owns retries.

use crate::category::ContentCategory;
use crate::corpus::{CorpusMutator, Document};
use crate::error::ApiError;
use crate::generation::orchestrator::{RetryOrchestrator, RetryRun, RetryState};
use crate::generation::plan::{DocumentFailure, GenerationPlan, RunReport};
use crate::provider::ModelProviderClient;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Progress events emitted while a plan runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        category: ContentCategory,
        model: String,
        total_documents: usize,
        eligible: usize,
    },
    DocumentStarted {
        index: usize,
        total: usize,
        name: String,
        path: PathBuf,
    },
    AttemptFailed {
        name: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
        will_retry: bool,
    },
    DocumentAppended {
        index: usize,
        total: usize,
        name: String,
        path: PathBuf,
        attempts: u32,
    },
    DocumentFailed {
        index: usize,
        total: usize,
        name: String,
        path: PathBuf,
        attempts: u32,
        reason: String,
    },
    RunFinished {
        succeeded: usize,
        failed: usize,
        skipped: usize,
        cancelled: bool,
    },
}

/// Receives pipeline events; implementations must not block.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Observer that discards every event
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Documents processed concurrently; 1 is strictly sequential
    pub max_in_flight: usize,
    /// Pause after each document
    pub pacing_delay: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 1,
            pacing_delay: Duration::from_millis(1500),
        }
    }
}

enum DocumentRun {
    Skipped,
    Finished {
        index: usize,
        document: Document,
        run: RetryRun,
    },
}

/// Executes a generation plan against a model client and collects the report.
pub struct PipelineExecutor {
    orchestrator: RetryOrchestrator,
    settings: ExecutorSettings,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancellationToken,
}

impl PipelineExecutor {
    pub fn new(
        orchestrator: RetryOrchestrator,
        settings: ExecutorSettings,
        observer: Arc<dyn PipelineObserver>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            settings,
            observer,
            cancel,
        }
    }

    pub async fn execute(
        &self,
        client: &dyn ModelProviderClient,
        plan: GenerationPlan,
    ) -> Result<RunReport, ApiError> {
        plan.validate()?;
        let mut report = RunReport::new(&plan, client.provider_name(), client.model_name());
        let category = plan.category;
        let total = plan.documents.len();

        info!(
            category = %category,
            model = client.model_name(),
            total_documents = plan.total_documents,
            eligible = total,
            "Generation started"
        );
        self.emit(PipelineEvent::RunStarted {
            category,
            model: client.model_name().to_string(),
            total_documents: plan.total_documents,
            eligible: total,
        });

        let mut mutator = CorpusMutator::new();
        let orchestrator = &self.orchestrator;
        let observer = self.observer.as_ref();
        let cancel = &self.cancel;
        let pacing_delay = self.settings.pacing_delay;
        let max_in_flight = self.settings.max_in_flight.max(1);

        let mut runs = stream::iter(plan.documents.into_iter().enumerate())
            .map(|(index, document)| async move {
                // The slot's previous document has been settled by the time this starts.
                if index >= max_in_flight {
                    pace(pacing_delay, cancel).await;
                }
                if cancel.is_cancelled() {
                    return DocumentRun::Skipped;
                }
                observer.on_event(&PipelineEvent::DocumentStarted {
                    index: index + 1,
                    total,
                    name: document.name().to_string(),
                    path: document.path().to_path_buf(),
                });
                let run = orchestrator
                    .run(client, &document, category, observer, cancel)
                    .await;
                DocumentRun::Finished {
                    index: index + 1,
                    document,
                    run,
                }
            })
            .buffer_unordered(max_in_flight);

        while let Some(result) = runs.next().await {
            match result {
                DocumentRun::Skipped => report.skipped += 1,
                DocumentRun::Finished {
                    index,
                    document,
                    run,
                } => self.settle(&mut mutator, &mut report, index, total, document, run),
            }
        }
        drop(runs);

        report.cancelled = self.cancel.is_cancelled() && report.skipped > 0;
        report.finish();

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "Generation finished"
        );
        self.emit(PipelineEvent::RunFinished {
            succeeded: report.succeeded,
            failed: report.failed,
            skipped: report.skipped,
            cancelled: report.cancelled,
        });
        Ok(report)
    }

    /// Apply a finished document to the corpus and the report.
    fn settle(
        &self,
        mutator: &mut CorpusMutator,
        report: &mut RunReport,
        index: usize,
        total: usize,
        mut document: Document,
        run: RetryRun,
    ) {
        let attempts = run.attempts();
        let failure = match run.state {
            RetryState::Succeeded { block, attempts } => {
                match mutator.append(&mut document, &block) {
                    Ok(_) => {
                        report.succeeded += 1;
                        report.appended.push(document.path().to_path_buf());
                        self.emit(PipelineEvent::DocumentAppended {
                            index,
                            total,
                            name: document.name().to_string(),
                            path: document.path().to_path_buf(),
                            attempts,
                        });
                        return;
                    }
                    Err(err) => err.to_string(),
                }
            }
            RetryState::Exhausted { last_failure, .. } => last_failure.to_string(),
            RetryState::Attempting { attempt } => {
                format!("retry loop stopped at attempt {}", attempt)
            }
        };

        error!(
            document = document.name(),
            attempts,
            reason = %failure,
            "Document failed"
        );
        report.failed += 1;
        report.failures.push(DocumentFailure {
            path: document.path().to_path_buf(),
            name: document.name().to_string(),
            attempts,
            reason: failure.clone(),
        });
        self.emit(PipelineEvent::DocumentFailed {
            index,
            total,
            name: document.name().to_string(),
            path: document.path().to_path_buf(),
            attempts,
            reason: failure,
        });
    }

    fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
    }
}

/// Sleep for `delay`, returning early once `cancel` fires.
async fn pace(delay: Duration, cancel: &CancellationToken) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => {}
    }
}
