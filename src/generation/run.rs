//! Single generate entry point: scan, plan, execute.
//! The CLI and integration callers use this only; no scanner/executor wiring in adapters.

use crate::category::ContentCategory;
use crate::config::PlaygenConfig;
use crate::corpus::CorpusScanner;
use crate::error::ApiError;
use crate::generation::executor::{PipelineExecutor, PipelineObserver};
use crate::generation::orchestrator::RetryOrchestrator;
use crate::generation::plan::{DocumentFailure, GenerationPlan, RunReport};
use crate::provider::ModelProviderClient;
use crate::synthesis::PromptSynthesizer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// What to generate
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub category: ContentCategory,
    /// Corpus root
    pub target: PathBuf,
    /// Maximum documents to process (0 = unlimited)
    pub limit: usize,
    /// List eligible documents without calling the model
    pub dry_run: bool,
}

/// Build the plan for a request without touching the model.
pub fn plan_generation(
    config: &PlaygenConfig,
    request: &GenerateRequest,
) -> Result<GenerationPlan, ApiError> {
    let scanner = CorpusScanner::with_options(
        request.target.clone(),
        config.block_format(),
        config.scan_options(request.limit),
    );
    let scan = scanner.scan(request.category)?;
    info!(
        category = %request.category,
        directory = %scan.directory.display(),
        total_documents = scan.total_documents,
        eligible = scan.eligible.len(),
        unreadable = scan.unreadable.len(),
        "Corpus scanned"
    );
    let unreadable = scan
        .unreadable
        .into_iter()
        .map(|entry| DocumentFailure {
            name: entry
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.path.to_string_lossy().into_owned()),
            path: entry.path,
            attempts: 0,
            reason: entry.reason,
        })
        .collect();
    let plan = GenerationPlan::new(request.category, scan.total_documents, scan.eligible)
        .with_unreadable(unreadable);
    plan.validate()?;
    Ok(plan)
}

/// Run the generation pipeline for one section.
///
/// `client` may be `None` only for a dry run.
pub async fn run_generate(
    config: &PlaygenConfig,
    request: &GenerateRequest,
    client: Option<&dyn ModelProviderClient>,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancellationToken,
) -> Result<RunReport, ApiError> {
    let plan = plan_generation(config, request)?;

    if request.dry_run {
        let model = client
            .map(|c| c.model_name().to_string())
            .unwrap_or_else(|| config.generation.resolve_model(None));
        let provider = client
            .map(|c| c.provider_name().to_string())
            .unwrap_or_else(|| config.generation.provider.to_string());
        return Ok(RunReport::dry_run(&plan, &provider, &model));
    }

    let client = client.ok_or_else(|| {
        ApiError::ProviderNotConfigured("A model client is required unless --dry-run is set".to_string())
    })?;

    let orchestrator = RetryOrchestrator::new(
        PromptSynthesizer::new(config.synthesis_settings(), config.block_format()),
        config.extractor(),
        config.retry_policy(),
    );
    let executor =
        PipelineExecutor::new(orchestrator, config.executor_settings(), observer, cancel);
    executor.execute(client, plan).await
}
