//! CLI route: run context. Resolves config, credential and client, then hands off to
//! `run_generate` and the presentation layer.

use crate::category::ContentCategory;
use crate::cli::parse::{Cli, OutputFormat};
use crate::cli::presentation::{format_report_json, format_report_text, ConsoleObserver};
use crate::config::{ConfigLoader, PlaygenConfig};
use crate::error::ApiError;
use crate::generation::{run_generate, GenerateRequest, PipelineObserver, RunReport};
use crate::provider::{ModelProvider, ModelProviderClient, ProviderFactory};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runtime context for one CLI invocation.
/// Built from the parsed flags using ConfigLoader only.
pub struct RunContext {
    config: PlaygenConfig,
    request: GenerateRequest,
    client: Option<Box<dyn ModelProviderClient>>,
    format: OutputFormat,
    quiet: bool,
}

impl RunContext {
    /// Create the run context from the layered config and the process environment.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = cli.config {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&cli.target)?
        };
        Self::from_config(cli, config, |name| std::env::var(name).ok())
    }

    /// Create the run context from a loaded config and an explicit credential lookup.
    pub fn from_config<F>(cli: &Cli, mut config: PlaygenConfig, env: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let category: ContentCategory = cli.section.parse()?;
        apply_overrides(&mut config, cli);

        let request = GenerateRequest {
            category,
            target: cli.target.clone(),
            limit: cli.limit,
            dry_run: cli.dry_run,
        };

        let client = if cli.dry_run {
            None
        } else {
            let credential_env = config.generation.credential_env().to_string();
            let api_key = env(&credential_env)
                .filter(|key| !key.trim().is_empty())
                .ok_or(ApiError::MissingCredential(credential_env))?;
            let provider = ModelProvider::new(
                config.generation.provider,
                config.generation.resolve_model(None),
                api_key,
                config.generation.endpoint.clone(),
            );
            debug!(provider = %provider.kind(), model = provider.model(), "Creating model client");
            Some(ProviderFactory::create_client(&provider)?)
        };

        Ok(Self {
            config,
            request,
            client,
            format: cli.format,
            quiet: cli.quiet,
        })
    }

    pub fn config(&self) -> &PlaygenConfig {
        &self.config
    }

    pub fn request(&self) -> &GenerateRequest {
        &self.request
    }

    /// Observer rendering progress lines for this invocation.
    pub fn observer(&self) -> Arc<dyn PipelineObserver> {
        let enabled = !self.quiet && self.format == OutputFormat::Text;
        Arc::new(ConsoleObserver::new(enabled, self.config.logging.color))
    }

    /// Run the pipeline and render the final report.
    pub async fn execute(&self, cancel: CancellationToken) -> Result<String, ApiError> {
        let report = self.run(self.observer(), cancel).await?;
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "Run finished"
        );
        Ok(self.render(&report))
    }

    pub async fn run(
        &self,
        observer: Arc<dyn PipelineObserver>,
        cancel: CancellationToken,
    ) -> Result<RunReport, ApiError> {
        run_generate(
            &self.config,
            &self.request,
            self.client.as_deref(),
            observer,
            cancel,
        )
        .await
    }

    pub fn render(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Text => format_report_text(report, self.config.logging.color),
            OutputFormat::Json => format_report_json(report),
        }
    }
}

/// Command-line flags win over every config layer.
fn apply_overrides(config: &mut PlaygenConfig, cli: &Cli) {
    if let Some(provider) = cli.provider {
        if provider != config.generation.provider {
            // A configured model belongs to the configured provider.
            config.generation.model = None;
            config.generation.credential_env = None;
        }
        config.generation.provider = provider;
    }
    if let Some(ref model) = cli.model {
        config.generation.model = Some(model.clone());
    }
}
