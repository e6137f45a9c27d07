//! Playground generation: retry orchestration, plan, executor and the run entry point.
//! The orchestrator owns one document's attempts; the executor owns the corpus walk.

pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod run;

pub use executor::{
    ExecutorSettings, NoopObserver, PipelineEvent, PipelineExecutor, PipelineObserver,
};
pub use orchestrator::{
    AttemptOutcome, AttemptRecord, Backoff, FailureReason, RetryOrchestrator, RetryPolicy,
    RetryRun, RetryState,
};
pub use plan::{DocumentFailure, GenerationPlan, RunReport};
pub use run::{plan_generation, run_generate, GenerateRequest};
