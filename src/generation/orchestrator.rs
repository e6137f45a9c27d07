//! Retry orchestrator: the per-document generate/extract state machine.
//!
//! Each cycle synthesizes a request, calls the client and extracts a block.
//! Transport and extraction failures both count against the attempt ceiling.
//! Terminal states are never left; the orchestrator never touches the corpus.

use crate::category::ContentCategory;
use crate::corpus::Document;
use crate::extraction::{Block, BlockExtractor, ExtractionFailure};
use crate::generation::executor::{PipelineEvent, PipelineObserver};
use crate::provider::ModelProviderClient;
use crate::synthesis::PromptSynthesizer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay growth between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    Fixed,
    Exponential,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed
    }
}

/// Retry ceiling and delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts per document, including the first
    pub max_attempts: u32,
    pub extraction_delay: Duration,
    pub transport_delay: Duration,
    pub backoff: Backoff,
    /// Upper bound for exponential delays
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            extraction_delay: Duration::from_secs(2),
            transport_delay: Duration::from_secs(2),
            backoff: Backoff::Fixed,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, reason: &FailureReason, attempt: u32) -> Duration {
        let base = match reason {
            FailureReason::Transport(_) => self.transport_delay,
            FailureReason::Extraction(_) => self.extraction_delay,
        };
        match self.backoff {
            Backoff::Fixed => base,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(31);
                base.checked_mul(1u32 << exponent)
                    .unwrap_or(self.max_delay)
                    .min(self.max_delay)
            }
        }
    }
}

/// Why an attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The client returned an error
    Transport(String),
    /// The response did not contain a well-formed block
    Extraction(ExtractionFailure),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(message) => write!(f, "transport: {}", message),
            FailureReason::Extraction(failure) => write!(f, "extraction: {}", failure),
        }
    }
}

/// Outcome of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(Block),
    TransientFailure(FailureReason),
    GiveUp(FailureReason),
}

/// Retry state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    Attempting { attempt: u32 },
    Succeeded { block: Block, attempts: u32 },
    Exhausted { attempts: u32, last_failure: FailureReason },
}

impl RetryState {
    pub fn initial() -> Self {
        RetryState::Attempting { attempt: 1 }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RetryState::Attempting { .. })
    }

    /// Next state given the outcome of the current attempt.
    ///
    /// Terminal states absorb every outcome.
    pub fn advance(self, outcome: AttemptOutcome) -> Self {
        let attempt = match self {
            RetryState::Attempting { attempt } => attempt,
            terminal => return terminal,
        };
        match outcome {
            AttemptOutcome::Success(block) => RetryState::Succeeded {
                block,
                attempts: attempt,
            },
            AttemptOutcome::TransientFailure(_) => RetryState::Attempting {
                attempt: attempt + 1,
            },
            AttemptOutcome::GiveUp(last_failure) => RetryState::Exhausted {
                attempts: attempt,
                last_failure,
            },
        }
    }
}

/// One entry of the attempt history
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    /// `None` for the successful attempt
    pub failure: Option<FailureReason>,
    pub duration_ms: u64,
}

/// Terminal state of one document plus its attempt history
#[derive(Debug, Clone)]
pub struct RetryRun {
    pub state: RetryState,
    pub history: Vec<AttemptRecord>,
}

impl RetryRun {
    pub fn attempts(&self) -> u32 {
        self.history.len() as u32
    }
}

/// Retry orchestrator
pub struct RetryOrchestrator {
    synthesizer: PromptSynthesizer,
    extractor: BlockExtractor,
    policy: RetryPolicy,
}

impl RetryOrchestrator {
    pub fn new(synthesizer: PromptSynthesizer, extractor: BlockExtractor, policy: RetryPolicy) -> Self {
        Self {
            synthesizer,
            extractor,
            policy,
        }
    }

    /// Drive one document to a terminal state.
    ///
    /// Once `cancel` fires no further attempt is started: the current failure
    /// becomes the last one.
    pub async fn run(
        &self,
        client: &dyn ModelProviderClient,
        document: &Document,
        category: ContentCategory,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
    ) -> RetryRun {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut history = Vec::new();
        let mut state = RetryState::initial();

        while let RetryState::Attempting { attempt } = state {
            let started = Instant::now();
            let outcome = self.attempt(client, document, category, attempt, max_attempts).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let failure = match &outcome {
                AttemptOutcome::Success(_) => None,
                AttemptOutcome::TransientFailure(reason) | AttemptOutcome::GiveUp(reason) => {
                    Some(reason.clone())
                }
            };
            history.push(AttemptRecord {
                attempt,
                failure: failure.clone(),
                duration_ms,
            });

            let mut outcome = outcome;
            if let Some(reason) = failure {
                let will_retry =
                    matches!(outcome, AttemptOutcome::TransientFailure(_)) && !cancel.is_cancelled();
                warn!(
                    document = document.name(),
                    attempt,
                    max_attempts,
                    will_retry,
                    reason = %reason,
                    "Generation attempt failed"
                );
                observer.on_event(&PipelineEvent::AttemptFailed {
                    name: document.name().to_string(),
                    attempt,
                    max_attempts,
                    reason: reason.to_string(),
                    will_retry,
                });
                let mut retrying = will_retry;
                if retrying {
                    let delay = self.policy.delay_after(&reason, attempt);
                    debug!(document = document.name(), delay_ms = delay.as_millis() as u64, "Waiting before retry");
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            debug!(document = document.name(), "Retry abandoned after cancellation");
                            retrying = false;
                        }
                    }
                }
                if !retrying {
                    outcome = AttemptOutcome::GiveUp(reason);
                }
            }

            state = state.advance(outcome);
        }

        RetryRun { state, history }
    }

    async fn attempt(
        &self,
        client: &dyn ModelProviderClient,
        document: &Document,
        category: ContentCategory,
        attempt: u32,
        max_attempts: u32,
    ) -> AttemptOutcome {
        let request = self.synthesizer.synthesize(document, category);
        debug!(
            document = document.name(),
            attempt,
            prompt_chars = request.prompt.chars().count(),
            "Submitting generation request"
        );

        let result = match client.generate(&request).await {
            Ok(text) => self
                .extractor
                .extract(&text)
                .map_err(FailureReason::Extraction),
            Err(err) => Err(FailureReason::Transport(err.to_string())),
        };

        match result {
            Ok(block) => AttemptOutcome::Success(block),
            Err(reason) if attempt < max_attempts => AttemptOutcome::TransientFailure(reason),
            Err(reason) => AttemptOutcome::GiveUp(reason),
        }
    }
}
