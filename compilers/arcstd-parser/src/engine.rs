use arcstd_protocol::{Action, Dependency, SentenceId, Token};
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::configuration::{Configuration, TransitionError};
use crate::oracle::{Oracle, OracleError};
use crate::trace::{TraceArc, TraceEvent, TraceSink};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("sentence {sentence}, step {step}: {source}")]
    Oracle {
        sentence: SentenceId,
        step: usize,
        #[source]
        source: OracleError,
    },

    #[error("sentence {sentence}, step {step}: oracle chose {action} but {source}")]
    Transition {
        sentence: SentenceId,
        step: usize,
        action: Action,
        #[source]
        source: TransitionError,
    },

    // NoAction and StepLimit are guards: every transition shrinks the buffer
    // or the stack, and the oracle only answers `None` in the terminal state.
    #[error("sentence {sentence}, step {step}: oracle returned no action for a non-terminal state")]
    NoAction { sentence: SentenceId, step: usize },

    #[error("sentence {sentence}: no terminal state after {limit} transitions")]
    StepLimit { sentence: SentenceId, limit: usize },
}

impl EngineError {
    pub fn sentence(&self) -> SentenceId {
        match self {
            EngineError::Oracle { sentence, .. }
            | EngineError::Transition { sentence, .. }
            | EngineError::NoAction { sentence, .. }
            | EngineError::StepLimit { sentence, .. } => *sentence,
        }
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub sentence: SentenceId,
    /// Number of transitions applied.
    pub steps: usize,
    /// Sentence tokens in id order, each with its head assigned.
    pub tokens: Vec<Token>,
}

impl ParseOutcome {
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.tokens
            .iter()
            .filter_map(|t| {
                t.head().map(|head| Dependency {
                    head,
                    dependent: t.id,
                })
            })
            .collect()
    }
}

/// Arc-standard control loop driven by an [`Oracle`].
///
/// The engine borrows the oracle immutably, so one oracle can back any
/// number of engines on different threads.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'o> {
    oracle: &'o Oracle,
}

impl<'o> Engine<'o> {
    pub fn new(oracle: &'o Oracle) -> Self {
        Self { oracle }
    }

    /// Parses one sentence, reporting every applied transition to `sink`.
    pub fn parse<S>(
        &self,
        sentence: SentenceId,
        tokens: Vec<Token>,
        sink: &mut S,
    ) -> Result<ParseOutcome, EngineError>
    where
        S: TraceSink + ?Sized,
    {
        let _span = debug_span!("parse", %sentence).entered();

        // Every token is shifted once and popped once
        let limit = 2 * tokens.len();
        let mut config = Configuration::new(tokens);
        let mut step = 0;

        while !config.is_terminal() {
            if step >= limit {
                return Err(EngineError::StepLimit { sentence, limit });
            }
            step += 1;

            // 1. Ask the oracle
            let action = self
                .oracle
                .consult(&config)
                .map_err(|source| EngineError::Oracle {
                    sentence,
                    step,
                    source,
                })?
                .ok_or(EngineError::NoAction { sentence, step })?;

            // 2. Snapshot before applying, so the trace shows what the oracle saw
            let snapshot = sink
                .is_enabled()
                .then(|| (forms(config.stack().iter()), forms(config.buffer())));

            // 3. Apply
            let attachment = config
                .apply(action)
                .map_err(|source| EngineError::Transition {
                    sentence,
                    step,
                    action,
                    source,
                })?;
            debug!(step, %action, depth = config.depth(), remaining = config.buffer_len(), "transition");

            if let Some((stack, buffer)) = snapshot {
                sink.record(TraceEvent {
                    step,
                    stack,
                    buffer,
                    action,
                    arc: attachment.map(|a| TraceArc {
                        head: a.dependency.head,
                        dependent: a.dependency.dependent,
                        head_form: a.head_form,
                        dependent_form: a.dependent_form,
                    }),
                });
            }
        }

        Ok(ParseOutcome {
            sentence,
            steps: step,
            tokens: config.into_tokens(),
        })
    }
}

fn forms<'a>(tokens: impl Iterator<Item = &'a Token>) -> Vec<String> {
    tokens.map(|t| t.form.clone()).collect()
}
