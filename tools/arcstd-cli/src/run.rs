use std::io::{self, Write};

use arcstd_parser::{Engine, EngineError, NoTrace, Oracle, ParseOutcome, TraceEvent};
use arcstd_protocol::SentenceId;
use arcstd_tree::{DependencyGraph, TreeError};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::conllu::Sentence;
use crate::output::{write_conllu, TraceDocument, TraceFormat};

#[derive(Debug, Error)]
pub enum SentenceError {
    #[error(transparent)]
    Parse(#[from] EngineError),

    #[error("sentence {sentence}: {source}")]
    Tree {
        sentence: SentenceId,
        #[source]
        source: TreeError,
    },
}

/// What one sentence produced, successful or not.
#[derive(Debug)]
pub struct SentenceReport {
    pub id: SentenceId,
    pub text: String,
    pub events: Vec<TraceEvent>,
    pub result: Result<ParseOutcome, SentenceError>,
}

/// Parses and validates a single sentence.
pub fn parse_sentence(oracle: &Oracle, sentence: &Sentence, record_trace: bool) -> SentenceReport {
    let engine = Engine::new(oracle);
    let mut events: Vec<TraceEvent> = Vec::new();
    let tokens = sentence.tokens.clone();

    let parsed = if record_trace {
        engine.parse(sentence.id, tokens, &mut events)
    } else {
        engine.parse(sentence.id, tokens, &mut NoTrace)
    };

    let result = parsed.map_err(SentenceError::from).and_then(|outcome| {
        let tree = DependencyGraph::from_tokens(&outcome.tokens)
            .and_then(|tree| tree.validate().map(|_| tree))
            .map_err(|source| SentenceError::Tree {
                sentence: sentence.id,
                source,
            })?;

        let roots = tree.root_children();
        if roots.len() > 1 {
            warn!(sentence = %sentence.id, roots = ?roots, "several tokens attached to ROOT");
        }
        Ok(outcome)
    });

    if result.is_ok() {
        info!("sentence {} done", sentence.id);
    }

    SentenceReport {
        id: sentence.id,
        text: sentence.text(),
        events,
        result,
    }
}

/// Parses every sentence on the current rayon pool. Reports come back in
/// input order whatever order the workers finish in.
pub fn parse_corpus(oracle: &Oracle, sentences: &[Sentence], record_trace: bool) -> Vec<SentenceReport> {
    sentences
        .par_iter()
        .map(|sentence| parse_sentence(oracle, sentence, record_trace))
        .collect()
}

/// Counts from [`write_reports`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub parsed: usize,
    pub failed: usize,
    /// Reports left unwritten because `fail_fast` stopped at a failure.
    pub skipped: usize,
}

/// Writes reports in corpus order. Successful sentences go to `out`, every
/// written sentence gets a trace block. A failed sentence is never written
/// to `out`; with `fail_fast` nothing after it is written at all.
pub fn write_reports<O, T>(
    reports: &[SentenceReport],
    file: &str,
    out: &mut O,
    mut trace: Option<&mut T>,
    format: TraceFormat,
    fail_fast: bool,
) -> io::Result<WriteSummary>
where
    O: Write,
    T: Write,
{
    let mut summary = WriteSummary::default();

    for (idx, report) in reports.iter().enumerate() {
        let error_text = report.result.as_ref().err().map(ToString::to_string);

        if let Some(trace) = trace.as_mut() {
            TraceDocument {
                file,
                sentence: report.id,
                text: &report.text,
                events: &report.events,
                error: error_text,
            }
            .write(trace, format)?;
        }

        match &report.result {
            Ok(outcome) => {
                write_conllu(out, report.id, &report.text, &outcome.tokens)?;
                summary.parsed += 1;
            }
            Err(err) => {
                error!(sentence = %report.id, "{}", err);
                summary.failed += 1;
                if fail_fast {
                    summary.skipped = reports.len() - idx - 1;
                    break;
                }
            }
        }
    }

    Ok(summary)
}
