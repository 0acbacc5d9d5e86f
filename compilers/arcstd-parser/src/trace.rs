use std::fmt;

use arcstd_protocol::{Action, TokenId};

#[cfg(feature = "serde")]
use serde::Serialize;

/// The arc added by a step, as it appears in the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraceArc {
    pub head: TokenId,
    pub dependent: TokenId,
    pub head_form: String,
    pub dependent_form: String,
}

/// One applied transition.
///
/// `stack` and `buffer` are the surface forms as they were when the oracle
/// chose `action`, i.e. before it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraceEvent {
    pub step: usize,
    pub stack: Vec<String>,
    pub buffer: Vec<String>,
    pub action: Action,
    pub arc: Option<TraceArc>,
}

impl fmt::Display for TraceEvent {
    /// `<step>\t[<stack>]\t[<buffer>]\t<ACTION>[\t(<arc>)]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t[{}]\t[{}]\t{}",
            self.step,
            self.stack.join(","),
            self.buffer.join(","),
            self.action.label()
        )?;

        match (&self.arc, self.action) {
            (Some(arc), Action::LeftArc) => write!(f, "\t({}<-{})", arc.head_form, arc.dependent_form),
            (Some(arc), _) => write!(f, "\t({}->{})", arc.head_form, arc.dependent_form),
            (None, _) => Ok(()),
        }
    }
}

/// Receives trace events as the engine produces them.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);

    /// Sinks that discard events return `false` so the engine can skip
    /// building snapshots.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl TraceSink for Vec<TraceEvent> {
    fn record(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _event: TraceEvent) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
