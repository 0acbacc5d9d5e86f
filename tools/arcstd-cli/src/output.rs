use std::io::{self, Write};

use arcstd_parser::TraceEvent;
use arcstd_protocol::{SentenceId, Token};
use clap::ValueEnum;
use serde::Serialize;

const CONLLU_HEADER: &str = "#1.ID\t2.FORM\t3.LEMMA\t4.UPOSTAG\t5.XPOSTAG\t6.FEATS\t7.HEAD\t8.DEPREL";
const TRACE_HEADER: &str = "Step\tStack\tWord List\tAction\tRelationAdded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceFormat {
    /// Tab-separated configuration table
    Text,
    /// One JSON object per sentence
    Json,
}

/// Writes one parsed sentence as CoNLL-U rows, heads filled in.
pub fn write_conllu<W: Write>(
    out: &mut W,
    sentence: SentenceId,
    text: &str,
    tokens: &[Token],
) -> io::Result<()> {
    writeln!(out, "# sent_id = {}", sentence)?;
    writeln!(out, "# text = {}", text)?;
    writeln!(out, "{}", CONLLU_HEADER)?;
    for token in tokens {
        let head = token
            .head()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "_".to_string());
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t_\t_\t{}\tDEP",
            token.id, token.form, token.lemma, token.upostag, head
        )?;
    }
    writeln!(out)
}

/// Everything the trace writers need about one sentence.
#[derive(Debug, Serialize)]
pub struct TraceDocument<'a> {
    pub file: &'a str,
    pub sentence: SentenceId,
    pub text: &'a str,
    pub events: &'a [TraceEvent],
    /// Set when the parse was aborted.
    pub error: Option<String>,
}

impl TraceDocument<'_> {
    pub fn write<W: Write>(&self, out: &mut W, format: TraceFormat) -> io::Result<()> {
        match format {
            TraceFormat::Text => self.write_text(out),
            TraceFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)
            }
        }
    }

    fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "<sentence file=\"{}\" id=\"{}\" text=\"{}\">",
            self.file, self.sentence, self.text
        )?;
        writeln!(out, "{}", TRACE_HEADER)?;
        for event in self.events {
            writeln!(out, "{}", event)?;
        }

        let last = self.events.last().map(|e| e.step).unwrap_or(0);
        match &self.error {
            None => writeln!(out, "{}\t[root]\t[]\tDone", last)?,
            Some(error) => writeln!(out, "{}\tFailed\t{}", last + 1, error)?,
        }
        writeln!(out, "</sentence>")?;
        writeln!(out)
    }
}
