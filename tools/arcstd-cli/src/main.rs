mod conllu;
mod output;
mod run;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use arcstd_parser::{Oracle, RuleTable};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::output::TraceFormat;

#[derive(Parser)]
#[command(author, version, about = "Rule-driven arc-standard dependency parser for CoNLL-U corpora")]
struct Cli {
    /// Tagged corpus in CoNLL-U format
    #[arg(short, long, value_name = "FILE", default_value = "input.txt")]
    input: PathBuf,

    /// Oracle rule table (`feature[,feature],op=<action>` per line)
    #[arg(short, long, value_name = "FILE", default_value = "feattemp.txt")]
    rules: PathBuf,

    /// Parsed corpus, heads filled in
    #[arg(short, long, value_name = "FILE", default_value = "output.txt")]
    output: PathBuf,

    /// Transition trace of every sentence
    #[arg(short, long, value_name = "FILE", default_value = "conftable.txt")]
    trace: PathBuf,

    /// Do not record or write the trace
    #[arg(long)]
    no_trace: bool,

    #[arg(long, value_enum, default_value_t = TraceFormat::Text)]
    trace_format: TraceFormat,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Stop writing at the first sentence that fails to parse
    #[arg(long)]
    fail_fast: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // 1. Rule table, rejected as a whole if any line is malformed
    let rules = RuleTable::from_path(&cli.rules)
        .with_context(|| format!("loading rule table {:?}", cli.rules))?;
    println!("Loaded {} rules from {:?}", rules.len(), cli.rules);
    let oracle = Oracle::new(rules);

    // 2. Corpus
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading corpus {:?}", cli.input))?;
    let sentences = conllu::parse_corpus(&source)
        .with_context(|| format!("parsing corpus {:?}", cli.input))?;

    // 3. Parse every sentence in parallel
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs.unwrap_or(0))
        .build()
        .context("starting worker pool")?;
    let record_trace = !cli.no_trace;
    let reports = pool.install(|| run::parse_corpus(&oracle, &sentences, record_trace));

    // 4. Write results in corpus order
    let mut output = BufWriter::new(
        File::create(&cli.output).with_context(|| format!("creating {:?}", cli.output))?,
    );
    let mut trace = if record_trace {
        let file = File::create(&cli.trace).with_context(|| format!("creating {:?}", cli.trace))?;
        Some(BufWriter::new(file))
    } else {
        None
    };
    let input_name = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let summary = run::write_reports(
        &reports,
        &input_name,
        &mut output,
        trace.as_mut(),
        cli.trace_format,
        cli.fail_fast,
    )
    .with_context(|| format!("writing {:?} / {:?}", cli.output, cli.trace))?;

    output.flush()?;
    if let Some(out) = trace.as_mut() {
        out.flush()?;
    }

    println!(
        "Parsed {} of {} sentences into {:?}",
        summary.parsed,
        sentences.len(),
        cli.output
    );
    if summary.skipped > 0 {
        println!("Stopped at the first failure, {} sentence(s) not written", summary.skipped);
    }
    if summary.failed > 0 {
        bail!("{} sentence(s) failed to parse", summary.failed);
    }
    Ok(())
}
