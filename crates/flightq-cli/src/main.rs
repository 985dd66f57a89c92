//! Flightq CLI
//!
//! - `run`: translate and answer every question in a file, writing one line
//!   per question to each per-stage artifact file
//! - `ask`: translate and answer a single question, showing every stage
//! - `eval`: answer a procedural form written by hand (or read back from
//!   `procedural.txt`)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use flightq_factdb::{Answer, FactStore};
use flightq_nlp::{PipelineConfig, Procedure, QueryProcessor};
use serde::Serialize;
use tracing::Level;

mod artifacts;

use artifacts::{render_list, ArtifactWriter, STAGE_FILES};

#[derive(Parser)]
#[command(name = "flightq")]
#[command(
    author,
    version,
    about = "Flightq: answer Vietnamese flight-schedule questions from a fact file"
)]
struct Cli {
    /// More logging (DEBUG).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Less logging (WARN).
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a query file and write per-stage artifacts.
    Run {
        /// Fact file, one `(RELATION arg ...)` per line
        #[arg(long)]
        facts: PathBuf,
        /// Query file, one question per line
        #[arg(long)]
        queries: PathBuf,
        /// Output directory for tokens.txt ... answers.txt
        #[arg(long, default_value = "Output")]
        out: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Answer one question.
    Ask {
        #[arg(long)]
        facts: PathBuf,
        /// The question, e.g. "Máy bay nào đến thành phố Huế lúc 13:30HR ?"
        question: String,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Evaluate a procedural form, e.g. "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE ?))".
    Eval {
        #[arg(long)]
        facts: PathBuf,
        form: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct PipelineArgs {
    /// JSON pipeline config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Drop stop words after city/time merging
    #[arg(long)]
    filter_stopwords: bool,
    /// Stop-word list, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Relation bank file, one `label(head, dependent)` per line
    #[arg(long)]
    bank: Option<PathBuf>,
}

impl PipelineArgs {
    fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if self.filter_stopwords {
            config.filter_stopwords = true;
        }
        if let Some(path) = &self.stopwords {
            config.stopwords_path = Some(path.clone());
        }
        if let Some(path) = &self.bank {
            config.bank_path = Some(path.clone());
        }
        Ok(config)
    }

    fn processor(&self) -> Result<QueryProcessor> {
        Ok(QueryProcessor::from_config(&self.resolve()?)?)
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_facts(path: &Path) -> Result<FactStore> {
    FactStore::load(path).with_context(|| format!("failed to load facts from {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_run(facts: &Path, queries: &Path, out: &Path, pipeline: &PipelineArgs) -> Result<()> {
    let processor = pipeline.processor()?;
    let store = load_facts(facts)?;
    let text = fs::read_to_string(queries)
        .with_context(|| format!("failed to read queries from {}", queries.display()))?;

    let mut writer = ArtifactWriter::create(out)?;
    let mut processed = 0usize;
    let mut answered = 0usize;
    for query in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let analysis = processor.process(query);
        let answer = store.query(&analysis.procedural);
        if !answer.is_sentinel() {
            answered += 1;
        }
        writer.append(&analysis, &answer)?;
        processed += 1;
    }
    writer.finish()?;

    eprintln!(
        "{} {} queries ({} answered) → {} [{}]",
        "processed".green().bold(),
        processed,
        answered,
        out.display().to_string().bold(),
        STAGE_FILES.join(", ")
    );
    Ok(())
}

#[derive(Serialize)]
struct AskReport<'a> {
    #[serde(flatten)]
    analysis: &'a flightq_nlp::Analysis,
    answer: &'a Answer,
    answer_text: String,
}

fn cmd_ask(facts: &Path, question: &str, json: bool, pipeline: &PipelineArgs) -> Result<()> {
    let processor = pipeline.processor()?;
    let store = load_facts(facts)?;
    let analysis = processor.process(question);
    let answer = store.query(&analysis.procedural);

    if json {
        let report = AskReport {
            analysis: &analysis,
            answer: &answer,
            answer_text: answer.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>12} {}", "tokens".cyan(), render_list(&analysis.tokens));
    println!("{:>12} {}", "dependencies".cyan(), render_list(&analysis.dependencies));
    println!("{:>12} {}", "grammatical".cyan(), render_list(&analysis.grammatical));
    println!("{:>12} {}", "logical".cyan(), analysis.logical);
    println!("{:>12} {}", "procedural".cyan(), analysis.procedural);
    print_answer(&answer);
    Ok(())
}

fn cmd_eval(facts: &Path, form: &str) -> Result<()> {
    let store = load_facts(facts)?;
    let procedure = match form.parse::<Procedure>() {
        Ok(procedure) => procedure,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable procedural form");
            Procedure::Invalid
        }
    };
    print_answer(&store.query(&procedure));
    Ok(())
}

fn print_answer(answer: &Answer) {
    let label = if answer.is_sentinel() {
        "answer".yellow().bold()
    } else {
        "answer".green().bold()
    };
    println!("{:>12} {}", label, answer);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Run {
            facts,
            queries,
            out,
            pipeline,
        } => cmd_run(&facts, &queries, &out, &pipeline),
        Commands::Ask {
            facts,
            question,
            json,
            pipeline,
        } => cmd_ask(&facts, &question, json, &pipeline),
        Commands::Eval { facts, form } => cmd_eval(&facts, &form),
    }
}
