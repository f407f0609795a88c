//! Terminal interface
//!
//! Audits a local call recording without the server: runs the
//! pipeline directly and prints each stage result as it lands,
//! followed by the per-speaker summary table (or the full report as
//! JSON).

use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;

use call_audit_config::{load_settings, AnalysisRules};
use call_audit_core::{CallReport, SummaryTable};
use call_audit_pipeline::{ingest, CallProcessor, StageEvent, Task, TaskSelection};

/// Audit a call recording: transcription, diarization, compliance,
/// PII/profanity masking, sentiment, speaking metrics, category.
#[derive(Parser)]
#[command(name = "call-audit", version)]
struct Cli {
    /// Input WAV file.
    input: PathBuf,

    /// Tasks to run (comma-separated; all when omitted). Names:
    /// Transcription, Speaker Diarization, Speaking Speed, PII Check,
    /// Profanity Check, Required Phrases, Sentiment Analysis, Call Category.
    #[arg(long, value_delimiter = ',')]
    tasks: Option<Vec<String>>,

    /// Environment name for config/{env}.toml.
    #[arg(long)]
    config_env: Option<String>,

    /// Print the full report as JSON instead of the summary table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config_env.as_deref()).context("loading settings")?;
    let rules = AnalysisRules::load_or_default(&settings.analysis.rules_path)
        .context("loading analysis rules")?;

    let tasks = match &cli.tasks {
        None => TaskSelection::all(),
        Some(names) => names
            .iter()
            .map(|name| Task::from_str(name))
            .collect::<Result<Vec<_>, _>>()
            .context("parsing task list")?
            .into_iter()
            .collect(),
    };

    let recording = ingest(&cli.input, settings.models.target_sample_rate)
        .with_context(|| format!("ingesting {}", cli.input.display()))?;
    println!(
        "Loaded {} ({:.1}s @ {} Hz)",
        cli.input.display(),
        recording.duration_secs(),
        recording.sample_rate
    );

    let processor =
        CallProcessor::with_http_backends(&settings, &rules).context("building pipeline")?;

    let mut report: Option<CallReport> = None;
    {
        let stream = processor.stream(&recording, &tasks);
        tokio::pin!(stream);
        while let Some(event) = stream.next().await {
            print_event(&event);
            if let StageEvent::Complete(done) = event {
                report = Some(*done);
            }
        }
    }

    let report = report.context("pipeline produced no report")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report.summary_table());
    }

    Ok(())
}

/// One progress line per stage
fn print_event(event: &StageEvent) {
    match event {
        StageEvent::Transcription(text) => {
            println!("\n[transcription]\n{}", text);
        }
        StageEvent::Diarization(outcome) => {
            println!(
                "\n[diarization] {} segments, {} speakers, {} interruptions",
                outcome.segments.len(),
                outcome.speaker_count(),
                outcome.interruptions
            );
            match outcome.speaking_ratio {
                Some(ratio) => println!("  speaking ratio: {:.2}", ratio),
                None => println!("  speaking ratio: N/A (only one speaker detected)"),
            }
            println!("  time to first word: {:.2}s", outcome.time_to_first_word);
        }
        StageEvent::SpeakingSpeed(stats) => {
            println!("\n[speaking speed]");
            for (speaker, s) in &stats.per_speaker {
                println!(
                    "  {}: {} words in {:.1}s ({:.1} WPM)",
                    speaker, s.word_count, s.speech_secs, s.words_per_minute
                );
            }
        }
        StageEvent::Pii(result) => {
            println!(
                "\n[pii] detected: {} ({} matches)",
                result.detected,
                result.entities.len()
            );
            if result.detected {
                println!("  masked: {}", result.masked_text);
            }
        }
        StageEvent::Profanity(result) => {
            println!("\n[profanity] detected: {} ({} hits)", result.detected, result.hits);
            if result.detected {
                println!("  censored: {}", result.censored_text);
            }
        }
        StageEvent::RequiredPhrases(result) => {
            println!("\n[required phrases] present: {}", result.required_present);
            for phrase in &result.present_phrases {
                println!("  found: {}", phrase);
            }
            for violation in &result.violations {
                println!("  FORBIDDEN: {}", violation.phrase);
            }
        }
        StageEvent::Sentiment(result) => {
            println!(
                "\n[sentiment] polarity {:.2}, subjectivity {:.2}, overall {}",
                result.score.polarity, result.score.subjectivity, result.overall
            );
        }
        StageEvent::Category(result) => {
            println!("\n[category] {}", result.category);
        }
        StageEvent::Error { stage, message } => {
            eprintln!("\n[{} failed] {}", stage, message);
        }
        StageEvent::Summary(_) | StageEvent::Complete(_) => {}
    }
}

/// Plain-text rendering of the summary table
fn print_table(table: &SummaryTable) {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .flat_map(|cell| cell.lines())
                .map(|line| line.len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    println!();
    print_row(&table.columns, &widths);
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    for row in &table.rows {
        print_row(row, &widths);
    }
}

fn print_row(cells: &[String], widths: &[usize]) {
    let height = cells
        .iter()
        .map(|cell| cell.lines().count().max(1))
        .max()
        .unwrap_or(1);

    for line_index in 0..height {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = cell.lines().nth(line_index).unwrap_or("");
                format!(" {:<width$} ", text, width = widths.get(i).copied().unwrap_or(0))
            })
            .collect();
        println!("{}", line.join("|"));
    }
}
