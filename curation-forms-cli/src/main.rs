use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde_json::Value;
use tracing_subscriber::filter::EnvFilter;

use curation_forms::entities::parse_clipboard_directive;
use curation_forms::form::dirty;
use curation_forms::progress::ProgressTracker;
use curation_forms::validation::SchemaValidator;
use curation_forms::{EditorOptions, Record, Validate, load_document};

#[derive(Debug, Parser)]
#[command(
    name = "curation-forms",
    version,
    about = "Check edit-form documents the way the curation editors do"
)]
struct Cli {
    /// Raise log verbosity (RUST_LOG still wins)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Editor options: file path, inline payload, or "-" for stdin
    #[arg(long = "options", value_name = "SPEC", global = true)]
    options: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether CURRENT has unsaved changes relative to BASELINE
    Diff {
        baseline: String,
        current: String,
        /// Top-level field to leave out of the comparison
        #[arg(long = "ignore", value_name = "FIELD", action = ArgAction::Append)]
        ignore: Vec<String>,
        /// Compare text exactly instead of trimmed
        #[arg(long = "raw-whitespace")]
        raw_whitespace: bool,
    },
    /// Validate an entity against a JSON Schema
    Validate {
        entity: String,
        #[arg(short = 's', long = "schema", value_name = "SPEC")]
        schema: String,
    },
    /// Apply the upload allow-list to a file's type and size
    CheckFile {
        #[arg(long = "mime", value_name = "TYPE")]
        mime: String,
        #[arg(long = "size", value_name = "BYTES")]
        size: u64,
    },
    /// Feed progress-stream messages (one per line) and print the final state
    Replay {
        /// Defaults to stdin
        file: Option<PathBuf>,
    },
    /// Check a copied directive and print what pasting it would apply
    PasteDirective { json: String },
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match cli.options.as_deref() {
        Some(spec) => serde_json::from_value::<EditorOptions>(load(spec, "options")?)
            .wrap_err("invalid editor options")?,
        None => EditorOptions::default(),
    };

    match cli.command {
        Command::Diff {
            baseline,
            current,
            ignore,
            raw_whitespace,
        } => run_diff(&options, &baseline, &current, ignore, raw_whitespace),
        Command::Validate { entity, schema } => run_validate(&entity, &schema),
        Command::CheckFile { mime, size } => Ok(match options.file_constraints.check(&mime, size) {
            Ok(()) => {
                println!("accepted");
                ExitCode::SUCCESS
            }
            Err(err) => {
                println!("rejected: {err}");
                ExitCode::FAILURE
            }
        }),
        Command::Replay { file } => run_replay(file),
        Command::PasteDirective { json } => match parse_clipboard_directive(&json) {
            Ok(directive) => {
                println!("{}", serde_json::to_string_pretty(&directive.to_json())?);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("rejected: {err}");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

fn init_logging(verbose: u8) {
    let default = if verbose > 0 {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load(spec: &str, label: &str) -> Result<Value> {
    load_document(spec, label).map_err(|err| eyre!("{err:#}"))
}

fn load_record(spec: &str, label: &str) -> Result<Record> {
    Record::from_json(load(spec, label)?).ok_or_else(|| eyre!("{label} must be an object"))
}

fn run_diff(
    options: &EditorOptions,
    baseline: &str,
    current: &str,
    ignore: Vec<String>,
    raw_whitespace: bool,
) -> Result<ExitCode> {
    let baseline = load_record(baseline, "baseline")?;
    let current = load_record(current, "current")?;
    let mut rules = options.dirty_rules();
    rules.ignored_fields.extend(ignore);
    if raw_whitespace {
        rules.normalize_whitespace = false;
    }
    let changed = dirty::changed_fields(&current, &baseline, &rules);
    if changed.is_empty() {
        println!("clean");
    } else {
        println!("dirty");
        for field in changed {
            println!("  {field}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(entity: &str, schema: &str) -> Result<ExitCode> {
    let record = load_record(entity, "entity")?;
    let schema = load(schema, "schema")?;
    let validator = SchemaValidator::new(&schema).map_err(|err| eyre!("{err:#}"))?;
    let result = validator.validate(&record);
    if result.is_valid() {
        println!("valid");
        return Ok(ExitCode::SUCCESS);
    }
    for (field, message) in result.field_errors() {
        println!("{field}: {message}");
    }
    for message in result.global_errors() {
        println!("{message}");
    }
    Ok(ExitCode::FAILURE)
}

fn run_replay(file: Option<PathBuf>) -> Result<ExitCode> {
    let contents = match file {
        Some(path) => fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            buffer
        }
    };

    let mut tracker = ProgressTracker::new();
    for line in contents.lines() {
        let line = line.trim();
        let payload = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);
        if !payload.is_empty() {
            tracker.feed(payload);
        }
    }

    let Some(status) = tracker.status() else {
        println!("no progress received");
        return Ok(ExitCode::FAILURE);
    };
    if let Some(error) = tracker.error_message() {
        println!("failed: {error}");
        return Ok(ExitCode::FAILURE);
    }
    let status = serde_json::to_value(status)?;
    let status = status.as_str().unwrap_or("unknown");
    match tracker.current_step() {
        Some(step) => println!("{status} ({:.0}%): {step}", tracker.percent()),
        None => println!("{status} ({:.0}%)", tracker.percent()),
    }
    Ok(ExitCode::SUCCESS)
}
