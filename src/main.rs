//! Purpose: `framekit` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Command results are JSON on stdout (pretty on a terminal, compact otherwise).
//! Invariants: Non-interactive errors are emitted as JSON on stderr; notices are JSON lines on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod input;
mod json;

use framekit::api::{
    DEFAULT_LABEL_FIELD, DEFAULT_MIN_ELEMENTS, Error, ErrorKind, VERSION, to_exit_code,
};
use framekit::notice::{Notice, notice_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint(clap_error_hint(&err)));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "framekit",
    version,
    about = "Flatten, serialize, and compare labeled tabular data",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Tables travel as JSON envelopes ({"type": "DataFrame", ...}).

Mental model:
  - `flatten` joins labeled tables into one long-form table
  - `significance` runs pairwise Wilcoxon signed-rank tests
  - `inspect` lists every table/series embedded in a document
"#,
    after_help = r#"EXAMPLES
  $ framekit flatten tables.json
  $ framekit significance --min-elements 10 samples.json
  $ cat report.json | framekit inspect

LEARN MORE
  $ framekit <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Join a mapping of labeled tables into one long-form table",
        long_about = r#"Join a JSON object of label -> DataFrame envelope into one DataFrame envelope.

The output's first column holds each row's source label; rows keep input order
and get a fresh 0-based index."#,
        after_help = r#"EXAMPLES
  $ framekit flatten tables.json
  $ framekit flatten --label-field run tables.json | jq '.columns'

NOTES
  - All tables must share the same flat column labels
  - An empty object yields an empty table with only the label column"#
    )]
    Flatten {
        #[arg(help = "Input file (default: stdin; - for stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        #[arg(
            long,
            default_value = DEFAULT_LABEL_FIELD,
            help = "Name of the leading provenance column"
        )]
        label_field: String,
    },
    #[command(
        about = "Pairwise Wilcoxon signed-rank tests across named samples",
        long_about = r#"Run a two-sided Wilcoxon signed-rank test on every pair of samples.

Input is a JSON object of name -> array of numbers. Pairs are reported in
input order; a longer sample is truncated to its partner's length."#,
        after_help = r#"EXAMPLES
  $ framekit significance samples.json
  $ framekit significance --table samples.json

NOTES
  - Truncations are reported as notice JSON lines on stderr
  - significant = p < 0.05; asterisks: **** <= 1e-4, *** <= 1e-3, ** <= 1e-2, * <= 0.05, else ns"#
    )]
    Significance {
        #[arg(help = "Input file (default: stdin; - for stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = DEFAULT_MIN_ELEMENTS,
            help = "Minimum number of elements required in each sample"
        )]
        min_elements: usize,
        #[arg(long, help = "Emit results as a DataFrame envelope")]
        table: bool,
    },
    #[command(
        about = "List tables and series embedded in a JSON document",
        after_help = r#"EXAMPLES
  $ framekit inspect report.json"#
    )]
    Inspect {
        #[arg(help = "Input file (default: stdin; - for stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    #[command(about = "Print version info as JSON")]
    Version,
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn emit_json(value: Value) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_notice(notice: &Notice) {
    let json = serde_json::to_string(&notice_json(notice))
        .unwrap_or_else(|_| "{\"notice\":{\"kind\":\"internal\"}}".to_string());
    eprintln!("{json}");
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("framekit {VERSION}");
    } else {
        emit_json(json!({
            "name": "framekit",
            "version": VERSION,
        }));
    }
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(field) = err.field() {
        lines.push(format!("field: {field}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Validation => "invalid input data".to_string(),
        ErrorKind::Decode => "malformed envelope".to_string(),
        ErrorKind::Shape => "shape mismatch".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);
    let subcommand = usage.and_then(|usage| {
        let mut tokens = usage.split_whitespace().skip_while(|t| *t != "framekit");
        tokens.next()?;
        tokens
            .next()
            .filter(|t| !t.starts_with('-') && !t.starts_with('<') && !t.starts_with('['))
    });
    match subcommand {
        Some(name) => format!("Try `framekit {name} --help`."),
        None => "Try `framekit --help`.".to_string(),
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check the input path and permissions.")
}
