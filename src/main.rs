mod report;

use boolsieve::export::{self, ExportOptions, LeafStyle};
use boolsieve::{CaseFolding, Options, compile_with};
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Compile boolean string conditions once and match inputs against them.
#[derive(Parser)]
#[command(name = "boolsieve", version)]
#[command(after_help = "Exit codes:\n  0  Success.\n  2  Invalid arguments, unreadable input or a condition that fails to compile.")]
struct Cli {
    /// Condition to compile; repeat for more. Indices follow the order given
    #[arg(short = 'c', long = "condition", value_name = "CONDITION", action = clap::ArgAction::Append)]
    conditions: Vec<String>,

    /// Read further conditions from a file, one per line (blank lines are empty conditions)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: Option<PathBuf>,

    /// Lower case-insensitive literals and inputs with ASCII rules only
    #[arg(long)]
    ascii_folding: bool,

    /// Print the compiled conditions as a search query (JSON) on FIELD and exit
    #[arg(long, value_name = "FIELD", num_args = 0..=1, default_missing_value = "raw")]
    export: Option<String>,

    /// With --export, render literals as match_phrase instead of wildcard queries
    #[arg(long, requires = "export")]
    match_phrase: bool,

    /// Force ANSI color output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI color output
    #[arg(long)]
    no_color: bool,

    /// Input text to match. If omitted, reads stdin
    input: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

/// Library logs go to stderr, filtered by `BOOLSIEVE_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BOOLSIEVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn run(cli: Cli) -> Result<(), String> {
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    let mut conditions = cli.conditions;
    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .map_err(|err| format!("error: failed to read {}: {err}", path.display()))?;
        conditions.extend(text.lines().map(str::to_string));
    }
    if conditions.is_empty() {
        return Err("error: no conditions given (use -c or -f)\n\nFor more information, try '--help'.".to_string());
    }

    let case_folding = if cli.ascii_folding { CaseFolding::Ascii } else { CaseFolding::Unicode };
    let matcher = match compile_with(&conditions, &Options { case_folding }) {
        Ok(matcher) => matcher,
        Err(err) => return Err(report::compile_error(&conditions, &err, color)),
    };

    if let Some(field) = cli.export {
        let leaf = if cli.match_phrase { LeafStyle::MatchPhrase } else { LeafStyle::Wildcard };
        let query = export::to_query(&matcher, &ExportOptions { field, leaf });
        let text = serde_json::to_string_pretty(&query).map_err(|err| format!("error: failed to render query: {err}"))?;
        println!("{text}");
        return Ok(());
    }

    let input = if cli.input.is_empty() { read_stdin_input()? } else { cli.input.join(" ") };
    let run = matcher.match_with_metrics(&input);
    report::print_run(&matcher, &input, &run, color);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    // A trailing newline from `echo` is not part of the input.
    if buffer.ends_with('\n') {
        buffer.pop();
        if buffer.ends_with('\r') {
            buffer.pop();
        }
    }
    Ok(buffer)
}
