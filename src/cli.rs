//! Command-line interface for pyscope.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::editor::{self, EditorAction};
use crate::parser::AnalyzeError;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Analyze a Python file - definitions, imports and complexity.
///
/// A syntax error in the file is reported as a finding and still exits 0.
/// Only unreadable files and invalid configuration exit non-zero.
#[derive(Parser, Debug)]
#[command(name = "pyscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Python file to analyze
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Run an editor action and print its JSON response (overrides --format)
    #[arg(short, long, value_enum)]
    pub editor: Option<EditorAction>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Output formats for a plain analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Full analysis as JSON
    Json,
    /// Definitions as `path:line:col: text` lines
    Quickfix,
}

/// Run the CLI and return the process exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let cwd = std::env::current_dir()?;
    let config = match Config::load(cli.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let analyzer = match Analyzer::new(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Some(action) = cli.editor {
        return run_editor(action, cli, &analyzer, &config);
    }

    let analysis = match analyzer.analyze_path(&cli.path) {
        Ok(a) => a,
        Err(e) => return Ok(report_fatal(&e)),
    };

    let output = match cli.format {
        OutputFormat::Text => report::render_text(&analysis),
        OutputFormat::Json => report::render_json(&analysis)?,
        OutputFormat::Quickfix => {
            let path = cli.path.to_string_lossy();
            report::render_quickfix(&report::navigation_list(&path, &analysis.definitions()))
        }
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(EXIT_SUCCESS)
}

fn run_editor(
    action: EditorAction,
    cli: &Cli,
    analyzer: &Analyzer,
    config: &Config,
) -> anyhow::Result<i32> {
    match editor::dispatch(action, &cli.path, analyzer, config) {
        Ok(response) => {
            println!("{}", response.to_json()?);
            Ok(EXIT_SUCCESS)
        }
        Err(e) => Ok(report_fatal(&e)),
    }
}

fn report_fatal(error: &AnalyzeError) -> i32 {
    eprintln!("Error: {}", error);
    EXIT_ERROR
}
