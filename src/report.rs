//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Text: colored terminal summary for human readability
//! - JSON: the full analysis payload for editor plugins
//! - Quickfix: a navigation list of definitions (`path:line:col: text`)

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    Analysis, ComplexityMetrics, Definition, DefinitionKind, ImportRecord, ImportStyle,
};
use crate::parser::SyntaxError;

// =============================================================================
// JSON Format
// =============================================================================

/// The full analysis payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub file: String,
    pub errors: Vec<SyntaxError>,
    pub definitions: Vec<Definition>,
    pub imports: Vec<ImportRecord>,
    pub complexity: ComplexityMetrics,
}

impl JsonReport {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            file: analysis.path().to_string_lossy().to_string(),
            errors: analysis.syntax_errors().to_vec(),
            definitions: analysis.definitions(),
            imports: analysis.imports(),
            complexity: analysis.complexity(),
        }
    }
}

/// Render the full analysis as pretty-printed JSON.
pub fn render_json(analysis: &Analysis) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::from_analysis(analysis))?)
}

// =============================================================================
// Navigation list
// =============================================================================

/// A jump target for a location-picker UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    #[serde(rename = "filename")]
    pub path: String,
    #[serde(rename = "lnum")]
    pub line: usize,
    #[serde(rename = "col")]
    pub column: usize,
    pub text: String,
}

/// Build the navigation list for a file's definitions, in source order.
pub fn navigation_list(path: &str, definitions: &[Definition]) -> Vec<NavigationEntry> {
    definitions
        .iter()
        .map(|d| NavigationEntry {
            path: path.to_string(),
            line: d.line,
            column: d.column,
            text: describe_definition(d),
        })
        .collect()
}

/// Label used in the navigation list.
pub fn describe_definition(definition: &Definition) -> String {
    match (definition.kind, &definition.enclosing) {
        (DefinitionKind::Class, _) => format!("Class: {}", definition.name),
        (DefinitionKind::Function, Some(class)) => {
            let label = if definition.is_async { "Async method" } else { "Method" };
            format!("{}: {} in {}", label, definition.name, class)
        }
        (DefinitionKind::Function, None) => {
            let label = if definition.is_async { "Async function" } else { "Function" };
            format!("{}: {}", label, definition.name)
        }
    }
}

/// Render a navigation list in vim's default `errorformat`.
pub fn render_quickfix(entries: &[NavigationEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{}:{}:{}: {}\n", entry.path, entry.line, entry.column, entry.text));
    }
    out
}

/// Render a navigation list as JSON for `setqflist()`.
pub fn render_quickfix_json(entries: &[NavigationEntry]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(entries)?)
}

// =============================================================================
// Text Format
// =============================================================================

/// Render a terminal summary.
///
/// A file with a syntax error only lists the error.
pub fn render_text(analysis: &Analysis) -> String {
    let mut out = String::new();

    let errors = analysis.syntax_errors();
    if !errors.is_empty() {
        write_errors(&mut out, errors);
        return out;
    }

    write_definitions(&mut out, &analysis.definitions());
    out.push('\n');
    write_imports(&mut out, &analysis.imports());
    out.push('\n');
    write_complexity(&mut out, &analysis.complexity());
    out
}

fn write_errors(out: &mut String, errors: &[SyntaxError]) {
    out.push_str(&format!("{}\n", "Syntax Errors:".red().bold()));
    for error in errors {
        out.push_str(&format!("  Line {}: {}\n", error.line, error.message));
    }
}

fn write_definitions(out: &mut String, definitions: &[Definition]) {
    out.push_str(&format!("{}\n", "Definitions:".cyan().bold()));
    if definitions.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
        return;
    }

    for definition in definitions {
        // One indent level per enclosing class.
        let depth = definition
            .enclosing
            .as_deref()
            .map(|c| c.split('.').count())
            .unwrap_or(0);
        let indent = "  ".repeat(depth + 1);
        let line = format!("(Line {})", definition.line);

        match definition.kind {
            DefinitionKind::Class => {
                out.push_str(&format!("{}Class: {} {}\n", indent, definition.name, line.dimmed()));
            }
            DefinitionKind::Function => {
                let label = match (definition.is_method(), definition.is_async) {
                    (true, false) => "Method",
                    (true, true) => "Async method",
                    (false, false) => "Function",
                    (false, true) => "Async function",
                };
                let returns = definition
                    .returns
                    .as_deref()
                    .map(|r| format!(" -> {}", r))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{}{}: {}({}){} {}\n",
                    indent,
                    label,
                    definition.name,
                    definition.parameters.join(", "),
                    returns,
                    line.dimmed()
                ));
            }
        }
    }
}

fn write_imports(out: &mut String, imports: &[ImportRecord]) {
    out.push_str(&format!("{}\n", "Imports:".cyan().bold()));
    if imports.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
        return;
    }

    for import in imports {
        let keyword = match import.style {
            ImportStyle::Plain => "import",
            ImportStyle::From => "from",
        };
        out.push_str(&format!(
            "  {} {} {}\n",
            keyword.dimmed(),
            import,
            format!("(Line {})", import.line).dimmed()
        ));
    }
}

fn write_complexity(out: &mut String, metrics: &ComplexityMetrics) {
    out.push_str(&format!(
        "{} {} functions, {} classes, {} imports, {} branches\n",
        "Complexity:".cyan().bold(),
        metrics.function_count,
        metrics.class_count,
        metrics.import_count,
        metrics.branch_count
    ));
}
