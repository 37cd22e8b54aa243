//! Editor command surface.
//!
//! Editor plugins call pyscope with the active buffer's path and one of two
//! actions, then read a single JSON document from stdout:
//! - `analyze-current-file`: the full [`JsonReport`]
//! - `show-definitions`: a quickfix list (`[{filename, lnum, col, text}]`)

use std::path::Path;

use tracing::debug;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::parser::AnalyzeError;
use crate::report::{self, JsonReport, NavigationEntry};

/// File extensions accepted by editor actions.
const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// A named editor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EditorAction {
    /// Full analysis of the current file
    AnalyzeCurrentFile,
    /// Definitions as a navigation list
    ShowDefinitions,
}

/// What an editor action produced.
#[derive(Debug)]
pub enum EditorResponse {
    Analysis(JsonReport),
    Definitions(Vec<NavigationEntry>),
    /// The buffer is not a Python file; nothing was analyzed.
    NotPython { message: String },
}

impl EditorResponse {
    /// Serialize for the plugin to parse.
    pub fn to_json(&self) -> anyhow::Result<String> {
        let json = match self {
            EditorResponse::Analysis(report) => serde_json::to_string_pretty(report)?,
            EditorResponse::Definitions(entries) => report::render_quickfix_json(entries)?,
            EditorResponse::NotPython { message } => serde_json::to_string(message)?,
        };
        Ok(json)
    }
}

/// Check if a path looks like a Python source file.
pub fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PYTHON_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Run an editor action against the active file.
pub fn dispatch(
    action: EditorAction,
    path: &Path,
    analyzer: &Analyzer,
    config: &Config,
) -> Result<EditorResponse, AnalyzeError> {
    if config.require_python_extension && !is_python_file(path) {
        debug!(path = %path.display(), "editor action on non-Python buffer");
        return Ok(EditorResponse::NotPython {
            message: "Not a Python file".to_string(),
        });
    }

    let analysis = analyzer.analyze_path(path)?;
    let response = match action {
        EditorAction::AnalyzeCurrentFile => {
            EditorResponse::Analysis(JsonReport::from_analysis(&analysis))
        }
        EditorAction::ShowDefinitions => {
            let path_str = path.to_string_lossy();
            EditorResponse::Definitions(report::navigation_list(&path_str, &analysis.definitions()))
        }
    };
    Ok(response)
}
