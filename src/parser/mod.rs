//! Python source parsing.
//!
//! This module turns a file on disk into a [`StructuralTree`]:
//! - `SourceUnit`: the path and text, read once per analysis
//! - `PythonParser`: tree-sitter wrapper that rejects trees containing errors
//! - `SyntaxError`: location and message of the first syntax problem
//!
//! tree-sitter recovers from far more than Python does, so a tree is only
//! accepted when it has no ERROR or MISSING node, its indentation replays
//! cleanly, and it uses no construct that Python 3 dropped.
//!
//! Reading and parsing are separate steps so that I/O failures
//! (`AnalyzeError::Io`) never get confused with syntax problems, which are
//! reported as plain data.

mod syntax;
mod validate;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tree_sitter::{Language, Node, Parser as TsParser, Tree};

pub use syntax::first_syntax_error;
pub use validate::{indentation_error, unsupported_construct};

/// Errors that abort an analysis run.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("python grammar unavailable: {0}")]
    Grammar(String),
}

/// The tree-sitter Python grammar.
pub fn language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// 1-indexed column of a node's start, counted in characters.
///
/// tree-sitter positions are byte offsets, which drift on lines holding
/// non-ASCII text.
pub fn char_column(source: &str, node: Node) -> usize {
    let start = node.start_byte();
    let byte_column = node.start_position().column;
    source
        .get(start.saturating_sub(byte_column)..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(byte_column)
        + 1
}

/// A source file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Path as given by the caller.
    pub path: PathBuf,
    /// Full file contents.
    pub text: String,
}

impl SourceUnit {
    /// Read a file as UTF-8 text.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AnalyzeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "read source file");
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Wrap text that did not come from disk (editor buffers, tests).
    pub fn from_text<P: Into<PathBuf>>(path: P, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A syntax problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed, in characters), 0 when unknown.
    pub column: usize,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A successfully parsed, error-free syntax tree.
///
/// Only [`PythonParser::parse`] builds these, so every tree handed to the
/// extractors is free of ERROR and MISSING nodes.
#[derive(Debug, Clone)]
pub struct StructuralTree {
    tree: Tree,
    source: String,
}

impl StructuralTree {
    /// The root `module` node.
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// The text the tree was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get text for a node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Character column of a node (1-indexed).
    pub fn column(&self, node: tree_sitter::Node) -> usize {
        char_column(&self.source, node)
    }
}

/// All-or-nothing Python parser.
pub struct PythonParser {
    inner: TsParser,
}

impl PythonParser {
    /// Create a parser. Fails only when the grammar cannot be loaded.
    pub fn new() -> Result<Self, AnalyzeError> {
        let mut inner = TsParser::new();
        inner
            .set_language(&language())
            .map_err(|e| AnalyzeError::Grammar(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parse a source unit.
    ///
    /// Returns the first syntax problem in document order, whether the
    /// grammar could not match the file or matched something Python rejects.
    pub fn parse(&mut self, unit: &SourceUnit) -> Result<StructuralTree, SyntaxError> {
        let tree = self
            .inner
            .parse(&unit.text, None)
            .ok_or_else(|| SyntaxError {
                message: "source could not be parsed".to_string(),
                line: 1,
                column: 0,
            })?;

        let root = tree.root_node();
        let first = [
            first_syntax_error(root, &unit.text),
            indentation_error(root, &unit.text),
            unsupported_construct(root, &unit.text),
        ]
        .into_iter()
        .flatten()
        .min_by_key(|e| (e.line, e.column));

        if let Some(error) = first {
            debug!(
                path = %unit.path.display(),
                line = error.line,
                message = %error.message,
                "parse rejected"
            );
            return Err(error);
        }

        debug!(path = %unit.path.display(), "parsed source");
        Ok(StructuralTree {
            tree,
            source: unit.text.clone(),
        })
    }
}
