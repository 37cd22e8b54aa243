//! pyscope - single-file Python analyzer.
//!
//! pyscope parses one Python file and reports syntax validity, function
//! and class definitions, imported modules, and coarse complexity counts.
//! It serves both a terminal CLI and editor plugins (quickfix lists).
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis:
//!
//! - `parser`: reads source files and builds error-free structural trees
//! - `analysis`: extracts definitions, imports and complexity from a tree
//! - `config`: optional YAML configuration
//! - `report`: output formatting (text, JSON, quickfix)
//! - `editor`: the two editor actions and their JSON responses
//! - `cli`: command-line surface
//!
//! # Example
//!
//! ```no_run
//! let analysis = pyscope::analyze("app.py")?;
//! for def in analysis.definitions() {
//!     println!("{} {} (line {})", def.kind, def.qualified_name(), def.line);
//! }
//! # Ok::<(), pyscope::AnalyzeError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod editor;
pub mod parser;
pub mod report;

pub use analysis::{
    analyze, Analysis, Analyzer, ComplexityMetrics, Definition, DefinitionKind, ImportRecord,
    ImportStyle,
};
pub use config::Config;
pub use editor::{EditorAction, EditorResponse};
pub use parser::{AnalyzeError, PythonParser, SourceUnit, StructuralTree, SyntaxError};
