//! AST-backed analysis of a single Python file.
//!
//! An [`Analyzer`] holds the compiled settings (branch query, parameter
//! filtering). Each call to [`Analyzer::analyze_path`] produces a fresh
//! [`Analysis`] which exposes four independent result sets:
//! - `syntax_errors()`: empty, or the first syntax problem
//! - `definitions()`: functions and classes in source order
//! - `imports()`: one record per imported name
//! - `complexity()`: counts of the above plus branch nodes
//!
//! # Lifecycle
//!
//! ```text
//! Unanalyzed ──parse ok──▶ Parsed ──extract──▶ Extracted
//!      │
//!      └──parse failed──▶ ParseFailed (only syntax_errors() is populated)
//! ```
//!
//! Nothing is cached across calls. Extraction is a pure function of the
//! tree, so every accessor can be called repeatedly with identical results.

mod complexity;
mod definitions;
mod facts;
mod imports;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

pub use complexity::{BranchQuery, DEFAULT_BRANCH_KINDS};
pub use definitions::extract_definitions;
pub use facts::{ComplexityMetrics, Definition, DefinitionKind, ImportRecord, ImportStyle};
pub use imports::extract_imports;

use crate::config::Config;
use crate::parser::{AnalyzeError, PythonParser, SourceUnit, StructuralTree, SyntaxError};

/// Settings shared by every analysis produced from one analyzer.
#[derive(Debug)]
struct Settings {
    branches: BranchQuery,
    skip_self_parameter: bool,
}

/// Entry point for analyzing files.
#[derive(Debug, Clone)]
pub struct Analyzer {
    settings: Arc<Settings>,
}

impl Analyzer {
    /// Build an analyzer from configuration.
    ///
    /// The configuration should already be validated; an unknown branch
    /// node kind surfaces here as a grammar error.
    pub fn new(config: &Config) -> Result<Self, AnalyzeError> {
        let branches = BranchQuery::new(&config.branch_kinds())
            .map_err(|e| AnalyzeError::Grammar(e.to_string()))?;
        Ok(Self {
            settings: Arc::new(Settings {
                branches,
                skip_self_parameter: config.skip_self_parameter,
            }),
        })
    }

    /// Read and analyze a file.
    ///
    /// I/O failures are returned as errors; syntax problems are not.
    pub fn analyze_path<P: AsRef<Path>>(&self, path: P) -> Result<Analysis, AnalyzeError> {
        let unit = SourceUnit::read(path)?;
        self.analyze_source(unit)
    }

    /// Analyze text that is already in memory.
    pub fn analyze_source(&self, unit: SourceUnit) -> Result<Analysis, AnalyzeError> {
        let mut parser = PythonParser::new()?;
        let (tree, errors) = match parser.parse(&unit) {
            Ok(tree) => (Some(tree), Vec::new()),
            Err(error) => {
                warn!(path = %unit.path.display(), %error, "syntax error");
                (None, vec![error])
            }
        };

        Ok(Analysis {
            unit,
            tree,
            errors,
            settings: Arc::clone(&self.settings),
        })
    }
}

/// Analyze a file with default settings.
pub fn analyze<P: AsRef<Path>>(path: P) -> Result<Analysis, AnalyzeError> {
    Analyzer::new(&Config::default())?.analyze_path(path)
}

/// The outcome of analyzing one file.
#[derive(Debug, Clone)]
pub struct Analysis {
    unit: SourceUnit,
    /// `None` when parsing failed.
    tree: Option<StructuralTree>,
    errors: Vec<SyntaxError>,
    settings: Arc<Settings>,
}

impl Analysis {
    /// Path of the analyzed file.
    pub fn path(&self) -> &Path {
        &self.unit.path
    }

    /// Whether the file parsed cleanly.
    pub fn is_parsed(&self) -> bool {
        self.tree.is_some()
    }

    /// The structural tree, absent if parsing failed.
    pub fn tree(&self) -> Option<&StructuralTree> {
        self.tree.as_ref()
    }

    /// Syntax errors: empty on success, exactly one on failure.
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn definitions(&self) -> Vec<Definition> {
        match &self.tree {
            Some(tree) => {
                let definitions = extract_definitions(tree, self.settings.skip_self_parameter);
                debug!(count = definitions.len(), "extracted definitions");
                definitions
            }
            None => Vec::new(),
        }
    }

    pub fn imports(&self) -> Vec<ImportRecord> {
        match &self.tree {
            Some(tree) => {
                let imports = extract_imports(tree);
                debug!(count = imports.len(), "extracted imports");
                imports
            }
            None => Vec::new(),
        }
    }

    /// Complexity metrics; all zero when parsing failed.
    pub fn complexity(&self) -> ComplexityMetrics {
        let tree = match &self.tree {
            Some(tree) => tree,
            None => return ComplexityMetrics::default(),
        };

        let definitions = self.definitions();
        let function_count = definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Function)
            .count();

        ComplexityMetrics {
            function_count,
            class_count: definitions.len() - function_count,
            import_count: self.imports().len(),
            branch_count: self.settings.branches.count(tree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_text(source: &str) -> Analysis {
        Analyzer::new(&Config::default())
            .unwrap()
            .analyze_source(SourceUnit::from_text("test.py", source))
            .unwrap()
    }

    #[test]
    fn test_hello_world_scenario() {
        let analysis = analyze_text("def hello_world(name): return name");
        assert!(analysis.syntax_errors().is_empty());
        assert_eq!(analysis.definitions().len(), 1);
        assert!(analysis.imports().is_empty());
        assert_eq!(
            analysis.complexity(),
            ComplexityMetrics {
                function_count: 1,
                class_count: 0,
                import_count: 0,
                branch_count: 0,
            }
        );
    }

    #[test]
    fn test_parse_failure_degrades_to_empty() {
        let analysis = analyze_text("def f(:");
        assert!(!analysis.is_parsed());
        assert_eq!(analysis.syntax_errors().len(), 1);
        assert_eq!(analysis.syntax_errors()[0].line, 1);
        assert!(analysis.definitions().is_empty());
        assert!(analysis.imports().is_empty());
        assert_eq!(analysis.complexity(), ComplexityMetrics::default());
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let analysis = analyze_text("import os\nclass A:\n    def m(self):\n        if os.name:\n            pass\n");
        assert_eq!(analysis.definitions(), analysis.definitions());
        assert_eq!(analysis.imports(), analysis.imports());
        assert_eq!(analysis.complexity(), analysis.complexity());
        assert_eq!(analysis.syntax_errors(), analysis.syntax_errors());
    }

    #[test]
    fn test_counts_match_extracted_sets() {
        let analysis = analyze_text(
            "import a, b\nfrom c import d\n\nclass X:\n    def y(self):\n        def z():\n            pass\n",
        );
        let metrics = analysis.complexity();
        assert_eq!(metrics.function_count + metrics.class_count, analysis.definitions().len());
        assert_eq!(metrics.function_count, 2);
        assert_eq!(metrics.class_count, 1);
        assert_eq!(metrics.import_count, analysis.imports().len());
        assert_eq!(metrics.import_count, 3);
    }

    #[test]
    fn test_analysis_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analysis>();
        assert_send_sync::<Analyzer>();
    }

    #[test]
    fn test_skip_self_parameter_disabled() {
        let config = Config {
            skip_self_parameter: false,
            ..Config::default()
        };
        let analysis = Analyzer::new(&config)
            .unwrap()
            .analyze_source(SourceUnit::from_text("t.py", "class A:\n    def m(self, x):\n        pass\n"))
            .unwrap();
        assert_eq!(analysis.definitions()[1].parameters, vec!["self", "x"]);
    }
}
