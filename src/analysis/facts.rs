//! Fact structures extracted from a structural tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Function,
    Class,
}

impl DefinitionKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::Class => "class",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function or class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// Line of the `def`/`class` keyword (1-indexed), decorators excluded.
    pub line: usize,
    /// Column of the definition (1-indexed).
    pub column: usize,
    /// Qualified name of the class directly containing this definition.
    ///
    /// `None` at module level and inside function bodies.
    pub enclosing: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    /// Decorator expressions without the leading `@`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    /// Parameter names for functions (empty for classes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// Return annotation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl Definition {
    /// Get the qualified name (`Class.method` for methods).
    pub fn qualified_name(&self) -> String {
        match &self.enclosing {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }

    /// A function defined directly in a class body.
    pub fn is_method(&self) -> bool {
        self.kind == DefinitionKind::Function && self.enclosing.is_some()
    }

    /// Private by naming convention (leading underscore, dunders included).
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// How an import was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStyle {
    /// `import a.b [as c]`
    Plain,
    /// `from a import b [as c]`
    From,
}

/// One imported module.
///
/// `from X import Y` is normalized to module `X.Y`. Relative imports keep
/// their leading dots (`from . import y` becomes `.y`), and a wildcard
/// import becomes `X.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub module: String,
    pub alias: Option<String>,
    /// Line of the import statement (1-indexed).
    pub line: usize,
    pub style: ImportStyle,
}

impl fmt::Display for ImportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} as {}", self.module, alias),
            None => write!(f, "{}", self.module),
        }
    }
}

/// Aggregate complexity snapshot for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub function_count: usize,
    pub class_count: usize,
    pub import_count: usize,
    /// Conditionals, loops and exception handlers.
    pub branch_count: usize,
}
