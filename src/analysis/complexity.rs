//! Branch counting for complexity metrics.
//!
//! Branch-like nodes are matched with a tree-sitter query generated from a
//! list of node kinds, so the set can be tuned from configuration.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor, QueryError};

use crate::parser::{self, StructuralTree};

/// Node kinds counted as branches by default.
///
/// Counts:
/// - if statements and elif clauses
/// - for and while loops
/// - except clauses
/// - conditional expressions (ternary)
/// - match case clauses
pub const DEFAULT_BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "conditional_expression",
    "case_clause",
];

/// A compiled query matching every configured branch node kind.
#[derive(Debug)]
pub struct BranchQuery {
    query: Option<Query>,
}

impl BranchQuery {
    /// Compile a query for the given node kinds.
    ///
    /// Fails if a kind does not exist in the Python grammar.
    pub fn new<I, S>(kinds: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let source: String = kinds
            .into_iter()
            .map(|k| format!("({}) @branch\n", k.as_ref()))
            .collect();
        if source.is_empty() {
            return Ok(Self { query: None });
        }

        let query = Query::new(&parser::language(), &source)?;
        Ok(Self { query: Some(query) })
    }

    /// Query over [`DEFAULT_BRANCH_KINDS`].
    pub fn default_kinds() -> Result<Self, QueryError> {
        Self::new(DEFAULT_BRANCH_KINDS)
    }

    /// Count branch nodes in a tree.
    pub fn count(&self, tree: &StructuralTree) -> usize {
        let query = match &self.query {
            Some(q) => q,
            None => return 0,
        };

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root(), tree.source().as_bytes());

        let mut count = 0;
        while matches.next().is_some() {
            count += 1;
        }
        count
    }
}
