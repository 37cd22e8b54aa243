//! Checks for source that the tree-sitter grammar accepts but Python rejects.
//!
//! The grammar is permissive in two ways that matter here:
//! - indentation comes from an external scanner that never fails, so a bad
//!   dedent or a missing block body still yields an error-free tree
//! - Python 2 statements (`print x`, `exec code`) are still part of it
//!
//! Both passes only look at well-formed regions of the tree. ERROR subtrees
//! are skipped and left to [`first_syntax_error`](super::first_syntax_error).

use tree_sitter::Node;

use super::{char_column, SyntaxError};

/// Tab stops used when measuring indentation.
const TAB_WIDTH: usize = 8;

/// Clause nodes that start their own logical line inside a compound statement.
const CLAUSE_KINDS: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
];

// =============================================================================
// Indentation
// =============================================================================

/// The start of a logical line.
#[derive(Debug, Clone, Copy)]
struct LogicalLine {
    row: usize,
    /// Indentation width with tabs expanded.
    indent: usize,
    /// Column of the first token (1-indexed, in characters).
    column: usize,
    /// The line is a compound statement header whose body is on later lines.
    opens_block: bool,
}

/// Replay Python's indentation stack over the logical lines of a tree.
///
/// Returns the first of:
/// - `unexpected indent`: deeper than the current block without a header
/// - `expected an indented block`: a header whose body is not indented
/// - `unindent does not match any outer indentation level`
pub fn indentation_error(root: Node, source: &str) -> Option<SyntaxError> {
    let mut lines = Vec::new();
    collect_block(root, source, &mut lines);
    lines.sort_by_key(|l| l.row);
    lines.dedup_by_key(|l| l.row);

    let mut stack = vec![0usize];
    let mut header: Option<LogicalLine> = None;

    for line in &lines {
        let top = stack.last().copied().unwrap_or(0);
        if line.indent > top {
            if header.is_none() {
                return Some(error_at(line, "unexpected indent"));
            }
            stack.push(line.indent);
        } else {
            if header.is_some() {
                return Some(error_at(line, "expected an indented block"));
            }
            while stack.last().is_some_and(|&level| line.indent < level) {
                stack.pop();
            }
            if stack.last() != Some(&line.indent) {
                return Some(error_at(
                    line,
                    "unindent does not match any outer indentation level",
                ));
            }
        }
        header = line.opens_block.then_some(*line);
    }

    // A header on the last logical line never got its body.
    header.map(|h| SyntaxError {
        message: "expected an indented block".to_string(),
        line: h.row + 2,
        column: 0,
    })
}

fn error_at(line: &LogicalLine, message: &str) -> SyntaxError {
    SyntaxError {
        message: message.to_string(),
        line: line.row + 1,
        column: line.column,
    }
}

/// Statements of a `module` or `block`.
fn collect_block(block: Node, source: &str, out: &mut Vec<LogicalLine>) {
    let mut cursor = block.walk();
    for child in block.named_children(&mut cursor) {
        match child.kind() {
            "comment" | "ERROR" => {}
            _ => collect_statement(child, source, out),
        }
    }
}

fn collect_statement(node: Node, source: &str, out: &mut Vec<LogicalLine>) {
    if let Some(line) = logical_line(node, source) {
        out.push(line);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "block" => collect_block(child, source, out),
            "decorator" => out.extend(logical_line(child, source)),
            "function_definition" | "class_definition" => collect_statement(child, source, out),
            kind if CLAUSE_KINDS.contains(&kind) => collect_statement(child, source, out),
            _ => {}
        }
    }
}

/// Describe the line a node starts, if the node is the first token on it.
fn logical_line(node: Node, source: &str) -> Option<LogicalLine> {
    let start = node.start_byte();
    let line_start = start.saturating_sub(node.start_position().column);
    let prefix = source.get(line_start..start)?;
    if !prefix.chars().all(|c| matches!(c, ' ' | '\t' | '\x0c')) {
        return None;
    }
    if continues_previous_line(source, line_start) {
        return None;
    }

    Some(LogicalLine {
        row: node.start_position().row,
        indent: indent_width(prefix),
        column: char_column(source, node),
        opens_block: opens_block(node),
    })
}

/// The previous physical line ends in a backslash continuation.
fn continues_previous_line(source: &str, line_start: usize) -> bool {
    source
        .get(..line_start)
        .map(|before| before.trim_end_matches(['\n', '\r']).ends_with('\\'))
        .unwrap_or(false)
}

fn indent_width(prefix: &str) -> usize {
    prefix.chars().fold(0, |width, c| match c {
        '\t' => (width / TAB_WIDTH + 1) * TAB_WIDTH,
        // Form feed resets the count, as in CPython's tokenizer.
        '\x0c' => 0,
        _ => width + 1,
    })
}

/// A header whose body is not on the same line as its colon.
///
/// An empty `block` counts: the grammar accepts a bare newline as a body,
/// which Python does not.
fn opens_block(node: Node) -> bool {
    let mut cursor = node.walk();
    let Some(block) = node.children(&mut cursor).find(|c| c.kind() == "block") else {
        return false;
    };

    let colon_row = block
        .prev_sibling()
        .map(|colon| colon.end_position().row)
        .unwrap_or_else(|| node.start_position().row);
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    match first {
        Some(statement) => statement.start_position().row > colon_row,
        None => true,
    }
}

// =============================================================================
// Constructs outside Python 3
// =============================================================================

/// Find the first construct the grammar accepts but Python 3 does not.
pub fn unsupported_construct(root: Node, source: &str) -> Option<SyntaxError> {
    if root.is_error() {
        return None;
    }
    if let Some(message) = reject(root, source) {
        return Some(SyntaxError {
            message,
            line: root.start_position().row + 1,
            column: char_column(source, root),
        });
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if let Some(found) = unsupported_construct(child, source) {
            return Some(found);
        }
    }
    None
}

fn reject(node: Node, source: &str) -> Option<String> {
    let message = match node.kind() {
        "print_statement" => "missing parentheses in call to 'print'".to_string(),
        "exec_statement" => "missing parentheses in call to 'exec'".to_string(),
        "delete_statement" => {
            let target = node.named_child(0)?;
            return invalid_delete_target(target).map(|what| format!("cannot delete {}", what));
        }
        "yield" if node.is_named() && bare_in_lambda(node) => "invalid syntax".to_string(),
        // The Python 2 inequality operator.
        "<>" if !node.is_named() => "invalid syntax".to_string(),
        "integer" => return invalid_integer(node.utf8_text(source.as_bytes()).ok()?),
        _ => return None,
    };
    Some(message)
}

/// A `yield` inside a lambda body without parentheses around it.
fn bare_in_lambda(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        match ancestor.kind() {
            "lambda" => return true,
            "parenthesized_expression" | "expression_statement" | "block" | "module" => {
                return false
            }
            _ => current = ancestor.parent(),
        }
    }
    false
}

/// Name the first target of a `del` that cannot be deleted.
fn invalid_delete_target(target: Node) -> Option<&'static str> {
    match target.kind() {
        "identifier" | "attribute" | "subscript" => None,
        "expression_list" | "tuple" | "list" | "parenthesized_expression" | "tuple_pattern"
        | "list_pattern" => {
            let mut cursor = target.walk();
            let found = target
                .named_children(&mut cursor)
                .filter(|c| c.kind() != "comment")
                .find_map(invalid_delete_target);
            found
        }
        "call" => Some("function call"),
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none" => {
            Some("literal")
        }
        _ => Some("expression"),
    }
}

/// Python 2 integer spellings: `0777` octals and the `L` suffix.
fn invalid_integer(text: &str) -> Option<String> {
    if text.ends_with(['l', 'L']) {
        return Some("invalid decimal literal".to_string());
    }
    let digits = text.replace('_', "");
    let is_decimal = digits.chars().all(|c| c.is_ascii_digit());
    if is_decimal && digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0')
    {
        return Some("leading zeros in decimal integer literals are not permitted".to_string());
    }
    None
}
