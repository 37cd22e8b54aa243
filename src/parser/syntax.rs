//! Locating the first syntax problem in a tree-sitter tree.

use tree_sitter::Node;

use super::{char_column, SyntaxError};

/// Longest token text quoted back in an "unexpected" message.
const MAX_TOKEN_LEN: usize = 24;

/// Find the first ERROR or MISSING node in document order.
///
/// Returns `None` for a clean tree.
pub fn first_syntax_error(root: Node, source: &str) -> Option<SyntaxError> {
    if !root.has_error() {
        return None;
    }

    let node = match first_error_node(root) {
        Some(n) => n,
        // has_error() was true but no concrete node was found; still not clean.
        None => {
            return Some(SyntaxError {
                message: "invalid syntax".to_string(),
                line: 1,
                column: 0,
            })
        }
    };

    Some(SyntaxError {
        message: describe(node, source.as_bytes()),
        line: node.start_position().row + 1,
        column: char_column(source, node),
    })
}

fn first_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_missing() || child.has_error() {
            if let Some(found) = first_error_node(child) {
                return Some(found);
            }
        }
    }
    None
}

fn describe(node: Node, source: &[u8]) -> String {
    if node.is_missing() {
        return if node.is_named() {
            format!("missing {}", node.kind())
        } else {
            format!("missing '{}'", node.kind())
        };
    }

    // An ERROR node wrapping a single token points straight at the culprit.
    if let Some(token) = single_token(node) {
        let text = token.utf8_text(source).unwrap_or("").trim();
        if !text.is_empty() && text.len() <= MAX_TOKEN_LEN && !text.contains('\n') {
            return format!("unexpected '{}'", text);
        }
    }

    "invalid syntax".to_string()
}

fn single_token(node: Node) -> Option<Node> {
    let mut current = node;
    loop {
        match current.child_count() {
            0 => return (current.id() != node.id()).then_some(current),
            1 => current = current.child(0)?,
            _ => return None,
        }
    }
}
