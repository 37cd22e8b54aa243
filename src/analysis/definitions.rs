//! Function and class extraction.

use tree_sitter::Node;

use crate::analysis::{Definition, DefinitionKind};
use crate::parser::StructuralTree;

/// What the walker is currently inside of.
#[derive(Clone)]
enum Scope {
    Module,
    /// Qualified name of the class body being walked.
    Class(String),
    Function,
}

/// Extract all definitions in source order.
///
/// Nested definitions are included. Only class enclosure is tracked: a
/// function inside another function has no `enclosing`.
pub fn extract_definitions(tree: &StructuralTree, skip_self: bool) -> Vec<Definition> {
    let mut definitions = Vec::new();
    walk(tree, tree.root(), &Scope::Module, skip_self, &mut definitions);
    definitions
}

fn walk(
    tree: &StructuralTree,
    node: Node,
    scope: &Scope,
    skip_self: bool,
    out: &mut Vec<Definition>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" | "class_definition" => {
                visit_definition(tree, child, Vec::new(), scope, skip_self, out);
            }
            "decorated_definition" => {
                let decorators = decorators(tree, child);
                if let Some(def) = child.child_by_field_name("definition") {
                    visit_definition(tree, def, decorators, scope, skip_self, out);
                }
            }
            _ => walk(tree, child, scope, skip_self, out),
        }
    }
}

fn visit_definition(
    tree: &StructuralTree,
    node: Node,
    decorators: Vec<String>,
    scope: &Scope,
    skip_self: bool,
    out: &mut Vec<Definition>,
) {
    let name = match node.child_by_field_name("name") {
        Some(n) => tree.node_text(n).to_string(),
        None => return,
    };
    let enclosing = match scope {
        Scope::Class(qualified) => Some(qualified.clone()),
        _ => None,
    };
    let position = node.start_position();
    let body = node.child_by_field_name("body");
    let docstring = body.and_then(|b| docstring(tree, b));

    let (kind, inner_scope) = if node.kind() == "class_definition" {
        let qualified = match &enclosing {
            Some(outer) => format!("{}.{}", outer, name),
            None => name.clone(),
        };
        (DefinitionKind::Class, Scope::Class(qualified))
    } else {
        (DefinitionKind::Function, Scope::Function)
    };

    let (is_async, parameters, returns) = if kind == DefinitionKind::Function {
        (
            is_async(node),
            node.child_by_field_name("parameters")
                .map(|p| parameters(tree, p, skip_self))
                .unwrap_or_default(),
            node.child_by_field_name("return_type")
                .map(|r| tree.node_text(r).to_string()),
        )
    } else {
        (false, Vec::new(), None)
    };

    out.push(Definition {
        kind,
        name,
        line: position.row + 1,
        column: tree.column(node),
        enclosing,
        is_async,
        decorators,
        parameters,
        returns,
        docstring,
    });

    if let Some(body) = body {
        walk(tree, body, &inner_scope, skip_self, out);
    }
}

fn is_async(func_node: Node) -> bool {
    func_node
        .child(0)
        .map(|first| first.kind() == "async")
        .unwrap_or(false)
}

fn decorators(tree: &StructuralTree, decorated: Node) -> Vec<String> {
    decorated
        .named_children(&mut decorated.walk())
        .filter(|n| n.kind() == "decorator")
        .map(|n| tree.node_text(n).trim_start_matches('@').trim().to_string())
        .collect()
}

fn parameters(tree: &StructuralTree, params: Node, skip_self: bool) -> Vec<String> {
    let mut names = Vec::new();
    for param in params.named_children(&mut params.walk()) {
        let name = match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                tree.node_text(param).to_string()
            }
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .map(|n| tree.node_text(n).to_string())
                .unwrap_or_default(),
            // `name: type` has no name field; the pattern is the first child.
            "typed_parameter" => param
                .named_child(0)
                .map(|n| tree.node_text(n).to_string())
                .unwrap_or_default(),
            // keyword_separator (`*`), positional_separator (`/`), comments
            _ => continue,
        };
        if name.is_empty() || (skip_self && name == "self") {
            continue;
        }
        names.push(name);
    }
    names
}

/// The docstring of a body block: a string literal as the first statement.
///
/// f-strings and bytes literals are not docstrings. Implicitly concatenated
/// literals are joined, and escape sequences are decoded unless the literal
/// is raw.
fn docstring(tree: &StructuralTree, body: Node) -> Option<String> {
    let first = body
        .named_children(&mut body.walk())
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    let content = match literal.kind() {
        "string" => string_value(tree, literal)?,
        "concatenated_string" => {
            let mut joined = String::new();
            for part in literal.named_children(&mut literal.walk()) {
                if part.kind() == "string" {
                    joined.push_str(&string_value(tree, part)?);
                }
            }
            joined
        }
        _ => return None,
    };
    Some(clean_docstring(&content))
}

/// The value of a plain (non-f, non-bytes) string literal.
fn string_value(tree: &StructuralTree, string: Node) -> Option<String> {
    let mut cursor = string.walk();
    let children: Vec<Node> = string.children(&mut cursor).collect();
    let start = children.iter().find(|c| c.kind() == "string_start")?;
    let end = children.iter().rev().find(|c| c.kind() == "string_end")?;
    if children.iter().any(|c| c.kind() == "interpolation") {
        return None;
    }

    let prefix = tree
        .node_text(*start)
        .trim_end_matches(['"', '\''])
        .to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let body = tree.source().get(start.end_byte()..end.start_byte())?;
    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(decode_escapes(body))
    }
}

/// Decode backslash escapes the way Python does for `str` literals.
///
/// Unknown escapes and `\N{...}` names are kept verbatim.
fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '\\' | '\'' | '"' => out.push(escape),
            '0'..='7' => {
                let mut digits = String::from(escape);
                while digits.len() < 3 {
                    match chars.next_if(|d| ('0'..='7').contains(d)) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                push_code_point(&mut out, &digits, 8, escape);
            }
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut digits = String::new();
                while digits.len() < width {
                    match chars.next_if(char::is_ascii_hexdigit) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                if digits.len() == width {
                    push_code_point(&mut out, &digits, 16, escape);
                } else {
                    out.push('\\');
                    out.push(escape);
                    out.push_str(&digits);
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code_point(out: &mut String, digits: &str, radix: u32, escape: char) {
    match u32::from_str_radix(digits, radix).ok().and_then(char::from_u32) {
        Some(decoded) => out.push(decoded),
        None => {
            out.push('\\');
            if radix == 16 {
                out.push(escape);
            }
            out.push_str(digits);
        }
    }
}

/// Strip the common indentation of continuation lines and surrounding blank lines.
fn clean_docstring(raw: &str) -> String {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or("").trim().to_string();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned = vec![first];
    for line in rest {
        let stripped = line.get(indent..).unwrap_or_else(|| line.trim_start());
        cleaned.push(stripped.trim_end().to_string());
    }

    cleaned.join("\n").trim().to_string()
}
