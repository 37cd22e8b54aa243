//! Import statement extraction.

use tree_sitter::Node;

use crate::analysis::{ImportRecord, ImportStyle};
use crate::parser::StructuralTree;

/// Extract one record per imported name, at any nesting depth, in source order.
pub fn extract_imports(tree: &StructuralTree) -> Vec<ImportRecord> {
    let mut imports = Vec::new();
    walk(tree, tree.root(), &mut imports);
    imports
}

fn walk(tree: &StructuralTree, node: Node, out: &mut Vec<ImportRecord>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_statement" => extract_import_statement(tree, child, out),
            "import_from_statement" => extract_from_statement(tree, child, "module_name", out),
            // `from __future__ import x` has its own node without a module field.
            "future_import_statement" => extract_from_statement(tree, child, "", out),
            _ => walk(tree, child, out),
        }
    }
}

/// `import a, b.c as d`
fn extract_import_statement(tree: &StructuralTree, node: Node, out: &mut Vec<ImportRecord>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some((module, alias)) = imported_name(tree, name) {
            out.push(ImportRecord {
                module,
                alias,
                line,
                style: ImportStyle::Plain,
            });
        }
    }
}

/// `from a import b, c as d` and `from . import x`
fn extract_from_statement(
    tree: &StructuralTree,
    node: Node,
    module_field: &str,
    out: &mut Vec<ImportRecord>,
) {
    let line = node.start_position().row + 1;
    let base = if module_field.is_empty() {
        "__future__".to_string()
    } else {
        match node.child_by_field_name(module_field) {
            Some(m) => tree.node_text(m).to_string(),
            None => return,
        }
    };

    let has_wildcard = node
        .named_children(&mut node.walk())
        .any(|c| c.kind() == "wildcard_import");
    if has_wildcard {
        out.push(ImportRecord {
            module: join_module(&base, "*"),
            alias: None,
            line,
            style: ImportStyle::From,
        });
        return;
    }

    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some((imported, alias)) = imported_name(tree, name) {
            out.push(ImportRecord {
                module: join_module(&base, &imported),
                alias,
                line,
                style: ImportStyle::From,
            });
        }
    }
}

/// Name and optional alias of a `dotted_name` or `aliased_import` node.
fn imported_name(tree: &StructuralTree, node: Node) -> Option<(String, Option<String>)> {
    match node.kind() {
        "dotted_name" => Some((tree.node_text(node).to_string(), None)),
        "aliased_import" => {
            let name = tree.node_text(node.child_by_field_name("name")?).to_string();
            let alias = node
                .child_by_field_name("alias")
                .map(|a| tree.node_text(a).to_string());
            Some((name, alias))
        }
        _ => None,
    }
}

/// Join a from-import base with an imported name.
///
/// A purely relative base (`.` or `..`) is concatenated without an extra dot.
fn join_module(base: &str, name: &str) -> String {
    let base: String = base.split_whitespace().collect();
    if base.ends_with('.') {
        format!("{}{}", base, name)
    } else {
        format!("{}.{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{PythonParser, SourceUnit};

    fn imports(source: &str) -> Vec<ImportRecord> {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser
            .parse(&SourceUnit::from_text("test.py", source))
            .unwrap();
        extract_imports(&tree)
    }

    fn summary(records: &[ImportRecord]) -> Vec<(&str, Option<&str>, usize)> {
        records
            .iter()
            .map(|r| (r.module.as_str(), r.alias.as_deref(), r.line))
            .collect()
    }

    #[test]
    fn test_plain_and_from_imports() {
        let records = imports("import os, sys\nfrom collections import OrderedDict as OD\n");
        assert_eq!(
            summary(&records),
            vec![
                ("os", None, 1),
                ("sys", None, 1),
                ("collections.OrderedDict", Some("OD"), 2),
            ]
        );
        assert_eq!(records[0].style, ImportStyle::Plain);
        assert_eq!(records[2].style, ImportStyle::From);
    }

    #[test]
    fn test_dotted_alias() {
        let records = imports("import os.path as osp\n");
        assert_eq!(summary(&records), vec![("os.path", Some("osp"), 1)]);
    }

    #[test]
    fn test_from_import_multiple_names() {
        let records = imports("from typing import (\n    List,\n    Optional,\n)\n");
        assert_eq!(
            summary(&records),
            vec![("typing.List", None, 1), ("typing.Optional", None, 1)]
        );
    }

    #[test]
    fn test_relative_and_wildcard_imports() {
        let source = "from . import sibling\nfrom ..pkg import thing\nfrom shapes import *\n";
        let records = imports(source);
        assert_eq!(
            summary(&records),
            vec![
                (".sibling", None, 1),
                ("..pkg.thing", None, 2),
                ("shapes.*", None, 3),
            ]
        );
    }

    #[test]
    fn test_future_import() {
        let records = imports("from __future__ import annotations\n");
        assert_eq!(summary(&records), vec![("__future__.annotations", None, 1)]);
    }

    #[test]
    fn test_nested_imports_are_found() {
        let source = r#"
def load():
    import json
    return json

class Lazy:
    def run(self):
        try:
            import yaml
        except ImportError:
            yaml = None
"#;
        let records = imports(source);
        assert_eq!(
            summary(&records),
            vec![("json", None, 3), ("yaml", None, 9)]
        );
    }

    #[test]
    fn test_no_imports() {
        assert!(imports("x = 1\n").is_empty());
    }
}
