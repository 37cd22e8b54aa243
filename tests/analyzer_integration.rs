//! Integration tests for the analyzer against testdata fixtures.

use std::path::PathBuf;

use pyscope::{
    analyze, AnalyzeError, Analyzer, ComplexityMetrics, Config, DefinitionKind, ImportStyle,
    SourceUnit,
};

fn testdata_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

// =============================================================================
// Definitions
// =============================================================================

#[test]
fn test_inventory_definitions() {
    let analysis = analyze(testdata_path("inventory.py")).expect("should analyze");
    assert!(analysis.syntax_errors().is_empty());

    let defs = analysis.definitions();
    let summary: Vec<_> = defs
        .iter()
        .map(|d| (d.kind, d.name.as_str(), d.line, d.enclosing.as_deref()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (DefinitionKind::Class, "Inventory", 8, None),
            (DefinitionKind::Function, "__init__", 11, Some("Inventory")),
            (DefinitionKind::Function, "add", 15, Some("Inventory")),
            (DefinitionKind::Function, "sync", 20, Some("Inventory")),
            (DefinitionKind::Class, "Snapshot", 27, Some("Inventory")),
            (DefinitionKind::Function, "freeze", 28, Some("Inventory.Snapshot")),
            (DefinitionKind::Function, "load", 32, None),
            (DefinitionKind::Function, "_decode", 35, None),
            (DefinitionKind::Function, "main", 42, None),
        ]
    );
}

#[test]
fn test_inventory_signatures() {
    let analysis = analyze(testdata_path("inventory.py")).unwrap();
    let defs = analysis.definitions();

    let add = defs.iter().find(|d| d.name == "add").unwrap();
    assert_eq!(add.parameters, vec!["item", "count"]);
    assert_eq!(add.returns.as_deref(), Some("None"));

    let sync = defs.iter().find(|d| d.name == "sync").unwrap();
    assert!(sync.is_async);
    assert_eq!(sync.qualified_name(), "Inventory.sync");

    let inventory = defs.iter().find(|d| d.name == "Inventory").unwrap();
    assert_eq!(
        inventory.docstring.as_deref(),
        Some("Tracks items and their stock levels.")
    );
}

#[test]
fn test_greeter_scenario() {
    let source = "class Greeter:\n    def __init__(self):\n        pass\n    def greet(self):\n        pass";
    let analysis = Analyzer::new(&Config::default())
        .unwrap()
        .analyze_source(SourceUnit::from_text("greeter.py", source))
        .unwrap();

    let defs = analysis.definitions();
    assert_eq!(defs.len(), 3);
    assert_eq!((defs[0].kind, defs[0].name.as_str(), defs[0].line), (DefinitionKind::Class, "Greeter", 1));
    assert_eq!(defs[0].enclosing, None);
    assert_eq!((defs[1].name.as_str(), defs[1].line), ("__init__", 2));
    assert_eq!(defs[1].enclosing.as_deref(), Some("Greeter"));
    assert_eq!((defs[2].name.as_str(), defs[2].line), ("greet", 4));
    assert_eq!(defs[2].enclosing.as_deref(), Some("Greeter"));
}

// =============================================================================
// Imports
// =============================================================================

#[test]
fn test_inventory_imports() {
    let analysis = analyze(testdata_path("inventory.py")).unwrap();
    let imports = analysis.imports();
    let summary: Vec<_> = imports
        .iter()
        .map(|i| (i.module.as_str(), i.alias.as_deref(), i.line))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("os", None, 3),
            ("sys", None, 3),
            ("collections.OrderedDict", Some("OD"), 4),
            (".models.Item", None, 5),
            (".models.Stock", Some("StockLevel"), 5),
            ("json", None, 33),
        ]
    );
    assert_eq!(imports[0].style, ImportStyle::Plain);
    assert_eq!(imports[3].style, ImportStyle::From);
}

#[test]
fn test_file_without_imports() {
    let analysis = analyze(testdata_path("no_imports.py")).unwrap();
    assert!(analysis.imports().is_empty());
    assert_eq!(analysis.complexity().import_count, 0);
}

// =============================================================================
// Complexity
// =============================================================================

#[test]
fn test_inventory_complexity() {
    let analysis = analyze(testdata_path("inventory.py")).unwrap();
    assert_eq!(
        analysis.complexity(),
        ComplexityMetrics {
            function_count: 7,
            class_count: 2,
            import_count: 6,
            // if, for, except, two ternaries, while
            branch_count: 6,
        }
    );
}

#[test]
fn test_counts_agree_with_definitions() {
    let analysis = analyze(testdata_path("inventory.py")).unwrap();
    let defs = analysis.definitions();
    let metrics = analysis.complexity();

    let functions = defs.iter().filter(|d| d.kind == DefinitionKind::Function).count();
    let classes = defs.iter().filter(|d| d.kind == DefinitionKind::Class).count();
    assert_eq!(metrics.function_count, functions);
    assert_eq!(metrics.class_count, classes);
    assert_eq!(metrics.function_count + metrics.class_count, defs.len());
}

#[test]
fn test_extra_branch_kinds_from_config() {
    let config = Config {
        extra_branch_kinds: vec!["with_statement".to_string()],
        ..Config::default()
    };
    let analysis = Analyzer::new(&config)
        .unwrap()
        .analyze_path(testdata_path("inventory.py"))
        .unwrap();
    assert_eq!(analysis.complexity().branch_count, 7);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_syntax_error_reported_at_line() {
    let analysis = analyze(testdata_path("broken.py")).expect("syntax errors are not fatal");
    let errors = analysis.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 8);

    assert!(analysis.definitions().is_empty());
    assert!(analysis.imports().is_empty());
    assert_eq!(analysis.complexity(), ComplexityMetrics::default());
}

#[test]
fn test_unexpected_indent_reported_at_line() {
    let analysis = analyze(testdata_path("bad_indent.py")).expect("syntax errors are not fatal");
    let errors = analysis.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "line 4: unexpected indent");
    assert_eq!(errors[0].column, 5);

    assert!(!analysis.is_parsed());
    assert!(analysis.definitions().is_empty());
    assert_eq!(analysis.complexity(), ComplexityMetrics::default());
}

#[test]
fn test_unmatched_dedent_reported_at_line() {
    let analysis = analyze(testdata_path("bad_dedent.py")).unwrap();
    let errors = analysis.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 5);
    assert_eq!(
        errors[0].message,
        "unindent does not match any outer indentation level"
    );
    assert!(analysis.imports().is_empty());
}

#[test]
fn test_missing_block_body() {
    let analyzer = Analyzer::new(&Config::default()).unwrap();
    let analysis = analyzer.analyze_source(SourceUnit::from_text(
        "guard.py",
        "def check(x):\n    if x:\n    return x\n",
    ))
    .unwrap();
    let errors = analysis.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
    assert_eq!(errors[0].message, "expected an indented block");
}

#[test]
fn test_python2_print_is_syntax_error() {
    let analysis = analyze(testdata_path("python2.py")).unwrap();
    let errors = analysis.syntax_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 5);
    assert_eq!(errors[0].column, 5);
    assert!(errors[0].message.contains("'print'"));
    assert!(analysis.definitions().is_empty());
}

#[test]
fn test_python2_only_constructs_rejected() {
    let analyzer = Analyzer::new(&Config::default()).unwrap();
    let cases = [
        ("exec \"x = 1\"\n", 1),
        ("x = 1\ndel f()\n", 2),
        ("handler = lambda x: yield\n", 1),
        ("x = 1\nif x <> 2:\n    pass\n", 2),
        ("mode = 0755\n", 1),
    ];
    for (source, line) in cases {
        let analysis = analyzer
            .analyze_source(SourceUnit::from_text("legacy.py", source))
            .unwrap();
        let errors = analysis.syntax_errors();
        assert_eq!(errors.len(), 1, "{:?} should be rejected", source);
        assert_eq!(errors[0].line, line, "wrong line for {:?}", source);
    }
}

#[test]
fn test_missing_file_is_fatal() {
    let result = analyze(testdata_path("does_not_exist.py"));
    match result {
        Err(AnalyzeError::Io { path, .. }) => assert!(path.ends_with("does_not_exist.py")),
        other => panic!("expected I/O error, got {:?}", other.map(|a| a.is_parsed())),
    }
}

#[test]
fn test_non_utf8_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.py");
    std::fs::write(&path, b"name = '\xe9t\xe9'\n").unwrap();
    assert!(matches!(analyze(&path), Err(AnalyzeError::Io { .. })));
}

#[test]
fn test_repeated_analysis_is_identical() {
    let first = analyze(testdata_path("inventory.py")).unwrap();
    let second = analyze(testdata_path("inventory.py")).unwrap();
    assert_eq!(first.definitions(), second.definitions());
    assert_eq!(first.imports(), second.imports());
    assert_eq!(first.complexity(), second.complexity());
}

#[test]
fn test_concurrent_analysis() {
    let analyzer = Analyzer::new(&Config::default()).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = analyzer.clone();
            std::thread::spawn(move || {
                analyzer
                    .analyze_path(testdata_path("inventory.py"))
                    .unwrap()
                    .complexity()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().function_count, 7);
    }
}
