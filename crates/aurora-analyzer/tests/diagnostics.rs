//! End-to-end diagnostics: AuroraLang source → analyze → verify.

use aurora_analyzer::{analyze, analyze_with_options, AnalysisOptions};
use aurora_common::{Diagnostic, Severity};

/// Analyze with every pass on, return all diagnostics.
fn diagnostics(source: &str) -> Vec<Diagnostic> {
    analyze(source, "test.aur").diagnostics
}

fn messages(source: &str) -> Vec<(Severity, String)> {
    diagnostics(source)
        .into_iter()
        .map(|d| (d.severity, d.message))
        .collect()
}

fn errors(source: &str) -> Vec<String> {
    messages(source)
        .into_iter()
        .filter(|(s, _)| *s == Severity::Error)
        .map(|(_, m)| m)
        .collect()
}

// =========================================================================
// Structure
// =========================================================================

#[test]
fn balanced_program_is_clean() {
    let src = r#"
extern putchard(x);

# Prints a (small) square {
fn square(n: double) -> double {
    return n * n
}

class Counter {
    var count: int = 0

    constructor(start: int) {
        this.count = start
    }

    fn increment() {
        this.count = this.count + 1
    }
}

fn main() {
    var c = new Counter(1)
    c.increment()
    let label = "brackets ({[ in strings"
    for i in 0..3 {
        printd(square(i))
    }
}
"#;
    let all = messages(src);
    assert!(all.is_empty(), "unexpected diagnostics: {:?}", all);
}

#[test]
fn unbalanced_brackets_are_reported() {
    let errs = errors("fn main() {\n    printd((1)\n");
    assert!(errs.contains(&"Unclosed '(' - expected ')' before end of file".to_string()));
    assert!(errs.contains(&"Unclosed '{' - expected '}' before end of file".to_string()));
}

// =========================================================================
// Returns
// =========================================================================

#[test]
fn void_function_returning_value() {
    let diags = diagnostics("fn f() { return 1 }");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Cannot return a value from a void function 'f'");
    let span = diags[0].span.as_ref().unwrap();
    assert_eq!(span.start.column, 10);
}

#[test]
fn typed_function_without_return_warns_once() {
    let all = messages("fn f() -> int { }");
    assert_eq!(all.len(), 1);
    let (severity, message) = &all[0];
    assert_eq!(*severity, Severity::Warning);
    assert!(message.contains("'f'") && message.contains("'int'"));
}

// =========================================================================
// Calls
// =========================================================================

#[test]
fn builtin_argument_type_mismatch() {
    let diags = diagnostics("printd(\"hi\")");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Type mismatch: expected 'double', got 'string'");
    let span = diags[0].span.as_ref().unwrap();
    assert_eq!((span.start.column, span.end.column), (8, 12));
}

#[test]
fn undefined_function_until_declared_extern() {
    assert_eq!(errors("foo(1)"), vec!["Undefined function 'foo'"]);
    assert!(errors("extern foo(a)\nfoo(1)").is_empty());
}

#[test]
fn constructor_arity() {
    let errs = errors("class Point { constructor(x, y) {} }\nlet p = new Point(1)");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("expects 2 argument(s), but got 1"), "{}", errs[0]);
}

#[test]
fn duplicate_function_points_at_first() {
    let diags = diagnostics("fn f() {}\n\nfn f() {}");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Function 'f' is already defined at line 1");
    assert_eq!(diags[0].related[0].span.line(), 1);
}

// =========================================================================
// Variables
// =========================================================================

#[test]
fn redeclaration_in_same_block() {
    let diags = diagnostics("let x = 1\nlet x = 1");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Variable 'x' is already declared at line 1");
    assert_eq!(diags[0].span.as_ref().unwrap().line(), 2);
}

#[test]
fn shadowing_in_nested_block() {
    assert!(errors("let x = 1\nif (true) {\n    let x = 1\n}").is_empty());
}

#[test]
fn assignment_to_let_and_var() {
    let errs = errors("let x = 1\nx = 2");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("'x'") && errs[0].contains("line 1"));
    assert!(errors("var x = 1\nx = 2").is_empty());
}

#[test]
fn string_arithmetic_with_literal() {
    assert_eq!(
        errors("let s = \"n: \" + 5"),
        vec!["Cannot perform arithmetic operation '+' on string and number"]
    );
}

// =========================================================================
// Style
// =========================================================================

#[test]
fn style_hints_are_tagged_and_optional() {
    let src = "let my_value = 1;\nclass A {\n    pub var x = 1\n}";
    let diags = diagnostics(src);
    assert_eq!(diags.len(), 3);
    assert!(diags
        .iter()
        .all(|d| d.severity == Severity::Hint && d.is_unnecessary()));

    let quiet = analyze_with_options(src, "test.aur", &AnalysisOptions { style_hints: false });
    assert!(quiet.diagnostics.is_empty());
}

#[test]
fn missing_header_brace_is_always_an_error() {
    let quiet = analyze_with_options("fn f()\n{\n}", "test.aur", &AnalysisOptions { style_hints: false });
    assert_eq!(quiet.diagnostics.len(), 1);
    assert_eq!(
        quiet.diagnostics[0].message,
        "Function definition missing opening '{' brace"
    );
}

// =========================================================================
// Whole-document behavior
// =========================================================================

#[test]
fn analysis_is_idempotent() {
    let src = "fn f() -> int { }\nlet x = 1\nx = 2\nfoo(\"a\" * 2)\nlet my_name = 3;";
    let first = analyze(src, "test.aur");
    let second = analyze(src, "test.aur");
    assert_eq!(first, second);
    assert!(!first.diagnostics.is_empty());
}

#[test]
fn json_record_uses_zero_based_ranges() {
    let result = analyze("foo()", "file:///main.aur");
    let json = serde_json::to_value(result.to_record()).unwrap();
    assert_eq!(json["uri"], "file:///main.aur");
    let diag = &json["diagnostics"][0];
    assert_eq!(diag["severity"], "error");
    assert_eq!(diag["range"]["start"]["line"], 0);
    assert_eq!(diag["range"]["start"]["character"], 0);
    assert_eq!(diag["range"]["end"]["character"], 3);
}
