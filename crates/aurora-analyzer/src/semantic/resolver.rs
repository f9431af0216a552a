use std::ops::Range;

use aurora_common::{Diagnostic, DiagnosticBag, Span};

use super::scope::{ScopeKind, ScopeStack, Variable, VariableKind};
use super::symbols::{parameter_from, FunctionSignature, Parameter, SymbolTable};
use super::types::{infer_type, Type};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::{call_close, split_arguments, starts_line, FnHeader, ParamDecl, Parser};
use crate::source::SourceFile;

/// Scope-resolving checker.
///
/// Walks the token stream once, keeping a [`ScopeStack`] in step with the
/// braces, and checks calls, constructor calls, variable declarations,
/// assignments and string/literal arithmetic against the symbol table.
pub struct Resolver<'a, 'src> {
    source: &'a SourceFile<'src>,
    tokens: &'a [Token],
    symbols: &'a SymbolTable,
    scopes: ScopeStack,
    diagnostics: DiagnosticBag,
    /// Body `{` of the function header just seen, with its parameters.
    pending_function: Option<(usize, Vec<ParamDecl>)>,
    /// Token index of a `for NAME in` binding waiting for its body.
    pending_loop_binding: Option<usize>,
    /// Body `{` of the class header just seen, with the class name.
    pending_class: Option<(usize, String)>,
    /// Enclosing class bodies, innermost last, with the scope depth each
    /// body opened at.
    classes: Vec<(String, usize)>,
}

impl<'a, 'src> Resolver<'a, 'src> {
    pub fn new(source: &'a SourceFile<'src>, tokens: &'a [Token], symbols: &'a SymbolTable) -> Self {
        Self {
            source,
            tokens,
            symbols,
            scopes: ScopeStack::new(),
            diagnostics: DiagnosticBag::new(),
            pending_function: None,
            pending_loop_binding: None,
            pending_class: None,
            classes: Vec::new(),
        }
    }

    pub fn resolve(mut self) -> DiagnosticBag {
        for i in 0..self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::LeftBrace => self.open_scope(i),
                TokenKind::RightBrace => self.close_scope(),
                TokenKind::Fn => {
                    let header = Parser::at(self.tokens, i).parse_fn_header();
                    self.expect_body(header);
                }
                TokenKind::Class => {
                    let header = Parser::at(self.tokens, i).parse_class_header();
                    self.pending_class = header.and_then(|h| h.body.map(|body| (body, h.name)));
                }
                TokenKind::Constructor => {
                    let header = Parser::at(self.tokens, i).parse_constructor_header();
                    self.expect_body(header);
                }
                TokenKind::For => {
                    if self.kind_at(i + 1) == TokenKind::Identifier
                        && self.kind_at(i + 2) == TokenKind::In
                    {
                        self.pending_loop_binding = Some(i + 1);
                    }
                }
                TokenKind::Let | TokenKind::Var => self.check_declaration(i),
                TokenKind::Identifier => {
                    if self.kind_at(i + 1) == TokenKind::LeftParen {
                        self.check_call(i);
                    } else if self.kind_at(i + 1).is_assignment() && self.is_statement_start(i) {
                        self.check_assignment(i);
                    }
                }
                TokenKind::StringLiteral => self.check_literal_operation(i),
                _ => {}
            }
        }

        tracing::debug!(
            diagnostics = self.diagnostics.len(),
            "scope resolution complete"
        );
        self.diagnostics
    }

    // ====================================================================
    // Scope bookkeeping
    // ====================================================================

    fn expect_body(&mut self, header: Option<FnHeader>) {
        if let Some(header) = header {
            if let Some(body) = header.body {
                self.pending_function = Some((body, header.params));
            }
        }
    }

    /// A function body's `{` opens one Function scope holding the
    /// parameters; any other `{` opens a Block scope.
    fn open_scope(&mut self, idx: usize) {
        if let Some((body, params)) = self.pending_function.take() {
            if body == idx {
                self.scopes.push(ScopeKind::Function);
                for param in &params {
                    let Parameter { name, ty } = parameter_from(param);
                    let variable = Variable {
                        name,
                        ty,
                        kind: VariableKind::Parameter,
                        declared_at: param.span.clone(),
                    };
                    if self.scopes.define(variable).is_err() {
                        tracing::trace!(name = %param.name, "duplicate parameter name");
                    }
                }
                return;
            }
        }

        self.scopes.push(ScopeKind::Block);
        if let Some((body, name)) = self.pending_class.take() {
            if body == idx {
                self.classes.push((name, self.scopes.depth()));
                return;
            }
        }
        if let Some(binding) = self.pending_loop_binding.take() {
            let tok = &self.tokens[binding];
            let _ = self.scopes.define(Variable {
                name: tok.lexeme.clone(),
                ty: Type::Double,
                kind: VariableKind::Var,
                declared_at: tok.span.clone(),
            });
        }
    }

    fn close_scope(&mut self) {
        if self
            .classes
            .last()
            .is_some_and(|(_, depth)| *depth == self.scopes.depth())
        {
            self.classes.pop();
        }
        self.scopes.pop();
    }

    // ====================================================================
    // Calls
    // ====================================================================

    /// `NAME(args)` at token `idx`.
    fn check_call(&mut self, idx: usize) {
        let (tokens, symbols) = (self.tokens, self.symbols);
        let name = &tokens[idx];
        let previous = idx.checked_sub(1).map(|p| tokens[p].kind);
        match previous {
            // Declarations, not calls.
            Some(TokenKind::Fn | TokenKind::Extern | TokenKind::Class) => return,
            // Method calls are not resolved.
            Some(TokenKind::Dot) => return,
            Some(TokenKind::New) => {
                self.check_constructor_call(idx);
                return;
            }
            _ => {}
        }

        let Some(signature) = self.lookup_callable(&name.lexeme) else {
            self.diagnostics.report(
                Diagnostic::error(format!("Undefined function '{}'", name.lexeme))
                    .with_span(name.span.clone())
                    .with_suggestion(format!(
                        "declare it with `fn {}(...)` or `extern {}(...)`",
                        name.lexeme, name.lexeme
                    )),
            );
            return;
        };

        let Some(close) = call_close(tokens, idx + 1) else {
            return;
        };
        let args = split_arguments(tokens, idx + 1, close);

        if args.len() != signature.arity() {
            let span = name.span.merge(&tokens[close].span);
            self.diagnostics.error(
                format!(
                    "Function '{}' expects {} argument(s), but got {}",
                    name.lexeme,
                    signature.arity(),
                    args.len()
                ),
                span,
            );
        }
        self.check_argument_types(signature, &args);
    }

    /// An unqualified callee: a global function, then a method of the
    /// enclosing class, then a method of any class.
    fn lookup_callable(&self, name: &str) -> Option<&'a FunctionSignature> {
        let symbols = self.symbols;
        symbols
            .function(name)
            .or_else(|| {
                let (class, _) = self.classes.last()?;
                symbols.class(class)?.method(name)
            })
            .or_else(|| symbols.method(name))
    }

    /// `new NAME(args)` at token `idx`.
    fn check_constructor_call(&mut self, idx: usize) {
        let (tokens, symbols) = (self.tokens, self.symbols);
        let name = &tokens[idx];
        let Some(class) = symbols.class(&name.lexeme) else {
            self.diagnostics.error(
                format!("Undefined class '{}'", name.lexeme),
                name.span.clone(),
            );
            return;
        };
        let Some(constructor) = class.constructor() else {
            return;
        };
        let Some(close) = call_close(tokens, idx + 1) else {
            return;
        };
        let args = split_arguments(tokens, idx + 1, close);

        if args.len() != constructor.arity() {
            let span = name.span.merge(&tokens[close].span);
            self.diagnostics.error(
                format!(
                    "Constructor of class '{}' expects {} argument(s), but got {}",
                    name.lexeme,
                    constructor.arity(),
                    args.len()
                ),
                span,
            );
        }
        self.check_argument_types(constructor, &args);
    }

    /// Pairwise check of inferred argument types against parameter types.
    fn check_argument_types(&mut self, signature: &FunctionSignature, args: &[Range<usize>]) {
        for (arg, param) in args.iter().zip(&signature.params) {
            let span = self.range_span(arg);
            let actual = infer_type(self.source.slice(span.start, span.end));
            if !actual.is_compatible_with(&param.ty) {
                self.diagnostics.error(
                    format!(
                        "Type mismatch: expected '{}', got '{}'",
                        param.ty.display_name(),
                        actual.display_name()
                    ),
                    span,
                );
            }
        }
    }

    // ====================================================================
    // Declarations and assignments
    // ====================================================================

    /// `let|var NAME [: T] [= expr]` at token `idx`.
    fn check_declaration(&mut self, idx: usize) {
        let Some(decl) = Parser::at(self.tokens, idx).parse_var_decl() else {
            return;
        };

        if let Some(existing) = self.scopes.lookup_current(&decl.name) {
            self.diagnostics.report(
                Diagnostic::error(format!(
                    "Variable '{}' is already declared at line {}",
                    decl.name,
                    existing.declared_at.line()
                ))
                .with_span(decl.name_span.clone())
                .with_related(existing.declared_at.clone(), "Previous declaration here"),
            );
            return;
        }

        let declared = decl.ty.as_ref().map(|t| Type::from_name(&t.text));
        let initialized = decl.init.as_ref().map(|init| {
            let span = self.range_span(init);
            (infer_type(self.source.slice(span.start, span.end)), span)
        });

        if let (Some(declared), Some((actual, init_span))) = (&declared, &initialized) {
            if !actual.is_compatible_with(declared) {
                self.diagnostics.error(
                    format!(
                        "Type mismatch: cannot assign '{}' to '{}'",
                        actual.display_name(),
                        declared.display_name()
                    ),
                    decl.name_span.merge(init_span),
                );
            }
        }

        let ty = declared
            .or_else(|| initialized.map(|(ty, _)| ty))
            .unwrap_or(Type::Double);
        let kind = if decl.mutable {
            VariableKind::Var
        } else {
            VariableKind::Let
        };
        tracing::trace!(name = %decl.name, ty = %ty, "declare variable");
        let _ = self.scopes.define(Variable {
            name: decl.name,
            ty,
            kind,
            declared_at: decl.name_span,
        });
    }

    /// `NAME = expr` (or a compound assignment) at statement start.
    fn check_assignment(&mut self, idx: usize) {
        let name = &self.tokens[idx];
        match self.scopes.lookup(&name.lexeme) {
            None => {
                self.diagnostics.error(
                    format!("Undefined variable '{}'", name.lexeme),
                    name.span.clone(),
                );
            }
            Some(variable) if !variable.kind.is_assignable() => {
                let diagnostic = Diagnostic::error(format!(
                    "Cannot assign to immutable variable '{}'. Declared with 'let' at line {}. Use 'var' for mutable variables.",
                    name.lexeme,
                    variable.declared_at.line()
                ))
                .with_span(name.span.clone())
                .with_related(variable.declared_at.clone(), "Declared here")
                .with_suggestion(format!("declare it as `var {}`", name.lexeme));
                self.diagnostics.report(diagnostic);
            }
            Some(_) => {}
        }
    }

    /// `"..." OP literal` where OP is `+ - * /` and the literal is a number
    /// or boolean.
    fn check_literal_operation(&mut self, idx: usize) {
        let op = self.kind_at(idx + 1);
        if !op.is_arithmetic() {
            return;
        }
        let operand = match self.kind_at(idx + 2) {
            TokenKind::IntLiteral | TokenKind::FloatLiteral => "number",
            TokenKind::True | TokenKind::False => "boolean",
            _ => return,
        };
        let span = self.tokens[idx].span.merge(&self.tokens[idx + 2].span);
        self.diagnostics.error(
            format!(
                "Cannot perform arithmetic operation '{}' on string and {}",
                self.tokens[idx + 1].lexeme,
                operand
            ),
            span,
        );
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    fn kind_at(&self, idx: usize) -> TokenKind {
        self.tokens
            .get(idx)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// First token on its line, or right after `;`, `{` or `}`.
    fn is_statement_start(&self, idx: usize) -> bool {
        starts_line(self.tokens, idx)
            || matches!(
                self.tokens[idx - 1].kind,
                TokenKind::Semicolon | TokenKind::LeftBrace | TokenKind::RightBrace
            )
    }

    /// Span from the first to the last token of a non-empty range.
    fn range_span(&self, range: &Range<usize>) -> Span {
        let first = &self.tokens[range.start];
        let last = &self.tokens[range.end - 1];
        first.span.merge(&last.span)
    }
}

#[cfg(test)]
mod tests {
    use aurora_common::Severity;

    use super::*;
    use crate::lexer::Lexer;
    use crate::semantic::symbols::SymbolCollector;

    /// Helper: lex, collect symbols, run the resolver, return diagnostics.
    fn resolve(source: &str) -> Vec<(Severity, String)> {
        let file = SourceFile::new("test.aur", source);
        let (tokens, _) = Lexer::new(source, "test.aur").tokenize();
        let (symbols, _) = SymbolCollector::new(&tokens).collect();
        Resolver::new(&file, &tokens, &symbols)
            .resolve()
            .into_diagnostics()
            .into_iter()
            .map(|d| (d.severity, d.message))
            .collect()
    }

    fn errors(source: &str) -> Vec<String> {
        resolve(source)
            .into_iter()
            .filter(|(s, _)| *s == Severity::Error)
            .map(|(_, m)| m)
            .collect()
    }

    fn full_diagnostics(source: &str) -> Vec<Diagnostic> {
        let file = SourceFile::new("test.aur", source);
        let (tokens, _) = Lexer::new(source, "test.aur").tokenize();
        let (symbols, _) = SymbolCollector::new(&tokens).collect();
        Resolver::new(&file, &tokens, &symbols)
            .resolve()
            .into_diagnostics()
    }

    // -- Calls --

    #[test]
    fn known_call_ok() {
        let errs = errors("fn add(a: int, b: int) -> int { return a + b }\nadd(1, 2)");
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn forward_reference_functions() {
        let errs = errors("fn main() { helper() }\nfn helper() { }");
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn undefined_function() {
        assert_eq!(errors("foo(1)"), vec!["Undefined function 'foo'"]);
    }

    #[test]
    fn arity_mismatch() {
        assert_eq!(
            errors("fn f(a, b) {}\nf(1)"),
            vec!["Function 'f' expects 2 argument(s), but got 1"]
        );
    }

    #[test]
    fn argument_type_mismatch_span() {
        let diags = full_diagnostics("printd(\"hi\")");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Type mismatch: expected 'double', got 'string'");
        let span = diags[0].span.as_ref().unwrap();
        assert_eq!((span.start.column, span.end.column), (8, 12));
    }

    #[test]
    fn nested_calls_are_checked() {
        let errs = errors("fn one() -> int { return 1 }\nprintd(missing(one(2)))");
        assert_eq!(
            errs,
            vec![
                "Undefined function 'missing'".to_string(),
                "Function 'one' expects 0 argument(s), but got 1".to_string(),
            ]
        );
    }

    #[test]
    fn unclosed_call_skips_arity() {
        assert!(errors("printd(1, 2").is_empty());
    }

    #[test]
    fn method_calls_and_keywords_are_skipped() {
        let src = "class A {\n fn go() {}\n}\nvar a = new A()\na.go(1, 2)\nthis.go()\nif (true) { }\nwhile (false) { }";
        let errs = errors(src);
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn sibling_method_call_resolves() {
        let src = "class A {\n    fn m(x: int) {}\n    fn run() {\n        m(1)\n        m()\n    }\n}";
        assert_eq!(errors(src), vec!["Function 'm' expects 1 argument(s), but got 0"]);
    }

    #[test]
    fn method_name_resolves_outside_its_class() {
        let src = "class A {\n fn m() {}\n}\nfn g() {\n m()\n}";
        let errs = errors(src);
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn enclosing_class_method_wins() {
        let src = "class A {\n fn m(a) {}\n}\nclass B {\n fn m() {}\n fn run() {\n  m()\n }\n}\nm(1)";
        let errs = errors(src);
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn calls_in_strings_and_comments_are_ignored() {
        let errs = errors("let s = \"nope(1)\" # ghost(2)");
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
    }

    #[test]
    fn optional_parameter_still_required() {
        let errs = errors("fn f(a: int?) {}\nf()\nf(null)");
        assert_eq!(errs, vec!["Function 'f' expects 1 argument(s), but got 0"]);
    }

    // -- Constructors --

    #[test]
    fn undefined_class() {
        assert_eq!(errors("let p = new Nope(1)"), vec!["Undefined class 'Nope'"]);
    }

    #[test]
    fn constructor_arity_and_types() {
        let src = "class P {\n constructor(x: int, label: string) {}\n}\nlet a = new P(1)\nlet b = new P(1, 2)";
        assert_eq!(
            errors(src),
            vec![
                "Constructor of class 'P' expects 2 argument(s), but got 1".to_string(),
                "Type mismatch: expected 'string', got 'int'".to_string(),
            ]
        );
    }

    #[test]
    fn class_without_constructor_accepts_anything() {
        assert!(errors("class E {}\nlet e = new E(1, 2)").is_empty());
    }

    // -- Declarations --

    #[test]
    fn redeclaration_same_scope() {
        assert_eq!(
            errors("let x = 1\nlet x = 2"),
            vec!["Variable 'x' is already declared at line 1"]
        );
    }

    #[test]
    fn redeclaration_nested_scope_ok() {
        assert!(errors("let x = 1\n{\n    let x = 2\n}").is_empty());
    }

    #[test]
    fn scopes_close_with_braces() {
        assert!(errors("{\n let x = 1\n}\nlet x = 2").is_empty());
    }

    #[test]
    fn declared_type_mismatch() {
        assert_eq!(
            errors("let s: string = 42"),
            vec!["Type mismatch: cannot assign 'int' to 'string'"]
        );
        assert!(errors("let d: double = 1\nlet p: Point? = null").is_empty());
    }

    #[test]
    fn parameter_redeclared_with_let() {
        assert_eq!(
            errors("fn f(a) {\n    let a = 2\n}"),
            vec!["Variable 'a' is already declared at line 1"]
        );
    }

    // -- Assignments --

    #[test]
    fn assign_to_let_is_error() {
        assert_eq!(
            errors("let x = 1\nx = 2"),
            vec!["Cannot assign to immutable variable 'x'. Declared with 'let' at line 1. Use 'var' for mutable variables."]
        );
    }

    #[test]
    fn assign_after_semicolon_on_same_line() {
        assert_eq!(errors("let x = 1; x = 2").len(), 1);
        assert!(errors("var x = 1; x = 2").is_empty());
    }

    #[test]
    fn assign_to_undefined_variable() {
        assert_eq!(errors("y = 3"), vec!["Undefined variable 'y'"]);
    }

    #[test]
    fn parameters_and_loop_bindings_are_assignable() {
        let src = "fn f(a) {\n    a = 2\n    for i in 0..3 {\n        i = 1\n    }\n}";
        assert!(errors(src).is_empty(), "unexpected errors: {:?}", errors(src));
    }

    #[test]
    fn class_fields_are_in_scope_inside_methods() {
        let src = "class A {\n let x: int\n var y: int\n fn set() {\n  x = 2\n  y = 3\n }\n}";
        assert_eq!(
            errors(src),
            vec!["Cannot assign to immutable variable 'x'. Declared with 'let' at line 2. Use 'var' for mutable variables."]
        );
    }

    #[test]
    fn class_fields_leave_scope_with_the_class() {
        assert_eq!(
            errors("class A {\n var x: int\n}\nx = 1"),
            vec!["Undefined variable 'x'"]
        );
    }

    #[test]
    fn comparison_is_not_assignment() {
        assert!(errors("let x = 1\nif (x == 2) { }").is_empty());
    }

    #[test]
    fn immutable_assignment_has_suggestion() {
        let diags = full_diagnostics("let x = 5\nx += 1");
        let diag = &diags[0];
        assert!(diag.message.starts_with("Cannot assign to immutable variable 'x'"));
        assert!(diag.suggestion.as_ref().is_some_and(|s| s.contains("var x")));
        assert_eq!(diag.related[0].span.line(), 1);
    }

    // -- Literal arithmetic --

    #[test]
    fn string_plus_number() {
        assert_eq!(
            errors("let s = \"a\" + 5"),
            vec!["Cannot perform arithmetic operation '+' on string and number"]
        );
    }

    #[test]
    fn string_times_boolean_every_occurrence() {
        let errs = errors("let s = \"a\" * true\nlet t = \"b\" - 2.5");
        assert_eq!(
            errs,
            vec![
                "Cannot perform arithmetic operation '*' on string and boolean".to_string(),
                "Cannot perform arithmetic operation '-' on string and number".to_string(),
            ]
        );
    }

    #[test]
    fn string_concatenation_is_fine() {
        assert!(errors("let s = \"a\" + \"b\"\nlet t = \"a\" + x").is_empty());
    }
}
