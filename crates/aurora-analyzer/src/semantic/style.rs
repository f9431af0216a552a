use std::ops::Range;

use aurora_common::DiagnosticBag;

use crate::lexer::token::{Token, TokenKind};
use crate::parser::Parser;
use crate::source::SourceFile;

const SNAKE_CASE: &str = "Consider using camelCase instead of snake_case for better AuroraLang style";
const SEMICOLON: &str = "Semicolons are optional in AuroraLang";
const PUB_MEMBER: &str = "Class members are public by default. The 'pub' modifier is unnecessary.";

/// Line-oriented lexical checks.
///
/// Headers that end their line without `{` are always reported as errors.
/// The hint family (snake_case names, trailing semicolons, `pub` members)
/// runs only when `hints` is set; every hint is tagged unnecessary.
pub fn check_style(source: &SourceFile<'_>, tokens: &[Token], hints: bool) -> DiagnosticBag {
    let mut checker = StyleChecker {
        source,
        tokens,
        diagnostics: DiagnosticBag::new(),
    };
    let lines = token_lines(tokens);

    for line in &lines {
        checker.check_missing_brace(line);
        if hints {
            checker.check_snake_case(line);
            checker.check_semicolon(line);
        }
    }
    if hints {
        checker.check_pub_members(&lines);
    }

    tracing::debug!(
        hints,
        diagnostics = checker.diagnostics.len(),
        "style check complete"
    );
    checker.diagnostics
}

struct StyleChecker<'a, 'src> {
    source: &'a SourceFile<'src>,
    tokens: &'a [Token],
    diagnostics: DiagnosticBag,
}

impl StyleChecker<'_, '_> {
    /// `fn`, `constructor` or `class` header that is the whole line.
    fn check_missing_brace(&mut self, line: &Range<usize>) {
        let first = line.start;
        let mut parser = Parser::at(self.tokens, first);

        let (header_end, what) = match self.tokens[first].kind {
            TokenKind::Fn => (parser.parse_fn_header().map(|h| h.end), "Function"),
            TokenKind::Constructor => (
                parser.parse_constructor_header().map(|h| h.end),
                "Constructor",
            ),
            TokenKind::Class => (parser.parse_class_header().map(|h| h.end), "Class"),
            _ => return,
        };

        if header_end == Some(line.end - 1) {
            self.diagnostics.error(
                format!("{} definition missing opening '{{' brace", what),
                self.source.line_span(self.tokens[first].line()),
            );
        }
    }

    fn check_snake_case(&mut self, line: &Range<usize>) {
        for token in &self.tokens[line.clone()] {
            if token.kind == TokenKind::Identifier && is_snake_case(&token.lexeme) {
                self.diagnostics.unnecessary(SNAKE_CASE, token.span.clone());
            }
        }
    }

    /// A line ending in `;`, unless it is an `extern` declaration.
    fn check_semicolon(&mut self, line: &Range<usize>) {
        let first = &self.tokens[line.start];
        let last = &self.tokens[line.end - 1];
        if last.kind == TokenKind::Semicolon && first.kind != TokenKind::Extern {
            self.diagnostics.unnecessary(SEMICOLON, last.span.clone());
        }
    }

    /// `pub` in front of a member inside a class body. Class extent is
    /// tracked by brace depth, independently of the other passes.
    fn check_pub_members(&mut self, lines: &[Range<usize>]) {
        let mut in_class = false;
        let mut depth: i64 = 0;

        for line in lines {
            let tokens = &self.tokens[line.clone()];
            if tokens[0].kind == TokenKind::Class
                && tokens.get(1).is_some_and(|t| t.kind == TokenKind::Identifier)
            {
                in_class = true;
            }

            for token in tokens {
                match token.kind {
                    TokenKind::LeftBrace => depth += 1,
                    TokenKind::RightBrace => {
                        depth -= 1;
                        if depth == 0 {
                            in_class = false;
                        }
                    }
                    _ => {}
                }
            }

            if in_class && tokens[0].kind == TokenKind::Pub && tokens.get(1).is_some_and(is_member_start) {
                self.diagnostics.unnecessary(PUB_MEMBER, tokens[0].span.clone());
            }
        }
    }
}

fn is_member_start(token: &Token) -> bool {
    match token.kind {
        TokenKind::Let | TokenKind::Var | TokenKind::Fn | TokenKind::Constructor => true,
        TokenKind::Identifier => token.lexeme == "static",
        _ => false,
    }
}

/// Two or more runs of lowercase ASCII letters joined by single `_`.
fn is_snake_case(name: &str) -> bool {
    let mut parts = 0;
    for part in name.split('_') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_lowercase()) {
            return false;
        }
        parts += 1;
    }
    parts >= 2
}

/// Token index ranges, one per source line holding at least one token.
/// The trailing `Eof` token is never part of a line.
fn token_lines(tokens: &[Token]) -> Vec<Range<usize>> {
    let end = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Eof)
        .unwrap_or(tokens.len());

    let mut lines = Vec::new();
    let mut start = 0;
    for i in 1..=end {
        if i == end || tokens[i].line() != tokens[start].line() {
            if start < i {
                lines.push(start..i);
            }
            start = i;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use aurora_common::{Diagnostic, Severity};

    use super::*;
    use crate::lexer::Lexer;

    fn check(source: &str, hints: bool) -> Vec<Diagnostic> {
        let file = SourceFile::new("test.aur", source);
        let (tokens, _) = Lexer::new(source, "test.aur").tokenize();
        check_style(&file, &tokens, hints).into_diagnostics()
    }

    fn messages(source: &str) -> Vec<(Severity, String)> {
        check(source, true)
            .into_iter()
            .map(|d| (d.severity, d.message))
            .collect()
    }

    #[test]
    fn clean_code_has_no_findings() {
        let src = "fn add(a, b) -> int {\n    return a + b\n}\nextern putchard(x);\nlet camelCase = 1";
        assert!(messages(src).is_empty(), "{:?}", messages(src));
    }

    #[test]
    fn missing_braces() {
        let src = "fn f(a) -> int\n{\n}\nclass Point\n{\n    constructor(x)\n    {\n    }\n}";
        let errors: Vec<String> = messages(src)
            .into_iter()
            .filter(|(s, _)| *s == Severity::Error)
            .map(|(_, m)| m)
            .collect();
        assert_eq!(
            errors,
            vec![
                "Function definition missing opening '{' brace".to_string(),
                "Class definition missing opening '{' brace".to_string(),
                "Constructor definition missing opening '{' brace".to_string(),
            ]
        );
    }

    #[test]
    fn missing_brace_spans_whole_line() {
        let diags = check("    fn f()", false);
        assert_eq!(diags.len(), 1);
        let span = diags[0].span.as_ref().unwrap();
        assert_eq!((span.start.column, span.end.column), (1, 11));
    }

    #[test]
    fn snake_case_hint() {
        let diags = check("let my_value = other_thing + x_1 + _x + ok", true);
        let hinted: Vec<_> = diags
            .iter()
            .filter(|d| d.message == SNAKE_CASE)
            .map(|d| d.span.as_ref().unwrap().start.column)
            .collect();
        assert_eq!(hinted, vec![5, 16]);
        assert!(diags.iter().all(|d| d.is_unnecessary() && d.severity == Severity::Hint));
    }

    #[test]
    fn semicolon_hint_skips_extern() {
        let diags = check("let x = 1;\nextern f();\nlet y = 2; # done", true);
        let lines: Vec<u32> = diags
            .iter()
            .filter(|d| d.message == SEMICOLON)
            .map(|d| d.span.as_ref().unwrap().line())
            .collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn pub_members_in_class() {
        let src = "pub fn outside() {}\nclass A {\n    pub var x = 1\n    pub fn get() {\n        return\n    }\n    pub static\n}\npub let y = 2";
        let lines: Vec<u32> = check(src, true)
            .iter()
            .filter(|d| d.message == PUB_MEMBER)
            .map(|d| d.span.as_ref().unwrap().line())
            .collect();
        assert_eq!(lines, vec![3, 4, 7]);
    }

    #[test]
    fn hints_can_be_disabled() {
        let src = "let snake_name = 1;\nclass A {\n    pub var x = 1\n}\nfn g()";
        let diags = check(src, false);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn snake_case_shapes() {
        assert!(is_snake_case("a_b"));
        assert!(is_snake_case("one_two_three"));
        assert!(!is_snake_case("single"));
        assert!(!is_snake_case("a__b"));
        assert!(!is_snake_case("a_B"));
        assert!(!is_snake_case("a_"));
    }
}
