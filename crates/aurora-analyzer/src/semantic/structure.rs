use aurora_common::{Diagnostic, DiagnosticBag};

use crate::lexer::token::{Token, TokenKind};

/// Bracket balance over `()`, `{}` and `[]`.
///
/// Brackets inside strings and comments never become tokens, so they are
/// not counted. Every finding is reported at the single bracket character
/// involved.
pub fn check_brackets(tokens: &[Token]) -> DiagnosticBag {
    let mut diagnostics = DiagnosticBag::new();
    let mut stack: Vec<&Token> = Vec::new();

    for token in tokens {
        if token.kind.is_opening_bracket() {
            stack.push(token);
            continue;
        }
        if !token.kind.is_closing_bracket() {
            continue;
        }

        let found = bracket(token.kind);
        match stack.last() {
            None => {
                diagnostics.error(
                    format!("Unexpected closing '{}' - no matching opening bracket", found),
                    token.span.clone(),
                );
            }
            Some(open) if open.kind.closing_bracket() == Some(token.kind) => {
                stack.pop();
            }
            Some(open) => {
                let expected = open.kind.closing_bracket().map(bracket).unwrap_or('?');
                diagnostics.report(
                    Diagnostic::error(format!(
                        "Mismatched bracket: expected '{}' but found '{}' (to match '{}' at line {})",
                        expected,
                        found,
                        bracket(open.kind),
                        open.line()
                    ))
                    .with_span(token.span.clone())
                    .with_related(open.span.clone(), format!("Opening '{}' here", bracket(open.kind))),
                );
                stack.pop();
            }
        }
    }

    for open in stack {
        let expected = open.kind.closing_bracket().map(bracket).unwrap_or('?');
        diagnostics.error(
            format!(
                "Unclosed '{}' - expected '{}' before end of file",
                bracket(open.kind),
                expected
            ),
            open.span.clone(),
        );
    }

    tracing::debug!(diagnostics = diagnostics.len(), "bracket check complete");
    diagnostics
}

fn bracket(kind: TokenKind) -> char {
    kind.bracket_char().unwrap_or('?')
}
