use aurora_common::DiagnosticBag;

use super::types::Type;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::{block_end, ends_line, FnHeader, Parser};
use crate::source::SourceFile;

/// Checks that `return` statements agree with the declared return type.
///
/// Every `fn` with a body is checked, methods included. Functions without
/// a `->` annotation are `void` here.
pub struct ReturnChecker<'a, 'src> {
    source: &'a SourceFile<'src>,
    tokens: &'a [Token],
    diagnostics: DiagnosticBag,
}

impl<'a, 'src> ReturnChecker<'a, 'src> {
    pub fn new(source: &'a SourceFile<'src>, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn check(mut self) -> DiagnosticBag {
        let tokens = self.tokens;
        let mut checked = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Fn {
                continue;
            }
            let Some(header) = Parser::at(tokens, i).parse_fn_header() else {
                continue;
            };
            if let Some(body) = header.body {
                self.check_function(&header, body);
                checked += 1;
            }
        }
        tracing::debug!(
            functions = checked,
            diagnostics = self.diagnostics.len(),
            "return checking complete"
        );
        self.diagnostics
    }

    fn check_function(&mut self, header: &FnHeader, body: usize) {
        let return_type = header
            .return_type
            .as_ref()
            .map(|t| Type::from_name(&t.text))
            .unwrap_or(Type::Void);
        let end = block_end(self.tokens, body);

        let mut returns = 0usize;
        for idx in body + 1..end {
            if self.tokens[idx].kind != TokenKind::Return {
                continue;
            }
            returns += 1;
            let keyword = &self.tokens[idx];

            match (self.has_value(idx), return_type == Type::Void) {
                (true, true) => {
                    let span = self.source.to_line_end(keyword.span.start);
                    self.diagnostics.error(
                        format!("Cannot return a value from a void function '{}'", header.name),
                        span,
                    );
                }
                (false, false) => {
                    self.diagnostics.error(
                        format!(
                            "Cannot use empty return in non-void function '{}'. Expected return type: '{}'",
                            header.name, return_type
                        ),
                        keyword.span.clone(),
                    );
                }
                _ => {}
            }
        }

        if returns == 0 && return_type != Type::Void {
            self.diagnostics.warning(
                format!(
                    "Function '{}' with return type '{}' should have at least one return statement",
                    header.name, return_type
                ),
                header.span.clone(),
            );
        }
    }

    /// A `return` carries a value when the next token sits on the same
    /// line and is not `;` or `}`.
    fn has_value(&self, idx: usize) -> bool {
        !ends_line(self.tokens, idx)
            && !matches!(
                self.tokens[idx + 1].kind,
                TokenKind::Semicolon | TokenKind::RightBrace
            )
    }
}
