//! Declaration-header parsing over the token stream.
//!
//! AuroraLang analysis does not build a syntax tree. The passes walk the
//! flat token list and use this module to recognize the few shapes they
//! care about: function/extern/constructor headers, class headers,
//! variable declarations, call argument lists and brace-delimited bodies.

mod declarations;
mod expressions;

pub use declarations::{ClassHeader, FnHeader, ParamDecl, TypeRef, VarDecl};
pub use expressions::{block_end, call_close, expression_end, split_arguments};

use crate::lexer::token::{Token, TokenKind};

/// Cursor over a token slice that ends with `Eof`.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    /// Start parsing at token index `pos`.
    pub fn at(tokens: &'t [Token], pos: usize) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token stream must end with Eof"
        );
        Self { tokens, pos }
    }

    /// Index of the current token.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move to token index `pos`.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len().saturating_sub(1));
    }

    // ========================================================================
    // Token manipulation helpers
    // ========================================================================

    /// Peek at the current token kind.
    pub fn peek(&self) -> TokenKind {
        self.peek_at(0)
    }

    /// Peek at a token kind N positions ahead.
    pub fn peek_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Get the current token (the `Eof` token once past the end).
    pub fn current(&self) -> &'t Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    /// Get the previous token (the one just consumed).
    pub fn previous(&self) -> &'t Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Advance past the current token and return it.
    pub fn advance(&mut self) -> &'t Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    /// Consume a token of the expected kind.
    pub fn expect(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.peek() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume if the current token matches, otherwise do nothing.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek() == TokenKind::Eof
    }
}

/// True when token `idx` is the first token on its line.
pub fn starts_line(tokens: &[Token], idx: usize) -> bool {
    idx == 0 || tokens[idx - 1].line() != tokens[idx].line()
}

/// True when token `idx` is the last non-`Eof` token on its line.
pub fn ends_line(tokens: &[Token], idx: usize) -> bool {
    match tokens.get(idx + 1) {
        Some(next) => next.kind == TokenKind::Eof || next.line() != tokens[idx].line(),
        None => true,
    }
}
