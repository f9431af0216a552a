use std::ops::Range;

use aurora_common::Span;

use super::expressions::{call_close, expression_end, split_arguments};
use super::Parser;
use crate::lexer::token::{Token, TokenKind};

/// A type annotation as written: a name with an optional `?` suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// Source text, e.g. `int` or `Point?`.
    pub text: String,
    pub span: Span,
}

/// `name` or `name: type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub span: Span,
}

/// Header of a function, extern or constructor: `fn NAME(params) [-> T]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FnHeader {
    /// Index of the `fn`, `extern` or `constructor` token.
    pub keyword: usize,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<TypeRef>,
    /// Index of the last token belonging to the header.
    pub end: usize,
    /// Index of the `{` immediately following the header, if any.
    pub body: Option<usize>,
    /// From the keyword to the end of the header.
    pub span: Span,
}

/// `class NAME [(...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    pub keyword: usize,
    pub name: String,
    pub name_span: Span,
    pub end: usize,
    pub body: Option<usize>,
}

/// `let|var NAME [: T] [= expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub keyword: usize,
    pub mutable: bool,
    pub name: String,
    pub name_span: Span,
    pub ty: Option<TypeRef>,
    /// Token range of the initializer expression.
    pub init: Option<Range<usize>>,
}

impl<'t> Parser<'t> {
    /// Parse `fn NAME(params) [-> T]`, positioned at `fn`.
    pub fn parse_fn_header(&mut self) -> Option<FnHeader> {
        let keyword = self.pos();
        self.expect(TokenKind::Fn)?;
        let name = self.expect(TokenKind::Identifier)?;
        self.parse_signature(keyword, name.lexeme.clone(), name.span.clone())
    }

    /// Parse `extern NAME(params) [-> T]`, positioned at `extern`.
    pub fn parse_extern(&mut self) -> Option<FnHeader> {
        let keyword = self.pos();
        self.expect(TokenKind::Extern)?;
        let name = self.expect(TokenKind::Identifier)?;
        self.parse_signature(keyword, name.lexeme.clone(), name.span.clone())
    }

    /// Parse `constructor(params)`, positioned at `constructor`.
    pub fn parse_constructor_header(&mut self) -> Option<FnHeader> {
        let keyword = self.pos();
        let kw = self.expect(TokenKind::Constructor)?;
        self.parse_signature(keyword, "constructor".to_string(), kw.span.clone())
    }

    /// Parameter list and optional return annotation. Fails when the
    /// parameter list is not closed.
    fn parse_signature(&mut self, keyword: usize, name: String, name_span: Span) -> Option<FnHeader> {
        let open = self.pos();
        self.expect(TokenKind::LeftParen)?;
        let close = call_close(self.tokens, open)?;
        let params = parse_params(self.tokens, open, close);
        self.seek(close + 1);

        let return_type = if self.eat(TokenKind::Arrow) {
            self.parse_type_ref()
        } else {
            None
        };

        let end = self.pos() - 1;
        let body = (self.peek() == TokenKind::LeftBrace).then(|| self.pos());
        let span = self.tokens[keyword].span.merge(&self.tokens[end].span);

        Some(FnHeader {
            keyword,
            name,
            name_span,
            params,
            return_type,
            end,
            body,
            span,
        })
    }

    /// Parse `class NAME [(...)]`, positioned at `class`.
    pub fn parse_class_header(&mut self) -> Option<ClassHeader> {
        let keyword = self.pos();
        self.expect(TokenKind::Class)?;
        let name = self.expect(TokenKind::Identifier)?;

        if self.peek() == TokenKind::LeftParen {
            if let Some(close) = call_close(self.tokens, self.pos()) {
                self.seek(close + 1);
            }
        }

        let end = self.pos() - 1;
        let body = (self.peek() == TokenKind::LeftBrace).then(|| self.pos());
        Some(ClassHeader {
            keyword,
            name: name.lexeme.clone(),
            name_span: name.span.clone(),
            end,
            body,
        })
    }

    /// Parse `let|var NAME [: T] [= expr]`, positioned at the keyword.
    pub fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let keyword = self.pos();
        let mutable = match self.peek() {
            TokenKind::Let => false,
            TokenKind::Var => true,
            _ => return None,
        };
        self.advance();
        let name = self.expect(TokenKind::Identifier)?;

        let ty = if self.eat(TokenKind::Colon) {
            self.parse_type_ref()
        } else {
            None
        };

        let init = if self.eat(TokenKind::Equal) {
            let start = self.pos();
            let end = expression_end(self.tokens, start);
            self.seek(end);
            (end > start).then_some(start..end)
        } else {
            None
        };

        Some(VarDecl {
            keyword,
            mutable,
            name: name.lexeme.clone(),
            name_span: name.span.clone(),
            ty,
            init,
        })
    }

    /// `NAME` or `NAME?`
    pub fn parse_type_ref(&mut self) -> Option<TypeRef> {
        let name = self.expect(TokenKind::Identifier)?;
        let mut text = name.lexeme.clone();
        let mut span = name.span.clone();
        if self.peek() == TokenKind::Question {
            let q = self.advance();
            text.push('?');
            span = span.merge(&q.span);
        }
        Some(TypeRef { text, span })
    }
}

/// Parameters between `open` and `close`. Each comma-separated part must
/// be `name` or `name: type[?]`; anything else is skipped.
fn parse_params(tokens: &[Token], open: usize, close: usize) -> Vec<ParamDecl> {
    split_arguments(tokens, open, close)
        .into_iter()
        .filter_map(|range| parse_param(&tokens[range]))
        .collect()
}

fn parse_param(part: &[Token]) -> Option<ParamDecl> {
    use TokenKind::{Colon, Identifier, Question};

    let kinds: Vec<TokenKind> = part.iter().map(|t| t.kind).collect();
    let ty = match kinds.as_slice() {
        [Identifier] => None,
        [Identifier, Colon, Identifier] => Some(TypeRef {
            text: part[2].lexeme.clone(),
            span: part[2].span.clone(),
        }),
        [Identifier, Colon, Identifier, Question] => Some(TypeRef {
            text: format!("{}?", part[2].lexeme),
            span: part[2].span.merge(&part[3].span),
        }),
        _ => return None,
    };

    let first = part.first()?;
    let last = part.last()?;
    Some(ParamDecl {
        name: first.lexeme.clone(),
        ty,
        span: first.span.merge(&last.span),
    })
}
