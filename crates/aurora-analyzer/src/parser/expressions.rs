use std::ops::Range;

use crate::lexer::token::{Token, TokenKind};

/// Index of the `)` closing the `(` at `open`.
///
/// Returns `None` when the list runs into a `{`, `}`, `;`, a mismatched
/// `]` or the end of input before it closes.
pub fn call_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok.kind {
            TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket => {
                depth -= 1;
                if depth == 0 {
                    return (tok.kind == TokenKind::RightParen).then_some(i);
                }
            }
            TokenKind::LeftBrace
            | TokenKind::RightBrace
            | TokenKind::Semicolon
            | TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

/// Split the tokens strictly between `open` and `close` on top-level
/// commas. Empty segments are dropped, so `f()` and `f(a,)` have zero and
/// one argument.
pub fn split_arguments(tokens: &[Token], open: usize, close: usize) -> Vec<Range<usize>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;

    for i in open + 1..close {
        match tokens[i].kind {
            TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                if i > start {
                    args.push(start..i);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if close > start {
        args.push(start..close);
    }
    args
}

/// Exclusive end of the expression starting at `start`.
///
/// The expression runs to the end of its line, continuing onto later lines
/// only while a `(` or `[` is open. It stops early at a top-level `;`, a
/// brace, an unbalanced closer or a keyword that starts a new statement.
pub fn expression_end(tokens: &[Token], start: usize) -> usize {
    let Some(first) = tokens.get(start) else {
        return start;
    };
    let mut last_line = first.line();
    let mut depth = 0usize;
    let mut i = start;

    while let Some(tok) = tokens.get(i) {
        if depth == 0 {
            let stops = matches!(
                tok.kind,
                TokenKind::Eof
                    | TokenKind::Semicolon
                    | TokenKind::LeftBrace
                    | TokenKind::RightBrace
                    | TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::Comma
                    | TokenKind::Let
                    | TokenKind::Var
                    | TokenKind::Fn
                    | TokenKind::Class
                    | TokenKind::Extern
                    | TokenKind::Return
            );
            if stops || tok.line() != last_line {
                break;
            }
        }
        match tok.kind {
            TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket => depth -= 1,
            // Never swallow a body or the end of input.
            TokenKind::LeftBrace | TokenKind::RightBrace | TokenKind::Eof => break,
            _ => {}
        }
        last_line = tok.line();
        i += 1;
    }
    i
}

/// Index of the `}` matching the `{` at `open`, or of the `Eof` token when
/// the body is never closed.
pub fn block_end(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok.kind {
            TokenKind::LeftBrace => depth += 1,
            TokenKind::RightBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            TokenKind::Eof => return i,
            _ => {}
        }
    }
    tokens.len().saturating_sub(1)
}
