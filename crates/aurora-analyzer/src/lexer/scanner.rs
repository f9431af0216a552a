use aurora_common::{DiagnosticBag, Position};

use super::cursor::Cursor;
use super::token::{Token, TokenKind};

/// Hand-written lexer for AuroraLang.
///
/// Line comments start with `#`. Strings are double-quoted and end at the
/// first `"` not preceded by `\`, or at the end of the line.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    diagnostics: DiagnosticBag,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source, file),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Tokenize the entire source, returning all tokens and diagnostics.
    /// The last token is always `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, DiagnosticBag) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized");
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.cursor.position();
        let prev = self.cursor.prev();
        let Some(ch) = self.cursor.advance() else {
            return Token::eof(self.cursor.span_from(start));
        };

        match ch {
            // === Delimiters ===
            '(' => self.make_token(TokenKind::LeftParen, start),
            ')' => self.make_token(TokenKind::RightParen, start),
            '{' => self.make_token(TokenKind::LeftBrace, start),
            '}' => self.make_token(TokenKind::RightBrace, start),
            '[' => self.make_token(TokenKind::LeftBracket, start),
            ']' => self.make_token(TokenKind::RightBracket, start),
            ',' => self.make_token(TokenKind::Comma, start),
            ';' => self.make_token(TokenKind::Semicolon, start),
            ':' => self.make_token(TokenKind::Colon, start),
            '?' => self.make_token(TokenKind::Question, start),
            '%' => self.make_token(TokenKind::Percent, start),

            // === Operators (multi-char disambiguation) ===
            '+' => self.one_or_two(start, '=', TokenKind::PlusEqual, TokenKind::Plus),
            '*' => self.one_or_two(start, '=', TokenKind::StarEqual, TokenKind::Star),
            '/' => self.one_or_two(start, '=', TokenKind::SlashEqual, TokenKind::Slash),
            '!' => self.one_or_two(start, '=', TokenKind::BangEqual, TokenKind::Bang),
            '<' => self.one_or_two(start, '=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.one_or_two(start, '=', TokenKind::GreaterEqual, TokenKind::Greater),
            '&' => self.one_or_two(start, '&', TokenKind::AmpAmp, TokenKind::Amp),
            '|' => self.one_or_two(start, '|', TokenKind::PipePipe, TokenKind::Pipe),
            '-' => {
                if self.cursor.eat('>') {
                    self.make_token(TokenKind::Arrow, start)
                } else if self.cursor.eat('=') {
                    self.make_token(TokenKind::MinusEqual, start)
                } else {
                    self.make_token(TokenKind::Minus, start)
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::EqualEqual, start)
                } else if self.cursor.eat('>') {
                    self.make_token(TokenKind::FatArrow, start)
                } else {
                    self.make_token(TokenKind::Equal, start)
                }
            }
            '.' => {
                if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                    // `.5`
                    self.cursor.eat_while(|c| c.is_ascii_digit());
                    self.make_token(TokenKind::FloatLiteral, start)
                } else if self.cursor.eat('.') {
                    self.make_token(TokenKind::DotDot, start)
                } else {
                    self.make_token(TokenKind::Dot, start)
                }
            }

            // === String literals ===
            // An escaped quote never opens a string, even outside one.
            '"' if prev == Some('\\') => self.make_token(TokenKind::Unknown, start),
            '"' => self.scan_string(start),

            // === Number literals ===
            c if c.is_ascii_digit() => self.scan_number(start),

            // === Identifiers and keywords ===
            c if is_ident_start(c) => self.scan_identifier(start),

            _ => self.make_token(TokenKind::Unknown, start),
        }
    }

    // ---------------------------------------------------------------
    // Whitespace & comments
    // ---------------------------------------------------------------

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());

            if self.cursor.peek() == Some('#') {
                self.cursor.eat_while(|c| c != '\n');
                continue;
            }

            break;
        }
    }

    // ---------------------------------------------------------------
    // String scanning
    // ---------------------------------------------------------------

    /// Scan a string after its opening `"` has been consumed. The lexeme
    /// keeps both quotes; escapes are not decoded.
    fn scan_string(&mut self, start: Position) -> Token {
        loop {
            match self.cursor.peek() {
                Some('"') if self.cursor.prev() != Some('\\') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::StringLiteral, start);
                }
                Some('\n') | None => {
                    let token = self.make_token(TokenKind::StringLiteral, start);
                    self.diagnostics
                        .error("unterminated string literal", token.span.clone());
                    return token;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Number scanning
    // ---------------------------------------------------------------

    /// Scan a decimal number. `1.` and `1.5` are floats; `1..5` is an
    /// integer followed by a range operator.
    fn scan_number(&mut self, start: Position) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let is_float = self.cursor.peek() == Some('.')
            && !self
                .cursor
                .peek_second()
                .is_some_and(|c| c == '.' || is_ident_start(c));

        if is_float {
            self.cursor.advance(); // consume '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());
            self.make_token(TokenKind::FloatLiteral, start)
        } else {
            self.make_token(TokenKind::IntLiteral, start)
        }
    }

    // ---------------------------------------------------------------
    // Identifier / keyword scanning
    // ---------------------------------------------------------------

    fn scan_identifier(&mut self, start: Position) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let lexeme = self.cursor.slice_from(start.offset);
        let kind = TokenKind::keyword_from_str(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Create a token using the slice from `start` to current position.
    fn make_token(&self, kind: TokenKind, start: Position) -> Token {
        let lexeme = self.cursor.slice_from(start.offset);
        let span = self.cursor.span_from(start);
        Token::new(kind, lexeme, span)
    }

    fn one_or_two(
        &mut self,
        start: Position,
        second: char,
        double: TokenKind,
        single: TokenKind,
    ) -> Token {
        if self.cursor.eat(second) {
            self.make_token(double, start)
        } else {
            self.make_token(single, start)
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
