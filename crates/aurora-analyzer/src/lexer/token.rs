use aurora_common::Span;
use std::fmt;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token (string literals keep their quotes).
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span,
        }
    }

    /// 1-based line the token starts on.
    pub fn line(&self) -> u32 {
        self.span.start.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// All token kinds in AuroraLang.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // === Identifiers ===
    Identifier,

    // === Keywords ===
    Fn,
    Extern,
    Class,
    Constructor,
    Let,
    Var,
    Return,
    If,
    Else,
    While,
    For,
    In,
    Loop,
    Match,
    Break,
    Continue,
    New,
    This,
    Pub,
    True,
    False,
    Null,

    // === Operators ===
    Plus,          // +
    Minus,         // -
    Star,          // *
    Slash,         // /
    Percent,       // %
    EqualEqual,    // ==
    BangEqual,     // !=
    Less,          // <
    Greater,       // >
    LessEqual,     // <=
    GreaterEqual,  // >=
    AmpAmp,        // &&
    PipePipe,      // ||
    Bang,          // !
    Equal,         // =
    PlusEqual,     // +=
    MinusEqual,    // -=
    StarEqual,     // *=
    SlashEqual,    // /=
    Arrow,         // ->
    FatArrow,      // =>
    Dot,           // .
    DotDot,        // ..
    Question,      // ?
    Amp,           // &
    Pipe,          // |

    // === Delimiters ===
    LeftParen,     // (
    RightParen,    // )
    LeftBrace,     // {
    RightBrace,    // }
    LeftBracket,   // [
    RightBracket,  // ]
    Comma,         // ,
    Semicolon,     // ;
    Colon,         // :

    // === Special ===
    /// A character the language does not use; left for the compiler to report.
    Unknown,
    Eof,
}

impl TokenKind {
    /// Try to match an identifier string to a keyword.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "fn" => Some(TokenKind::Fn),
            "extern" => Some(TokenKind::Extern),
            "class" => Some(TokenKind::Class),
            "constructor" => Some(TokenKind::Constructor),
            "let" => Some(TokenKind::Let),
            "var" => Some(TokenKind::Var),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "in" => Some(TokenKind::In),
            "loop" => Some(TokenKind::Loop),
            "match" => Some(TokenKind::Match),
            "break" => Some(TokenKind::Break),
            "continue" => Some(TokenKind::Continue),
            "new" => Some(TokenKind::New),
            "this" => Some(TokenKind::This),
            "pub" => Some(TokenKind::Pub),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            _ => None,
        }
    }

    pub fn is_opening_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::LeftParen | TokenKind::LeftBrace | TokenKind::LeftBracket
        )
    }

    pub fn is_closing_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::RightParen | TokenKind::RightBrace | TokenKind::RightBracket
        )
    }

    /// The closer that balances an opening bracket.
    pub fn closing_bracket(&self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            _ => None,
        }
    }

    /// Source character of a single-character delimiter.
    pub fn bracket_char(&self) -> Option<char> {
        match self {
            TokenKind::LeftParen => Some('('),
            TokenKind::RightParen => Some(')'),
            TokenKind::LeftBrace => Some('{'),
            TokenKind::RightBrace => Some('}'),
            TokenKind::LeftBracket => Some('['),
            TokenKind::RightBracket => Some(']'),
            _ => None,
        }
    }

    /// `+ - * /`
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash
        )
    }

    /// `=` and the compound assignment operators.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
        )
    }
}
