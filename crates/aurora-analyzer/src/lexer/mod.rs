pub mod cursor;
pub mod token;

mod classify;
mod scanner;

pub use classify::{classify_line, CharClass};
pub use scanner::Lexer;
pub use token::{Token, TokenKind};
