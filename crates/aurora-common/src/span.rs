/// Source position within a file (1-based line/column, 0-based byte offset).
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// 0-based byte offset from start of file.
    pub offset: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// 0-based `(line, character)` pair, the shape editors expect.
    pub fn zero_based(&self) -> (u32, u32) {
        (self.line.saturating_sub(1), self.column.saturating_sub(1))
    }
}

/// A range in source code, from `start` to `end` in a given document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// Document identity (path or URI).
    pub file: String,
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
}

impl Span {
    pub fn new(file: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }

    /// Create a dummy span for built-in symbols.
    pub fn dummy() -> Self {
        Self {
            file: String::new(),
            start: Position::default(),
            end: Position::default(),
        }
    }

    /// Merge two spans into one that covers both (same file assumed).
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span {
            file: self.file.clone(),
            start,
            end,
        }
    }

    /// 1-based line the span starts on.
    pub fn line(&self) -> u32 {
        self.start.line
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file, self.start.line, self.start.column
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new("a.aur", Position::new(1, 1, 0), Position::new(1, 4, 3));
        let b = Span::new("a.aur", Position::new(2, 2, 10), Position::new(2, 6, 14));
        let merged = b.merge(&a);
        assert_eq!(merged.start, a.start);
        assert_eq!(merged.end, b.end);
    }

    #[test]
    fn zero_based_conversion() {
        assert_eq!(Position::new(3, 7, 40).zero_based(), (2, 6));
        assert_eq!(Position::default().zero_based(), (0, 0));
    }

    #[test]
    fn display_uses_one_based_location() {
        let span = Span::new("main.aur", Position::new(4, 2, 30), Position::new(4, 5, 33));
        assert_eq!(span.to_string(), "main.aur:4:2");
    }
}
