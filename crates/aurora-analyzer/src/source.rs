use aurora_common::{Position, Span};

/// A document's text plus a line index for position arithmetic.
///
/// Lines are 1-based. Line text never includes the `\n` terminator or a
/// trailing `\r`.
#[derive(Debug, Clone)]
pub struct SourceFile<'src> {
    name: String,
    text: &'src str,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
}

impl<'src> SourceFile<'src> {
    pub fn new(name: impl Into<String>, text: &'src str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of a 1-based line.
    pub fn line(&self, line: u32) -> Option<&'src str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let text = &self.text[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Number of characters on a 1-based line.
    pub fn line_len(&self, line: u32) -> u32 {
        self.line(line).map(|l| l.chars().count() as u32).unwrap_or(0)
    }

    /// Position of a 1-based `(line, column)`; the column is clamped to
    /// one past the last character of the line.
    pub fn position(&self, line: u32, column: u32) -> Option<Position> {
        let text = self.line(line)?;
        let start = self.line_starts[(line - 1) as usize];
        let wanted = column.max(1) as usize - 1;
        let (chars, bytes) = text
            .char_indices()
            .take(wanted)
            .fold((0usize, 0usize), |(n, _), (i, ch)| (n + 1, i + ch.len_utf8()));
        Some(Position::new(
            line,
            chars as u32 + 1,
            (start + bytes) as u32,
        ))
    }

    /// Position just past the last character of a line.
    pub fn line_end(&self, line: u32) -> Position {
        self.position(line, u32::MAX)
            .unwrap_or_else(|| Position::new(line, 1, self.text.len() as u32))
    }

    /// Span from `start` to the end of its line.
    pub fn to_line_end(&self, start: Position) -> Span {
        self.span(start, self.line_end(start.line))
    }

    /// Span covering a whole line.
    pub fn line_span(&self, line: u32) -> Span {
        let start = self
            .position(line, 1)
            .unwrap_or_else(|| Position::new(line, 1, self.text.len() as u32));
        self.to_line_end(start)
    }

    pub fn span(&self, start: Position, end: Position) -> Span {
        Span::new(self.name.clone(), start, end)
    }

    /// Source text between two positions.
    pub fn slice(&self, start: Position, end: Position) -> &'src str {
        let from = (start.offset as usize).min(self.text.len());
        let to = (end.offset as usize).clamp(from, self.text.len());
        &self.text[from..to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_without_terminators() {
        let src = SourceFile::new("a.aur", "one\r\ntwo\n\nfour");
        assert_eq!(src.line_count(), 4);
        assert_eq!(src.line(1), Some("one"));
        assert_eq!(src.line(2), Some("two"));
        assert_eq!(src.line(3), Some(""));
        assert_eq!(src.line(4), Some("four"));
        assert_eq!(src.line(5), None);
        assert_eq!(src.line(0), None);
    }

    #[test]
    fn position_counts_chars_and_bytes() {
        let src = SourceFile::new("a.aur", "x\né = 1");
        let pos = src.position(2, 3).unwrap();
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 2 + 3);
    }

    #[test]
    fn position_clamps_to_line_end() {
        let src = SourceFile::new("a.aur", "abc\nde");
        let pos = src.position(1, 40).unwrap();
        assert_eq!(pos.column, 4);
        assert_eq!(pos.offset, 3);
        assert_eq!(src.line_end(2).column, 3);
    }

    #[test]
    fn line_span_and_slice() {
        let src = SourceFile::new("a.aur", "let x = 1\nreturn 5");
        let span = src.line_span(2);
        assert_eq!(span.start.column, 1);
        assert_eq!(span.end.column, 9);
        assert_eq!(src.slice(span.start, span.end), "return 5");
    }
}
