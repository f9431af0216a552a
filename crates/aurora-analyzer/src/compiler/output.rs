use std::sync::LazyLock;

use aurora_common::{Diagnostic, Severity};
use regex::Regex;

use crate::source::SourceFile;

/// Producer name attached to compiler-reported diagnostics.
pub const COMPILER_SOURCE: &str = "compiler";

/// Width of the range given to a compiler diagnostic; the compiler only
/// reports a start column.
const RANGE_WIDTH: u32 = 5;

/// One finding: `SEVERITY[CODE]: MESSAGE` anywhere on a line, then
/// `--> PATH:LINE:COL` on the next.
static FINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\[(\w+)\]:[ \t]*(.+)\r?\n[ \t]*-->[ \t]*(.+):(\d+):(\d+)")
        .expect("compiler finding pattern is valid")
});

/// Parse diagnostics out of the compiler's text output.
///
/// The compiler prints each finding as two lines:
///
/// ```text
/// Error[E0001]: Expected parameter name (got '{')
///   --> main.aur:9:10
/// ```
///
/// Findings whose line falls outside `source` are dropped.
pub fn parse_compiler_output(output: &str, source: &SourceFile<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for caps in FINDING.captures_iter(output) {
        let message = caps[3].trim();
        if message.is_empty() {
            continue;
        }
        let (Ok(line), Ok(column)) = (caps[5].parse::<u32>(), caps[6].parse::<u32>()) else {
            continue;
        };
        if line == 0 || line > source.line_count() {
            tracing::debug!(line, "compiler diagnostic outside the document");
            continue;
        }

        // 0-based column clamped to the line, then back to 1-based.
        let len = source.line_len(line);
        let start = column.saturating_sub(1).min(len);
        let end = column.saturating_sub(1).saturating_add(RANGE_WIDTH).min(len);
        let (Some(from), Some(to)) = (
            source.position(line, start + 1),
            source.position(line, end + 1),
        ) else {
            continue;
        };

        let mut diagnostic = Diagnostic::error(message)
            .with_span(source.span(from, to))
            .with_code(&caps[2])
            .with_source(COMPILER_SOURCE);
        diagnostic.severity = severity_of(&caps[1]);
        diagnostics.push(diagnostic);
    }

    tracing::debug!(count = diagnostics.len(), "parsed compiler output");
    diagnostics
}

/// Severity for the compiler's leading word, compared case-insensitively.
fn severity_of(word: &str) -> Severity {
    if word.eq_ignore_ascii_case("warning") {
        Severity::Warning
    } else if word.eq_ignore_ascii_case("note") {
        Severity::Info
    } else {
        Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "fn main() {\n    let x = 1\n    printd(x, y)\n}";

    fn parse(output: &str) -> Vec<Diagnostic> {
        let file = SourceFile::new("main.aur", SOURCE);
        parse_compiler_output(output, &file)
    }

    #[test]
    fn error_with_code_and_location() {
        let diags = parse("Error[E0001]: Expected parameter name (got '{')\n  --> main.aur:3:5\n");
        assert_eq!(diags.len(), 1);
        let d = &diags[0];
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "Expected parameter name (got '{')");
        assert_eq!(d.code.as_deref(), Some("E0001"));
        assert_eq!(d.source.as_deref(), Some("compiler"));
        let span = d.span.as_ref().unwrap();
        assert_eq!((span.start.line, span.start.column, span.end.column), (3, 5, 10));
    }

    #[test]
    fn severity_words() {
        let output = "warning[W1]: unused\n --> a.aur:1:1\nNOTE[N2]: see here\n --> a.aur:2:1\nfatal[F3]: boom\n --> a.aur:2:2";
        let severities: Vec<Severity> = parse(output).iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Warning, Severity::Info, Severity::Error]
        );
    }

    #[test]
    fn range_is_clamped_to_line() {
        let diags = parse("error[E2]: late\n--> main.aur:4:1\nerror[E3]: past end\n--> main.aur:2:40");
        let first = diags[0].span.as_ref().unwrap();
        assert_eq!((first.start.column, first.end.column), (1, 2));
        let second = diags[1].span.as_ref().unwrap();
        assert_eq!((second.start.column, second.end.column), (14, 14));
    }

    #[test]
    fn lines_outside_document_are_dropped() {
        assert!(parse("error[E1]: nope\n  --> main.aur:9:1\nerror[E1]: zero\n  --> main.aur:0:1").is_empty());
    }

    #[test]
    fn header_and_location_must_be_adjacent() {
        let output = "build: error[E1]: split\n\n  --> main.aur:1:1\nwarning[W2]: crlf\r\n  --> main.aur:2:5\r\n";
        let diags = parse(output);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "crlf");
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn unrelated_output_is_ignored() {
        let output = "Compiling main.aur\nerror: no code here\n  --> main.aur:1:1\nerror[E1]:\n  --> main.aur:1:1\nDone.";
        assert!(parse(output).is_empty());
    }
}
