use serde::Serialize;

use crate::errors::{Diagnostic, DiagnosticTag, Severity};
use crate::span::{Position, Span};

/// All diagnostics for one document, in the order they were produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDiagnostics {
    /// Identity of the analyzed document (path or URI).
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentDiagnostics {
    pub fn new(uri: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            uri: uri.into(),
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Serializable view with 0-based ranges.
    pub fn to_record(&self) -> DocumentRecord {
        DocumentRecord {
            uri: self.uri.clone(),
            diagnostics: self.diagnostics.iter().map(DiagnosticRecord::from).collect(),
        }
    }
}

/// JSON shape of [`DocumentDiagnostics`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub uri: String,
    pub diagnostics: Vec<DiagnosticRecord>,
}

/// JSON shape of a single diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeRecord>,
    pub severity: &'static str,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedRecord {
    pub uri: String,
    pub range: RangeRecord,
    pub message: String,
}

/// 0-based start/end range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeRecord {
    pub start: PositionRecord,
    pub end: PositionRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    pub line: u32,
    pub character: u32,
}

impl From<Position> for PositionRecord {
    fn from(pos: Position) -> Self {
        let (line, character) = pos.zero_based();
        Self { line, character }
    }
}

impl From<&Span> for RangeRecord {
    fn from(span: &Span) -> Self {
        Self {
            start: span.start.into(),
            end: span.end.into(),
        }
    }
}

impl From<&Diagnostic> for DiagnosticRecord {
    fn from(diag: &Diagnostic) -> Self {
        Self {
            range: diag.span.as_ref().map(RangeRecord::from),
            severity: diag.severity.as_str(),
            message: diag.message.clone(),
            related: diag
                .related
                .iter()
                .map(|r| RelatedRecord {
                    uri: r.span.file.clone(),
                    range: RangeRecord::from(&r.span),
                    message: r.message.clone(),
                })
                .collect(),
            tags: diag
                .tags
                .iter()
                .map(|tag| match tag {
                    DiagnosticTag::Unnecessary => "unnecessary",
                })
                .collect(),
            code: diag.code.clone(),
            source: diag.source.clone(),
            suggestion: diag.suggestion.clone(),
        }
    }
}
