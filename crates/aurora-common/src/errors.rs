use crate::span::Span;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// Extra rendering hints attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticTag {
    /// Code that can be removed; editors may render it faded or struck through.
    Unnecessary,
}

/// A related source location providing additional context for a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedSpan {
    pub span: Span,
    pub message: String,
}

/// A diagnostic (error, warning, info, or hint) attached to a source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub related: Vec<RelatedSpan>,
    pub tags: Vec<DiagnosticTag>,
    /// Diagnostic code, e.g. `E0001` for compiler-reported problems.
    pub code: Option<String>,
    /// Producer of the diagnostic when it is not the analyzer itself.
    pub source: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            span: None,
            related: Vec::new(),
            tags: Vec::new(),
            code: None,
            source: None,
            suggestion: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, message)
    }

    pub fn hint(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Hint, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedSpan {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_unnecessary(&self) -> bool {
        self.tags.contains(&DiagnosticTag::Unnecessary)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity.as_str())?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref span) = self.span {
            write!(f, "\n  --> {}", span)?;
        }
        Ok(())
    }
}

/// Convenience collector for diagnostics during analysis.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(message).with_span(span));
    }

    pub fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::warning(message).with_span(span));
    }

    /// Report a style hint tagged as unnecessary code.
    pub fn unnecessary(&mut self, message: impl Into<String>, span: Span) {
        self.report(
            Diagnostic::hint(message)
                .with_span(span)
                .with_tag(DiagnosticTag::Unnecessary),
        );
    }

    /// Move every diagnostic of `other` into this bag, preserving order.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn span() -> Span {
        Span::new("t.aur", Position::new(1, 1, 0), Position::new(1, 2, 1))
    }

    #[test]
    fn builder_chain() {
        let d = Diagnostic::error("boom")
            .with_span(span())
            .with_code("E0001")
            .with_source("compiler");
        assert!(d.is_error());
        assert_eq!(d.code.as_deref(), Some("E0001"));
        assert_eq!(d.source.as_deref(), Some("compiler"));
    }

    #[test]
    fn unnecessary_hint_is_tagged_once() {
        let mut bag = DiagnosticBag::new();
        bag.unnecessary("drop it", span());
        let d = &bag.diagnostics()[0];
        assert_eq!(d.severity, Severity::Hint);
        assert!(d.is_unnecessary());
        let d = d.clone().with_tag(DiagnosticTag::Unnecessary);
        assert_eq!(d.tags.len(), 1);
    }

    #[test]
    fn extend_keeps_order_and_error_state() {
        let mut first = DiagnosticBag::new();
        first.warning("w", span());
        let mut second = DiagnosticBag::new();
        second.error("e", span());
        first.extend(second);
        assert_eq!(first.len(), 2);
        assert!(first.has_errors());
        assert_eq!(first.diagnostics()[1].message, "e");
    }

    #[test]
    fn display_includes_code_and_location() {
        let d = Diagnostic::warning("careful")
            .with_span(span())
            .with_code("W1");
        assert_eq!(d.to_string(), "warning[W1]: careful\n  --> t.aur:1:1");
    }
}
