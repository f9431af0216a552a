pub mod resolver;
pub mod returns;
pub mod scope;
pub mod structure;
pub mod style;
pub mod symbols;
pub mod types;

use aurora_common::{DiagnosticBag, DocumentDiagnostics};

use crate::lexer::Lexer;
use crate::source::SourceFile;

/// Knobs for [`analyze_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Emit the style hint family (snake_case, semicolons, `pub` members).
    pub style_hints: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { style_hints: true }
    }
}

/// Analyze one document with default options.
pub fn analyze(text: &str, uri: &str) -> DocumentDiagnostics {
    analyze_with_options(text, uri, &AnalysisOptions::default())
}

/// Run every pass over `text` and collect their diagnostics.
///
/// Passes run in a fixed order and none suppresses another's output:
///  1. Scanning (unterminated strings)
///  2. Bracket balance
///  3. Symbol collection (duplicate functions and classes)
///  4. Scope resolution (calls, declarations, assignments, literal misuse)
///  5. Return consistency
///  6. Style (missing header braces, then the optional hints)
///
/// Every call starts from fresh tables seeded only with the built-ins, so
/// the result depends on `text` alone.
pub fn analyze_with_options(text: &str, uri: &str, options: &AnalysisOptions) -> DocumentDiagnostics {
    let source = SourceFile::new(uri, text);
    let (tokens, lex_diags) = Lexer::new(text, uri).tokenize();

    let mut all = DiagnosticBag::new();
    all.extend(lex_diags);
    all.extend(structure::check_brackets(&tokens));

    let (symbols, symbol_diags) = symbols::SymbolCollector::new(&tokens).collect();
    all.extend(symbol_diags);
    all.extend(resolver::Resolver::new(&source, &tokens, &symbols).resolve());
    all.extend(returns::ReturnChecker::new(&source, &tokens).check());
    all.extend(style::check_style(&source, &tokens, options.style_hints));

    tracing::debug!(
        uri,
        tokens = tokens.len(),
        diagnostics = all.len(),
        "analysis complete"
    );
    DocumentDiagnostics::new(uri, all.into_diagnostics())
}

/// Symbol table for `text`, built-ins included.
pub fn collect_symbols(text: &str, uri: &str) -> symbols::SymbolTable {
    let (tokens, _) = Lexer::new(text, uri).tokenize();
    symbols::SymbolCollector::new(&tokens).collect().0
}
