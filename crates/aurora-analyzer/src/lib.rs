pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod source;

pub use semantic::{analyze, analyze_with_options, collect_symbols, AnalysisOptions};
pub use source::SourceFile;
