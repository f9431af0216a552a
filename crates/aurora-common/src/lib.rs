pub mod config;
pub mod errors;
pub mod report;
pub mod span;

pub use config::{AuroraConfig, ConfigError};
pub use errors::{Diagnostic, DiagnosticBag, DiagnosticTag, RelatedSpan, Severity};
pub use report::{DocumentDiagnostics, DocumentRecord};
pub use span::{Position, Span};
