//! Adapter for the external AuroraLang compiler: running it and turning
//! its text output into diagnostics.

mod output;
mod runner;

pub use output::{parse_compiler_output, COMPILER_SOURCE};
pub use runner::{llvm_output_path, Compiler, CompilerError, CompilerOutput};
