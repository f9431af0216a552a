use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aurora_analyzer::compiler::{llvm_output_path, parse_compiler_output, Compiler};
use aurora_analyzer::lexer::Lexer;
use aurora_analyzer::semantic::symbols::SymbolTable;
use aurora_analyzer::{analyze_with_options, collect_symbols, AnalysisOptions, SourceFile};
use aurora_common::config::{self, AuroraConfig, ConfigError};
use aurora_common::{Diagnostic, DocumentDiagnostics, Severity};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "AURORA_LOG";

/// AuroraLang diagnostics checker.
///
/// Reports structural, semantic and style problems in .aur source files.
#[derive(Parser)]
#[command(
    name = "aurora-check",
    version,
    about,
    long_about = "AuroraLang diagnostics checker.\n\nReports bracket, declaration, call, assignment, return and style problems\nin .aur source files without compiling them.\n\nExamples:\n  aurora-check main.aur               Check and render diagnostics\n  aurora-check main.aur --json        Print diagnostics as JSON\n  aurora-check main.aur --no-style    Skip style hints\n  aurora-check main.aur --compiler    Also run the AuroraLang compiler\n  aurora-check main.aur --emit-llvm   Compile to main.ll with the compiler"
)]
struct Cli {
    /// Input .aur source file.
    input: PathBuf,

    /// Print diagnostics as one JSON document on stdout.
    #[arg(long)]
    json: bool,

    /// Only report errors.
    #[arg(short, long)]
    quiet: bool,

    /// Skip style hints (snake_case names, semicolons, `pub` members).
    #[arg(long = "no-style")]
    no_style: bool,

    /// Also run the external compiler and include its diagnostics.
    #[arg(long)]
    compiler: bool,

    /// Compile to LLVM IR with the external compiler instead of checking.
    #[arg(long = "emit-llvm")]
    emit_llvm: bool,

    /// LLVM IR output path (default: input with a .ll extension).
    #[arg(short, long, requires = "emit_llvm")]
    output: Option<PathBuf>,

    /// Emit token stream to stdout (debug).
    #[arg(long = "emit-tokens")]
    emit_tokens: bool,

    /// Emit collected functions and classes to stdout (debug).
    #[arg(long = "emit-symbols")]
    emit_symbols: bool,

    /// Verbose logging (overridden by AURORA_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };
    let uri = cli.input.display().to_string();

    if cli.emit_tokens {
        let (tokens, _) = Lexer::new(&source, &uri).tokenize();
        for token in &tokens {
            println!(
                "{:>4}:{:<3} {:?} {:?}",
                token.span.start.line, token.span.start.column, token.kind, token.lexeme,
            );
        }
        return;
    }

    if cli.emit_symbols {
        print_symbols(&collect_symbols(&source, &uri));
        return;
    }

    // === Configuration ===
    let config = load_config(&cli.input);
    let options = AnalysisOptions {
        style_hints: config.lint.style_hints && !cli.no_style,
    };

    if cli.emit_llvm {
        let out = cli.output.clone().unwrap_or_else(|| llvm_output_path(&cli.input));
        let ok = emit_llvm(&config, &cli.input, &out, &source, &uri);
        process::exit(if ok { 0 } else { 1 });
    }

    // === Analysis ===
    let mut result = analyze_with_options(&source, &uri, &options);
    let mut failed = false;

    if cli.compiler {
        match run_compiler(&config, &cli.input, &source, &uri) {
            Ok(diagnostics) => result.diagnostics.extend(diagnostics),
            Err(message) => {
                eprintln!("error: {}", message);
                failed = true;
            }
        }
    }

    if cli.quiet {
        result.diagnostics.retain(Diagnostic::is_error);
    }

    if cli.json {
        match serde_json::to_string_pretty(&result.to_record()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize diagnostics: {}", e);
                process::exit(1);
            }
        }
    } else {
        for diag in &result.diagnostics {
            print_diagnostic(diag, &source, &uri);
        }
        print_summary(&result);
    }

    if failed || result.has_errors() {
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Find and load Aurora.toml from the source file's directory (walks up).
/// A missing file means defaults; an unreadable or invalid one is fatal.
fn load_config(input: &Path) -> AuroraConfig {
    let abs_input = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    match config::find_and_load_config(&abs_input) {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => {
            let dir = abs_input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            AuroraConfig::defaults(dir)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run_compiler(config: &AuroraConfig, input: &Path, source: &str, uri: &str) -> Result<Vec<Diagnostic>, String> {
    let compiler = Compiler::from_config(config);
    let output = compiler.run(input, &[]).map_err(|e| e.to_string())?;
    if !output.success() {
        tracing::debug!(status = %output.status, "compiler reported failure");
    }
    let file = SourceFile::new(uri, source);
    Ok(parse_compiler_output(output.diagnostic_text(), &file))
}

/// Compile `input` to LLVM IR at `out`, echoing the compiler's output and
/// rendering any diagnostics it reports. Returns whether it succeeded.
fn emit_llvm(config: &AuroraConfig, input: &Path, out: &Path, source: &str, uri: &str) -> bool {
    eprintln!("Emitting LLVM IR: {} -> {}", input.display(), out.display());
    let output = match Compiler::from_config(config).emit_llvm(input, out) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };

    if !output.stdout.trim().is_empty() {
        print!("{}", output.stdout);
    }
    let file = SourceFile::new(uri, source);
    let diagnostics = parse_compiler_output(output.diagnostic_text(), &file);
    if diagnostics.is_empty() && !output.stderr.trim().is_empty() {
        eprint!("{}", output.stderr);
    }
    for diag in &diagnostics {
        print_diagnostic(diag, source, uri);
    }

    if output.success() {
        eprintln!("LLVM IR written to {}", out.display());
        true
    } else {
        eprintln!("error: compiler exited with {}", output.status);
        false
    }
}

fn print_symbols(table: &SymbolTable) {
    for function in table.functions() {
        let params: Vec<String> = function
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        let line = function
            .line()
            .map(|l| format!(" (line {})", l))
            .unwrap_or_default();
        println!(
            "{:?} {}({}) -> {}{}",
            function.kind,
            function.name,
            params.join(", "),
            function.return_type,
            line
        );
    }
    for class in table.classes() {
        println!("class {} (line {})", class.name, class.declared_at.line());
        for (name, ty) in &class.fields {
            println!("    field {}: {}", name, ty);
        }
        for method in class.methods.values() {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty))
                .collect();
            println!(
                "    {:?} {}({}) -> {}",
                method.kind,
                method.name,
                params.join(", "),
                method.return_type
            );
        }
    }
}

fn print_summary(result: &DocumentDiagnostics) {
    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    let hints = result.count(Severity::Hint) + result.count(Severity::Info);
    if errors + warnings + hints == 0 {
        eprintln!("{}: no problems found", result.uri);
    } else {
        eprintln!(
            "{}: {} error(s), {} warning(s), {} hint(s)",
            result.uri, errors, warnings, hints
        );
    }
}

/// Character offset of a byte offset; ariadne labels count characters.
fn char_offset(source: &str, byte: u32) -> usize {
    let mut byte = (byte as usize).min(source.len());
    while !source.is_char_boundary(byte) {
        byte -= 1;
    }
    source[..byte].chars().count()
}

fn print_diagnostic(diag: &Diagnostic, source: &str, file_name: &str) {
    let (kind, color) = match diag.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
        Severity::Info | Severity::Hint => (ReportKind::Advice, Color::Cyan),
    };

    if let Some(ref span) = diag.span {
        let char_len = source.chars().count();
        let label_range = |start: u32, end: u32| {
            let start = char_offset(source, start);
            let end = char_offset(source, end).max(start + 1).min(char_len.max(start));
            start..end
        };

        let range = label_range(span.start.offset, span.end.offset);
        let mut report = Report::build(kind, file_name, range.start).with_message(&diag.message);
        if let Some(ref code) = diag.code {
            report = report.with_code(code);
        }
        report = report.with_label(
            Label::new((file_name, range))
                .with_message(&diag.message)
                .with_color(color),
        );

        for related in &diag.related {
            report = report.with_label(
                Label::new((file_name, label_range(related.span.start.offset, related.span.end.offset)))
                    .with_message(&related.message)
                    .with_color(Color::Blue),
            );
        }

        if let Some(ref suggestion) = diag.suggestion {
            report = report.with_help(suggestion);
        }

        if let Err(e) = report.finish().eprint((file_name, Source::from(source))) {
            eprintln!("error: failed to render diagnostic: {}", e);
        }
    } else {
        eprintln!("{}: {}", diag.severity.as_str(), diag.message);
        if let Some(ref suggestion) = diag.suggestion {
            eprintln!("   = help: {}", suggestion);
        }
        eprintln!();
    }
}
