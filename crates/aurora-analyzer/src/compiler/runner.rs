use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use aurora_common::config::default_compiler_path;
use aurora_common::AuroraConfig;

/// Errors from invoking the external compiler.
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    #[error("failed to run compiler '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one compiler run.
#[derive(Debug, Clone)]
pub struct CompilerOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl CompilerOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The stream the compiler reports diagnostics on: stderr when it
    /// printed anything there, stdout otherwise.
    pub fn diagnostic_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Handle on the external AuroraLang compiler executable.
#[derive(Debug, Clone)]
pub struct Compiler {
    program: PathBuf,
}

impl Compiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the executable from configuration. When the configured
    /// path is left at the default, a local build under `build_path`
    /// takes precedence over the one on `PATH`.
    pub fn from_config(config: &AuroraConfig) -> Self {
        let configured = &config.compiler.path;
        if *configured == default_compiler_path() {
            let local = config.resolved_build_path().join(configured);
            if local.is_file() {
                tracing::debug!(path = %local.display(), "using local compiler build");
                return Self::new(local);
            }
        }
        Self::new(configured.as_str())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `compiler [args] FILE` from the file's directory and capture
    /// both output streams. A non-zero exit status is not an error here.
    pub fn run(&self, file: &Path, args: &[&str]) -> Result<CompilerOutput, CompilerError> {
        tracing::debug!(
            program = %self.program.display(),
            file = %file.display(),
            ?args,
            "running compiler"
        );
        let output = self
            .command(file, args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CompilerError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(CompilerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        })
    }

    /// Compile `file` to LLVM IR written to `out`.
    pub fn emit_llvm(&self, file: &Path, out: &Path) -> Result<CompilerOutput, CompilerError> {
        let out = out.to_string_lossy();
        self.run(file, &emit_llvm_args(&out))
    }

    fn command(&self, file: &Path, args: &[&str]) -> Command {
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut command = Command::new(&self.program);
        command.args(args).arg(file).current_dir(dir);
        command
    }
}

fn emit_llvm_args(out: &str) -> [&str; 3] {
    ["--emit-llvm", "-o", out]
}

/// Default LLVM IR output for a source file: the same path with `.ll`.
pub fn llvm_output_path(file: &Path) -> PathBuf {
    file.with_extension("ll")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path, path: &str) -> AuroraConfig {
        let mut config = AuroraConfig::defaults(dir.to_path_buf());
        config.compiler.path = path.to_string();
        config
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aurora-runner-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_path_without_local_build() {
        let dir = scratch_dir("nobuild");
        let compiler = Compiler::from_config(&config_in(&dir, "aurora"));
        assert_eq!(compiler.program(), Path::new("aurora"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn local_build_wins_over_default() {
        let dir = scratch_dir("local");
        std::fs::create_dir_all(dir.join("build")).unwrap();
        std::fs::write(dir.join("build").join("aurora"), "").unwrap();

        let compiler = Compiler::from_config(&config_in(&dir, "aurora"));
        assert_eq!(compiler.program(), dir.join("build").join("aurora"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn explicit_path_is_kept() {
        let dir = scratch_dir("explicit");
        std::fs::create_dir_all(dir.join("build")).unwrap();
        std::fs::write(dir.join("build").join("aurora"), "").unwrap();

        let compiler = Compiler::from_config(&config_in(&dir, "/opt/aurora/bin/aurora"));
        assert_eq!(compiler.program(), Path::new("/opt/aurora/bin/aurora"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn emit_llvm_command_line() {
        let compiler = Compiler::new("aurora");
        let file = Path::new("demo/main.aur");
        let command = compiler.command(file, &emit_llvm_args("demo/main.ll"));

        let args: Vec<&std::ffi::OsStr> = command.get_args().collect();
        assert_eq!(args, ["--emit-llvm", "-o", "demo/main.ll", "demo/main.aur"]);
        assert_eq!(command.get_program(), "aurora");
        assert_eq!(command.get_current_dir(), Some(Path::new("demo")));
    }

    #[test]
    fn bare_file_runs_in_current_dir() {
        let command = Compiler::new("aurora").command(Path::new("main.aur"), &[]);
        assert_eq!(command.get_current_dir(), Some(Path::new(".")));
    }

    #[test]
    fn llvm_output_replaces_extension() {
        assert_eq!(llvm_output_path(Path::new("src/main.aur")), Path::new("src/main.ll"));
    }

    #[test]
    fn emit_llvm_reports_missing_compiler() {
        let compiler = Compiler::new("aurora-compiler-that-does-not-exist");
        let err = compiler
            .emit_llvm(Path::new("main.aur"), Path::new("main.ll"))
            .unwrap_err();
        assert!(matches!(err, CompilerError::Spawn { .. }));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let compiler = Compiler::new("aurora-compiler-that-does-not-exist");
        let err = compiler.run(Path::new("main.aur"), &[]).unwrap_err();
        assert!(matches!(err, CompilerError::Spawn { .. }));
        assert!(err.to_string().contains("aurora-compiler-that-does-not-exist"));
    }
}
