use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name of the per-project configuration.
pub const CONFIG_FILE: &str = "Aurora.toml";

/// Placeholder in `build_path` that expands to the project root.
const WORKSPACE_FOLDER: &str = "${workspaceFolder}";

/// The parsed Aurora.toml configuration.
#[derive(Debug, Clone)]
pub struct AuroraConfig {
    pub compiler: CompilerSection,
    pub lint: LintSection,
    /// The directory containing the Aurora.toml file (or the source
    /// directory when running with defaults).
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSection {
    /// Compiler executable; `aurora` means "look it up".
    #[serde(default = "default_compiler_path")]
    pub path: String,
    /// Directory holding a local compiler build.
    #[serde(default = "default_build_path")]
    pub build_path: String,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            path: default_compiler_path(),
            build_path: default_build_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LintSection {
    /// Report camelCase, semicolon and `pub` style hints.
    #[serde(default = "default_style_hints")]
    pub style_hints: bool,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            style_hints: default_style_hints(),
        }
    }
}

pub fn default_compiler_path() -> String {
    "aurora".to_string()
}
fn default_build_path() -> String {
    format!("{}/build", WORKSPACE_FOLDER)
}
fn default_style_hints() -> bool {
    true
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    compiler: CompilerSection,
    #[serde(default)]
    lint: LintSection,
}

/// Errors that can occur when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no Aurora.toml found (searched from {0})")]
    NotFound(String),
    #[error("failed to read Aurora.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Aurora.toml: {0}")]
    ParseError(String),
    #[error("invalid Aurora.toml: [compiler] path must not be empty")]
    InvalidCompilerPath,
}

impl AuroraConfig {
    /// Defaults used when no Aurora.toml exists.
    pub fn defaults(root_dir: PathBuf) -> Self {
        Self {
            compiler: CompilerSection::default(),
            lint: LintSection::default(),
            root_dir,
        }
    }

    /// `build_path` with `${workspaceFolder}` expanded to the project root.
    pub fn resolved_build_path(&self) -> PathBuf {
        let root = self.root_dir.display().to_string();
        PathBuf::from(self.compiler.build_path.replace(WORKSPACE_FOLDER, &root))
    }
}

/// Walk up from `start_dir` looking for `Aurora.toml`.
/// Returns the path to the config file if found.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate an Aurora.toml from a file path.
pub fn load_config(path: &Path) -> Result<AuroraConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let root_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    parse_config(&content, root_dir)
}

/// Parse and validate an Aurora.toml from a string.
pub fn parse_config(content: &str, root_dir: PathBuf) -> Result<AuroraConfig, ConfigError> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    if raw.compiler.path.trim().is_empty() {
        return Err(ConfigError::InvalidCompilerPath);
    }

    Ok(AuroraConfig {
        compiler: raw.compiler,
        lint: raw.lint,
        root_dir,
    })
}

/// Find and load the config starting from a source file's directory.
pub fn find_and_load_config(source_file: &Path) -> Result<AuroraConfig, ConfigError> {
    let start_dir = source_file
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let config_path = find_config(start_dir)
        .ok_or_else(|| ConfigError::NotFound(start_dir.display().to_string()))?;
    tracing::debug!(path = %config_path.display(), "loading project config");
    load_config(&config_path)
}
