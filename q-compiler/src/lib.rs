//! q Language Compiler
//!
//! This crate renders fully resolved q ASTs to Java source files. The
//! front end (parsing, name and type resolution) lives elsewhere and hands
//! over a [`q_ast::Ast`] in which every variable knows its definition and
//! every expression knows its type.

pub mod backend;
pub mod config;
pub mod error;
pub mod java;
pub mod names;
pub mod pipeline;

// Re-export main types
pub use backend::{
    BackendFactory, CodegenBackend, CodegenMetadata, CodegenOptions, CodegenResult, CompilationTarget,
};
pub use config::{CompilerConfig, ConfigError};
pub use error::RenderError;
pub use java::JavaBackend;
pub use names::{Namer, Substitutions};
pub use pipeline::{CompilationPipeline, PipelineResult, PipelineStage};

use q_ast::{Ast, AstError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, CompilerError>;

/// High-level compilation function
pub fn compile(ast: &Ast, target: &str, output_dir: &Path, config: CompilerConfig) -> Result<CompilationResult> {
    let mut pipeline = CompilationPipeline::new(config);
    pipeline.compile(ast, target, output_dir)
}

/// Compilation result
#[derive(Debug)]
pub struct CompilationResult {
    pub target: String,
    /// Written path (or relative path, without the write stage) to content
    pub files: BTreeMap<PathBuf, String>,
    pub metadata: CompilationMetadata,
}

/// Compilation metadata
#[derive(Debug)]
pub struct CompilationMetadata {
    pub load_time: std::time::Duration,
    pub codegen_time: std::time::Duration,
    pub write_time: std::time::Duration,
    pub total_time: std::time::Duration,
    pub ast_nodes: usize,
    pub generated_files: usize,
    pub total_output_size: usize,
}

/// Compiler errors
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    #[error("Invalid tree: {0}")]
    Ast(#[from] AstError),

    #[error("Code generation failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid target: {target}")]
    InvalidTarget { target: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Compiler builder for fluent configuration
pub struct CompilerBuilder {
    config: CompilerConfig,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self {
            config: CompilerConfig::default(),
        }
    }

    pub fn target(mut self, target: &str) -> Self {
        self.config.target = target.to_string();
        self
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.config.indent_width = width;
        self
    }

    pub fn holder_type(mut self, name: &str) -> Self {
        self.config.holder_type = name.to_string();
        self
    }

    pub fn self_name(mut self, name: &str) -> Self {
        self.config.self_name = name.to_string();
        self
    }

    pub fn emit_runtime(mut self, enabled: bool) -> Self {
        self.config.emit_runtime = enabled;
        self
    }

    /// Add or replace one built-in substitution
    pub fn builtin(mut self, from: &str, to: &str) -> Self {
        self.config.builtins.insert(from, to);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler::new(self.config)
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main compiler interface
pub struct Compiler {
    config: CompilerConfig,
    pipeline: CompilationPipeline,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let pipeline = CompilationPipeline::new(config.clone());
        Self { config, pipeline }
    }

    /// Compile a resolved tree for the configured target
    pub fn compile(&mut self, ast: &Ast, output_dir: &Path) -> Result<CompilationResult> {
        self.pipeline.compile(ast, &self.config.target, output_dir)
    }

    /// Compile a resolved tree stored as JSON
    pub fn compile_file(&mut self, input_path: &Path, output_dir: &Path) -> Result<CompilationResult> {
        self.pipeline.compile_file(input_path, &self.config.target, output_dir)
    }

    /// Render in memory, keyed by relative path
    pub fn render(&self, ast: &Ast) -> Result<BTreeMap<PathBuf, String>> {
        self.pipeline.render(ast, &self.config.target)
    }

    /// Get available targets
    pub fn available_targets(&self) -> Vec<String> {
        BackendFactory::available_backends()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Validate configuration
    pub fn validate_config(&self) -> Result<()> {
        self.config.validate()?;
        BackendFactory::create_backend(&self.config.target)?;
        Ok(())
    }

    /// Get configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Update configuration
    pub fn update_config(&mut self, config: CompilerConfig) {
        self.config = config.clone();
        self.pipeline = CompilationPipeline::new(config);
    }
}

/// Convenience functions
pub mod convenience {
    use super::*;

    /// Render to Java with default settings, without writing anything
    pub fn render_java(ast: &Ast) -> Result<BTreeMap<PathBuf, String>> {
        let options = JavaBackend::default_options();
        Ok(JavaBackend::new().generate_code(ast, &options)?.files)
    }

    /// Quick compilation to Java with default settings
    pub fn compile_to_java(ast: &Ast, output_dir: &Path) -> Result<CompilationResult> {
        compile(ast, "java", output_dir, CompilerConfig::default())
    }

    /// Load a resolved tree from a JSON file
    pub fn load_ast(path: &Path) -> Result<Ast> {
        Ok(Ast::from_file(path)?)
    }
}
