//! Abstract backend interface for code generation

use crate::names::Substitutions;
use crate::{CompilerError, Result};
use q_ast::Ast;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Compilation target specification
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationTarget {
    pub name: String,
    pub file_extension: String,
    pub supports_generics: bool,
    /// Whether callables may live outside a type
    pub supports_free_functions: bool,
}

/// Code generation options, fixed for the duration of a run
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub target: CompilationTarget,
    pub indent_width: usize,
    /// Synthetic type hosting a package's free functions
    pub holder_type: String,
    /// Receiver name bound inside method macros
    pub self_name: String,
    /// Fixed renaming of source built-ins
    pub builtins: Substitutions,
    pub emit_runtime: bool,
}

impl CodegenOptions {
    pub fn for_target(target: CompilationTarget) -> Self {
        Self {
            target,
            indent_width: 4,
            holder_type: "Functions".to_string(),
            self_name: "self".to_string(),
            builtins: Substitutions::java(),
            emit_runtime: false,
        }
    }
}

/// Result of code generation
#[derive(Debug)]
pub struct CodegenResult {
    /// Relative path to complete file text
    pub files: BTreeMap<PathBuf, String>,
    pub metadata: CodegenMetadata,
}

/// Metadata about the generated code
#[derive(Debug)]
pub struct CodegenMetadata {
    pub target_info: CompilationTarget,
    pub generated_files: usize,
    pub total_size: usize,
    pub compilation_time: std::time::Duration,
}

/// Abstract code generation backend
pub trait CodegenBackend {
    /// Get the target information for this backend
    fn target_info(&self) -> CompilationTarget;

    /// Check if this backend supports the given feature
    fn supports_feature(&self, feature: &str) -> bool;

    /// Render a resolved tree to a set of files
    fn generate_code(&self, ast: &Ast, options: &CodegenOptions) -> Result<CodegenResult>;

    /// Generate runtime support code
    fn generate_runtime(&self, options: &CodegenOptions) -> Result<String>;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend for the specified target
    pub fn create_backend(target: &str) -> Result<Box<dyn CodegenBackend>> {
        match target {
            "java" | "jvm" => Ok(Box::new(crate::java::JavaBackend::new())),
            _ => Err(CompilerError::InvalidTarget {
                target: target.to_string(),
            }),
        }
    }

    /// List all available backends
    pub fn available_backends() -> Vec<&'static str> {
        vec!["java"]
    }
}

/// Utility functions for code generation
pub mod utils {
    /// Nest `text` one level: a leading newline, every line prefixed with
    /// `width` spaces, one trailing newline. Empty text stays empty.
    pub fn indent(text: &str, width: usize) -> String {
        if text.is_empty() {
            return String::new();
        }
        let newline = format!("\n{}", " ".repeat(width));
        let mut nested = format!("\n{text}").replace('\n', &newline);
        nested.push('\n');
        nested
    }
}
