//! Compilation pipeline for orchestrating the compilation process

use crate::{
    backend::{BackendFactory, CodegenResult},
    config::CompilerConfig,
    CompilationMetadata, CompilationResult, CompilerError,
};
use q_ast::Ast;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Compilation pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Read a resolved tree from disk
    Load,
    CodeGen,
    /// Write rendered files below the output directory
    Write,
}

impl PipelineStage {
    fn order(self) -> u8 {
        match self {
            PipelineStage::Load => 0,
            PipelineStage::CodeGen => 1,
            PipelineStage::Write => 2,
        }
    }

    /// Only `Write` can be switched off; the others produce what later stages need
    fn is_optional(self) -> bool {
        matches!(self, PipelineStage::Write)
    }
}

/// Pipeline stage result
#[derive(Debug)]
pub struct PipelineResult<T> {
    pub stage: PipelineStage,
    pub result: T,
    pub duration: Duration,
}

/// Compilation pipeline
pub struct CompilationPipeline {
    config: CompilerConfig,
    enabled_stages: Vec<PipelineStage>,
}

impl CompilationPipeline {
    pub fn new(config: CompilerConfig) -> Self {
        let enabled_stages = vec![PipelineStage::Load, PipelineStage::CodeGen, PipelineStage::Write];

        Self {
            config,
            enabled_stages,
        }
    }

    /// Load a resolved tree from `input` and compile it
    pub fn compile_file(
        &mut self,
        input: &Path,
        target: &str,
        output_dir: &Path,
    ) -> Result<CompilationResult, CompilerError> {
        let load_result = self.run_load_stage(input)?;
        let load_time = load_result.duration;
        let mut result = self.compile(&load_result.result, target, output_dir)?;
        result.metadata.load_time = load_time;
        result.metadata.total_time += load_time;
        Ok(result)
    }

    /// Run code generation and, when enabled, the write stage
    pub fn compile(
        &mut self,
        ast: &Ast,
        target: &str,
        output_dir: &Path,
    ) -> Result<CompilationResult, CompilerError> {
        let total_start = Instant::now();
        self.config.validate()?;
        info!(backend = target, nodes = ast.len(), "compiling resolved tree");

        // Stage 1: Code generation
        let codegen_result = self.run_codegen_stage(ast, target)?;
        let codegen_time = codegen_result.duration;
        let generated_files = codegen_result.result.files;

        // Stage 2: Write files
        let (final_files, write_time) = if self.is_stage_enabled(PipelineStage::Write) {
            let write_result = self.run_write_stage(generated_files, output_dir)?;
            (write_result.result, write_result.duration)
        } else {
            debug!("write stage disabled, keeping files in memory");
            (generated_files, Duration::ZERO)
        };

        let total_time = total_start.elapsed();
        let total_output_size = final_files.values().map(|content| content.len()).sum();
        let generated_files_count = final_files.len();
        info!(files = generated_files_count, bytes = total_output_size, ?total_time, "compilation finished");

        Ok(CompilationResult {
            target: target.to_string(),
            files: final_files,
            metadata: CompilationMetadata {
                load_time: Duration::ZERO,
                codegen_time,
                write_time,
                total_time,
                ast_nodes: ast.len(),
                generated_files: generated_files_count,
                total_output_size,
            },
        })
    }

    /// Render without touching the filesystem; paths stay relative
    pub fn render(&self, ast: &Ast, target: &str) -> Result<BTreeMap<PathBuf, String>, CompilerError> {
        self.config.validate()?;
        Ok(self.run_codegen_stage(ast, target)?.result.files)
    }

    /// Run load stage
    fn run_load_stage(&self, input: &Path) -> Result<PipelineResult<Ast>, CompilerError> {
        let start = Instant::now();
        let ast = Ast::from_file(input)?;
        let duration = start.elapsed();
        debug!(path = %input.display(), nodes = ast.len(), "loaded resolved tree");

        Ok(PipelineResult {
            stage: PipelineStage::Load,
            result: ast,
            duration,
        })
    }

    /// Run code generation stage
    fn run_codegen_stage(&self, ast: &Ast, target: &str) -> Result<PipelineResult<CodegenResult>, CompilerError> {
        let start = Instant::now();

        let backend = BackendFactory::create_backend(target)?;
        let codegen_options = self.config.codegen_options(backend.target_info());
        let codegen_result = backend.generate_code(ast, &codegen_options)?;

        let duration = start.elapsed();

        Ok(PipelineResult {
            stage: PipelineStage::CodeGen,
            result: codegen_result,
            duration,
        })
    }

    /// Run file writing stage
    fn run_write_stage(
        &self,
        files: BTreeMap<PathBuf, String>,
        output_dir: &Path,
    ) -> Result<PipelineResult<BTreeMap<PathBuf, String>>, CompilerError> {
        let start = Instant::now();
        let mut written_files = BTreeMap::new();

        for (relative_path, content) in files {
            let full_path = output_dir.join(&relative_path);

            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, &content)?;
            debug!(path = %full_path.display(), bytes = content.len(), "wrote file");

            written_files.insert(full_path, content);
        }

        let duration = start.elapsed();

        Ok(PipelineResult {
            stage: PipelineStage::Write,
            result: written_files,
            duration,
        })
    }

    /// Enable or disable a pipeline stage. Required stages stay enabled.
    pub fn set_stage_enabled(&mut self, stage: PipelineStage, enabled: bool) {
        if !enabled && !stage.is_optional() {
            warn!(?stage, "required pipeline stage cannot be disabled");
            return;
        }

        if enabled {
            if !self.enabled_stages.contains(&stage) {
                self.enabled_stages.push(stage);
                self.enabled_stages.sort_by_key(|s| s.order());
            }
        } else {
            self.enabled_stages.retain(|&s| s != stage);
        }
    }

    /// Check if a stage is enabled
    pub fn is_stage_enabled(&self, stage: PipelineStage) -> bool {
        self.enabled_stages.contains(&stage)
    }

    /// Get pipeline configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Update pipeline configuration
    pub fn update_config(&mut self, config: CompilerConfig) {
        self.config = config;
    }
}
