//! Java code generation backend
//!
//! Java has no free functions, so the projection from tree to files is not
//! one-to-one:
//!
//! - every top-level class or interface becomes `<pkg dirs>/<Name>.java`
//! - the free functions of a package are gathered into one synthetic holder
//!   class, `<pkg dirs>/Functions.java`, which also receives the `main`
//!   entry point when the package defines a function named `main`
//! - macros, method macros and primitives produce no output of their own

pub mod expr;
pub mod runtime;
pub mod stmt;

pub use expr::ExprRenderer;
pub use stmt::StmtRenderer;

use crate::backend::{utils, CodegenBackend, CodegenMetadata, CodegenOptions, CodegenResult, CompilationTarget};
use crate::error::RenderError;
use crate::names::{self, package_path, Namer};
use crate::Result;
use indexmap::IndexMap;
use q_ast::{Ast, NodeId, NodeKind};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Declaration that owns an output file, or a share of one
#[derive(Debug, Clone, Copy)]
enum TopLevel {
    Type(NodeId),
    Function(NodeId),
}

/// Java code generation backend
#[derive(Debug, Default)]
pub struct JavaBackend;

impl JavaBackend {
    pub fn new() -> Self {
        JavaBackend
    }

    pub fn target() -> CompilationTarget {
        CompilationTarget {
            name: "java".to_string(),
            file_extension: "java".to_string(),
            supports_generics: true,
            supports_free_functions: false,
        }
    }

    pub fn default_options() -> CodegenOptions {
        CodegenOptions::for_target(Self::target())
    }

    /// Render every output file of `ast`, keyed by path relative to the
    /// output root. Stops at the first structural defect.
    pub fn project(&self, ast: &Ast, options: &CodegenOptions) -> names::Result<BTreeMap<PathBuf, String>> {
        let renderer = StmtRenderer::new(ast, options);
        let namer = renderer.namer();

        let mut items = Vec::new();
        collect_top_level(ast, ast.root_definitions(), &mut items)?;

        let mut files = BTreeMap::new();
        let mut holders: IndexMap<Option<String>, Vec<NodeId>> = IndexMap::new();
        for item in items {
            match item {
                TopLevel::Type(id) => {
                    let (path, text) = self.type_file(ast, id, &renderer, namer, options)?;
                    debug!(path = %path.display(), node = %id, "rendered type");
                    insert_file(&mut files, path, text);
                }
                TopLevel::Function(id) => holders.entry(namer.package(ast, id)).or_default().push(id),
            }
        }

        for (package, functions) in holders {
            let (path, text) = self.holder_file(ast, package.as_deref(), &functions, &renderer, options)?;
            debug!(path = %path.display(), functions = functions.len(), "rendered function holder");
            insert_file(&mut files, path, text);
        }

        Ok(files)
    }

    fn type_file(
        &self,
        ast: &Ast,
        id: NodeId,
        renderer: &StmtRenderer<'_>,
        namer: Namer<'_>,
        options: &CodegenOptions,
    ) -> names::Result<(PathBuf, String)> {
        let name = ast
            .kind(id)
            .name()
            .ok_or_else(|| RenderError::unhandled_node(ast, id, "a top-level type"))?;
        let package = namer.package(ast, id);
        let path = file_path(package.as_deref(), &name.text, options);
        let text = with_package(package.as_deref(), renderer.render(id)?);
        Ok((path, text))
    }

    fn holder_file(
        &self,
        ast: &Ast,
        package: Option<&str>,
        functions: &[NodeId],
        renderer: &StmtRenderer<'_>,
        options: &CodegenOptions,
    ) -> names::Result<(PathBuf, String)> {
        let mut members = functions
            .iter()
            .map(|id| renderer.render(*id))
            .collect::<names::Result<Vec<_>>>()?;

        let has_main = functions
            .iter()
            .any(|id| matches!(ast.kind(*id).name(), Some(name) if name.text == "main"));
        if has_main {
            members.push(entry_point(options));
        }

        let holder = format!(
            "public class {} {{{}}}",
            options.holder_type,
            utils::indent(&members.join("\n"), options.indent_width)
        );
        let path = file_path(package, &options.holder_type, options);
        Ok((path, with_package(package, holder)))
    }
}

impl CodegenBackend for JavaBackend {
    fn target_info(&self) -> CompilationTarget {
        Self::target()
    }

    fn supports_feature(&self, feature: &str) -> bool {
        match feature {
            "classes" | "interfaces" | "generics" | "packages" | "macros" | "entry-point" => true,
            "free-functions" | "closures" => false,
            _ => false,
        }
    }

    fn generate_code(&self, ast: &Ast, options: &CodegenOptions) -> Result<CodegenResult> {
        let start_time = std::time::Instant::now();

        let mut files = self.project(ast, options)?;
        if options.emit_runtime {
            let runtime_code = self.generate_runtime(options)?;
            insert_file(&mut files, PathBuf::from(runtime::file_name(options)), runtime_code);
        }

        let compilation_time = start_time.elapsed();
        let generated_files = files.len();
        let total_size = files.values().map(|s| s.len()).sum();

        Ok(CodegenResult {
            files,
            metadata: CodegenMetadata {
                target_info: self.target_info(),
                generated_files,
                total_size,
                compilation_time,
            },
        })
    }

    fn generate_runtime(&self, options: &CodegenOptions) -> Result<String> {
        runtime::generate(options)
    }
}

/// Walk root and package definitions in source order
fn collect_top_level(
    ast: &Ast,
    definitions: &[NodeId],
    items: &mut Vec<TopLevel>,
) -> names::Result<()> {
    for &id in definitions {
        match ast.kind(id) {
            NodeKind::Package(package) => collect_top_level(ast, &package.definitions, items)?,
            NodeKind::Class(_) | NodeKind::Interface(_) => items.push(TopLevel::Type(id)),
            NodeKind::Function(_) => items.push(TopLevel::Function(id)),
            NodeKind::Primitive(_) | NodeKind::Macro(_) | NodeKind::MethodMacro(_) => {}
            NodeKind::Root(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Method(_)
            | NodeKind::Declaration(_)
            | NodeKind::Field(_)
            | NodeKind::Block(_)
            | NodeKind::Local(_)
            | NodeKind::Return(_)
            | NodeKind::ExprStmt(_)
            | NodeKind::Assign(_)
            | NodeKind::If(_)
            | NodeKind::Type(_)
            | NodeKind::Var(_)
            | NodeKind::Call(_)
            | NodeKind::Attr(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::List(_)
            | NodeKind::Native(_)
            | NodeKind::Fixed(_) => {
                return Err(RenderError::unhandled_node(ast, id, "a top-level definition"));
            }
        }
    }
    Ok(())
}

fn insert_file(files: &mut BTreeMap<PathBuf, String>, path: PathBuf, text: String) {
    if files.contains_key(&path) {
        warn!(path = %path.display(), "output path rendered twice, keeping the later file");
    }
    files.insert(path, text);
}

fn file_path(package: Option<&str>, name: &str, options: &CodegenOptions) -> PathBuf {
    let file = format!("{}.{}", name, options.target.file_extension);
    match package {
        Some(package) => package_path(package).join(file),
        None => PathBuf::from(file),
    }
}

fn with_package(package: Option<&str>, body: String) -> String {
    match package {
        Some(package) => format!("package {package};\n\n{body}"),
        None => body,
    }
}

/// `public static void main(String[] args)` delegating to the user's `main()`
fn entry_point(options: &CodegenOptions) -> String {
    format!(
        "public static void main(String[] args) {{{}}}",
        utils::indent("main();", options.indent_width)
    )
}
