//! q Language compiler CLI

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use q_compiler::{convenience, CompilerBuilder, CompilerConfig};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "q-lang")]
#[command(about = "Render resolved q ASTs to Java sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a resolved tree and write the generated files
    Compile(CompileArgs),

    /// Print the generated files instead of writing them
    Emit(EmitArgs),

    /// Show available targets
    Targets,

    /// Create default configuration file
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "q-lang.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file path
        path: PathBuf,
    },
}

#[derive(Args)]
struct CompileArgs {
    /// Resolved tree (JSON)
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "dist")]
    output: PathBuf,

    #[command(flatten)]
    codegen: CodegenArgs,
}

#[derive(Args)]
struct EmitArgs {
    /// Resolved tree (JSON)
    input: PathBuf,

    #[command(flatten)]
    codegen: CodegenArgs,
}

#[derive(Args)]
struct CodegenArgs {
    /// Target language/platform
    #[arg(short, long)]
    target: Option<String>,

    /// Spaces per nesting level
    #[arg(long)]
    indent: Option<usize>,

    /// Also emit the Builtins runtime class
    #[arg(long)]
    emit_runtime: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile(args) => handle_compile(args, cli.config.as_deref()).await,
        Commands::Emit(args) => handle_emit(args, cli.config.as_deref()).await,
        Commands::Targets => handle_targets().await,
        Commands::InitConfig { output } => handle_init_config(&output).await,
        Commands::ValidateConfig { path } => handle_validate_config(&path).await,
    }
}

async fn handle_compile(args: CompileArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = create_config(config_path, &args.codegen)?;
    info!("Compiling {} to {}", args.input.display(), config.target);

    let mut compiler = CompilerBuilder::new().build();
    compiler.update_config(config);

    if !args.input.is_file() {
        bail!("{} is not a file", args.input.display());
    }

    let result = compiler
        .compile_file(&args.input, &args.output)
        .with_context(|| format!("failed to compile {}", args.input.display()))?;

    info!("Compilation successful!");
    info!("  Load time: {:?}", result.metadata.load_time);
    info!("  Code generation time: {:?}", result.metadata.codegen_time);
    info!("  Total time: {:?}", result.metadata.total_time);
    info!(
        "  Generated {} files ({} bytes) in {}",
        result.metadata.generated_files,
        result.metadata.total_output_size,
        args.output.display()
    );

    Ok(())
}

async fn handle_emit(args: EmitArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = create_config(config_path, &args.codegen)?;

    let ast = convenience::load_ast(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let mut compiler = CompilerBuilder::new().build();
    compiler.update_config(config);

    for (path, content) in compiler.render(&ast)? {
        println!("// {}", path.display());
        println!("{}", content);
        println!();
    }

    Ok(())
}

async fn handle_targets() -> anyhow::Result<()> {
    let compiler = CompilerBuilder::new().build();
    let targets = compiler.available_targets();

    println!("Available targets:");
    for target in targets {
        println!("  {}", target);
    }

    Ok(())
}

async fn handle_init_config(output: &Path) -> anyhow::Result<()> {
    info!("Creating configuration file at {}", output.display());

    CompilerConfig::default().to_file(output)?;

    info!("Configuration file created successfully!");

    Ok(())
}

async fn handle_validate_config(path: &Path) -> anyhow::Result<()> {
    info!("Validating configuration file {}", path.display());

    let config = CompilerConfig::from_file(path)?;
    config.validate()?;

    info!("Configuration file is valid!");

    Ok(())
}

/// Configuration file (or defaults) overridden by command-line flags
fn create_config(config_path: Option<&Path>, args: &CodegenArgs) -> anyhow::Result<CompilerConfig> {
    let mut config = match config_path {
        Some(path) => CompilerConfig::from_file(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?,
        None => CompilerConfig::default(),
    };

    if let Some(target) = &args.target {
        config.target = target.clone();
    }
    if let Some(indent) = args.indent {
        config.indent_width = indent;
    }
    if args.emit_runtime {
        config.emit_runtime = true;
    }

    config.validate()?;
    Ok(config)
}
