mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::generate::cmd_generate;
use commands::validate::cmd_validate;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Grammar IR toolchain for Swift highlighting declarations.
#[derive(Parser)]
#[command(
    name = "modeweave",
    version,
    about = "Grammar IR toolchain for Swift highlighting declarations"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log compiler passes to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate grammar IR documents
    Validate {
        /// IR document to validate (repeatable)
        #[arg(long = "input")]
        inputs: Vec<PathBuf>,
        /// Validate every *.json file in this directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Generate the Swift declarations for one language
    Generate {
        /// Language id, e.g. swift
        #[arg(long)]
        lang: String,
        /// Path to the IR document (default: <root>/tools/ir/<lang>.json)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Path to the Swift output (default: <root>/Sources/SwiftHighlight/Languages/<Base>.swift)
        #[arg(long = "out")]
        output_path: Option<PathBuf>,
        /// Repository root for default paths
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Generator config file (default: <root>/modeweave.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fail instead of falling back to declaration order on a residual cycle
        #[arg(long)]
        strict: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "modeweave={level},modeweave_core={level},modeweave_codegen={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { inputs, dir } => {
            cmd_validate(&inputs, dir.as_deref(), cli.output, cli.quiet);
        }
        Commands::Generate {
            lang,
            input,
            output_path,
            root,
            config,
            strict,
        } => {
            let request = modeweave_codegen::GenerateRequest {
                lang,
                input,
                output: output_path,
                strict,
            };
            cmd_generate(&request, &root, config.as_deref(), cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
