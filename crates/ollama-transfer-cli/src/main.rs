//! Ollama Transfer CLI - export installed Ollama models to tar archives and
//! import them back.
//!
//! Exit status is 0 on success or when an overwrite prompt is declined, and 1
//! on any fatal error.

mod commands;

use clap::{Parser, Subcommand};
use ollama_transfer::TransferError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "ollama-transfer")]
#[command(about = "Export or import an Ollama model tarball")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a model into a tarball
    Export {
        /// Model specification in the form 'model_name:model_size' (e.g. foo-model:14b)
        model_spec: String,

        #[command(flatten)]
        common: CommonArgs,

        /// Directory to write the tarball to (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Import a model from a tarball
    Import {
        /// Path to the tarball to import
        tarball: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Base path for models (default: $OLLAMA_MODELS or ~/.ollama/models)
    #[arg(long = "base_path", alias = "base-path", value_name = "PATH")]
    base_path: Option<PathBuf>,

    /// Check blob contents against their sha256 digests
    #[arg(long)]
    verify: bool,

    /// Overwrite existing files without prompting
    #[arg(short = 'y', long)]
    yes: bool,
}

fn init_logging(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TransferError>()
        .map(TransferError::exit_code)
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Command::Export {
            model_spec,
            common,
            output_dir,
        } => commands::export(&model_spec, common, output_dir),
        Command::Import { tarball, common } => commands::import(&tarball, common),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
