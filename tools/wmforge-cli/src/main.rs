//! wmforge CLI: turn watermark edit settings into ffmpeg commands and scripts.
//!
//! Usage:
//!   wmforge init <FILE>               Write default settings
//!   wmforge validate <FILE>           Report problems in a settings file
//!   wmforge compile <FILE>            Print the command or batch script
//!   wmforge ask <FILE> <QUESTION>     Ask the assistant about the settings
//!   wmforge info <FILE>               Show settings and filter stages

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wmforge_command_engine::Dialect;

mod commands;

#[derive(Parser)]
#[command(
    name = "wmforge",
    about = "Compile video watermark settings into ffmpeg commands",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a settings file with editor defaults
    Init {
        /// Settings file to create
        path: PathBuf,

        /// Start in batch mode
        #[arg(long)]
        batch: bool,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Report problems in a settings file
    Validate {
        /// Settings file
        path: PathBuf,
    },

    /// Compile settings into a command or batch script
    Compile {
        /// Settings file
        path: PathBuf,

        /// Batch script dialect: windows|posix (defaults to the config value)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Source video name shown in single-file commands
        #[arg(long)]
        video: Option<String>,

        /// Watermark image name
        #[arg(long)]
        watermark: Option<String>,

        /// Write the output into this directory instead of stdout
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Ask the assistant a question about the current settings
    Ask {
        /// Settings file
        path: PathBuf,

        /// Question text
        question: Vec<String>,
    },

    /// Show settings and the compiled filter stages
    Info {
        /// Settings file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = wmforge_common::AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    wmforge_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init { path, batch, force } => commands::init::run(path, batch, force),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Compile {
            path,
            dialect,
            video,
            watermark,
            save,
        } => commands::compile::run(
            &config,
            path,
            commands::compile::CompileArgs {
                dialect,
                video,
                watermark,
                save,
            },
        ),
        Commands::Ask { path, question } => {
            commands::ask::run(&config, path, question.join(" ")).await
        }
        Commands::Info { path } => commands::info::run(path),
    }
}
