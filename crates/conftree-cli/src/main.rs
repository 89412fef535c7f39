//! conftree CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "conftree")]
#[command(version, about = "Format and check YAML configuration files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a file in canonical layout
    Fmt {
        /// YAML file to format
        file: PathBuf,

        /// Spaces per nesting level
        #[arg(long, default_value_t = conftree_yaml::DEFAULT_INDENT)]
        indent: usize,

        /// Collection layout; keeps the layout of the input when omitted
        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        /// Fail instead of printing when the file is not formatted
        #[arg(long)]
        check: bool,

        /// Overwrite the file instead of printing
        #[arg(short, long, conflicts_with = "check")]
        write: bool,
    },

    /// Report errors in a file
    Check {
        /// YAML file to check
        file: PathBuf,
    },

    /// List the implicit tag of every scalar
    Tags {
        /// YAML file to inspect
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Flow,
    Block,
    Auto,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conftree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fmt {
            file,
            indent,
            style,
            check,
            write,
        } => commands::fmt::execute(&commands::fmt::FmtArgs {
            file,
            indent,
            style,
            check,
            write,
        }),
        Commands::Check { file } => commands::check::execute(&file),
        Commands::Tags { file } => commands::tags::execute(&file),
    }
}
