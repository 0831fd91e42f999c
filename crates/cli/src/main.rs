mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Structural comparison of versioned API documents.
#[derive(Parser)]
#[command(
    name = "evolve",
    version,
    about = "Structural comparison of versioned API documents"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log comparison details to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents and produce a migration guide
    Compare {
        /// Path to the old document
        old: PathBuf,
        /// Path to the new document
        new: PathBuf,
        /// Write the migration guide to this path
        #[arg(long)]
        guide: Option<PathBuf>,
        /// Previously generated guide that must stem from the old document
        #[arg(long)]
        baseline: Option<PathBuf>,
        /// TOML file with comparison settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Detect renamed endpoints and parameters
        #[arg(long)]
        relaxed: bool,
        /// Detect renamed models, properties and enum cases
        #[arg(long)]
        relaxed_models: bool,
        /// Similarity a rename candidate must exceed
        #[arg(long)]
        threshold: Option<f64>,
        /// Exit with status 1 when the guide contains breaking changes
        #[arg(long)]
        breaking: bool,
    },

    /// Load and validate a document
    Validate {
        /// Path to the document JSON file
        document: PathBuf,
    },

    /// Print the report of a saved migration guide
    Summary {
        /// Path to the migration guide JSON file
        guide: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Compare {
            old,
            new,
            guide,
            baseline,
            config,
            relaxed,
            relaxed_models,
            threshold,
            breaking,
        } => {
            let options = commands::compare::CompareOptions {
                guide,
                baseline,
                config,
                relaxed,
                relaxed_models,
                threshold,
                breaking,
            };
            commands::compare::cmd_compare(&old, &new, &options, cli.output, cli.quiet);
        }
        Commands::Validate { document } => {
            commands::validate::cmd_validate(&document, cli.output, cli.quiet);
        }
        Commands::Summary { guide } => {
            commands::summary::cmd_summary(&guide, cli.output, cli.quiet);
        }
    }
}

/// Report an error in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
