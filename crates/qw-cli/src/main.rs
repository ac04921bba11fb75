//! CLI frontend for the Questweave narrative engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::graph::GraphFormat;

#[derive(Parser)]
#[command(
    name = "qw",
    about = "Questweave: check, lint, graph, and play tag-driven quests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a content bundle and report load warnings
    Check {
        /// Content bundle (JSON)
        file: PathBuf,

        /// Print a JSON summary, or the error document on failure
        #[arg(long)]
        json: bool,
    },

    /// Run every static check over a content bundle
    Lint {
        /// Content bundle (JSON)
        file: PathBuf,

        /// Fail on warnings as well as errors
        #[arg(long)]
        deny_warnings: bool,

        /// Print findings as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// List step variants
    Steps {
        /// Content bundle (JSON)
        file: PathBuf,

        /// Only show variants at this location (id or display name)
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Print the step transition graph
    Graph {
        /// Content bundle (JSON)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: GraphFormat,

        /// Keep transitions the tag analysis proves impossible
        #[arg(long)]
        no_prune: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve a skill check
    Roll {
        /// Content bundle (JSON), for the game config
        file: PathBuf,

        /// Skill sources: stat or tag names
        #[arg(short, long, value_delimiter = ',', required = true)]
        skill: Vec<String>,

        /// Difficulty class
        #[arg(long)]
        dc: i64,

        /// Tags the roller holds (repeat for counts)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Stat overrides such as `might=3`
        #[arg(long)]
        stat: Vec<String>,

        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Play through a content bundle on stdin
    Play {
        /// Content bundle (JSON)
        file: PathBuf,

        /// RNG seed for a reproducible playthrough
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { file, json } => commands::check::run(&file, json),
        Commands::Lint {
            file,
            deny_warnings,
            json,
        } => commands::lint::run(&file, deny_warnings, json),
        Commands::Steps { file, location } => commands::steps::run(&file, location.as_deref()),
        Commands::Graph {
            file,
            format,
            no_prune,
            output,
        } => commands::graph::run(&file, format, !no_prune, output.as_deref()),
        Commands::Roll {
            file,
            skill,
            dc,
            tag,
            stat,
            seed,
        } => commands::roll::run(&file, &skill, dc, &tag, &stat, seed),
        Commands::Play { file, seed } => commands::play::run(&file, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
