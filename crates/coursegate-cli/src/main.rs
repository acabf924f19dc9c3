//! coursegate CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coursegate",
    version,
    about = "Course content gating and quiz engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate lesson availability for a learner
    Availability {
        /// Path to .toml course file
        #[arg(long)]
        course: PathBuf,

        /// Path to .toml learner file
        #[arg(long)]
        learner: PathBuf,

        /// JSON file with the learner's progress snapshot
        #[arg(long)]
        progress: Option<PathBuf>,

        /// Evaluate as of this instant (RFC 3339 or YYYY-MM-DD, default: now)
        #[arg(long)]
        at: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Validate course TOML files
    Validate {
        /// Path to course file or directory
        #[arg(long)]
        course: PathBuf,
    },

    /// Simulate a quiz attempt lifecycle against an in-memory store
    Simulate {
        /// Path to .toml course file
        #[arg(long)]
        course: PathBuf,

        /// Path to .toml learner file
        #[arg(long)]
        learner: PathBuf,

        /// Quiz lesson id to attempt
        #[arg(long)]
        lesson: String,

        /// JSON file of answers keyed by question id
        #[arg(long)]
        answers: PathBuf,

        /// Evaluate as of this instant (RFC 3339 or YYYY-MM-DD, default: now)
        #[arg(long)]
        at: Option<String>,

        /// If the submission is held for review, resolve it at this score
        #[arg(long)]
        review_score: Option<u8>,
    },

    /// Create an example course and learner file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursegate=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Availability {
            course,
            learner,
            progress,
            at,
            format,
        } => commands::availability::execute(course, learner, progress, at, format),
        Commands::Validate { course } => commands::validate::execute(course),
        Commands::Simulate {
            course,
            learner,
            lesson,
            answers,
            at,
            review_score,
        } => commands::simulate::execute(course, learner, lesson, answers, at, review_score).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
