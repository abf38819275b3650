//! tutorforge CLI — the user-facing command-line interface standing in for
//! the HTTP surface of §6, so the full grading pipeline is end-to-end
//! exercisable without a network layer (§9C).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tutorforge_core::model::Language;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "tutorforge", version, about = "Sandboxed grading and pedagogical hints for student code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one investigation and print the resulting status/hint bundle
    Submit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        problem: String,
        #[arg(long)]
        language: Language,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Persist a draft without executing it
    Save {
        #[arg(long)]
        user: String,
        #[arg(long)]
        problem: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the stored draft, attempt count, and last error
    Draft {
        #[arg(long)]
        user: String,
        #[arg(long)]
        problem: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the sanitized problem catalog
    Problems {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Scaffold a starter config and data directory
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tutorforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Submit {
            user,
            problem,
            language,
            file,
            config,
        } => commands::submit::execute(user, problem, language, file, config).await,
        Commands::Save {
            user,
            problem,
            file,
            config,
        } => commands::save::execute(user, problem, file, config).await,
        Commands::Draft { user, problem, config } => commands::draft::execute(user, problem, config).await,
        Commands::Problems { config } => commands::problems::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
