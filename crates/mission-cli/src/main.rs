mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    apply::ApplySubcommand, checkpoint::CheckpointSubcommand, config::ConfigSubcommand,
    plan::PlanSubcommand, update::UpdateSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mission",
    about = "Mission lifecycle for AI-assisted coding: plan, apply, complete, with VCS checkpoints",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .mission/ or .git/)
    #[arg(long, global = true, env = "MISSION_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .mission/, a default config and .gitignore entries
    Init,

    /// Run the check gate and report whether a command may proceed
    Check {
        /// Command context: plan, apply, complete or debug
        #[arg(long, default_value = "")]
        context: String,
    },

    /// Print the current mission id, issuing one if needed
    Id,

    /// Start or refine the planning phase
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Edit the live mission document
    Update {
        #[command(subcommand)]
        subcommand: UpdateSubcommand,
    },

    /// Validate the plan and move the mission to planned
    Finalize,

    /// Start execution, or record its outcome
    Apply {
        #[command(subcommand)]
        subcommand: Option<ApplySubcommand>,
    },

    /// Squash checkpoints, archive the mission and clean up
    Complete {
        /// Message for the consolidated commit
        #[arg(long, short = 'm')]
        message: String,
        /// Succeed even when there is no live mission
        #[arg(long)]
        force: bool,
    },

    /// Manage mission checkpoints
    Checkpoint {
        #[command(subcommand)]
        subcommand: CheckpointSubcommand,
    },

    /// Park the live mission under .mission/paused/
    Pause,

    /// Bring back a paused mission (latest when no id is given)
    Restore { id: Option<String> },

    /// Append a record to the execution log
    Log {
        message: String,
        /// DEBUG, INFO, WARN, ERROR or SUCCESS
        #[arg(long, default_value = "INFO")]
        level: String,
    },

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // stdout carries JSON only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Check { context } => cmd::check::run(&root, &context),
        Commands::Id => cmd::id::run(&root),
        Commands::Plan { subcommand } => cmd::plan::run(&root, subcommand),
        Commands::Update { subcommand } => cmd::update::run(&root, subcommand),
        Commands::Finalize => cmd::finalize::run(&root),
        Commands::Apply { subcommand } => cmd::apply::run(&root, subcommand),
        Commands::Complete { message, force } => cmd::complete::run(&root, &message, force),
        Commands::Checkpoint { subcommand } => cmd::checkpoint::run(&root, subcommand),
        Commands::Pause => cmd::pause::pause(&root),
        Commands::Restore { id } => cmd::pause::restore(&root, id.as_deref()),
        Commands::Log { message, level } => cmd::log::run(&root, &message, &level),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        if let Err(print_err) = output::print_error(&e) {
            eprintln!("error: {print_err:#}");
        }
        std::process::exit(1);
    }
}
