#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::{Path, PathBuf};
use taskview_core::config::PROJECT_DIR;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// File name of the default store under the project directory.
const DEFAULT_DB_FILE: &str = "tasks.sqlite3";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "taskview: scoped, filtered and sorted task collections",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `FORMAT`).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Path to the task store (default: `$TASKVIEW_DB` or `.taskview/tasks.sqlite3`).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }

    /// Resolve the store path: `--db`, then `TASKVIEW_DB`, then the project default.
    fn db_path(&self, project_root: &Path) -> PathBuf {
        resolve_db_path(
            self.db.clone(),
            env::var_os("TASKVIEW_DB").map(PathBuf::from),
            project_root,
        )
    }
}

fn resolve_db_path(flag: Option<PathBuf>, env_path: Option<PathBuf>, project_root: &Path) -> PathBuf {
    flag.or(env_path)
        .unwrap_or_else(|| project_root.join(PROJECT_DIR).join(DEFAULT_DB_FILE))
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create and migrate the task store",
        long_about = "Create the task store (if needed), migrate it to the latest schema and write a default config.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    tv init\n\n    # Use an explicit store path\n    tv --db /tmp/tasks.sqlite3 init\n\n    # Emit machine-readable output\n    tv init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Read a task collection",
        long_about = "Read one page of tasks visible to a user, scoped to a list, favorites or a saved filter.",
        after_help = "EXAMPLES:\n    # All tasks user 1 can read\n    tv tasks --user 1\n\n    # Tasks in list 3, most urgent first\n    tv tasks --user 1 --list 3 -p sort_by=priority -p order_by=desc\n\n    # Due before a date, including tasks with no due date\n    tv tasks --user 1 -p filter_by=due_date -p filter_comparator=less -p filter_value=2024-01-01T00:00:00Z -p filter_include_nulls=true\n\n    # Favorites (-1) and saved filter 1 (-2)\n    tv tasks --user 1 --list -1\n    tv tasks --user 1 --list -2 --json"
    )]
    Tasks(cmd::tasks::TasksArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show lists a user can read",
        long_about = "Show every list a user can read through ownership or a list, team or namespace share.",
        after_help = "EXAMPLES:\n    # Readable lists\n    tv lists --user 1\n\n    # Only lists the user can write to\n    tv lists --user 1 --min-privilege write"
    )]
    Lists(cmd::lists::ListsArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show shares naming a user",
        long_about = "Show list and namespace shares given to a user directly or to one of their teams.",
        after_help = "EXAMPLES:\n    # Shares for user 2\n    tv grants --user 2\n\n    # Emit machine-readable output\n    tv grants --user 2 --json"
    )]
    Grants(cmd::grants::GrantsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKVIEW_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskview=debug,info"
        } else {
            "taskview=info,warn"
        })
    });

    let format = env::var("TASKVIEW_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; diagnostics go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    let db_path = cli.db_path(&project_root);

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root, &db_path),
        Commands::Tasks(ref args) => cmd::tasks::run_tasks(args, output, &project_root, &db_path),
        Commands::Lists(ref args) => cmd::lists::run_lists(args, output, &db_path),
        Commands::Grants(ref args) => cmd::grants::run_grants(args, output, &db_path),
    }
}
