//! HustleBoard command-line front end.
//!
//! # Responsibility
//! - Drive sessions, entity CRUD and deadline scans against a local state
//!   database from a terminal.
//! - Keep presentation here; every rule lives in `hustleboard_core`.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hustleboard_core::{default_log_level, init_logging, CoreConfig, SqliteStorage};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "hustleboard", version, about = "Local-first team task board")]
struct Cli {
    /// State database file.
    #[arg(long, env = "HUSTLEBOARD_DB", default_value = "hustleboard.sqlite3", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "HUSTLEBOARD_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "HUSTLEBOARD_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Skip the artificial store and auth latency.
    #[arg(long, global = true)]
    no_latency: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core wiring probe.
    Ping,
    /// Print core version.
    Version,
    /// Create an account and log in.
    Register(RegisterArgs),
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in as a team-less guest.
    Guest,
    Logout,
    /// Show the current session user.
    Whoami,
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Meeting(MeetingCommand),
    #[command(subcommand)]
    Feedback(FeedbackCommand),
    /// Run one deadline scan and print the alerts.
    Scan,
    /// Keep scanning on the configured interval until Ctrl-C.
    Watch {
        /// Seconds between scans; defaults to one minute.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Weekly activity summary for the current user.
    Timesheet,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    name: String,
    /// manager|member
    #[arg(long)]
    role: Option<String>,
    /// Join an existing team.
    #[arg(long)]
    invite: Option<String>,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    Add {
        #[arg(long)]
        title: String,
        /// Due date (`YYYY-MM-DD` or RFC 3339).
        #[arg(long)]
        due: Option<String>,
        /// Assignee email or id.
        #[arg(long)]
        assign: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    List {
        #[arg(long)]
        status: Option<String>,
        /// Sort field; prefix with `-` for descending.
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Move a task to `completed`.
    Done { id: String },
    /// Move a task to another board column.
    Move { id: String, status: String },
    Rm { id: String },
}

#[derive(Debug, Subcommand)]
enum MeetingCommand {
    Add {
        #[arg(long)]
        title: String,
        /// Start time (`YYYY-MM-DDTHH:MM` UTC or RFC 3339).
        #[arg(long)]
        at: String,
        /// Attendee email or id; repeat for several. None invites the team.
        #[arg(long = "attendee")]
        attendees: Vec<String>,
        #[arg(long, default_value_t = 60)]
        duration: u32,
    },
    List,
    Rm { id: String },
}

#[derive(Debug, Subcommand)]
enum FeedbackCommand {
    Add {
        /// Recipient email.
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "5")]
        rating: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        task: Option<String>,
    },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }
    info!(
        "event=cli_start module=cli status=ok db={}",
        cli.db.display()
    );

    let mut config = CoreConfig::default();
    if cli.no_latency {
        config = config.without_latency();
    }
    config.validate()?;

    let storage = SqliteStorage::open(&cli.db)
        .with_context(|| format!("failed to open state database `{}`", cli.db.display()))?;
    let app = commands::App::new(Arc::new(storage), config);

    app.run(cli.command).await
}
