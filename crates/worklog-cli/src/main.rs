//! Worklog CLI
//!
//! Thin wrapper around worklog-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Record an entry in a fresh session
//! worklog add demo "Wired up the session index" --new-session
//!
//! # Continue a session
//! worklog add demo "Fixed the pagination bug" --session <session_id>
//!
//! # List the newest entries for a project
//! worklog list --project demo --limit 20
//!
//! # Read one session start to finish
//! worklog session <session_id>
//!
//! # Search narrative fields
//! worklog search "pagination" --limit 10
//!
//! # Recently active sessions
//! worklog sessions --project demo
//!
//! # Project aggregates
//! worklog summary demo
//! ```

mod format;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use worklog_core::{
    config, validation, CreateLogInput, LogFilters, LogManager, LogStore, SearchField,
    SearchRequest, SessionSelector,
};

use format::OutputFormat;

/// Structured work logging, grouped by session and project
#[derive(Parser)]
#[command(name = "worklog")]
#[command(version = "0.1.0")]
#[command(about = "Structured work logging, grouped by session and project")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Database path (default: $WORKLOG_DB_PATH, else the user data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new entry
    Add {
        /// Project the entry belongs to
        project: String,
        /// What was worked on
        content: String,
        /// Continue an existing session
        #[arg(long, conflicts_with = "new_session")]
        session: Option<String>,
        /// Start a fresh session
        #[arg(long)]
        new_session: bool,
        #[arg(long)]
        successes: Option<String>,
        #[arg(long)]
        failures: Option<String>,
        #[arg(long)]
        blockers: Option<String>,
        #[arg(long)]
        thoughts: Option<String>,
    },

    /// List entries, newest first
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        session: Option<String>,
        /// Inclusive lower bound, canonical ISO-8601
        #[arg(long)]
        since: Option<String>,
        /// Inclusive upper bound, canonical ISO-8601
        #[arg(long)]
        until: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one session's entries, oldest first
    Session {
        session_id: String,
    },

    /// Substring search across narrative fields
    Search {
        query: String,
        /// Restrict to specific fields (repeatable); default is all five
        #[arg(long = "field")]
        fields: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List recently active sessions
    Sessions {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Aggregate summary for a project
    Summary {
        project: String,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let path = config::resolve_db_path(cli.db)?;
    let store = LogStore::open(path).await?;
    let manager = LogManager::new(store);

    let outcome = run(&manager, cli.command, cli.format).await;
    manager.store().close().await?;
    outcome
}

async fn run(manager: &LogManager, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Add {
            project,
            content,
            session,
            new_session,
            successes,
            failures,
            blockers,
            thoughts,
        } => {
            let session = SessionSelector::from_parts(session, new_session)?;
            let receipt = manager
                .create_log(CreateLogInput {
                    project_name: project,
                    work_content: content,
                    session,
                    successes,
                    failures,
                    blockers,
                    thoughts,
                })
                .await?;
            println!(
                "Logged {} at {} (session {})",
                receipt.log_id, receipt.timestamp, receipt.session_id
            );
        }

        Commands::List {
            project,
            session,
            since,
            until,
            limit,
            offset,
        } => {
            let page = manager
                .get_logs(LogFilters {
                    limit,
                    offset,
                    project_name: project,
                    session_id: session,
                    start_date: since,
                    end_date: until,
                })
                .await?;
            println!("{}", format::page(&page, format));
        }

        Commands::Session { session_id } => {
            let logs = manager.get_session_logs(&session_id).await?;
            println!("{}", format::session_logs(&logs, format));
        }

        Commands::Search { query, fields, limit } => {
            // This surface advertises the extended 1000-character bound;
            // the canonical 500-character rule still applies downstream.
            validation::validate_search_query_extended(&query)?;
            let fields = fields
                .iter()
                .map(|f| SearchField::parse(f))
                .collect::<worklog_core::Result<Vec<_>>>()?;
            let results = manager
                .search_logs(SearchRequest { query, fields, limit })
                .await?;
            println!("{}", format::search(&results, format));
        }

        Commands::Sessions { project, limit } => {
            let sessions = manager.get_recent_sessions(limit, project).await?;
            println!("{}", format::sessions(&sessions, format));
        }

        Commands::Summary { project, since, until } => {
            let summary = manager.get_project_summary(&project, since, until).await?;
            println!("{}", format::summary(&summary, format));
        }
    }
    Ok(())
}
