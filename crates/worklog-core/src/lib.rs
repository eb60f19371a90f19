//! Worklog Core Library
//!
//! Append-only work logging with session grouping and substring search.
//!
//! ## Overview
//!
//! A work log is a single SQLite table of immutable entries. Each entry
//! records what was done (`work_content`) plus optional narrative fields
//! (`successes`, `failures`, `blockers`, `thoughts`), grouped by a session
//! identifier and labelled with a project name. Entries are created once
//! and never updated or deleted.
//!
//! The crate is split along the same lines as its responsibilities:
//!
//! - [`validation`]: field-level contracts applied to all external input
//! - [`session`]: session identifier generation and validation
//! - [`storage`]: the SQLite persistence engine with versioned migrations
//! - [`manager`]: the orchestrator applying defaults, caps and trimming
//!
//! ## Quick Start
//!
//! ```ignore
//! use worklog_core::{CreateLogInput, LogManager, LogStore, SessionSelector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LogStore::open("~/.local/share/worklog/worklog.db").await?;
//!     let manager = LogManager::new(store);
//!
//!     let receipt = manager
//!         .create_log(CreateLogInput {
//!             project_name: "demo".into(),
//!             work_content: "Wired up the session index".into(),
//!             session: SessionSelector::StartNew,
//!             successes: None,
//!             failures: None,
//!             blockers: None,
//!             thoughts: None,
//!         })
//!         .await?;
//!
//!     println!("logged {} in session {}", receipt.log_id, receipt.session_id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod sanitize;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;

// Re-exports
pub use error::{Result, WorklogError};
pub use manager::LogManager;
pub use storage::LogStore;
pub use types::{
    CreateLogInput, CreateReceipt, DateRange, LogEntry, LogFilters, LogPage, ProjectSummary,
    SearchField, SearchRequest, SearchResults, SessionInfo, SessionLogs, SessionSelector,
    SessionSummary,
};
