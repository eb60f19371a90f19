//! Worklog MCP Server
//!
//! An MCP (Model Context Protocol) server for recording and querying
//! structured work-log entries.
//!
//! ## Tools
//!
//! - **create_log**: append one entry, continuing or starting a session
//! - **get_logs**: filtered, paginated reads (newest first)
//! - **get_session_logs**: one session's narrative (oldest first)
//! - **search_logs**: substring search across narrative fields
//! - **get_recent_sessions** / **get_latest_session**: grouped session views
//! - **get_project_summary**: per-project aggregates
//!
//! ## Usage
//!
//! ```bash
//! # Start the MCP server (stdout carries the protocol, logs go to stderr)
//! cargo run -p worklog-mcp
//!
//! # Or with logging
//! RUST_LOG=debug cargo run -p worklog-mcp
//! ```
//!
//! Every tool returns JSON text in a uniform envelope: successes carry
//! `"success": true` plus the payload, failures carry
//! `{"success": false, "error": {type, message, details}}`. Both include a
//! server timestamp.

pub mod envelope;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use worklog_core::{
    config, validation, CreateLogInput, LogFilters, LogManager, LogPage, LogStore,
    ProjectSummary, Result, SearchField, SearchRequest, SearchResults, SessionInfo, SessionLogs,
    SessionSelector,
};

/// Prefix of the human-readable session ids this layer generates.
pub const SESSION_ID_PREFIX: &str = "worklog";

/// Generate the tool layer's human-readable session id:
/// `worklog-<project>-<YYYY-MM-DD>-<4-digit suffix>`.
///
/// Fits the 128-character session rule for any valid project name
/// (prefix + date + suffix add 24 characters to the 100-character cap).
pub fn generate_named_session_id(project_name: &str) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let suffix: u32 = rand::rng().random_range(1000..10000);
    format!("{SESSION_ID_PREFIX}-{project_name}-{date}-{suffix}")
}

/// Loosely-typed `create_log` parameters as they arrive over the wire,
/// converted once into the core's typed input.
#[derive(Debug, Clone)]
pub struct CreateLogParams {
    pub project_name: String,
    pub work_content: String,
    pub session_id: Option<String>,
    pub new_session: bool,
    pub successes: Option<String>,
    pub failures: Option<String>,
    pub blockers: Option<String>,
    pub thoughts: Option<String>,
}

/// `create_log` response: the receipt plus a human-readable session note.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogOutcome {
    pub log_id: String,
    pub session_id: String,
    pub timestamp: String,
    pub message: String,
}

/// The dispatcher's view of the core: one shared [`LogManager`], thin
/// async methods per tool.
pub struct WorkLogService {
    manager: LogManager,
}

impl WorkLogService {
    pub fn new(manager: LogManager) -> Self {
        Self { manager }
    }

    /// Open the store at the configured location (env override or the
    /// user-scoped default) and wrap it in a manager.
    pub async fn open_default() -> Result<Self> {
        let path = config::resolve_db_path(None)?;
        let store = LogStore::open(path).await?;
        Ok(Self::new(LogManager::new(store)))
    }

    /// Append one entry. Exactly one of `session_id`/`new_session` must be
    /// present; starting a session mints a `worklog-<project>-<date>-<n>`
    /// identifier.
    pub async fn create_log(&self, params: CreateLogParams) -> Result<CreateLogOutcome> {
        let selector = SessionSelector::from_parts(params.session_id, params.new_session)?;
        let (selector, message) = match selector {
            SessionSelector::StartNew => (
                SessionSelector::Continue(generate_named_session_id(params.project_name.trim())),
                "New session started",
            ),
            continued => (continued, "Session continued"),
        };
        let receipt = self
            .manager
            .create_log(CreateLogInput {
                project_name: params.project_name,
                work_content: params.work_content,
                session: selector,
                successes: params.successes,
                failures: params.failures,
                blockers: params.blockers,
                thoughts: params.thoughts,
            })
            .await?;
        Ok(CreateLogOutcome {
            log_id: receipt.log_id,
            session_id: receipt.session_id,
            timestamp: receipt.timestamp,
            message: message.to_string(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn get_logs(
        &self,
        project_name: Option<String>,
        session_id: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<LogPage> {
        let filters = LogFilters {
            limit: limit.map(validation::validate_limit).transpose()?,
            offset: offset.map(validation::validate_offset).transpose()?,
            project_name,
            session_id,
            start_date,
            end_date,
        };
        self.manager.get_logs(filters).await
    }

    pub async fn get_session_logs(&self, session_id: String) -> Result<SessionLogs> {
        self.manager.get_session_logs(&session_id).await
    }

    pub async fn search_logs(
        &self,
        query: String,
        fields: Option<Vec<String>>,
        limit: Option<i64>,
    ) -> Result<SearchResults> {
        let fields = fields
            .unwrap_or_default()
            .iter()
            .map(|f| SearchField::parse(f))
            .collect::<Result<Vec<_>>>()?;
        self.manager
            .search_logs(SearchRequest {
                query,
                fields,
                limit: limit.map(validation::validate_limit).transpose()?,
            })
            .await
    }

    pub async fn get_recent_sessions(
        &self,
        limit: Option<i64>,
        project_name: Option<String>,
    ) -> Result<Vec<SessionInfo>> {
        let limit = limit.map(validation::validate_limit).transpose()?;
        self.manager.get_recent_sessions(limit, project_name).await
    }

    pub async fn get_latest_session(&self, project_name: String) -> Result<Option<SessionInfo>> {
        self.manager.get_latest_session(&project_name).await
    }

    pub async fn get_project_summary(
        &self,
        project_name: String,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<ProjectSummary> {
        self.manager
            .get_project_summary(&project_name, start_date, end_date)
            .await
    }
}
