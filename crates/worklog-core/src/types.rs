//! Core types for the work-log service.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorklogError};

/// One immutable work-log entry, the sole persisted entity.
///
/// Entries are created once and never updated or deleted; `log_id` is the
/// primary key and `timestamp` is stamped server-side at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub log_id: String,
    /// Creation instant, canonical ISO-8601 UTC.
    pub timestamp: String,
    pub session_id: String,
    pub project_name: String,
    pub work_content: String,
    pub successes: Option<String>,
    pub failures: Option<String>,
    pub blockers: Option<String>,
    pub thoughts: Option<String>,
    pub created_at: String,
}

/// What `create` hands back: the server-stamped identity of the new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceipt {
    pub log_id: String,
    pub session_id: String,
    pub timestamp: String,
}

/// How a new entry picks its session: continue an existing one or start
/// fresh. Exactly one of the two external parameters (`session_id`,
/// `new_session`) must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSelector {
    /// Continue the given (client-supplied, validated) session.
    Continue(String),
    /// Generate a fresh session identifier.
    StartNew,
}

impl SessionSelector {
    /// Convert the loosely-typed external pair into the tagged form,
    /// rejecting both-present and neither-present.
    pub fn from_parts(session_id: Option<String>, new_session: bool) -> Result<Self> {
        match (session_id, new_session) {
            (Some(_), true) => Err(WorklogError::validation(
                "sessionId",
                "provide either session_id or new_session=true, not both",
                None,
            )),
            (None, false) => Err(WorklogError::validation(
                "sessionId",
                "provide session_id to continue a session, or new_session=true to start one",
                None,
            )),
            (Some(id), false) => Ok(Self::Continue(id)),
            (None, true) => Ok(Self::StartNew),
        }
    }
}

/// Input to [`crate::manager::LogManager::create_log`].
#[derive(Debug, Clone)]
pub struct CreateLogInput {
    pub project_name: String,
    pub work_content: String,
    pub session: SessionSelector,
    pub successes: Option<String>,
    pub failures: Option<String>,
    pub blockers: Option<String>,
    pub thoughts: Option<String>,
}

/// Optional filters for `get_logs`, ANDed together when several are set.
#[derive(Debug, Clone, Default)]
pub struct LogFilters {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Exact match.
    pub project_name: Option<String>,
    /// Exact match.
    pub session_id: Option<String>,
    /// Inclusive lower bound on `timestamp`, canonical ISO-8601.
    pub start_date: Option<String>,
    /// Inclusive upper bound on `timestamp`, canonical ISO-8601.
    pub end_date: Option<String>,
}

/// One page of filtered results, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    /// Count of all matching rows, ignoring limit/offset.
    pub total_count: u64,
    pub has_more: bool,
}

/// Inclusive timestamp range; both fields empty when there are no rows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Recomputed-on-demand summary of one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    /// Project of the session's most recent entry.
    pub project_name: String,
    pub log_count: u64,
    pub date_range: DateRange,
}

/// A session's full narrative: all entries oldest-first plus its summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLogs {
    pub logs: Vec<LogEntry>,
    pub session_summary: SessionSummary,
}

/// The five narrative columns a substring search may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    WorkContent,
    Successes,
    Failures,
    Blockers,
    Thoughts,
}

impl SearchField {
    /// All five narrative fields, the search default.
    pub fn all() -> [Self; 5] {
        [
            Self::WorkContent,
            Self::Successes,
            Self::Failures,
            Self::Blockers,
            Self::Thoughts,
        ]
    }

    /// The backing column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::WorkContent => "workContent",
            Self::Successes => "successes",
            Self::Failures => "failures",
            Self::Blockers => "blockers",
            Self::Thoughts => "thoughts",
        }
    }

    /// Parse an externally supplied field name (camelCase or snake_case).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "workContent" | "work_content" => Ok(Self::WorkContent),
            "successes" => Ok(Self::Successes),
            "failures" => Ok(Self::Failures),
            "blockers" => Ok(Self::Blockers),
            "thoughts" => Ok(Self::Thoughts),
            other => Err(WorklogError::validation(
                "fields",
                "unknown search field (expected one of workContent, successes, failures, blockers, thoughts)",
                Some(other),
            )),
        }
    }
}

/// Input to [`crate::manager::LogManager::search_logs`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Empty means all five narrative fields.
    pub fields: Vec<SearchField>,
    pub limit: Option<u32>,
}

/// Substring-search results, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub logs: Vec<LogEntry>,
    /// Full match count, ignoring the limit.
    pub total_matches: u64,
}

/// Recomputed-on-demand aggregate over one project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_name: String,
    pub log_count: u64,
    pub session_count: u64,
    pub date_range: DateRange,
    /// The five most recent matching entries.
    pub recent_entries: Vec<LogEntry>,
}

/// One row of the recent-sessions view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    /// Project of the session's most recent scanned entry.
    pub project_name: String,
    pub last_activity: String,
    pub log_count: u64,
}
