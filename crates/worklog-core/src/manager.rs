//! Orchestration layer composing validation, session identity and storage.
//!
//! The only place with default-value and capping policy: page sizes default
//! to 50 and cap at 1000, string fields are trimmed, narrative content is
//! sanitized, and `log_id`/`timestamp` are always stamped here; callers
//! can supply neither.

use chrono::Utc;
use tracing::debug;
use ulid::Ulid;

use crate::error::{Result, WorklogError};
use crate::storage::LogStore;
use crate::types::{
    CreateLogInput, CreateReceipt, LogEntry, LogFilters, LogPage, ProjectSummary, SearchField,
    SearchRequest, SearchResults, SessionInfo, SessionLogs, SessionSelector,
};
use crate::{sanitize, session, validation};

/// Page size applied when a read request names none.
pub const DEFAULT_LIMIT: u32 = 50;

/// How many of the newest rows the recent-sessions view scans.
const SESSION_SCAN_WINDOW: u32 = 1000;

/// The orchestrator the outside world calls.
///
/// Owns a [`LogStore`] handle injected at construction; the manager itself
/// keeps no other state and does no locking of its own.
pub struct LogManager {
    store: LogStore,
}

impl LogManager {
    pub fn new(store: LogStore) -> Self {
        Self { store }
    }

    /// The underlying store handle (e.g. for `close`).
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Validate, trim and sanitize the input, resolve the session, stamp
    /// identity and timestamp, and insert exactly one entry.
    ///
    /// Validation failures are rejected before any storage I/O; a failed
    /// call never leaves a row behind.
    pub async fn create_log(&self, input: CreateLogInput) -> Result<CreateReceipt> {
        let project_name = validation::validate_project_name(&input.project_name)?;
        let work_content = sanitize::sanitize_content(&validation::validate_work_content(
            &input.work_content,
        )?);
        let session_id = match input.session {
            SessionSelector::StartNew => session::generate_session_id(),
            SessionSelector::Continue(raw) => validation::validate_session_id(&raw)?,
        };
        let successes = validation::validate_optional_field("successes", input.successes.as_deref())?
            .map(|v| sanitize::sanitize_content(&v));
        let failures = validation::validate_optional_field("failures", input.failures.as_deref())?
            .map(|v| sanitize::sanitize_content(&v));
        let blockers = validation::validate_optional_field("blockers", input.blockers.as_deref())?
            .map(|v| sanitize::sanitize_content(&v));
        let thoughts = validation::validate_optional_field("thoughts", input.thoughts.as_deref())?
            .map(|v| sanitize::sanitize_content(&v));

        let timestamp = validation::canonical_timestamp(Utc::now());
        let entry = LogEntry {
            log_id: Ulid::new().to_string(),
            timestamp: timestamp.clone(),
            session_id,
            project_name,
            work_content,
            successes,
            failures,
            blockers,
            thoughts,
            created_at: timestamp,
        };
        debug!(log_id = %entry.log_id, session_id = %entry.session_id, project = %entry.project_name, "creating log entry");
        self.store.create(entry).await
    }

    /// Validate the filters, apply pagination defaults and delegate.
    pub async fn get_logs(&self, filters: LogFilters) -> Result<LogPage> {
        let mut validated = LogFilters::default();
        if let Some(project) = filters.project_name.as_deref() {
            validated.project_name = Some(validation::validate_project_name(project)?);
        }
        if let Some(session) = filters.session_id.as_deref() {
            validated.session_id = Some(validation::validate_session_id(session)?);
        }
        if let Some(start) = filters.start_date.as_deref() {
            validated.start_date = Some(validate_timestamp_bound("startDate", start)?);
        }
        if let Some(end) = filters.end_date.as_deref() {
            validated.end_date = Some(validate_timestamp_bound("endDate", end)?);
        }
        if let Some(limit) = filters.limit {
            validation::validate_limit(i64::from(limit))?;
        }
        validated.limit = Some(
            filters
                .limit
                .unwrap_or(DEFAULT_LIMIT)
                .min(validation::MAX_LIMIT),
        );
        validated.offset = Some(filters.offset.unwrap_or(0));
        self.store.get_logs(validated).await
    }

    /// A session's full narrative, oldest first.
    ///
    /// A malformed identifier fails with a session error rather than
    /// silently returning an empty result.
    pub async fn get_session_logs(&self, session_id: &str) -> Result<SessionLogs> {
        let session_id = session_id.trim();
        if !session::is_valid_session_id(session_id) {
            return Err(WorklogError::session(
                session_id,
                "session id must be 1-128 characters of [A-Za-z0-9._-]",
            ));
        }
        self.store.get_session_logs(session_id.to_string()).await
    }

    /// Substring search across the requested narrative fields (all five
    /// when none are named), capped like `get_logs`.
    pub async fn search_logs(&self, request: SearchRequest) -> Result<SearchResults> {
        let query = validation::validate_search_query(&request.query)?;
        let fields = if request.fields.is_empty() {
            SearchField::all().to_vec()
        } else {
            request.fields
        };
        if let Some(limit) = request.limit {
            validation::validate_limit(i64::from(limit))?;
        }
        let limit = request
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .min(validation::MAX_LIMIT);
        self.store.search_logs(query, fields, limit).await
    }

    /// Recent sessions, most recently active first.
    ///
    /// Bounded-scan approximation: only the newest 1000 rows matching the
    /// filter are grouped, so a session whose latest activity falls outside
    /// that window is invisible to this view.
    pub async fn get_recent_sessions(
        &self,
        limit: Option<u32>,
        project_name: Option<String>,
    ) -> Result<Vec<SessionInfo>> {
        if let Some(limit) = limit {
            validation::validate_limit(i64::from(limit))?;
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(validation::MAX_LIMIT) as usize;
        let project_name = match project_name.as_deref() {
            Some(p) => Some(validation::validate_project_name(p)?),
            None => None,
        };

        let page = self
            .store
            .get_logs(LogFilters {
                limit: Some(SESSION_SCAN_WINDOW),
                offset: Some(0),
                project_name,
                ..Default::default()
            })
            .await?;

        // Newest first, so the first entry seen for a session carries its
        // latest activity and project.
        let mut sessions: Vec<SessionInfo> = Vec::new();
        for entry in &page.logs {
            match sessions.iter_mut().find(|s| s.session_id == entry.session_id) {
                Some(info) => info.log_count += 1,
                None => sessions.push(SessionInfo {
                    session_id: entry.session_id.clone(),
                    project_name: entry.project_name.clone(),
                    last_activity: entry.timestamp.clone(),
                    log_count: 1,
                }),
            }
        }
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// The most recently active session of one project, if any is visible
    /// within the recent-sessions scan window.
    pub async fn get_latest_session(&self, project_name: &str) -> Result<Option<SessionInfo>> {
        Ok(self
            .get_recent_sessions(Some(1), Some(project_name.to_string()))
            .await?
            .into_iter()
            .next())
    }

    /// Aggregate view of one project, optionally bounded to an inclusive
    /// timestamp window.
    pub async fn get_project_summary(
        &self,
        project_name: &str,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<ProjectSummary> {
        let project_name = validation::validate_project_name(project_name)?;
        let start_date = match start_date.as_deref() {
            Some(s) => Some(validate_timestamp_bound("startDate", s)?),
            None => None,
        };
        let end_date = match end_date.as_deref() {
            Some(e) => Some(validate_timestamp_bound("endDate", e)?),
            None => None,
        };
        self.store
            .get_project_summary(project_name, start_date, end_date)
            .await
    }
}

/// Filter bounds must be canonical ISO-8601 and inside the supported year
/// window.
fn validate_timestamp_bound(field: &str, value: &str) -> Result<String> {
    let value = validation::validate_date_filter(field, value)?;
    if !validation::is_valid_timestamp(&value) {
        return Err(WorklogError::validation(
            field,
            format!("{field} is outside the supported year range"),
            Some(&value),
        ));
    }
    Ok(value)
}
