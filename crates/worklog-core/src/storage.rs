//! SQLite-backed persistence engine for work-log entries.
//!
//! A single connection guarded by a mutex; every public operation runs on
//! the tokio blocking pool so callers never block an async worker. Write
//! serialization is left to SQLite itself: the connection is opened with a
//! busy timeout so concurrent writers queue instead of failing immediately,
//! and busy/locked failures surface as retryable [`WorklogError::Storage`].
//!
//! Substring search uses SQL `LIKE`, which in SQLite is case-insensitive
//! for ASCII and case-sensitive for anything beyond; see
//! [`LogStore::search_logs`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, ToSql};
use tracing::{debug, info};

use crate::error::{Result, WorklogError};
use crate::types::{
    CreateReceipt, DateRange, LogEntry, LogFilters, LogPage, ProjectSummary, SearchField,
    SearchResults, SessionLogs, SessionSummary,
};
use crate::validation;

/// How long a blocked writer waits for SQLite's lock before failing
/// (retryably).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The full entry column list, in insert order.
const ENTRY_COLUMNS: &str =
    "logId, timestamp, sessionId, projectName, workContent, successes, failures, blockers, thoughts, createdAt";

/// One schema migration: a version number and the SQL that realizes it.
struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "
        CREATE TABLE work_logs (
            logId       TEXT PRIMARY KEY,
            timestamp   TEXT NOT NULL,
            sessionId   TEXT NOT NULL,
            projectName TEXT NOT NULL,
            workContent TEXT NOT NULL,
            successes   TEXT,
            failures    TEXT,
            blockers    TEXT,
            thoughts    TEXT,
            createdAt   TEXT NOT NULL
        );
        CREATE INDEX idx_work_logs_session ON work_logs(sessionId);
        CREATE INDEX idx_work_logs_project ON work_logs(projectName);
        CREATE INDEX idx_work_logs_timestamp ON work_logs(timestamp DESC);
        CREATE INDEX idx_work_logs_created ON work_logs(createdAt);
    ",
}];

/// Map a rusqlite failure onto the storage error taxonomy.
///
/// Lock contention and timeouts are retryable; constraint violations and
/// malformed queries are not.
fn map_sqlite(err: rusqlite::Error, operation: &'static str) -> WorklogError {
    let retryable = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    );
    WorklogError::storage(operation, retryable, err.to_string())
}

/// Apply every migration whose version exceeds the recorded one, ascending,
/// each inside one transaction that also records its own version. A failed
/// migration rolls back entirely and leaves the recorded version unchanged.
fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version   INTEGER PRIMARY KEY,
            appliedAt TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| map_sqlite(e, "migrate"))?;

    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .map_err(|e| map_sqlite(e, "migrate"))?;

    for migration in migrations.iter().filter(|m| m.version > current) {
        let tx = conn.transaction().map_err(|e| map_sqlite(e, "migrate"))?;
        tx.execute_batch(migration.sql)
            .map_err(|e| map_sqlite(e, "migrate"))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, appliedAt) VALUES (?1, ?2)",
            params![migration.version, validation::canonical_timestamp(Utc::now())],
        )
        .map_err(|e| map_sqlite(e, "migrate"))?;
        tx.commit().map_err(|e| map_sqlite(e, "migrate"))?;
        info!(version = migration.version, "applied schema migration");
    }
    Ok(())
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        log_id: row.get(0)?,
        timestamp: row.get(1)?,
        session_id: row.get(2)?,
        project_name: row.get(3)?,
        work_content: row.get(4)?,
        successes: row.get(5)?,
        failures: row.get(6)?,
        blockers: row.get(7)?,
        thoughts: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Escape LIKE metacharacters so the query matches literally.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Persistence handle for the work-log table.
///
/// Explicitly constructed and passed into [`crate::manager::LogManager`];
/// there is no process-wide singleton. Cheap to clone.
#[derive(Clone)]
pub struct LogStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl LogStore {
    /// Open (or create) the store at `path`, creating parent directories
    /// and applying any pending schema migrations.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = tokio::task::spawn_blocking(move || open_connection(&path))
            .await
            .map_err(|e| WorklogError::storage("open", false, format!("blocking task failed: {e}")))??;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard
                .as_ref()
                .ok_or_else(|| WorklogError::storage(operation, false, "store is closed"))?;
            f(conn)
        })
        .await
        .map_err(|e| WorklogError::storage(operation, false, format!("blocking task failed: {e}")))?
    }

    /// Insert exactly one entry.
    ///
    /// A constraint violation (duplicate `logId`) is a non-retryable
    /// storage error; busy/locked contention is retryable.
    pub async fn create(&self, entry: LogEntry) -> Result<CreateReceipt> {
        self.run("create", move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO work_logs ({ENTRY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    entry.log_id,
                    entry.timestamp,
                    entry.session_id,
                    entry.project_name,
                    entry.work_content,
                    entry.successes,
                    entry.failures,
                    entry.blockers,
                    entry.thoughts,
                    entry.created_at,
                ],
            )
            .map_err(|e| map_sqlite(e, "create"))?;
            debug!(log_id = %entry.log_id, "inserted log entry");
            Ok(CreateReceipt {
                log_id: entry.log_id,
                session_id: entry.session_id,
                timestamp: entry.timestamp,
            })
        })
        .await
    }

    /// Filtered, paginated read, newest first.
    ///
    /// Filters are ANDed; `total_count` counts every matching row
    /// regardless of limit/offset. Entries sharing a timestamp keep a
    /// stable but unspecified relative order.
    pub async fn get_logs(&self, filters: LogFilters) -> Result<LogPage> {
        self.run("get_logs", move |conn| {
            let mut clauses: Vec<&'static str> = Vec::new();
            let mut args: Vec<Box<dyn ToSql>> = Vec::new();
            if let Some(project) = &filters.project_name {
                clauses.push("projectName = ?");
                args.push(Box::new(project.clone()));
            }
            if let Some(session) = &filters.session_id {
                clauses.push("sessionId = ?");
                args.push(Box::new(session.clone()));
            }
            if let Some(start) = &filters.start_date {
                clauses.push("timestamp >= ?");
                args.push(Box::new(start.clone()));
            }
            if let Some(end) = &filters.end_date {
                clauses.push("timestamp <= ?");
                args.push(Box::new(end.clone()));
            }
            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let total: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM work_logs{where_sql}"),
                    params_from_iter(args.iter().map(|b| b.as_ref())),
                    |row| row.get(0),
                )
                .map_err(|e| map_sqlite(e, "get_logs"))?;

            let limit = filters.limit.map(i64::from).unwrap_or(-1);
            let offset = i64::from(filters.offset.unwrap_or(0));
            args.push(Box::new(limit));
            args.push(Box::new(offset));
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM work_logs{where_sql}
                     ORDER BY timestamp DESC LIMIT ? OFFSET ?"
                ))
                .map_err(|e| map_sqlite(e, "get_logs"))?;
            let logs = stmt
                .query_map(params_from_iter(args.iter().map(|b| b.as_ref())), row_to_entry)
                .map_err(|e| map_sqlite(e, "get_logs"))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| map_sqlite(e, "get_logs"))?;

            let total = total as u64;
            let has_more = (offset as u64) + (logs.len() as u64) < total;
            Ok(LogPage {
                logs,
                total_count: total,
                has_more,
            })
        })
        .await
    }

    /// All entries for one session, oldest first (a session reads as a
    /// narrative), plus a recomputed summary. The summary's date range is
    /// a pair of empty strings when the session has no rows.
    pub async fn get_session_logs(&self, session_id: String) -> Result<SessionLogs> {
        self.run("get_session_logs", move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM work_logs
                     WHERE sessionId = ?1 ORDER BY timestamp ASC"
                ))
                .map_err(|e| map_sqlite(e, "get_session_logs"))?;
            let logs = stmt
                .query_map([&session_id], row_to_entry)
                .map_err(|e| map_sqlite(e, "get_session_logs"))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| map_sqlite(e, "get_session_logs"))?;

            let session_summary = SessionSummary {
                session_id,
                project_name: logs
                    .last()
                    .map(|e| e.project_name.clone())
                    .unwrap_or_default(),
                log_count: logs.len() as u64,
                date_range: DateRange {
                    start: logs.first().map(|e| e.timestamp.clone()).unwrap_or_default(),
                    end: logs.last().map(|e| e.timestamp.clone()).unwrap_or_default(),
                },
            };
            Ok(SessionLogs {
                logs,
                session_summary,
            })
        })
        .await
    }

    /// Substring match of `query` against each requested field, rows
    /// matching on ANY field included, newest first. `total_matches`
    /// ignores the limit.
    ///
    /// Matching uses SQLite `LIKE` with its native text comparison:
    /// case-insensitive for ASCII letters, case-sensitive beyond ASCII.
    /// LIKE metacharacters in `query` are escaped and match literally.
    pub async fn search_logs(
        &self,
        query: String,
        fields: Vec<SearchField>,
        limit: u32,
    ) -> Result<SearchResults> {
        self.run("search_logs", move |conn| {
            let clause = fields
                .iter()
                .map(|f| format!("{} LIKE '%' || ?1 || '%' ESCAPE '\\'", f.column()))
                .collect::<Vec<_>>()
                .join(" OR ");
            let needle = escape_like(&query);

            let total: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM work_logs WHERE {clause}"),
                    params![needle],
                    |row| row.get(0),
                )
                .map_err(|e| map_sqlite(e, "search_logs"))?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM work_logs WHERE {clause}
                     ORDER BY timestamp DESC LIMIT ?2"
                ))
                .map_err(|e| map_sqlite(e, "search_logs"))?;
            let logs = stmt
                .query_map(params![needle, i64::from(limit)], row_to_entry)
                .map_err(|e| map_sqlite(e, "search_logs"))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| map_sqlite(e, "search_logs"))?;

            Ok(SearchResults {
                logs,
                total_matches: total as u64,
            })
        })
        .await
    }

    /// Aggregate view of one project: entry count, distinct session count,
    /// timestamp range and the five most recent entries, optionally bounded
    /// to an inclusive timestamp window.
    pub async fn get_project_summary(
        &self,
        project_name: String,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<ProjectSummary> {
        self.run("get_project_summary", move |conn| {
            let mut clauses = vec!["projectName = ?"];
            let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(project_name.clone())];
            if let Some(start) = &start_date {
                clauses.push("timestamp >= ?");
                args.push(Box::new(start.clone()));
            }
            if let Some(end) = &end_date {
                clauses.push("timestamp <= ?");
                args.push(Box::new(end.clone()));
            }
            let where_sql = clauses.join(" AND ");

            let (log_count, session_count, start, end): (i64, i64, String, String) = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*), COUNT(DISTINCT sessionId),
                                COALESCE(MIN(timestamp), ''), COALESCE(MAX(timestamp), '')
                         FROM work_logs WHERE {where_sql}"
                    ),
                    params_from_iter(args.iter().map(|b| b.as_ref())),
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .map_err(|e| map_sqlite(e, "get_project_summary"))?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM work_logs WHERE {where_sql}
                     ORDER BY timestamp DESC LIMIT 5"
                ))
                .map_err(|e| map_sqlite(e, "get_project_summary"))?;
            let recent_entries = stmt
                .query_map(params_from_iter(args.iter().map(|b| b.as_ref())), row_to_entry)
                .map_err(|e| map_sqlite(e, "get_project_summary"))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| map_sqlite(e, "get_project_summary"))?;

            Ok(ProjectSummary {
                project_name,
                log_count: log_count as u64,
                session_count: session_count as u64,
                date_range: DateRange { start, end },
                recent_entries,
            })
        })
        .await
    }

    /// Release the underlying connection. Idempotent; any operation after
    /// the first close fails with a non-retryable storage error.
    pub async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            if let Some(connection) = conn.lock().take() {
                connection
                    .close()
                    .map_err(|(_, e)| map_sqlite(e, "close"))?;
            }
            Ok(())
        })
        .await
        .map_err(|e| WorklogError::storage("close", false, format!("blocking task failed: {e}")))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = Connection::open(path).map_err(|e| map_sqlite(e, "open"))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| map_sqlite(e, "open"))?;
    // journal_mode returns a result row, so pragma_update would reject it
    let _mode: String = conn
        .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
        .map_err(|e| map_sqlite(e, "open"))?;
    apply_migrations(&mut conn, MIGRATIONS)?;
    Ok(conn)
}
