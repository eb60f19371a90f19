//! Store location resolution.
//!
//! The database path is taken from, in order: an explicit override (CLI
//! flag or constructor argument), the `WORKLOG_DB_PATH` environment
//! variable, then a default under the user's data directory.

use std::path::PathBuf;

use crate::error::{Result, WorklogError};

/// Environment variable overriding the store location.
pub const DB_PATH_ENV: &str = "WORKLOG_DB_PATH";

/// Resolve the database path for this process.
pub fn resolve_db_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let base = dirs::data_dir().ok_or(WorklogError::DataDirNotFound)?;
    Ok(base.join("worklog").join("worklog.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let path = resolve_db_path(Some(PathBuf::from("/tmp/x.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn default_ends_with_worklog_db() {
        // May legitimately fail only on platforms without a data dir.
        if let Ok(path) = resolve_db_path(None) {
            assert!(path.ends_with("worklog/worklog.db") || path.to_string_lossy().ends_with("worklog.db"));
        }
    }
}
