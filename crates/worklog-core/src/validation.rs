//! Field-level validation for all external input.
//!
//! Every check is synchronous, side-effect-free and total: well-typed input
//! either passes or fails with [`WorklogError::Validation`] naming the
//! field, the rule and the offending value. Validation always runs before
//! any storage I/O, so a failed call never leaves a partial write.
//!
//! String lengths are counted in characters, not bytes.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use crate::error::{Result, WorklogError};

/// Maximum project name length.
pub const MAX_PROJECT_NAME_LEN: usize = 100;
/// Maximum session id length accepted by the create/query input validator.
///
/// Deliberately looser than the 128-character rule enforced by
/// [`crate::session`]: identifiers in the 129..=255 range are accepted here
/// even though the generator could never produce them.
pub const MAX_INPUT_SESSION_ID_LEN: usize = 255;
/// Maximum length of `work_content` and each optional narrative field.
pub const MAX_CONTENT_LEN: usize = 10_000;
/// Canonical search query bound, used by the log manager.
pub const MAX_SEARCH_QUERY_LEN: usize = 500;
/// Extended search query bound, see [`validate_search_query_extended`].
pub const MAX_SEARCH_QUERY_LEN_EXTENDED: usize = 1_000;
/// Maximum page size for any read operation.
pub const MAX_LIMIT: u32 = 1000;
/// Earliest year accepted by [`is_valid_timestamp`].
pub const MIN_TIMESTAMP_YEAR: i32 = 2020;

fn fail(field: &str, message: impl Into<String>, provided: &str) -> WorklogError {
    WorklogError::validation(field, message, Some(provided))
}

/// Validate and trim a project name: 1..=100 characters, first character
/// ASCII alphanumeric, the rest alphanumeric, `_` or `-`.
pub fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    let count = name.chars().count();
    if count == 0 {
        return Err(fail("projectName", "project name must not be empty", name));
    }
    if count > MAX_PROJECT_NAME_LEN {
        return Err(fail(
            "projectName",
            format!("project name must be at most {MAX_PROJECT_NAME_LEN} characters"),
            name,
        ));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or_default();
    if !first.is_ascii_alphanumeric() {
        return Err(fail(
            "projectName",
            "project name must start with an alphanumeric character",
            name,
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')) {
        return Err(fail(
            "projectName",
            "project name may only contain [A-Za-z0-9_-]",
            name,
        ));
    }
    Ok(name.to_string())
}

/// Validate and trim a client-supplied session id: 1..=255 characters,
/// first character ASCII alphanumeric, the rest alphanumeric, `.`, `_`
/// or `-`.
pub fn validate_session_id(id: &str) -> Result<String> {
    let id = id.trim();
    let count = id.chars().count();
    if count == 0 {
        return Err(fail("sessionId", "session id must not be empty", id));
    }
    if count > MAX_INPUT_SESSION_ID_LEN {
        return Err(fail(
            "sessionId",
            format!("session id must be at most {MAX_INPUT_SESSION_ID_LEN} characters"),
            id,
        ));
    }
    let mut chars = id.chars();
    let first = chars.next().unwrap_or_default();
    if !first.is_ascii_alphanumeric() {
        return Err(fail(
            "sessionId",
            "session id must start with an alphanumeric character",
            id,
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(fail(
            "sessionId",
            "session id may only contain [A-Za-z0-9._-]",
            id,
        ));
    }
    Ok(id.to_string())
}

/// Validate and trim the required work content: non-empty, ≤ 10,000
/// characters.
pub fn validate_work_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(fail("workContent", "work content must not be empty", content));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(fail(
            "workContent",
            format!("work content must be at most {MAX_CONTENT_LEN} characters"),
            "<content elided>",
        ));
    }
    Ok(content.to_string())
}

/// Validate an optional narrative field: when present, ≤ 10,000 characters
/// (empty is allowed). Returns the trimmed value.
pub fn validate_optional_field(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => {
            let v = v.trim();
            if v.chars().count() > MAX_CONTENT_LEN {
                return Err(fail(
                    field,
                    format!("{field} must be at most {MAX_CONTENT_LEN} characters"),
                    "<content elided>",
                ));
            }
            Ok(Some(v.to_string()))
        }
    }
}

fn validate_query_with_bound(query: &str, bound: usize) -> Result<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(fail("query", "search query must not be empty", query));
    }
    if query.chars().count() > bound {
        return Err(fail(
            "query",
            format!("search query must be at most {bound} characters"),
            query,
        ));
    }
    Ok(query.to_string())
}

/// Validate and trim a search query against the canonical 500-character
/// bound. This is the entry point used by [`crate::manager::LogManager`].
pub fn validate_search_query(query: &str) -> Result<String> {
    validate_query_with_bound(query, MAX_SEARCH_QUERY_LEN)
}

/// Validate and trim a search query against the extended 1,000-character
/// bound.
///
/// The two bounds are a documented discrepancy: both are externally
/// observable entry points, but the 500-character rule is canonical and is
/// the one enforced on the search path itself. This function exists for
/// boundary layers that historically advertised the larger bound.
pub fn validate_search_query_extended(query: &str) -> Result<String> {
    validate_query_with_bound(query, MAX_SEARCH_QUERY_LEN_EXTENDED)
}

/// Validate a page size: 0..=1000. Zero is valid and returns no rows.
pub fn validate_limit(limit: i64) -> Result<u32> {
    if !(0..=i64::from(MAX_LIMIT)).contains(&limit) {
        return Err(fail(
            "limit",
            format!("limit must be between 0 and {MAX_LIMIT}"),
            &limit.to_string(),
        ));
    }
    Ok(limit as u32)
}

/// Validate a pagination offset: ≥ 0.
pub fn validate_offset(offset: i64) -> Result<u32> {
    if offset < 0 || offset > i64::from(u32::MAX) {
        return Err(fail(
            "offset",
            "offset must be a non-negative integer",
            &offset.to_string(),
        ));
    }
    Ok(offset as u32)
}

/// Canonical ISO-8601 rendering: UTC, millisecond precision, `Z` suffix.
pub fn canonical_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validate a date filter bound: the value must already be in canonical
/// ISO-8601 form, i.e. parsing and re-serializing reproduces the input
/// byte-for-byte. Merely date-like strings are rejected.
pub fn validate_date_filter(field: &str, value: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
        fail(field, format!("{field} is not a valid ISO-8601 timestamp: {e}"), value)
    })?;
    let canonical = canonical_timestamp(parsed.with_timezone(&Utc));
    if canonical != value {
        return Err(fail(
            field,
            format!("{field} must be in canonical ISO-8601 form (expected '{canonical}')"),
            value,
        ));
    }
    Ok(value.to_string())
}

/// Timestamp sanity check: canonical round-trip (as in
/// [`validate_date_filter`]) AND a year within `[2020, current year + 5]`
/// inclusive. Syntactically valid timestamps outside the window fail.
pub fn is_valid_timestamp(value: &str) -> bool {
    let Ok(parsed) = DateTime::parse_from_rfc3339(value) else {
        return false;
    };
    let utc = parsed.with_timezone(&Utc);
    if canonical_timestamp(utc) != value {
        return false;
    }
    let year = utc.year();
    (MIN_TIMESTAMP_YEAR..=Utc::now().year() + 5).contains(&year)
}
