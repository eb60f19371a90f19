//! Output formatters: table, JSON and markdown renderings of query
//! results. Presentation only, no invariants of its own.

use clap::ValueEnum;
use serde::Serialize;
use worklog_core::{LogEntry, LogPage, ProjectSummary, SearchResults, SessionInfo, SessionLogs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {e}"))
}

/// Truncate to `max` characters, appending an ellipsis when shortened.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

fn entry_table(entries: &[LogEntry]) -> String {
    let mut out = format!(
        "{:<24}  {:<16}  {:<28}  {}\n",
        "TIMESTAMP", "PROJECT", "SESSION", "CONTENT"
    );
    for e in entries {
        out.push_str(&format!(
            "{:<24}  {:<16}  {:<28}  {}\n",
            e.timestamp,
            clip(&e.project_name, 16),
            clip(&e.session_id, 28),
            clip(&e.work_content, 60),
        ));
    }
    out
}

fn entry_markdown(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!(
            "### {} ({})\n\n- session: `{}`\n- log id: `{}`\n\n{}\n\n",
            e.timestamp, e.project_name, e.session_id, e.log_id, e.work_content
        ));
        for (label, value) in [
            ("Successes", &e.successes),
            ("Failures", &e.failures),
            ("Blockers", &e.blockers),
            ("Thoughts", &e.thoughts),
        ] {
            if let Some(text) = value {
                if !text.is_empty() {
                    out.push_str(&format!("**{label}:** {text}\n\n"));
                }
            }
        }
    }
    out
}

pub fn page(page: &LogPage, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(page),
        OutputFormat::Table => format!(
            "{}\n{} of {} entries{}",
            entry_table(&page.logs),
            page.logs.len(),
            page.total_count,
            if page.has_more { " (more available)" } else { "" },
        ),
        OutputFormat::Markdown => format!(
            "## Log entries\n\n{}\n_{} of {} entries{}_\n",
            entry_markdown(&page.logs),
            page.logs.len(),
            page.total_count,
            if page.has_more { ", more available" } else { "" },
        ),
    }
}

pub fn session_logs(logs: &SessionLogs, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(logs),
        OutputFormat::Table => {
            let s = &logs.session_summary;
            format!(
                "Session {} ({}): {} entries, {} .. {}\n\n{}",
                s.session_id,
                s.project_name,
                s.log_count,
                s.date_range.start,
                s.date_range.end,
                entry_table(&logs.logs),
            )
        }
        OutputFormat::Markdown => {
            let s = &logs.session_summary;
            format!(
                "## Session `{}`\n\nProject: {} | Entries: {} | Range: {} .. {}\n\n{}",
                s.session_id,
                s.project_name,
                s.log_count,
                s.date_range.start,
                s.date_range.end,
                entry_markdown(&logs.logs),
            )
        }
    }
}

pub fn search(results: &SearchResults, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(results),
        OutputFormat::Table => format!(
            "{}\n{} of {} matches",
            entry_table(&results.logs),
            results.logs.len(),
            results.total_matches,
        ),
        OutputFormat::Markdown => format!(
            "## Search results\n\n{}\n_{} of {} matches_\n",
            entry_markdown(&results.logs),
            results.logs.len(),
            results.total_matches,
        ),
    }
}

pub fn sessions(sessions: &[SessionInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(&sessions),
        OutputFormat::Table => {
            let mut out = format!(
                "{:<28}  {:<16}  {:<24}  {}\n",
                "SESSION", "PROJECT", "LAST ACTIVITY", "ENTRIES"
            );
            for s in sessions {
                out.push_str(&format!(
                    "{:<28}  {:<16}  {:<24}  {}\n",
                    clip(&s.session_id, 28),
                    clip(&s.project_name, 16),
                    s.last_activity,
                    s.log_count,
                ));
            }
            out
        }
        OutputFormat::Markdown => {
            let mut out = String::from(
                "| Session | Project | Last activity | Entries |\n|---|---|---|---|\n",
            );
            for s in sessions {
                out.push_str(&format!(
                    "| `{}` | {} | {} | {} |\n",
                    s.session_id, s.project_name, s.last_activity, s.log_count
                ));
            }
            out
        }
    }
}

pub fn summary(summary: &ProjectSummary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(summary),
        OutputFormat::Table => format!(
            "Project {}: {} entries across {} sessions, {} .. {}\n\nMost recent:\n{}",
            summary.project_name,
            summary.log_count,
            summary.session_count,
            summary.date_range.start,
            summary.date_range.end,
            entry_table(&summary.recent_entries),
        ),
        OutputFormat::Markdown => format!(
            "## Project `{}`\n\nEntries: {} | Sessions: {} | Range: {} .. {}\n\n### Most recent\n\n{}",
            summary.project_name,
            summary.log_count,
            summary.session_count,
            summary.date_range.start,
            summary.date_range.end,
            entry_markdown(&summary.recent_entries),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogEntry {
        LogEntry {
            log_id: "01AB".into(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            session_id: "s1".into(),
            project_name: "demo".into(),
            work_content: "did the thing".into(),
            successes: Some("built".into()),
            failures: None,
            blockers: None,
            thoughts: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn clip_is_char_safe() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("0123456789", 8), "01234...");
        // Multi-byte characters must not be split.
        assert_eq!(clip("éééééééééé", 8), "ééééé...");
    }

    #[test]
    fn table_and_markdown_render_entries() {
        let page_value = LogPage {
            logs: vec![entry()],
            total_count: 1,
            has_more: false,
        };
        let table = page(&page_value, OutputFormat::Table);
        assert!(table.contains("demo"));
        assert!(table.contains("1 of 1 entries"));

        let md = page(&page_value, OutputFormat::Markdown);
        assert!(md.contains("### 2026-01-01T00:00:00.000Z (demo)"));
        assert!(md.contains("**Successes:** built"));
    }

    #[test]
    fn json_output_is_parseable() {
        let text = page(
            &LogPage {
                logs: vec![entry()],
                total_count: 1,
                has_more: false,
            },
            OutputFormat::Json,
        );
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["logs"][0]["projectName"], "demo");
    }
}
