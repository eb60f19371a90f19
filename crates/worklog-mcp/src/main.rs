//! Worklog MCP Server
//!
//! Start with: `cargo run -p worklog-mcp`
//! Or with logging: `RUST_LOG=debug cargo run -p worklog-mcp`

use rmcp::{model::ServerInfo, tool, ServerHandler, ServiceExt};
use std::sync::Arc;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;
use worklog_mcp::{envelope, CreateLogParams, WorkLogService};

/// MCP Server handler
#[derive(Clone)]
struct WorkLogServer {
    service: Arc<WorkLogService>,
}

#[tool(tool_box)]
impl ServerHandler for WorkLogServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Structured work-log server: record entries grouped by session and project, \
                 then read, search and summarize them."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

#[tool(tool_box)]
impl WorkLogServer {
    #[tool(description = "Record a work-log entry. Pass session_id to continue a session, or new_session=true to start one (exactly one of the two)")]
    async fn create_log(
        &self,
        #[tool(param)] project_name: String,
        #[tool(param)] work_content: String,
        #[tool(param)] session_id: Option<String>,
        #[tool(param)] new_session: Option<bool>,
        #[tool(param)] successes: Option<String>,
        #[tool(param)] failures: Option<String>,
        #[tool(param)] blockers: Option<String>,
        #[tool(param)] thoughts: Option<String>,
    ) -> String {
        let params = CreateLogParams {
            project_name,
            work_content,
            session_id,
            new_session: new_session.unwrap_or(false),
            successes,
            failures,
            blockers,
            thoughts,
        };
        match self.service.create_log(params).await {
            Ok(outcome) => envelope::success(&outcome),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "Read log entries, newest first, with optional project/session/date filters and pagination (limit up to 1000, default 50)")]
    async fn get_logs(
        &self,
        #[tool(param)] project_name: Option<String>,
        #[tool(param)] session_id: Option<String>,
        #[tool(param)] start_date: Option<String>,
        #[tool(param)] end_date: Option<String>,
        #[tool(param)] limit: Option<i64>,
        #[tool(param)] offset: Option<i64>,
    ) -> String {
        match self
            .service
            .get_logs(project_name, session_id, start_date, end_date, limit, offset)
            .await
        {
            Ok(page) => envelope::success(&page),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "Read one session's entries oldest-first, with a summary (count and date range)")]
    async fn get_session_logs(&self, #[tool(param)] session_id: String) -> String {
        match self.service.get_session_logs(session_id).await {
            Ok(logs) => envelope::success(&logs),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "Substring search across narrative fields (default: all of workContent, successes, failures, blockers, thoughts)")]
    async fn search_logs(
        &self,
        #[tool(param)] query: String,
        #[tool(param)] fields: Option<Vec<String>>,
        #[tool(param)] limit: Option<i64>,
    ) -> String {
        match self.service.search_logs(query, fields, limit).await {
            Ok(results) => envelope::success(&results),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "List recently active sessions (grouped from the newest 1000 matching entries)")]
    async fn get_recent_sessions(
        &self,
        #[tool(param)] limit: Option<i64>,
        #[tool(param)] project_name: Option<String>,
    ) -> String {
        match self.service.get_recent_sessions(limit, project_name).await {
            Ok(sessions) => envelope::success(&sessions),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "Get the most recently active session for a project")]
    async fn get_latest_session(&self, #[tool(param)] project_name: String) -> String {
        match self.service.get_latest_session(project_name.clone()).await {
            Ok(Some(session)) => envelope::success(&session),
            Ok(None) => envelope::success(&serde_json::json!({
                "found": false,
                "projectName": project_name,
            })),
            Err(e) => envelope::failure(&e),
        }
    }

    #[tool(description = "Aggregate summary for a project: counts, session count, date range and the five most recent entries")]
    async fn get_project_summary(
        &self,
        #[tool(param)] project_name: String,
        #[tool(param)] start_date: Option<String>,
        #[tool(param)] end_date: Option<String>,
    ) -> String {
        match self
            .service
            .get_project_summary(project_name, start_date, end_date)
            .await
        {
            Ok(summary) => envelope::success(&summary),
            Err(e) => envelope::failure(&e),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (not stdout, as stdout is for MCP communication)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting worklog MCP server");

    let service = WorkLogService::open_default().await?;
    let server = WorkLogServer {
        service: Arc::new(service),
    };

    // Serve via stdio
    let service = server.serve((stdin(), stdout())).await?;

    // Wait for shutdown
    service.waiting().await?;

    Ok(())
}
