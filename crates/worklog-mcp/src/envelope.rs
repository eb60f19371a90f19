//! Uniform JSON envelopes for tool responses.
//!
//! Every tool returns text: successes merge the payload's fields with
//! `"success": true`, failures carry the error taxonomy's type, message
//! and per-kind details. Both include a server timestamp.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use worklog_core::{validation, WorklogError};

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"success\": false, \"error\": \"{e}\"}}"))
}

/// Wrap a successful payload.
pub fn success<T: Serialize>(payload: &T) -> String {
    let timestamp = validation::canonical_timestamp(Utc::now());
    let mut value = match serde_json::to_value(payload) {
        Ok(v) => v,
        Err(e) => return failure(&WorklogError::Serialization(e)),
    };
    match &mut value {
        Value::Object(map) => {
            map.insert("success".into(), Value::Bool(true));
            map.insert("timestamp".into(), Value::String(timestamp));
            render(&value)
        }
        // Non-object payloads (arrays, null) ride under "data".
        _ => render(&json!({
            "success": true,
            "data": value,
            "timestamp": timestamp,
        })),
    }
}

/// Wrap a failure in the `{success, error{type, message, details}}` shape.
pub fn failure(err: &WorklogError) -> String {
    let details = match err {
        WorklogError::Validation { field, provided, .. } => json!({
            "field": field,
            "providedValue": provided,
        }),
        WorklogError::Session { session_id, .. } => json!({
            "sessionId": session_id,
        }),
        WorklogError::Storage { operation, retryable, .. } => json!({
            "operation": operation,
            "retryable": retryable,
        }),
        _ => Value::Null,
    };
    render(&json!({
        "success": false,
        "error": {
            "type": err.kind(),
            "message": err.to_string(),
            "details": details,
        },
        "timestamp": validation::canonical_timestamp(Utc::now()),
    }))
}
