use crate::commands::Out;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{error, warn};

fn json_text(value: &Value) -> Content {
    match serde_json::to_string_pretty(value) {
        Ok(text) => Content::text(text),
        Err(e) => {
            error!("Unable to serialize JSON output: {e}");
            Content::text(value.to_string())
        }
    }
}

/// Converts the outcome of an operation into a tool result. Both outcomes carry a single JSON text
/// item, `{"success": true, ...}` or `{"success": false, "error": "..."}`, and failures also set
/// the tool error flag.
pub(super) fn tool_result<T>(result: crate::Result<Out<T>>) -> Result<CallToolResult, ErrorData>
where
    T: Debug + Clone + Serialize,
{
    let response = result.and_then(|out| out.to_response());
    Ok(match response {
        Ok(value) => CallToolResult::success(vec![json_text(&value)]),
        Err(e) => {
            warn!("Tool call failed: {e}");
            CallToolResult::error(vec![json_text(&e.to_response())])
        }
    })
}
